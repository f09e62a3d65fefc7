use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{repo::User, repo::UserRole, session::MaybeSession},
    flash,
    jobs::repo::Job,
    payments::{Customer, Customizations, PaymentRequest},
    state::AppState,
};

/// Builds a payment-initiation payload for the given job and redirects to
/// the gateway's hosted checkout page. Payment state is not reconciled
/// against the job row.
#[instrument(skip(state, session))]
pub async fn pay(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(job_id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let Some(session) = session else {
        return Ok(flash::redirect("/", "Only employers can promote jobs."));
    };
    if session.role != UserRole::Employer {
        warn!(user_id = %session.user_id, "non-employer attempted to promote a job");
        return Ok(flash::redirect(
            "/dashboard",
            "Only employers can promote jobs.",
        ));
    }

    let Ok(job_id) = Uuid::parse_str(&job_id) else {
        return Err((StatusCode::NOT_FOUND, "Job not found".into()));
    };
    let job = match Job::find_by_id(&state.db, job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => return Err((StatusCode::NOT_FOUND, "Job not found".into())),
        Err(e) => return Err(internal(e)),
    };

    // Customer details come from the stored user row, not the session claims.
    let user = match User::find_by_id(&state.db, session.user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(user_id = %session.user_id, "session user no longer exists");
            return Ok(flash::redirect("/", "Only employers can promote jobs."));
        }
        Err(e) => return Err(internal(e)),
    };

    let cfg = &state.config.payment;
    let request = PaymentRequest {
        tx_ref: Uuid::new_v4().to_string(),
        amount: cfg.amount,
        currency: cfg.currency.clone(),
        redirect_url: cfg.redirect_url.clone(),
        customer: Customer {
            email: user.email,
            phonenumber: user.phone,
            name: user.name,
        },
        customizations: Customizations {
            title: "Premium job post".into(),
            description: format!("Promote listing {}", job.title),
        },
    };

    match state.payments.initiate(&request).await {
        Ok(link) => {
            info!(%job_id, tx_ref = %request.tx_ref, "payment initiated");
            Ok(Redirect::to(&link).into_response())
        }
        Err(e) => {
            warn!(error = %e, %job_id, "payment initiation failed");
            Ok(flash::redirect(
                "/dashboard",
                "Payment initiation failed. Try again.",
            ))
        }
    }
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
