use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::SessionInfo,
        repo::UserRole,
        session::MaybeSession,
    },
    flash::{self, Flash},
    jobs::dto::{
        DashboardResponse, HomeResponse, JobDetails, JobForm, JobListItem, SearchParams,
        SearchResponse,
    },
    jobs::repo::Job,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(job_details))
        .route("/dashboard", get(dashboard))
        .route("/search", get(search))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/post-job", post(post_job))
}

/// Public landing page: all listings, newest first, plus any pending
/// flash message (validation redirects land here).
#[instrument(skip(state, message))]
pub async fn home(
    State(state): State<AppState>,
    Flash(message): Flash,
) -> Result<Response, (StatusCode, String)> {
    let jobs = Job::list_all(&state.db).await.map_err(internal)?;
    let jobs = jobs.into_iter().map(JobListItem::from).collect();
    Ok((
        flash::clear_headers(),
        Json(HomeResponse {
            flash: message,
            jobs,
        }),
    )
        .into_response())
}

#[instrument(skip(state))]
pub async fn list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobListItem>>, (StatusCode, String)> {
    let jobs = Job::list_all(&state.db).await.map_err(internal)?;
    Ok(Json(jobs.into_iter().map(JobListItem::from).collect()))
}

#[instrument(skip(state))]
pub async fn job_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobDetails>, (StatusCode, String)> {
    // Malformed ids get the same generic not-found as unknown ones.
    let Ok(id) = Uuid::parse_str(&id) else {
        return Err((StatusCode::NOT_FOUND, "Job not found".into()));
    };
    match Job::find_by_id(&state.db, id).await {
        Ok(Some(job)) => Ok(Json(JobDetails::from(job))),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Job not found".into())),
        Err(e) => Err(internal(e)),
    }
}

/// Role-filtered listing: employers see only their own posts, seekers see
/// everything.
#[instrument(skip(state, session, message))]
pub async fn dashboard(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Flash(message): Flash,
) -> Result<Response, (StatusCode, String)> {
    let Some(session) = session else {
        return Ok(flash::redirect("/", "Login required to view dashboard."));
    };

    let jobs = match session.role {
        UserRole::Employer => Job::list_by_owner(&state.db, session.user_id).await,
        UserRole::Seeker => Job::list_all(&state.db).await,
    }
    .map_err(internal)?;

    Ok((
        flash::clear_headers(),
        Json(DashboardResponse {
            user: SessionInfo {
                id: session.user_id,
                name: session.name,
                role: session.role,
            },
            flash: message,
            jobs: jobs.into_iter().map(JobListItem::from).collect(),
        }),
    )
        .into_response())
}

#[instrument(skip(state, session, form))]
pub async fn post_job(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Form(form): Form<JobForm>,
) -> Result<Response, (StatusCode, String)> {
    let Some(session) = session else {
        return Ok(flash::redirect("/", "Only employers can post jobs."));
    };
    if session.role != UserRole::Employer {
        warn!(user_id = %session.user_id, "non-employer attempted to post a job");
        return Ok(flash::redirect("/dashboard", "Only employers can post jobs."));
    }

    let title = form.title.trim();
    let company = form.company.trim();
    let location = form.location.trim();
    let description = form.description.trim();
    let category = form.category.trim();

    if title.is_empty()
        || company.is_empty()
        || location.is_empty()
        || description.is_empty()
        || category.is_empty()
    {
        return Ok(flash::redirect("/dashboard", "All job fields are required."));
    }

    let is_paid = form.is_paid.is_some();

    let job = Job::create(
        &state.db,
        title,
        company,
        location,
        description,
        category,
        session.user_id,
        is_paid,
    )
    .await
    .map_err(internal)?;

    info!(job_id = %job.id, user_id = %session.user_id, is_paid, "job posted");
    Ok(flash::redirect("/dashboard", "Job posted successfully."))
}

#[instrument(skip(state, session))]
pub async fn search(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Query(params): Query<SearchParams>,
) -> Result<Response, (StatusCode, String)> {
    if session.is_none() {
        return Ok(flash::redirect(
            "/",
            "Please register or login to search jobs.",
        ));
    }

    let query = params.query.trim().to_string();
    if query.is_empty() {
        return Ok(flash::redirect("/dashboard", "Please enter a search term."));
    }

    let jobs = Job::search(&state.db, &query).await.map_err(internal)?;
    Ok(Json(SearchResponse {
        query,
        jobs: jobs.into_iter().map(JobListItem::from).collect(),
    })
    .into_response())
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
