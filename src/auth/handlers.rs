use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm, SessionKeys},
        repo::{User, UserRole},
        services::{age_on, hash_password, is_valid_email, is_valid_phone, parse_dob, verify_password},
        session,
    },
    flash,
    state::AppState,
};

const MIN_AGE_YEARS: i32 = 15;
const MIN_PASSWORD_LEN: usize = 6;

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(mut form): Form<RegisterForm>,
) -> Result<Response, (StatusCode, String)> {
    form.email = form.email.trim().to_lowercase();
    let name = form.name.trim();
    let phone = form.phone.trim();
    let region = form.region.trim();
    let role_raw = form.role.trim();
    let gender = form.gender.trim();
    let dob_raw = form.dob.trim();

    if name.is_empty()
        || form.email.is_empty()
        || phone.is_empty()
        || region.is_empty()
        || role_raw.is_empty()
        || gender.is_empty()
        || dob_raw.is_empty()
        || form.password.is_empty()
    {
        return Ok(flash::redirect("/", "All fields are required."));
    }

    if !is_valid_email(&form.email) {
        return Ok(flash::redirect("/", "Enter a valid email address."));
    }

    let Some(role) = UserRole::parse(role_raw) else {
        return Ok(flash::redirect("/", "Role must be seeker or employer."));
    };

    if !is_valid_phone(phone) {
        warn!("invalid phone format on registration");
        return Ok(flash::redirect(
            "/",
            "Phone must be in Ghana format: +233XXXXXXXXX",
        ));
    }

    let dob = match parse_dob(dob_raw) {
        Ok(d) => d,
        Err(_) => {
            return Ok(flash::redirect("/", "Invalid date of birth format."));
        }
    };

    if age_on(dob, OffsetDateTime::now_utc().date()) < MIN_AGE_YEARS {
        return Ok(flash::redirect(
            "/",
            "You must be at least 15 years old to register.",
        ));
    }

    if form.password.len() < MIN_PASSWORD_LEN {
        return Ok(flash::redirect(
            "/",
            "Password must be at least 6 characters.",
        ));
    }

    match User::find_by_email(&state.db, &form.email).await {
        Ok(Some(_)) => {
            warn!(email = %form.email, "email already registered");
            return Ok(flash::redirect("/", "Email already registered. Please login."));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(internal(e));
        }
    }

    let hash = hash_password(&form.password).map_err(internal)?;

    let user = match User::create(
        &state.db,
        name,
        &form.email,
        phone,
        region,
        role,
        gender,
        dob,
        &hash,
    )
    .await
    {
        Ok(u) => u,
        // Pre-check raced with another registration for the same email.
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %form.email, "email uniqueness violation on insert");
            return Ok(flash::redirect("/", "Email already registered. Please login."));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(internal(e));
        }
    };

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.name, user.role).map_err(internal)?;

    info!(user_id = %user.id, email = %user.email, role = user.role.as_str(), "user registered");

    let mut headers = HeaderMap::new();
    headers.append(header::SET_COOKIE, session::set_cookie(&token));
    headers.append(
        header::SET_COOKIE,
        flash::set_cookie("Registration successful, welcome!"),
    );
    Ok((headers, Redirect::to("/dashboard")).into_response())
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(mut form): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    form.email = form.email.trim().to_lowercase();

    if form.email.is_empty() || form.password.is_empty() {
        return Ok(flash::redirect("/", "Please enter email and password."));
    }

    let user = match User::find_by_email(&state.db, &form.email).await {
        Ok(Some(u)) => u,
        // Same generic message as a wrong password, to avoid confirming
        // which emails have accounts.
        Ok(None) => {
            warn!(email = %form.email, "login unknown email");
            return Ok(flash::redirect("/", "Invalid credentials."));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(internal(e));
        }
    };

    let ok = verify_password(&form.password, &user.password_hash).map_err(internal)?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Ok(flash::redirect("/", "Invalid credentials."));
    }

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.name, user.role).map_err(internal)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");

    let mut headers = HeaderMap::new();
    headers.append(header::SET_COOKIE, session::set_cookie(&token));
    headers.append(header::SET_COOKIE, flash::set_cookie("Login successful."));
    Ok((headers, Redirect::to("/dashboard")).into_response())
}

#[instrument]
pub async fn logout() -> Response {
    let mut headers = HeaderMap::new();
    headers.append(header::SET_COOKIE, session::clear_cookie());
    headers.append(header::SET_COOKIE, flash::set_cookie("Logged out."));
    (headers, Redirect::to("/")).into_response()
}

fn is_unique_violation(e: &anyhow::Error) -> bool {
    e.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.code().as_deref() == Some("23505"))
        .unwrap_or(false)
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
