use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use tower::ServiceExt;
use uuid::Uuid;

use jobboard::{
    app::build_app,
    auth::{dto::SessionKeys, repo::UserRole},
    flash,
    state::AppState,
};

fn fake_app() -> (Router, AppState) {
    let state = AppState::fake();
    (build_app(state.clone()), state)
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn session_cookie(state: &AppState, role: UserRole) -> String {
    use axum::extract::FromRef;
    let keys = SessionKeys::from_ref(state);
    let token = keys
        .sign(Uuid::new_v4(), "Test User", role)
        .expect("sign session token");
    format!("session={token}")
}

fn location(res: &Response<Body>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .expect("redirect has Location header")
        .to_str()
        .expect("location is ascii")
}

/// Decoded flash message from the response's Set-Cookie headers.
fn flash_message(res: &Response<Body>) -> Option<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| {
            let value = cookie.strip_prefix("flash=")?;
            let value = value.split(';').next()?;
            flash::decode(value)
        })
}

fn valid_register_body() -> String {
    "name=Ama+Mensah&email=ama%40example.com&phone=%2B233241234567&region=Greater+Accra\
     &role=employer&gender=Female&dob=1990-05-10&password=s3cret-pw"
        .to_string()
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let (app, _state) = fake_app();
    let res = app
        .oneshot(form_post("/register", "name=Ama&email=ama%40example.com"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("All fields are required.")
    );
}

#[tokio::test]
async fn register_rejects_malformed_email() {
    let (app, _state) = fake_app();
    let body = valid_register_body().replace("ama%40example.com", "not-an-email");
    let res = app.oneshot(form_post("/register", &body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("Enter a valid email address.")
    );
}

#[tokio::test]
async fn register_rejects_unknown_role() {
    let (app, _state) = fake_app();
    let body = valid_register_body().replace("role=employer", "role=admin");
    let res = app.oneshot(form_post("/register", &body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("Role must be seeker or employer.")
    );
}

#[tokio::test]
async fn register_rejects_invalid_phone() {
    let (app, _state) = fake_app();
    let body = valid_register_body().replace("%2B233241234567", "0241234567");
    let res = app.oneshot(form_post("/register", &body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("Phone must be in Ghana format: +233XXXXXXXXX")
    );
}

#[tokio::test]
async fn register_rejects_malformed_dob() {
    let (app, _state) = fake_app();
    let body = valid_register_body().replace("1990-05-10", "10%2F05%2F1990");
    let res = app.oneshot(form_post("/register", &body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("Invalid date of birth format.")
    );
}

#[tokio::test]
async fn register_rejects_underage_user() {
    let (app, _state) = fake_app();
    // Roughly 14 years ago, safely under the 15-year threshold.
    let dob = time::OffsetDateTime::now_utc().date() - time::Duration::days(14 * 365);
    let format = time::macros::format_description!("[year]-[month]-[day]");
    let body = valid_register_body().replace("1990-05-10", &dob.format(&format).unwrap());
    let res = app.oneshot(form_post("/register", &body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("You must be at least 15 years old to register.")
    );
}

#[tokio::test]
async fn register_rejects_short_password() {
    let (app, _state) = fake_app();
    let body = valid_register_body().replace("s3cret-pw", "abc");
    let res = app.oneshot(form_post("/register", &body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("Password must be at least 6 characters.")
    );
}

#[tokio::test]
async fn register_surfaces_store_failure() {
    let (app, _state) = fake_app();
    let res = app
        .oneshot(form_post("/register", &valid_register_body()))
        .await
        .unwrap();

    // The fake state's pool points at an unreachable server, so the
    // duplicate-email lookup fails; that failure must become a 500, not a
    // silently-assumed "email is free".
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let establishes_session = res
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|c| c.starts_with("session="));
    assert!(
        !establishes_session,
        "a store failure must not establish a session"
    );
}

#[tokio::test]
async fn login_rejects_blank_credentials() {
    let (app, _state) = fake_app();
    let res = app
        .oneshot(form_post("/login", "email=&password="))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("Please enter email and password.")
    );
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let (app, state) = fake_app();
    let res = app
        .oneshot(
            Request::builder()
                .uri("/logout")
                .header(header::COOKIE, session_cookie(&state, UserRole::Seeker))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    let clears_session = res
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|c| c.starts_with("session=;") && c.contains("Max-Age=0"));
    assert!(clears_session, "logout must expire the session cookie");
    assert_eq!(flash_message(&res).as_deref(), Some("Logged out."));
}

#[tokio::test]
async fn dashboard_requires_a_session() {
    let (app, _state) = fake_app();
    let res = app
        .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("Login required to view dashboard.")
    );
}

#[tokio::test]
async fn tampered_session_is_treated_as_anonymous() {
    let (app, state) = fake_app();
    let cookie = format!("{}x", session_cookie(&state, UserRole::Employer));
    let res = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
}

#[tokio::test]
async fn post_job_requires_a_session() {
    let (app, _state) = fake_app();
    let res = app
        .oneshot(form_post("/post-job", "title=Welder"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("Only employers can post jobs.")
    );
}

#[tokio::test]
async fn post_job_rejects_seeker_role() {
    let (app, state) = fake_app();
    let mut req = form_post(
        "/post-job",
        "title=Welder&company=AcmeCorp&location=Accra&description=MIG+welding&category=Other",
    );
    req.headers_mut().insert(
        header::COOKIE,
        session_cookie(&state, UserRole::Seeker).parse().unwrap(),
    );
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("Only employers can post jobs.")
    );
}

#[tokio::test]
async fn post_job_rejects_blank_fields() {
    let (app, state) = fake_app();
    let mut req = form_post(
        "/post-job",
        "title=&company=AcmeCorp&location=Accra&description=MIG+welding&category=Other",
    );
    req.headers_mut().insert(
        header::COOKIE,
        session_cookie(&state, UserRole::Employer).parse().unwrap(),
    );
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("All job fields are required.")
    );
}

#[tokio::test]
async fn search_requires_a_session() {
    let (app, _state) = fake_app();
    let res = app
        .oneshot(
            Request::builder()
                .uri("/search?query=welder")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("Please register or login to search jobs.")
    );
}

#[tokio::test]
async fn search_rejects_a_blank_query() {
    let (app, state) = fake_app();
    let res = app
        .oneshot(
            Request::builder()
                .uri("/search?query=")
                .header(header::COOKIE, session_cookie(&state, UserRole::Seeker))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("Please enter a search term.")
    );
}

#[tokio::test]
async fn pay_requires_an_employer_session() {
    let (app, state) = fake_app();
    let job_id = Uuid::new_v4();
    let res = app
        .oneshot(
            Request::builder()
                .uri(format!("/pay/{job_id}"))
                .header(header::COOKIE, session_cookie(&state, UserRole::Seeker))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard");
    assert_eq!(
        flash_message(&res).as_deref(),
        Some("Only employers can promote jobs.")
    );
}
