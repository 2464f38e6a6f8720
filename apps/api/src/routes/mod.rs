pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::assessment::handlers as assessment;
use crate::auth::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::reports::handlers as reports;
use crate::state::AppState;

/// Resume uploads come in through multipart; 10 MiB is plenty for a PDF.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Jobs
        .route("/api/v1/jobs", post(jobs::handle_create_job))
        .route(
            "/api/v1/jobs/:job_id",
            get(jobs::handle_get_job).put(jobs::handle_update_job),
        )
        .route("/api/v1/dashboard", get(jobs::handle_dashboard))
        // Assessments
        .route(
            "/api/v1/assessments/:job_id/start",
            post(assessment::handle_start),
        )
        .route(
            "/api/v1/assessments/:attempt_id",
            get(assessment::handle_status),
        )
        .route(
            "/api/v1/assessments/:attempt_id/answers/:question_id",
            put(assessment::handle_answer),
        )
        .route(
            "/api/v1/assessments/:attempt_id/submit",
            post(assessment::handle_submit),
        )
        // Reports
        .route("/api/v1/reports/:attempt_id", get(reports::handle_report))
        .route(
            "/api/v1/leaderboard/:job_id",
            get(reports::handle_leaderboard),
        )
        .route("/api/v1/profile", get(reports::handle_profile))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
