//! Job campaign CRUD and the role-dependent dashboard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::session::{current_user, require_recruiter};
use crate::errors::AppError;
use crate::models::{AssessmentAttempt, Difficulty, Job, UserRole};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub num_questions: Option<u32>,
    pub duration_minutes: Option<u32>,
    pub deadline: String,
    pub threshold: Option<u32>,
    pub is_coding_enabled: Option<bool>,
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<JobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let user = current_user(&state.store)?;
    require_recruiter(&user)?;
    validate_job(&request)?;

    let job = Job {
        id: Uuid::new_v4(),
        recruiter_id: user.id,
        skills: Job::skills_from_description(&request.description),
        title: request.title,
        description: request.description,
        difficulty: request.difficulty,
        num_questions: request.num_questions.unwrap_or(10),
        duration_minutes: request.duration_minutes.unwrap_or(30),
        deadline: request.deadline,
        threshold: request.threshold.unwrap_or(30),
        is_coding_enabled: request.is_coding_enabled.unwrap_or(true),
        created_at: Utc::now(),
    };
    state.store.add_job(job.clone())?;
    info!("Job campaign '{}' launched by '{}'", job.title, user.username);

    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/v1/jobs/:job_id
///
/// Full replacement of the editable fields; `recruiterId` and `createdAt`
/// carry over from the stored record. Only the posting recruiter may edit.
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<JobRequest>,
) -> Result<Json<Job>, AppError> {
    let user = current_user(&state.store)?;
    require_recruiter(&user)?;

    let existing = state
        .store
        .job(job_id)?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    if existing.recruiter_id != user.id {
        return Err(AppError::Forbidden);
    }
    validate_job(&request)?;

    let job = Job {
        id: existing.id,
        recruiter_id: existing.recruiter_id,
        skills: Job::skills_from_description(&request.description),
        title: request.title,
        description: request.description,
        difficulty: request.difficulty,
        num_questions: request.num_questions.unwrap_or(existing.num_questions),
        duration_minutes: request.duration_minutes.unwrap_or(existing.duration_minutes),
        deadline: request.deadline,
        threshold: request.threshold.unwrap_or(existing.threshold),
        is_coding_enabled: request.is_coding_enabled.unwrap_or(existing.is_coding_enabled),
        created_at: existing.created_at,
    };
    state.store.update_job(&job)?;
    info!("Job campaign '{}' updated", job.title);

    Ok(Json(job))
}

/// GET /api/v1/jobs/:job_id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    current_user(&state.store)?;
    let job = state
        .store
        .job(job_id)?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    Ok(Json(job))
}

fn validate_job(request: &JobRequest) -> Result<(), AppError> {
    if request.title.trim().is_empty() || request.description.trim().is_empty() {
        return Err(AppError::Validation(
            "Title and description are required.".to_string(),
        ));
    }
    if request.deadline.trim().is_empty() {
        return Err(AppError::Validation("Deadline is required.".to_string()));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Dashboard
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterJobSummary {
    #[serde(flatten)]
    pub job: Job,
    pub applicant_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentJobSummary {
    #[serde(flatten)]
    pub job: Job,
    /// Set when the student already has a finished attempt for this job,
    /// pointing at the report to show instead of the start button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum DashboardResponse {
    Recruiter {
        role: UserRole,
        jobs: Vec<RecruiterJobSummary>,
        total_evaluated: usize,
    },
    Student {
        role: UserRole,
        jobs: Vec<StudentJobSummary>,
        tests_completed: usize,
    },
}

/// GET /api/v1/dashboard
///
/// Recruiters get their own campaigns with applicant counts. Students get
/// every campaign still open, flagged with their finished attempt where one
/// exists.
pub async fn handle_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let user = current_user(&state.store)?;
    let jobs = state.store.jobs()?;
    let attempts = state.store.attempts()?;

    let response = if user.role == UserRole::Recruiter {
        let own: Vec<Job> = jobs
            .into_iter()
            .filter(|j| j.recruiter_id == user.id)
            .collect();
        let total_evaluated = attempts
            .iter()
            .filter(|a| own.iter().any(|j| j.id == a.job_id))
            .count();
        let jobs = own
            .into_iter()
            .map(|job| {
                let applicant_count = attempts.iter().filter(|a| a.job_id == job.id).count();
                RecruiterJobSummary {
                    job,
                    applicant_count,
                }
            })
            .collect();
        DashboardResponse::Recruiter {
            role: user.role,
            jobs,
            total_evaluated,
        }
    } else {
        let now = Utc::now();
        let own_attempts: Vec<&AssessmentAttempt> = attempts
            .iter()
            .filter(|a| a.student_id == user.id)
            .collect();
        let tests_completed = own_attempts.len();
        let jobs = jobs
            .into_iter()
            .filter(|j| j.accepts_candidates(now))
            .map(|job| {
                let attempt_id = own_attempts
                    .iter()
                    .find(|a| a.job_id == job.id)
                    .map(|a| a.id);
                StudentJobSummary { job, attempt_id }
            })
            .collect();
        DashboardResponse::Student {
            role: user.role,
            jobs,
            tests_completed,
        }
    };

    Ok(Json(response))
}
