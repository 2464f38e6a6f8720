//! Read-side endpoints: performance reports, per-job leaderboards, and the
//! candidate profile with attempt history.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::session::current_user;
use crate::errors::AppError;
use crate::models::{
    AssessmentAttempt, Job, QuestionEvaluation, User, UserProfile, UserRole,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Performance report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub attempt: AssessmentAttempt,
    pub job: Job,
    pub candidate: Option<UserProfile>,
    pub evaluations: Vec<QuestionEvaluation>,
}

/// GET /api/v1/reports/:attempt_id
///
/// Visible to any recruiter and to the candidate the attempt belongs to;
/// everyone else is refused.
pub async fn handle_report(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> Result<Json<ReportResponse>, AppError> {
    let user = current_user(&state.store)?;
    let attempt = state
        .store
        .attempt(attempt_id)?
        .ok_or_else(|| AppError::NotFound(format!("Attempt {attempt_id} not found")))?;

    let is_recruiter = user.role == UserRole::Recruiter;
    if !is_recruiter && user.id != attempt.student_id {
        return Err(AppError::Forbidden);
    }

    let job = state
        .store
        .job(attempt.job_id)?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", attempt.job_id)))?;
    let candidate = state
        .store
        .users()?
        .iter()
        .find(|u| u.id == attempt.student_id)
        .map(UserProfile::from);
    let evaluations = state.store.load_evaluations(attempt_id)?;

    Ok(Json(ReportResponse {
        attempt,
        job,
        candidate,
        evaluations,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Leaderboard
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub attempt_id: Uuid,
    pub full_name: String,
    pub username: String,
    pub score: f64,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub job_title: String,
    pub entries: Vec<LeaderboardEntry>,
}

/// GET /api/v1/leaderboard/:job_id
///
/// Qualified attempts only, best score first.
pub async fn handle_leaderboard(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    current_user(&state.store)?;
    let job = state
        .store
        .job(job_id)?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    let attempts = state.store.attempts()?;
    let users = state.store.users()?;

    Ok(Json(LeaderboardResponse {
        job_title: job.title,
        entries: rank_qualified(job_id, &attempts, &users),
    }))
}

/// Filters to the job's qualified attempts, sorts by score descending, and
/// assigns 1-based ranks. Candidates no longer on record show as "Unknown".
fn rank_qualified(
    job_id: Uuid,
    attempts: &[AssessmentAttempt],
    users: &[User],
) -> Vec<LeaderboardEntry> {
    let mut qualified: Vec<&AssessmentAttempt> = attempts
        .iter()
        .filter(|a| a.job_id == job_id && a.status == crate::models::AttemptStatus::Qualified)
        .collect();
    qualified.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    qualified
        .into_iter()
        .enumerate()
        .map(|(i, attempt)| {
            let student = users.iter().find(|u| u.id == attempt.student_id);
            LeaderboardEntry {
                rank: i + 1,
                attempt_id: attempt.id,
                full_name: student
                    .map(|u| u.full_name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                username: student.map(|u| u.username.clone()).unwrap_or_default(),
                score: attempt.score,
                end_time: attempt.end_time,
            }
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Profile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub attempt: AssessmentAttempt,
    pub job_title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: UserProfile,
    pub history: Vec<HistoryEntry>,
}

/// GET /api/v1/profile
///
/// The signed-in user's account details plus their own attempts, each joined
/// to the campaign title.
pub async fn handle_profile(
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = current_user(&state.store)?;
    let jobs = state.store.jobs()?;
    let history = state
        .store
        .attempts()?
        .into_iter()
        .filter(|a| a.student_id == user.id)
        .map(|attempt| {
            let job_title = jobs
                .iter()
                .find(|j| j.id == attempt.job_id)
                .map(|j| j.title.clone())
                .unwrap_or_else(|| "Removed campaign".to_string());
            HistoryEntry { attempt, job_title }
        })
        .collect();

    Ok(Json(ProfileResponse {
        user: UserProfile::from(&user),
        history,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttemptStatus;
    use std::collections::HashMap;

    fn attempt(job_id: Uuid, student_id: Uuid, score: f64, status: AttemptStatus) -> AssessmentAttempt {
        AssessmentAttempt {
            id: Uuid::new_v4(),
            job_id,
            student_id,
            start_time: Utc::now(),
            end_time: Some(Utc::now()),
            answers: HashMap::new(),
            score,
            status,
            is_suspicious: false,
            suspicious_reason: None,
            feedback: String::new(),
            resume_url: None,
        }
    }

    fn student(full_name: &str, username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            role: UserRole::Student,
            full_name: full_name.to_string(),
            contact_number: "9876543210".to_string(),
            dob: "2000-01-01".to_string(),
            created_at: Utc::now(),
            password: "password123".to_string(),
        }
    }

    #[test]
    fn test_rank_orders_by_score_descending() {
        let job_id = Uuid::new_v4();
        let alice = student("Alice", "alice");
        let bob = student("Bob", "bob");
        let attempts = vec![
            attempt(job_id, alice.id, 62.0, AttemptStatus::Qualified),
            attempt(job_id, bob.id, 88.5, AttemptStatus::Qualified),
        ];
        let entries = rank_qualified(job_id, &attempts, &[alice, bob]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].full_name, "Bob");
        assert_eq!(entries[0].score, 88.5);
        assert_eq!(entries[1].rank, 2);
        assert_eq!(entries[1].full_name, "Alice");
    }

    #[test]
    fn test_rank_excludes_disqualified_and_other_jobs() {
        let job_id = Uuid::new_v4();
        let alice = student("Alice", "alice");
        let attempts = vec![
            attempt(job_id, alice.id, 10.0, AttemptStatus::Disqualified),
            attempt(Uuid::new_v4(), alice.id, 95.0, AttemptStatus::Qualified),
        ];
        assert!(rank_qualified(job_id, &attempts, &[alice]).is_empty());
    }

    #[test]
    fn test_rank_handles_missing_candidate_record() {
        let job_id = Uuid::new_v4();
        let attempts = vec![attempt(job_id, Uuid::new_v4(), 50.0, AttemptStatus::Qualified)];
        let entries = rank_qualified(job_id, &attempts, &[]);
        assert_eq!(entries[0].full_name, "Unknown");
        assert_eq!(entries[0].username, "");
    }
}
