use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    Pending,
    Qualified,
    Disqualified,
}

impl AttemptStatus {
    /// QUALIFIED iff score meets the job threshold.
    pub fn from_score(score: f64, threshold: u32) -> Self {
        if score >= threshold as f64 {
            AttemptStatus::Qualified
        } else {
            AttemptStatus::Disqualified
        }
    }
}

/// One candidate's full record of taking one job's assessment. Created at
/// submission time — not at start — and immutable thereafter. Nothing stops
/// the same student submitting further attempts for the same job; each
/// submission appends a new record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentAttempt {
    pub id: Uuid,
    pub job_id: Uuid,
    pub student_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// question id → the answer text as last entered.
    pub answers: HashMap<String, String>,
    pub score: f64,
    pub status: AttemptStatus,
    pub is_suspicious: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspicious_reason: Option<String>,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
}

/// Per-question grading detail, persisted separately from the attempt and
/// keyed by attempt id for report rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEvaluation {
    pub question_id: String,
    pub is_correct: bool,
    pub marks_obtained: f64,
    pub ai_feedback: String,
    /// Reference solution, present for incorrect answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}
