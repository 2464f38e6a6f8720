//! AI gateway — the single point of entry for all generative-model calls.
//!
//! Two stateless request/response operations: question generation and
//! answer evaluation. Both return typed, schema-validated payloads;
//! malformed model output is rejected, never silently trusted.
//!
//! ARCHITECTURAL RULE: no other module may talk to the Gemini API directly.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Job;

pub mod client;
pub mod evaluate;
pub mod generate;
pub mod prompts;

pub use client::GeminiClient;
pub use evaluate::{EvaluationReport, EvaluationRequest};
pub use generate::GeneratedQuestion;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Model returned empty content")]
    EmptyContent,

    #[error("Model returned an empty question set")]
    EmptyQuestionSet,
}

/// The assessment intelligence seam. Carried in `AppState` as
/// `Arc<dyn AssessmentAi>` so tests can substitute a scripted backend.
#[async_trait]
pub trait AssessmentAi: Send + Sync {
    /// Generates the ordered question set for one attempt at `job`.
    /// Contract (prompt-level, not locally enforced): marks sum to 100,
    /// with coding/subjective/MCQ distribution when coding is enabled.
    async fn generate_questions(&self, job: &Job) -> Result<Vec<GeneratedQuestion>, AiError>;

    /// Grades a completed attempt and flags suspicious submissions.
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationReport, AiError>;
}
