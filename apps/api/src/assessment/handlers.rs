//! Axum route handlers for the assessment lifecycle:
//! resume intake → question generation → timed answering → submission → report.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::ai::EvaluationRequest;
use crate::assessment::attempt::{AttemptSession, Tick};
use crate::assessment::sessions::{SubmissionError, SubmissionInput};
use crate::auth::session::current_user;
use crate::errors::AppError;
use crate::models::{AssessmentAttempt, AttemptStatus, CandidateQuestion, Question};
use crate::state::AppState;

/// Cap on extracted resume text forwarded to the evaluator.
const RESUME_SUMMARY_MAX_CHARS: usize = 4000;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub attempt_id: Uuid,
    pub questions: Vec<CandidateQuestion>,
    pub duration_seconds: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptStatusResponse {
    pub attempt_id: Uuid,
    pub job_title: String,
    pub questions: Vec<CandidateQuestion>,
    pub answers: HashMap<String, String>,
    pub remaining_seconds: u32,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub attempt: AssessmentAttempt,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessments/:job_id/start
///
/// Resume intake plus question generation. Requires a PDF resume part named
/// `resume`; the file is checked by declared type only and its bytes are not
/// retained. On generation failure nothing is created and the caller is back
/// at intake.
pub async fn handle_start(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<StartResponse>, AppError> {
    let user = current_user(&state.store)?;
    let job = state
        .store
        .job(job_id)?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let resume = read_resume_field(multipart).await?;
    let resume_summary = derive_resume_summary(&resume, &user.full_name);

    info!("Generating {} questions for job '{}'", job.num_questions, job.title);
    let generated = state
        .ai
        .generate_questions(&job)
        .await
        .map_err(|e| AppError::Ai(format!("question generation failed: {e}")))?;

    let questions: Vec<Question> = generated
        .into_iter()
        .enumerate()
        .map(|(i, q)| q.into_question(i))
        .collect();

    let session = AttemptSession::new(job, user.id, resume_summary, questions);
    let duration_seconds = session.remaining_seconds();
    let candidate_questions: Vec<CandidateQuestion> =
        session.questions.iter().map(Question::candidate_view).collect();

    let attempt_id = state.attempts.insert(session).await;
    let ticker = spawn_countdown(state.clone(), attempt_id);
    state.attempts.set_ticker(attempt_id, ticker).await;

    info!("Attempt {attempt_id} started ({duration_seconds}s on the clock)");

    Ok(Json(StartResponse {
        attempt_id,
        questions: candidate_questions,
        duration_seconds,
    }))
}

/// GET /api/v1/assessments/:attempt_id
///
/// Current question set, recorded answers, and remaining seconds.
pub async fn handle_status(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> Result<Json<AttemptStatusResponse>, AppError> {
    let user = current_user(&state.store)?;
    let view = state
        .attempts
        .view(attempt_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Attempt {attempt_id} not found")))?;
    if view.student_id != user.id {
        return Err(AppError::Forbidden);
    }
    Ok(Json(AttemptStatusResponse {
        attempt_id,
        job_title: view.job_title,
        questions: view.questions,
        answers: view.answers,
        remaining_seconds: view.remaining_seconds,
    }))
}

/// PUT /api/v1/assessments/:attempt_id/answers/:question_id
///
/// Records (or overwrites) one answer. Navigation is random-access; the
/// previously entered answer stays until explicitly changed.
pub async fn handle_answer(
    State(state): State<AppState>,
    Path((attempt_id, question_id)): Path<(Uuid, String)>,
    Json(request): Json<AnswerRequest>,
) -> Result<StatusCode, AppError> {
    let user = current_user(&state.store)?;
    let view = state
        .attempts
        .view(attempt_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Attempt {attempt_id} not found")))?;
    if view.student_id != user.id {
        return Err(AppError::Forbidden);
    }

    match state
        .attempts
        .record_answer(attempt_id, &question_id, request.answer)
        .await
    {
        Some(true) => Ok(StatusCode::NO_CONTENT),
        Some(false) => Err(AppError::NotFound(format!(
            "Question {question_id} not part of this attempt"
        ))),
        None => Err(AppError::NotFound(format!("Attempt {attempt_id} not found"))),
    }
}

/// POST /api/v1/assessments/:attempt_id/submit
///
/// Manual submission: cancels the countdown and grades the attempt. On
/// evaluation failure the session is kept with its answers and can be
/// submitted again.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> Result<Json<SubmitResponse>, AppError> {
    let user = current_user(&state.store)?;
    let view = state
        .attempts
        .view(attempt_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Attempt {attempt_id} not found")))?;
    if view.student_id != user.id {
        return Err(AppError::Forbidden);
    }

    let input = state
        .attempts
        .begin_manual_submission(attempt_id)
        .await
        .map_err(|e| match e {
            SubmissionError::NotFound => {
                AppError::NotFound(format!("Attempt {attempt_id} not found"))
            }
            SubmissionError::AlreadySubmitting => {
                AppError::Validation("Submission already in progress".to_string())
            }
        })?;

    let attempt = submit_attempt(&state, input).await?;
    Ok(Json(SubmitResponse { attempt }))
}

// ────────────────────────────────────────────────────────────────────────────
// Countdown and submission pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Drives one attempt's clock at one tick per second. Stops when the
/// session disappears (manual submission or teardown) and hands an expiring
/// attempt to the automatic submission path exactly once.
pub fn spawn_countdown(state: AppState, attempt_id: Uuid) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            match state.attempts.tick(attempt_id).await {
                None => break,
                Some(Tick::Running { .. }) => {}
                Some(Tick::Expired) => {
                    info!("Attempt {attempt_id} ran out of time, auto-submitting");
                    let state = state.clone();
                    // Separate task: the submission must not die with this
                    // ticker when the session drops its handle.
                    tokio::spawn(async move {
                        let Some(input) = state.attempts.begin_auto_submission(attempt_id).await
                        else {
                            return;
                        };
                        if let Err(e) = submit_attempt(&state, input).await {
                            error!("Automatic submission for attempt {attempt_id} failed: {e}");
                        }
                    });
                    break;
                }
            }
        }
    })
}

/// Grades the attempt and finalizes the durable record: evaluation
/// breakdown first, then the attempt itself, then the session is dropped.
/// A failed evaluation reopens the session with answers intact.
pub async fn submit_attempt(
    state: &AppState,
    input: SubmissionInput,
) -> Result<AssessmentAttempt, AppError> {
    let request = EvaluationRequest {
        job_title: input.job.title.clone(),
        job_description: input.job.description.clone(),
        resume_summary: input.resume_summary.clone(),
        questions: input.questions.clone(),
        answers: input.answers.clone(),
        time_taken_minutes: input.elapsed_minutes,
    };

    let report = match state.ai.evaluate(&request).await {
        Ok(report) => report,
        Err(e) => {
            state.attempts.reopen_after_failure(input.attempt_id).await;
            return Err(AppError::Ai(format!("evaluation failed: {e}")));
        }
    };

    let status = AttemptStatus::from_score(report.total_score, input.job.threshold);
    let attempt = AssessmentAttempt {
        id: input.attempt_id,
        job_id: input.job.id,
        student_id: input.student_id,
        start_time: input.started_at,
        end_time: Some(Utc::now()),
        answers: input.answers,
        score: report.total_score,
        status,
        is_suspicious: report.is_suspicious,
        suspicious_reason: report.suspicious_reason,
        feedback: report.feedback,
        resume_url: Some("attached-pdf".to_string()),
    };

    state
        .store
        .save_evaluations(attempt.id, &report.evaluations)?;
    state.store.add_attempt(attempt.clone())?;
    state.attempts.remove(attempt.id).await;

    info!(
        "Attempt {} submitted: score {} → {:?}",
        attempt.id, attempt.score, attempt.status
    );
    Ok(attempt)
}

// ────────────────────────────────────────────────────────────────────────────
// Resume intake
// ────────────────────────────────────────────────────────────────────────────

struct ResumeUpload {
    bytes: Vec<u8>,
}

/// Pulls the `resume` part out of the multipart body. Only the declared
/// type is checked — content validation is out of scope.
async fn read_resume_field(mut multipart: Multipart) -> Result<ResumeUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("resume") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string).unwrap_or_default();
        let content_type = field.content_type().map(str::to_string).unwrap_or_default();
        let looks_like_pdf =
            content_type == "application/pdf" || file_name.to_lowercase().ends_with(".pdf");
        if !looks_like_pdf {
            return Err(AppError::Validation(
                "Please upload a valid PDF file.".to_string(),
            ));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed reading resume upload: {e}")))?;
        return Ok(ResumeUpload {
            bytes: bytes.to_vec(),
        });
    }
    Err(AppError::Validation(
        "Please upload your PDF resume before starting.".to_string(),
    ))
}

/// Extracts text from the resume for the evaluation prompt. Unextractable
/// files fall back to a templated summary rather than failing intake.
fn derive_resume_summary(resume: &ResumeUpload, full_name: &str) -> String {
    match pdf_extract::extract_text_from_mem(&resume.bytes) {
        Ok(text) if !text.trim().is_empty() => {
            let trimmed = text.trim();
            let mut summary: String = trimmed.chars().take(RESUME_SUMMARY_MAX_CHARS).collect();
            if summary.len() < trimmed.len() {
                summary.push('…');
            }
            summary
        }
        Ok(_) => fallback_summary(full_name),
        Err(e) => {
            warn!("Resume text extraction failed, using templated summary: {e}");
            fallback_summary(full_name)
        }
    }
}

fn fallback_summary(full_name: &str) -> String {
    format!("Candidate Name: {full_name}. System analyzing resume for job matching...")
}
