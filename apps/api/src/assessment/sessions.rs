//! Registry of in-flight attempts plus their countdown tasks.
//!
//! The registry lock is never held across an evaluation call: submission
//! clones what it needs out of the session, releases the lock, and comes
//! back afterwards to either drop the session (success) or reopen it
//! (failure, answers preserved).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::assessment::attempt::{AttemptSession, Tick};
use crate::models::{CandidateQuestion, Job, Question};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("no active attempt with this id")]
    NotFound,

    #[error("a submission for this attempt is already in progress")]
    AlreadySubmitting,
}

/// Read-only snapshot of a running attempt for the status endpoint.
#[derive(Debug)]
pub struct AttemptView {
    pub student_id: Uuid,
    pub job_title: String,
    pub questions: Vec<CandidateQuestion>,
    pub answers: HashMap<String, String>,
    pub remaining_seconds: u32,
}

/// Everything the submission path needs, cloned out of the session so the
/// registry lock can be released before the evaluation call.
#[derive(Debug)]
pub struct SubmissionInput {
    pub attempt_id: Uuid,
    pub student_id: Uuid,
    pub job: Job,
    pub questions: Vec<Question>,
    pub answers: HashMap<String, String>,
    pub resume_summary: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_minutes: u32,
}

struct ActiveAttempt {
    session: AttemptSession,
    ticker: Option<JoinHandle<()>>,
}

#[derive(Clone, Default)]
pub struct ActiveAttempts {
    inner: Arc<Mutex<HashMap<Uuid, ActiveAttempt>>>,
}

impl ActiveAttempts {
    pub async fn insert(&self, session: AttemptSession) -> Uuid {
        let id = session.id;
        self.inner.lock().await.insert(
            id,
            ActiveAttempt {
                session,
                ticker: None,
            },
        );
        id
    }

    /// Attaches the countdown task so it can be cancelled on manual
    /// submission or teardown.
    pub async fn set_ticker(&self, attempt_id: Uuid, handle: JoinHandle<()>) {
        if let Some(active) = self.inner.lock().await.get_mut(&attempt_id) {
            active.ticker = Some(handle);
        } else {
            // Session vanished between spawn and registration.
            handle.abort();
        }
    }

    pub async fn view(&self, attempt_id: Uuid) -> Option<AttemptView> {
        let guard = self.inner.lock().await;
        let active = guard.get(&attempt_id)?;
        Some(AttemptView {
            student_id: active.session.student_id,
            job_title: active.session.job.title.clone(),
            questions: active
                .session
                .questions
                .iter()
                .map(Question::candidate_view)
                .collect(),
            answers: active.session.answers().clone(),
            remaining_seconds: active.session.remaining_seconds(),
        })
    }

    /// Records an answer. `None` if the attempt is gone, `Some(false)` if
    /// the question id is unknown.
    pub async fn record_answer(
        &self,
        attempt_id: Uuid,
        question_id: &str,
        answer: String,
    ) -> Option<bool> {
        let mut guard = self.inner.lock().await;
        let active = guard.get_mut(&attempt_id)?;
        Some(active.session.record_answer(question_id, answer))
    }

    /// Advances the attempt's clock by one second. `None` once the session
    /// has been removed — the ticker uses that to stop.
    pub async fn tick(&self, attempt_id: Uuid) -> Option<Tick> {
        let mut guard = self.inner.lock().await;
        let active = guard.get_mut(&attempt_id)?;
        Some(active.session.tick())
    }

    /// Manual submission: cancels the countdown, flips the submitting flag,
    /// and hands back the evaluation input.
    pub async fn begin_manual_submission(
        &self,
        attempt_id: Uuid,
    ) -> Result<SubmissionInput, SubmissionError> {
        let mut guard = self.inner.lock().await;
        let active = guard
            .get_mut(&attempt_id)
            .ok_or(SubmissionError::NotFound)?;
        active
            .session
            .begin_submission()
            .map_err(|_| SubmissionError::AlreadySubmitting)?;
        if let Some(ticker) = active.ticker.take() {
            ticker.abort();
        }
        Ok(submission_input(&active.session))
    }

    /// Automatic submission: the expiring tick already flipped the
    /// submitting flag and the ticker stops on its own, so this only
    /// detaches the handle and clones the input.
    pub async fn begin_auto_submission(&self, attempt_id: Uuid) -> Option<SubmissionInput> {
        let mut guard = self.inner.lock().await;
        let active = guard.get_mut(&attempt_id)?;
        drop(active.ticker.take());
        Some(submission_input(&active.session))
    }

    /// Evaluation failed: keep the session and its answers so the caller
    /// can submit again. The countdown stays cancelled.
    pub async fn reopen_after_failure(&self, attempt_id: Uuid) {
        if let Some(active) = self.inner.lock().await.get_mut(&attempt_id) {
            active.session.reopen_after_failure();
        }
    }

    /// Drops the session and cancels any ticker still attached.
    pub async fn remove(&self, attempt_id: Uuid) {
        if let Some(mut active) = self.inner.lock().await.remove(&attempt_id) {
            if let Some(ticker) = active.ticker.take() {
                ticker.abort();
            }
        }
    }
}

fn submission_input(session: &AttemptSession) -> SubmissionInput {
    SubmissionInput {
        attempt_id: session.id,
        student_id: session.student_id,
        job: session.job.clone(),
        questions: session.questions.clone(),
        answers: session.answers().clone(),
        resume_summary: session.resume_summary.clone(),
        started_at: session.started_at,
        elapsed_minutes: session.elapsed_minutes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, QuestionType};

    fn sample_session() -> AttemptSession {
        let job = Job {
            id: Uuid::new_v4(),
            recruiter_id: Uuid::new_v4(),
            title: "QA Engineer".to_string(),
            description: "Selenium, Rust".to_string(),
            skills: vec![],
            difficulty: Difficulty::Easy,
            num_questions: 1,
            duration_minutes: 2,
            deadline: "2026-10-10".to_string(),
            threshold: 30,
            is_coding_enabled: false,
            created_at: Utc::now(),
        };
        let question = Question {
            id: "q-0".to_string(),
            question_type: QuestionType::Mcq,
            text: "Pick one.".to_string(),
            marks: 100,
            options: None,
            correct_option_id: Some("a".to_string()),
            rubric: None,
            initial_code: None,
            test_cases: None,
        };
        AttemptSession::new(job, Uuid::new_v4(), "summary".to_string(), vec![question])
    }

    #[tokio::test]
    async fn test_view_redacts_answer_key_and_tracks_clock() {
        let attempts = ActiveAttempts::default();
        let id = attempts.insert(sample_session()).await;

        attempts.tick(id).await.unwrap();
        let view = attempts.view(id).await.unwrap();
        assert_eq!(view.remaining_seconds, 119);
        let question_json = serde_json::to_value(&view.questions[0]).unwrap();
        assert!(question_json.get("correctOptionId").is_none());
    }

    #[tokio::test]
    async fn test_answer_recording_through_registry() {
        let attempts = ActiveAttempts::default();
        let id = attempts.insert(sample_session()).await;

        assert_eq!(attempts.record_answer(id, "q-0", "a".into()).await, Some(true));
        assert_eq!(attempts.record_answer(id, "q-9", "a".into()).await, Some(false));
        assert_eq!(
            attempts.record_answer(Uuid::new_v4(), "q-0", "a".into()).await,
            None
        );
        assert_eq!(attempts.view(id).await.unwrap().answers["q-0"], "a");
    }

    #[tokio::test]
    async fn test_manual_submission_is_exclusive_until_reopened() {
        let attempts = ActiveAttempts::default();
        let id = attempts.insert(sample_session()).await;

        let input = attempts.begin_manual_submission(id).await.unwrap();
        assert_eq!(input.elapsed_minutes, 1);
        assert!(matches!(
            attempts.begin_manual_submission(id).await,
            Err(SubmissionError::AlreadySubmitting)
        ));

        attempts.reopen_after_failure(id).await;
        assert!(attempts.begin_manual_submission(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_removed_attempt_stops_ticking() {
        let attempts = ActiveAttempts::default();
        let id = attempts.insert(sample_session()).await;
        assert!(attempts.tick(id).await.is_some());
        attempts.remove(id).await;
        assert!(attempts.tick(id).await.is_none());
        assert!(matches!(
            attempts.begin_manual_submission(id).await,
            Err(SubmissionError::NotFound)
        ));
    }
}
