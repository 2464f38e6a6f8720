//! Question generation — wire contract and prompt assembly.

use serde::{Deserialize, Serialize};

use crate::ai::prompts::GENERATION_PROMPT_TEMPLATE;
use crate::models::{Difficulty, Job, McqOption, Question, QuestionType, TestCase};

/// A question as returned by the model — the persisted [`Question`] minus
/// the locally assigned id. Deserialization is strict on required fields;
/// a payload missing `type`, `text`, or `marks` is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    pub marks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<McqOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCase>>,
}

impl GeneratedQuestion {
    /// Promotes a generated question to a session question with a local id
    /// (`q-<index>`, ordered as the model returned them).
    pub fn into_question(self, index: usize) -> Question {
        Question {
            id: format!("q-{index}"),
            question_type: self.question_type,
            text: self.text,
            marks: self.marks,
            options: self.options,
            correct_option_id: self.correct_option_id,
            rubric: self.rubric,
            initial_code: self.initial_code,
            test_cases: self.test_cases,
        }
    }
}

/// Sum of marks across the set. The 100-mark total is a prompt contract;
/// callers log a deviation but accept the set.
pub fn total_marks(questions: &[GeneratedQuestion]) -> u32 {
    questions.iter().map(|q| q.marks).sum()
}

pub fn generation_prompt(job: &Job) -> String {
    let difficulty = match job.difficulty {
        Difficulty::Easy => "EASY",
        Difficulty::Medium => "MEDIUM",
        Difficulty::Hard => "HARD",
    };
    GENERATION_PROMPT_TEMPLATE
        .replace("{job_title}", &job.title)
        .replace("{job_description}", &job.description)
        .replace("{difficulty}", difficulty)
        .replace("{num_questions}", &job.num_questions.to_string())
        .replace("{is_coding_enabled}", &job.is_coding_enabled.to_string())
}
