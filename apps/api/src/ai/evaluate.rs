//! Answer evaluation — wire contract and prompt assembly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ai::prompts::EVALUATION_PROMPT_TEMPLATE;
use crate::models::{Question, QuestionEvaluation};

/// Everything the evaluation call needs about one finished attempt.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub job_title: String,
    pub job_description: String,
    pub resume_summary: String,
    pub questions: Vec<Question>,
    /// question id → answer text as last entered.
    pub answers: HashMap<String, String>,
    pub time_taken_minutes: u32,
}

/// Per-question digest sent to the evaluator: the question, what the
/// candidate answered, the answer key where one exists, and the weight.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnswerDigest<'a> {
    id: &'a str,
    text: &'a str,
    user_ans: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    correct: Option<&'a str>,
    max: u32,
    #[serde(rename = "type")]
    question_type: crate::models::QuestionType,
}

/// The evaluator's verdict. `total_score` is on the 0–100 scale; the
/// suspicion flag marks guesswork or resume/JD mismatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub total_score: f64,
    pub is_suspicious: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspicious_reason: Option<String>,
    pub feedback: String,
    pub evaluations: Vec<QuestionEvaluation>,
}

pub fn evaluation_prompt(request: &EvaluationRequest) -> String {
    let digests: Vec<AnswerDigest<'_>> = request
        .questions
        .iter()
        .map(|q| AnswerDigest {
            id: &q.id,
            text: &q.text,
            user_ans: request
                .answers
                .get(&q.id)
                .map(String::as_str)
                .unwrap_or("No Answer"),
            correct: q.correct_option_id.as_deref(),
            max: q.marks,
            question_type: q.question_type,
        })
        .collect();
    let results_json = serde_json::to_string(&digests).expect("digest serialization");

    EVALUATION_PROMPT_TEMPLATE
        .replace("{job_title}", &request.job_title)
        .replace("{job_description}", &request.job_description)
        .replace("{resume_summary}", &request.resume_summary)
        .replace(
            "{time_taken_minutes}",
            &request.time_taken_minutes.to_string(),
        )
        .replace("{results_json}", &results_json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionType;

    fn question(id: &str, correct: Option<&str>) -> Question {
        Question {
            id: id.to_string(),
            question_type: QuestionType::Mcq,
            text: format!("question {id}"),
            marks: 5,
            options: None,
            correct_option_id: correct.map(str::to_string),
            rubric: None,
            initial_code: None,
            test_cases: None,
        }
    }

    fn request(answers: HashMap<String, String>) -> EvaluationRequest {
        EvaluationRequest {
            job_title: "SRE".to_string(),
            job_description: "Keep it running".to_string(),
            resume_summary: "Five years of on-call".to_string(),
            questions: vec![question("q-0", Some("a")), question("q-1", None)],
            answers,
            time_taken_minutes: 10,
        }
    }

    #[test]
    fn test_unanswered_questions_digest_as_no_answer() {
        let mut answers = HashMap::new();
        answers.insert("q-0".to_string(), "a".to_string());
        let prompt = evaluation_prompt(&request(answers));
        assert!(prompt.contains(r#""userAns":"a""#));
        assert!(prompt.contains(r#""userAns":"No Answer""#));
        assert!(prompt.contains("Time Taken: 10 minutes"));
    }

    #[test]
    fn test_digest_omits_missing_answer_key() {
        let prompt = evaluation_prompt(&request(HashMap::new()));
        // q-0 carries its key, q-1 has none and the field is omitted.
        assert!(prompt.contains(r#""correct":"a""#));
        assert_eq!(prompt.matches(r#""correct":"#).count(), 1);
    }

    #[test]
    fn test_report_deserializes_with_optional_reason() {
        let json = r#"{
            "totalScore": 72.5,
            "isSuspicious": false,
            "feedback": "Comfortable with the stack.",
            "evaluations": [
                {"questionId": "q-0", "isCorrect": true, "marksObtained": 5, "aiFeedback": "Right."},
                {"questionId": "q-1", "isCorrect": false, "marksObtained": 0,
                 "aiFeedback": "Wrong.", "correctAnswer": "Option b"}
            ]
        }"#;
        let report: EvaluationReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.total_score, 72.5);
        assert!(report.suspicious_reason.is_none());
        assert_eq!(report.evaluations.len(), 2);
        assert_eq!(report.evaluations[1].correct_answer.as_deref(), Some("Option b"));
    }

    #[test]
    fn test_report_without_feedback_is_rejected() {
        let json = r#"{"totalScore": 10, "isSuspicious": true, "evaluations": []}"#;
        assert!(serde_json::from_str::<EvaluationReport>(json).is_err());
    }
}
