use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    Mcq,
    Subjective,
    Coding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
}

/// A single generated assessment question. Questions exist only for the
/// lifetime of an attempt; they are never persisted independently, and their
/// ids (`q-0`, `q-1`, …) are assigned locally after generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    pub marks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<McqOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCase>>,
}

/// The question shape shown to the candidate while the attempt is running.
/// The answer key and grading rubric stay server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    pub marks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<McqOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCase>>,
}

impl Question {
    pub fn candidate_view(&self) -> CandidateQuestion {
        CandidateQuestion {
            id: self.id.clone(),
            question_type: self.question_type,
            text: self.text.clone(),
            marks: self.marks,
            options: self.options.clone(),
            initial_code: self.initial_code.clone(),
            test_cases: self.test_cases.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_type_wire_names() {
        assert_eq!(serde_json::to_string(&QuestionType::Mcq).unwrap(), r#""MCQ""#);
        let t: QuestionType = serde_json::from_str(r#""SUBJECTIVE""#).unwrap();
        assert_eq!(t, QuestionType::Subjective);
    }

    #[test]
    fn test_candidate_view_drops_answer_key() {
        let question = Question {
            id: "q-0".to_string(),
            question_type: QuestionType::Mcq,
            text: "Which keyword moves ownership?".to_string(),
            marks: 4,
            options: Some(vec![
                McqOption {
                    id: "a".to_string(),
                    text: "move".to_string(),
                },
                McqOption {
                    id: "b".to_string(),
                    text: "borrow".to_string(),
                },
            ]),
            correct_option_id: Some("a".to_string()),
            rubric: Some("exact keyword required".to_string()),
            initial_code: None,
            test_cases: None,
        };
        let json = serde_json::to_value(question.candidate_view()).unwrap();
        assert!(json.get("correctOptionId").is_none());
        assert!(json.get("rubric").is_none());
        assert_eq!(json["options"].as_array().unwrap().len(), 2);
        assert_eq!(json["type"], "MCQ");
    }
}
