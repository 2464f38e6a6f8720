//! Gemini-backed implementation of [`AssessmentAi`].
//!
//! Wraps the `generateContent` REST endpoint with bounded retry on rate
//! limits and server errors, JSON-mode output, and strict typed parsing.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ai::evaluate::{evaluation_prompt, EvaluationReport, EvaluationRequest};
use crate::ai::generate::{generation_prompt, total_marks, GeneratedQuestion};
use crate::ai::prompts::JSON_ONLY_SYSTEM;
use crate::ai::{AiError, AssessmentAi};
use crate::models::Job;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Model used for question generation.
/// Intentionally hardcoded to prevent accidental drift.
pub const GENERATION_MODEL: &str = "gemini-3-pro-preview";
/// Model used for answer evaluation.
pub const EVALUATION_MODEL: &str = "gemini-3-flash-preview";
const MAX_RETRIES: u32 = 3;

// ── request / response wire types ───────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// First text part of the first candidate, if any.
    fn text(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ── client ──────────────────────────────────────────────────────────────

/// The one Gemini client shared by both gateway operations.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Makes one `generateContent` call and returns the raw text payload.
    /// Retries on 429 and 5xx with exponential backoff (1s, 2s, 4s).
    async fn call(&self, model: &str, prompt: &str) -> Result<String, AiError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: JSON_ONLY_SYSTEM,
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let url = format!("{API_BASE}/{model}:generateContent");
        let mut last_error: Option<AiError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Gemini call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(AiError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(AiError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(AiError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: GenerateContentResponse = response.json().await?;

            if let Some(usage) = &parsed.usage_metadata {
                debug!(
                    "Gemini call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                    usage.prompt_token_count, usage.candidates_token_count
                );
            }

            let text = parsed.text().ok_or(AiError::EmptyContent)?;
            return Ok(text.to_string());
        }

        Err(last_error.unwrap_or(AiError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the model and parses the text payload as `T`. JSON mode is
    /// requested, but fences are still stripped in case the model wraps
    /// its output anyway.
    async fn call_json<T: DeserializeOwned>(&self, model: &str, prompt: &str) -> Result<T, AiError> {
        let text = self.call(model, prompt).await?;
        serde_json::from_str(strip_json_fences(&text)).map_err(AiError::Parse)
    }
}

#[async_trait]
impl AssessmentAi for GeminiClient {
    async fn generate_questions(&self, job: &Job) -> Result<Vec<GeneratedQuestion>, AiError> {
        let prompt = generation_prompt(job);
        let questions: Vec<GeneratedQuestion> =
            self.call_json(GENERATION_MODEL, &prompt).await?;

        if questions.is_empty() {
            return Err(AiError::EmptyQuestionSet);
        }

        let sum = total_marks(&questions);
        if sum != 100 {
            // Prompt contract only; accept the set as-is.
            warn!(
                "Generated question set totals {} marks instead of 100 for job '{}'",
                sum, job.title
            );
        }

        Ok(questions)
    }

    async fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationReport, AiError> {
        let prompt = evaluation_prompt(request);
        self.call_json(EVALUATION_MODEL, &prompt).await
    }
}

/// Removes a surrounding markdown code fence (```json … ``` or ``` … ```)
/// if the model ignored the JSON-only instruction.
fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.strip_suffix("```").map(str::trim).unwrap_or(body.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_language_tag() {
        let input = "```json\n[{\"marks\": 10}]\n```";
        assert_eq!(strip_json_fences(input), "[{\"marks\": 10}]");
    }

    #[test]
    fn test_strip_fences_bare() {
        let input = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_json_fences(input), "{\"a\": 1}");
    }

    #[test]
    fn test_unfenced_text_passes_through() {
        assert_eq!(strip_json_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_response_text_skips_textless_parts() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{}, {"text": "[1, 2]"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 3}
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), Some("[1, 2]"));
    }

    #[test]
    fn test_empty_candidates_yield_no_text() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.text().is_none());
    }
}
