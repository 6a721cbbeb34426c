use std::time::Duration;

use serde::{Deserialize, Serialize};
use viva_core::error::AppError;

use super::{decode_response, encode_request, non_empty, Llm};

/// Google Gemini `generateContent` over HTTPS.
#[derive(Debug, Clone)]
pub struct GeminiLlm {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiLlm {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, AppError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("https://") {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Gemini base URL must use https",
            )
            .with_details(format!("base_url={base_url}")));
        }
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AppError::new("AI_GEMINI_KEY_MISSING", "Gemini API key is empty"));
        }
        Ok(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(120),
        })
    }

    /// Read the API key from the environment variable named `key_var`.
    pub fn from_env(base_url: &str, key_var: &str) -> Result<Self, AppError> {
        let key = std::env::var(key_var).map_err(|_| {
            AppError::new("AI_GEMINI_KEY_MISSING", "Gemini API key is not set")
                .with_details(format!("env={key_var}"))
        })?;
        Self::new(base_url, key)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[derive(Debug, Clone, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn first_candidate_text(resp: GenerateContentResponse) -> String {
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

impl Llm for GeminiLlm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        let body = encode_request(&GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        })?;

        log::debug!("gemini generate model={model} prompt_chars={}", prompt.chars().count());
        let resp = ureq::post(&self.endpoint(model))
            .timeout(self.timeout)
            .set("x-goog-api-key", &self.api_key)
            .send_json(body);

        let reply: GenerateContentResponse = decode_response(resp, model)?;
        non_empty(first_candidate_text(reply))
    }
}
