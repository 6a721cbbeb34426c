use serde::de::DeserializeOwned;
use viva_core::error::AppError;

/// Single-turn text generation. Output format is never guaranteed.
pub trait Llm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError>;
}

pub mod gemini_llm;
pub mod ollama_llm;

fn generation_error(message: &str) -> AppError {
    AppError::new("AI_GENERATION_FAILED", message.to_string())
}

fn encode_request<T: serde::Serialize>(req: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(req)
        .map_err(|e| generation_error("Failed to encode generation request").with_details(e.to_string()))
}

/// Decode a generation response body. Rate limits, server errors and transport failures are
/// retryable.
fn decode_response<T: DeserializeOwned>(
    resp: Result<ureq::Response, ureq::Error>,
    model: &str,
) -> Result<T, AppError> {
    match resp {
        Ok(r) if r.status() == 200 => r.into_json::<T>().map_err(|e| {
            generation_error("Failed to decode generation response").with_details(e.to_string())
        }),
        Ok(r) => Err(generation_error("Generation request failed")
            .with_details(format!("status={}; model={model}", r.status()))),
        Err(ureq::Error::Status(code, r)) => Err(generation_error("Generation request failed")
            .with_details(format!(
                "status={code}; model={model}; body={}",
                r.into_string().unwrap_or_default()
            ))
            .with_retryable(code == 429 || code >= 500)),
        Err(e) => Err(generation_error("Failed to call generation endpoint")
            .with_details(e.to_string())
            .with_retryable(true)),
    }
}

fn non_empty(text: String) -> Result<String, AppError> {
    if text.trim().is_empty() {
        return Err(generation_error("Generation response was empty"));
    }
    Ok(text)
}
