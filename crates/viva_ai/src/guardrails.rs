use viva_core::error::AppError;

/// Reject blank inputs before they reach a model call.
pub fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::new(
            "AI_EVALUATION_INVALID_INPUT",
            format!("{field} must not be empty"),
        ));
    }
    Ok(())
}

/// De-duplicate context chunks, keeping first-seen order.
pub fn dedup_context(chunks: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    chunks
        .into_iter()
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
