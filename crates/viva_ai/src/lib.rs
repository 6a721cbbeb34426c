pub mod embeddings;
pub mod guardrails;
pub mod index;
pub mod llm;
pub mod ollama;
pub mod retrieve;
pub mod session;
pub mod viva;
