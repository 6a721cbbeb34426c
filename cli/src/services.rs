use std::time::Duration;

use viva_ai::embeddings::ollama_embed::OllamaEmbedder;
use viva_ai::llm::gemini_llm::GeminiLlm;
use viva_ai::llm::ollama_llm::OllamaLlm;
use viva_ai::llm::Llm;
use viva_ai::ollama::OllamaClient;
use viva_core::config::{LlmProvider, VivaConfig};
use viva_core::error::AppError;

/// Model adapters resolved from configuration.
pub struct Services {
    pub client: OllamaClient,
    pub embedder: OllamaEmbedder,
    pub llm: Box<dyn Llm>,
}

impl Services {
    pub fn from_config(cfg: &VivaConfig) -> Result<Self, AppError> {
        let timeout = Duration::from_secs(cfg.llm.timeout_secs);
        let client = OllamaClient::new(&cfg.ollama.base_url)?.with_generate_timeout(timeout);
        let embedder = OllamaEmbedder::new(client.clone());

        let llm: Box<dyn Llm> = match cfg.llm.provider {
            LlmProvider::Ollama => Box::new(OllamaLlm::new(client.clone())),
            LlmProvider::Gemini => Box::new(
                GeminiLlm::from_env(&cfg.llm.gemini_base_url, &cfg.llm.api_key_env)?
                    .with_timeout(timeout),
            ),
        };
        log::debug!(
            "services: ollama={} embed_model={} provider={:?} llm_model={}",
            client.base_url(),
            cfg.ollama.embed_model,
            cfg.llm.provider,
            cfg.llm.model
        );

        Ok(Self {
            client,
            embedder,
            llm,
        })
    }
}
