use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunking::ChunkingConfig;
use crate::error::AppError;
use crate::ingest::ExtractionConfig;

pub const DEFAULT_THEMES: [&str; 5] = [
    "problem motivation and limitations of existing approaches",
    "core architecture and design decisions",
    "training methodology and optimization strategy",
    "advantages and trade-offs of the proposed method",
    "limitations, assumptions, and failure cases",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub embed_model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            // all-MiniLM-L6-v2, 384 dimensions.
            embed_model: "all-minilm".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Ollama,
    Gemini,
}

impl LlmProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "gemini" => Some(Self::Gemini),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub gemini_base_url: String,
    /// Name of the environment variable holding the Gemini API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            model: "llama3.1".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExamConfig {
    pub num_questions: usize,
    /// Retrieval queries used to gather context for question generation.
    pub themes: Vec<String>,
    pub theme_top_k: usize,
    pub answer_top_k: usize,
    pub min_answer_chars: usize,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            num_questions: 5,
            themes: DEFAULT_THEMES.iter().map(|t| t.to_string()).collect(),
            theme_top_k: 2,
            answer_top_k: 3,
            min_answer_chars: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VivaConfig {
    pub ollama: OllamaConfig,
    pub llm: LlmConfig,
    pub extraction: ExtractionConfig,
    pub chunking: ChunkingConfig,
    pub exam: ExamConfig,
}

impl VivaConfig {
    /// Defaults, optionally overlaid by a TOML file, then by `VIVA_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env_overrides(|k| std::env::var(k).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::new("CONFIG_READ_FAILED", "Failed to read config file")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        Self::from_toml_str(&raw).map_err(|e| {
            let d = e.details.clone().unwrap_or_default();
            e.with_details(format!("path={}; {d}", path.display()))
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, AppError> {
        toml::from_str(raw).map_err(|e| {
            AppError::new("CONFIG_PARSE_FAILED", "Failed to parse config")
                .with_details(format!("err={e}"))
        })
    }

    /// `lookup` is injected so tests do not have to mutate the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("VIVA_OLLAMA_URL") {
            self.ollama.base_url = v;
        }
        if let Some(v) = lookup("VIVA_EMBED_MODEL") {
            self.ollama.embed_model = v;
        }
        if let Some(v) = lookup("VIVA_LLM_PROVIDER") {
            self.llm.provider = LlmProvider::parse(&v).ok_or_else(|| {
                AppError::new("CONFIG_INVALID", "VIVA_LLM_PROVIDER must be ollama or gemini")
                    .with_details(format!("value={v}"))
            })?;
        }
        if let Some(v) = lookup("VIVA_LLM_MODEL") {
            self.llm.model = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.chunking.validate()?;

        let invalid = |msg: &str| Err(AppError::new("CONFIG_INVALID", msg.to_string()));
        if self.ollama.embed_model.trim().is_empty() {
            return invalid("ollama.embed_model must not be empty");
        }
        if self.llm.model.trim().is_empty() {
            return invalid("llm.model must not be empty");
        }
        if self.llm.timeout_secs == 0 {
            return invalid("llm.timeout_secs must be greater than zero");
        }
        if self.exam.num_questions == 0 {
            return invalid("exam.num_questions must be at least 1");
        }
        if self.exam.themes.iter().all(|t| t.trim().is_empty()) {
            return invalid("exam.themes must contain at least one non-empty theme");
        }
        if self.exam.theme_top_k == 0 || self.exam.answer_top_k == 0 {
            return invalid("exam.theme_top_k and exam.answer_top_k must be at least 1");
        }
        Ok(())
    }
}
