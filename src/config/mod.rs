// SPDX-License-Identifier: BUSL-1.1
//! Process-wide configuration, resolved once from the environment (or a
//! `.env` file) and cached for the lifetime of the process.

use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Local,
    Remote,
}

impl LlmProviderKind {
    fn from_env(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "remote" => LlmProviderKind::Remote,
            _ => LlmProviderKind::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub llm_provider: LlmProviderKind,
    pub local_base_url: String,
    pub local_model: String,
    pub remote_api_key: String,
    pub remote_model: String,
    pub confidence_threshold: f32,
    pub hitl_threshold: f32,
    pub rag_top_k: usize,
    pub embedding_model: String,
    pub llm_batch_enabled: bool,
    pub llm_batch_size: usize,
    pub api_host: String,
    pub api_port: u16,
    pub feedback_log_path: String,
    pub currency: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm_provider: LlmProviderKind::Local,
            local_base_url: "http://localhost:11434".to_string(),
            local_model: "llama3.2".to_string(),
            remote_api_key: String::new(),
            remote_model: "gpt-4o-mini".to_string(),
            confidence_threshold: 0.6,
            hitl_threshold: 0.4,
            rag_top_k: 5,
            embedding_model: "all-MiniLM-L6-v2".to_string(),
            llm_batch_enabled: true,
            llm_batch_size: 8,
            api_host: "0.0.0.0".to_string(),
            api_port: 8001,
            feedback_log_path: "./data/hitl_feedback.jsonl".to_string(),
            currency: "USD".to_string(),
        }
    }
}

impl Settings {
    fn load() -> Self {
        // Best-effort: a missing .env file is not an error.
        let _ = dotenv::dotenv();

        let default = Self::default();
        Self {
            llm_provider: std::env::var("LLM_PROVIDER")
                .map(|v| LlmProviderKind::from_env(&v))
                .unwrap_or(default.llm_provider),
            local_base_url: env_or("LOCAL_BASE_URL", &default.local_base_url),
            local_model: env_or("LOCAL_MODEL", &default.local_model),
            remote_api_key: env_or("REMOTE_API_KEY", &default.remote_api_key),
            remote_model: env_or("REMOTE_MODEL", &default.remote_model),
            confidence_threshold: env_parsed("CONFIDENCE_THRESHOLD", default.confidence_threshold),
            hitl_threshold: env_parsed("HITL_THRESHOLD", default.hitl_threshold),
            rag_top_k: env_parsed("RAG_TOP_K", default.rag_top_k),
            embedding_model: env_or("EMBEDDING_MODEL", &default.embedding_model),
            llm_batch_enabled: env_bool("LLM_BATCH_ENABLED", default.llm_batch_enabled),
            llm_batch_size: env_parsed("LLM_BATCH_SIZE", default.llm_batch_size),
            api_host: env_or("API_HOST", &default.api_host),
            api_port: env_parsed("API_PORT", default.api_port),
            feedback_log_path: env_or("FEEDBACK_LOG_PATH", &default.feedback_log_path),
            currency: env_or("CURRENCY", &default.currency),
        }
    }
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Resolve and cache the process-wide settings.
pub fn get_settings() -> &'static Settings {
    SETTINGS.get_or_init(Settings::load)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_thresholds() {
        let s = Settings::default();
        assert_eq!(s.confidence_threshold, 0.6);
        assert_eq!(s.hitl_threshold, 0.4);
        assert_eq!(s.rag_top_k, 5);
        assert!(s.llm_batch_enabled);
        assert_eq!(s.llm_batch_size, 8);
    }

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!(LlmProviderKind::from_env("REMOTE"), LlmProviderKind::Remote);
        assert_eq!(LlmProviderKind::from_env("local"), LlmProviderKind::Local);
        assert_eq!(LlmProviderKind::from_env("garbage"), LlmProviderKind::Local);
    }
}
