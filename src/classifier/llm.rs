// SPDX-License-Identifier: BUSL-1.1
//! LLM oracle tier: the last resort when keyword and RAG evidence are
//! insufficient. Two providers are supported, selected once at startup
//! (grounded in the teacher's `vector::vector_db_client::VectorDbClient`
//! for the `reqwest`-backed client shape, and the original
//! `get_llm_provider()` for the selection policy).

use crate::config::{LlmProviderKind, Settings};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const SYSTEM_PROMPT: &str = "\
You are a food classification expert. Given a dish name and any supporting \
evidence, determine whether the dish is vegetarian (contains no meat, \
poultry, fish, or seafood; dairy and eggs are allowed). \
Respond with a single JSON object: {\"is_vegetarian\": true|false, \
\"confidence\": 0.0-1.0, \"reasoning\": \"short explanation\"}.";

pub const BATCH_SYSTEM_PROMPT: &str = "\
You are a food classification expert. You will receive a numbered list of \
dish names, each with any supporting evidence. For every dish, determine \
whether it is vegetarian (contains no meat, poultry, fish, or seafood; \
dairy and eggs are allowed). Respond with a JSON array, one object per \
dish in the same order: [{\"name\": \"...\", \"is_vegetarian\": true|false, \
\"confidence\": 0.0-1.0, \"reasoning\": \"short explanation\"}, ...].";

/// A single LLM verdict on one dish, before it's folded into a `TierResult`.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmVerdict {
    #[serde(default)]
    pub name: Option<String>,
    pub is_vegetarian: Option<bool>,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub reasoning: String,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
    async fn is_available(&self) -> bool;
    fn name(&self) -> &'static str;
}

/// Local provider: an Ollama-compatible `/api/chat` endpoint.
pub struct LocalProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl LocalProvider {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("failed to build local LLM client"),
            base_url,
            model,
        }
    }
}

#[async_trait]
impl LlmProvider for LocalProvider {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "stream": false,
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("local LLM request failed")?;

        let parsed: serde_json::Value = resp.json().await.context("local LLM returned invalid JSON")?;
        parsed
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("local LLM response missing message.content"))
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url.trim_end_matches('/'));
        self.client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Remote provider: an OpenAI-compatible `/chat/completions` endpoint.
pub struct RemoteProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl RemoteProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("failed to build remote LLM client"),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl LlmProvider for RemoteProvider {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "temperature": 0.1,
        });

        let resp = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("remote LLM request failed")?;

        let parsed: serde_json::Value = resp.json().await.context("remote LLM returned invalid JSON")?;
        parsed
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("remote LLM response missing choices[0].message.content"))
    }

    async fn is_available(&self) -> bool {
        self.api_key.len() > 10
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Resolve the configured provider, falling back to local if remote is
/// requested but unavailable. Fatal if nothing can serve requests.
pub async fn select_provider(settings: &Settings) -> Result<Box<dyn LlmProvider>> {
    let local = LocalProvider::new(settings.local_base_url.clone(), settings.local_model.clone());
    let remote = RemoteProvider::new(settings.remote_api_key.clone(), settings.remote_model.clone());

    match settings.llm_provider {
        LlmProviderKind::Remote => {
            if remote.is_available().await {
                return Ok(Box::new(remote));
            }
            if local.is_available().await {
                tracing::warn!("remote LLM provider unavailable, falling back to local");
                return Ok(Box::new(local));
            }
        }
        LlmProviderKind::Local => {
            if local.is_available().await {
                return Ok(Box::new(local));
            }
            if remote.is_available().await {
                tracing::warn!("local LLM provider unavailable, falling back to remote");
                return Ok(Box::new(remote));
            }
        }
    }

    Err(anyhow!("no LLM provider is available (checked local and remote)"))
}

/// Extract the first `{...}` JSON object from free-form model output and
/// parse it as a single verdict.
pub fn parse_single_response(raw: &str) -> Result<LlmVerdict> {
    let start = raw.find('{').ok_or_else(|| anyhow!("no JSON object found in LLM response"))?;
    let end = raw.rfind('}').ok_or_else(|| anyhow!("no JSON object found in LLM response"))?;
    if end < start {
        return Err(anyhow!("malformed JSON object in LLM response"));
    }
    let slice = &raw[start..=end];
    serde_json::from_str(slice).context("failed to parse LLM JSON verdict")
}

/// Extract a `[...]` JSON array from free-form model output (stripping
/// markdown code fences first) and parse it as a list of verdicts.
pub fn parse_batch_response(raw: &str) -> Result<Vec<LlmVerdict>> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let start = cleaned.find('[').ok_or_else(|| anyhow!("no JSON array found in batch LLM response"))?;
    let end = cleaned.rfind(']').ok_or_else(|| anyhow!("no JSON array found in batch LLM response"))?;
    if end < start {
        return Err(anyhow!("malformed JSON array in batch LLM response"));
    }
    let slice = &cleaned[start..=end];
    serde_json::from_str(slice).context("failed to parse batch LLM JSON verdicts")
}

/// Match batch verdicts back to input names: prefer substring-containment
/// matching (the model sometimes paraphrases), falling back to positional
/// order when no name match is found.
pub fn match_batch_verdicts(names: &[String], verdicts: &[LlmVerdict]) -> Vec<Option<LlmVerdict>> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let lower = name.to_lowercase();
            verdicts
                .iter()
                .find(|v| {
                    v.name
                        .as_ref()
                        .map(|n| {
                            let n = n.to_lowercase();
                            n.contains(&lower) || lower.contains(&n)
                        })
                        .unwrap_or(false)
                })
                .or_else(|| verdicts.get(idx))
                .cloned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_response_with_surrounding_text() {
        let raw = "Sure, here's my answer:\n{\"is_vegetarian\": true, \"confidence\": 0.8, \"reasoning\": \"no meat\"}\nHope that helps!";
        let v = parse_single_response(raw).unwrap();
        assert_eq!(v.is_vegetarian, Some(true));
        assert_eq!(v.confidence, 0.8);
    }

    #[test]
    fn parses_batch_response_wrapped_in_code_fence() {
        let raw = "```json\n[{\"name\":\"Pho\",\"is_vegetarian\":false,\"confidence\":0.7,\"reasoning\":\"beef broth\"}]\n```";
        let v = parse_batch_response(raw).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].is_vegetarian, Some(false));
    }

    #[test]
    fn matches_batch_verdicts_by_substring_containment() {
        let names = vec!["Margherita Pizza".to_string(), "Pho".to_string()];
        let verdicts = vec![
            LlmVerdict { name: Some("Pho (beef)".into()), is_vegetarian: Some(false), confidence: 0.7, reasoning: "beef".into() },
            LlmVerdict { name: Some("Margherita".into()), is_vegetarian: Some(true), confidence: 0.9, reasoning: "cheese only".into() },
        ];
        let matched = match_batch_verdicts(&names, &verdicts);
        assert_eq!(matched[0].as_ref().unwrap().is_vegetarian, Some(true));
        assert_eq!(matched[1].as_ref().unwrap().is_vegetarian, Some(false));
    }

    #[test]
    fn falls_back_to_positional_match_when_no_name_matches() {
        let names = vec!["Unknown Dish".to_string()];
        let verdicts = vec![LlmVerdict { name: None, is_vegetarian: Some(true), confidence: 0.5, reasoning: String::new() }];
        let matched = match_batch_verdicts(&names, &verdicts);
        assert!(matched[0].is_some());
    }
}
