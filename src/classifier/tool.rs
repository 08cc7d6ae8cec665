// SPDX-License-Identifier: BUSL-1.1
//! The classifier tool: turns a list of menu items into confident and
//! uncertain buckets. Two execution strategies mirror the original
//! `ClassifierTool.execute` — a straightforward per-item sequential path,
//! and a two-pass batched path that defers everything the cheap tiers
//! can't decide to a single batched LLM call.

use crate::classifier::engine::{self, WeightedTier};
use crate::classifier::keyword;
use crate::classifier::llm::{self, LlmProvider, BATCH_SYSTEM_PROMPT};
use crate::config::Settings;
use crate::kb::KnowledgeBase;
use crate::types::{ClassifiedItem, MenuItem, Method, TierResult, UncertainItem};
use crate::vector::VectorStore;
use crate::embeddings::EmbeddingGenerator;

pub struct ExecuteOutcome {
    pub confident_items: Vec<ClassifiedItem>,
    pub uncertain_items: Vec<UncertainItem>,
    pub all_items: Vec<ClassifiedItem>,
}

#[allow(clippy::too_many_arguments)]
fn to_classified(
    item: &MenuItem,
    result: &TierResult,
    method: Method,
    related_ingredients: Vec<String>,
    fallback_chain: Vec<String>,
    category: Option<String>,
    currency: &str,
) -> ClassifiedItem {
    ClassifiedItem {
        name: item.name.clone(),
        price: item.price,
        source_image: item.source_image,
        is_vegetarian: result.is_vegetarian,
        confidence: result.confidence,
        method,
        reasoning: if result.reasoning.is_empty() { None } else { Some(result.reasoning.clone()) },
        evidence: result.evidence.clone(),
        related_ingredients,
        fallback_chain,
        category,
        currency: currency.to_string(),
    }
}

fn to_uncertain(classified: &ClassifiedItem) -> UncertainItem {
    UncertainItem {
        name: classified.name.clone(),
        price: classified.price,
        confidence: classified.confidence,
        evidence: classified.evidence.clone(),
        suggested_classification: classified.is_vegetarian,
        source_image: classified.source_image.clone(),
    }
}

fn is_uncertain(classified: &ClassifiedItem, hitl_threshold: f32) -> bool {
    classified.is_vegetarian.is_none() || classified.confidence < hitl_threshold
}

/// Run every item through the full keyword → RAG → LLM cascade, one at a
/// time. Simple, correct, and the original's default when batching is off.
pub async fn execute_sequential(
    items: &[MenuItem],
    kb: &KnowledgeBase,
    store: &VectorStore,
    embedder: &EmbeddingGenerator,
    provider: &dyn LlmProvider,
    settings: &Settings,
) -> ExecuteOutcome {
    let mut confident_items = Vec::new();
    let mut uncertain_items = Vec::new();
    let mut all_items = Vec::with_capacity(items.len());

    for item in items {
        let outcome = engine::classify_single(&item.name, kb, store, embedder, provider, settings).await;
        let classified = to_classified(
            item,
            &outcome.result,
            outcome.method,
            outcome.related_ingredients,
            outcome.fallback_chain,
            outcome.category,
            &settings.currency,
        );

        if is_uncertain(&classified, settings.hitl_threshold) {
            uncertain_items.push(to_uncertain(&classified));
        } else {
            confident_items.push(classified.clone());
        }
        all_items.push(classified);
    }

    ExecuteOutcome { confident_items, uncertain_items, all_items }
}

struct PendingLlmItem<'a> {
    item: &'a MenuItem,
    keyword_confidence: f32,
    rag_result: TierResult,
    related_ingredients: Vec<String>,
    category: Option<String>,
}

fn batch_evidence_text(item: &MenuItem, related: &[String]) -> String {
    if related.is_empty() {
        item.name.clone()
    } else {
        format!("{} (related: {})", item.name, related.join(", "))
    }
}

/// Pass 1 + pass 2: bucket immediately on keyword/RAG confidence, batch
/// everything else into `llm_batch_size`-sized LLM calls.
pub async fn execute_batched(
    items: &[MenuItem],
    kb: &KnowledgeBase,
    store: &VectorStore,
    embedder: &EmbeddingGenerator,
    provider: &dyn LlmProvider,
    settings: &Settings,
) -> ExecuteOutcome {
    let mut confident_items = Vec::new();
    let mut uncertain_items = Vec::new();
    let mut all_items: Vec<Option<ClassifiedItem>> = vec![None; items.len()];
    let mut needs_llm: Vec<(usize, PendingLlmItem)> = Vec::new();

    // Pass 1: cheap tiers only.
    for (idx, item) in items.iter().enumerate() {
        let kw = keyword::classify(&item.name, &kb.keywords);
        if kw.confidence >= 0.9 {
            let fallback_chain = vec![format!("keyword:{:.2}", kw.confidence)];
            let classified = to_classified(item, &kw, Method::Keyword, Vec::new(), fallback_chain, None, &settings.currency);
            bucket(&classified, settings.hitl_threshold, &mut confident_items, &mut uncertain_items);
            all_items[idx] = Some(classified);
            continue;
        }

        let hits = store.search(&item.name, settings.rag_top_k, embedder);
        let rag = engine::analyze_rag_evidence(&hits);
        let related = engine::related_ingredients(&hits);
        let category = hits.first().map(|h| h.category.clone());

        if rag.is_vegetarian.is_some() && rag.confidence >= settings.confidence_threshold {
            let fallback_chain = vec![format!("keyword:{:.2}", kw.confidence), format!("rag:{:.2}", rag.confidence)];
            let classified = to_classified(item, &rag, Method::Rag, related, fallback_chain, category, &settings.currency);
            bucket(&classified, settings.hitl_threshold, &mut confident_items, &mut uncertain_items);
            all_items[idx] = Some(classified);
            continue;
        }

        needs_llm.push((
            idx,
            PendingLlmItem {
                item,
                keyword_confidence: kw.confidence,
                rag_result: rag,
                related_ingredients: related,
                category,
            },
        ));
    }

    // Pass 2: batch whatever's left through the LLM.
    for chunk in needs_llm.chunks(settings.llm_batch_size) {
        let prompt_body = chunk
            .iter()
            .enumerate()
            .map(|(i, (_, pending))| format!("{}. {}", i + 1, batch_evidence_text(pending.item, &pending.related_ingredients)))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!("Classify each dish below:\n{prompt_body}");

        let names: Vec<String> = chunk.iter().map(|(_, p)| p.item.name.clone()).collect();
        let llm_results: Vec<TierResult> = match provider.generate(BATCH_SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => match llm::parse_batch_response(&raw) {
                Ok(verdicts) => llm::match_batch_verdicts(&names, &verdicts)
                    .into_iter()
                    .map(|v| match v {
                        Some(verdict) => TierResult {
                            is_vegetarian: verdict.is_vegetarian,
                            confidence: verdict.confidence.clamp(0.0, 1.0),
                            reasoning: verdict.reasoning,
                            evidence: Vec::new(),
                        },
                        None => TierResult::error("no matching LLM verdict in batch response"),
                    })
                    .collect(),
                Err(e) => names.iter().map(|_| TierResult::error(format!("batch parse error: {e}"))).collect(),
            },
            Err(e) => names.iter().map(|_| TierResult::error(format!("batch request error: {e}"))).collect(),
        };

        for ((idx, pending), llm_result) in chunk.iter().zip(llm_results.into_iter()) {
            // Keyword tier is stubbed out here: it already had its shot in pass 1.
            let keyword_stub = TierResult::none();
            let combined = engine::combine_results(&[
                WeightedTier { label: "keyword", result: &keyword_stub, weight: 0.4 },
                WeightedTier { label: "rag", result: &pending.rag_result, weight: 0.3 },
                WeightedTier { label: "llm", result: &llm_result, weight: 0.3 },
            ]);

            let mut fallback_chain = vec![
                format!("keyword:{:.2}", pending.keyword_confidence),
                format!("rag:{:.2}", pending.rag_result.confidence),
                format!("llm:{:.2}", llm_result.confidence),
            ];
            if llm_result.confidence == 0.0 || llm_result.is_vegetarian.is_none() {
                fallback_chain.push("fallback_to_rag".to_string());
            }

            let classified = to_classified(
                pending.item,
                &combined,
                Method::Combined,
                pending.related_ingredients.clone(),
                fallback_chain,
                pending.category.clone(),
                &settings.currency,
            );
            bucket(&classified, settings.hitl_threshold, &mut confident_items, &mut uncertain_items);
            all_items[*idx] = Some(classified);
        }
    }

    ExecuteOutcome {
        confident_items,
        uncertain_items,
        all_items: all_items.into_iter().flatten().collect(),
    }
}

fn bucket(
    classified: &ClassifiedItem,
    hitl_threshold: f32,
    confident_items: &mut Vec<ClassifiedItem>,
    uncertain_items: &mut Vec<UncertainItem>,
) {
    if is_uncertain(classified, hitl_threshold) {
        uncertain_items.push(to_uncertain(classified));
    } else {
        confident_items.push(classified.clone());
    }
}

/// Entry point mirroring the original's batch-enabled/disabled switch.
pub async fn execute(
    items: &[MenuItem],
    kb: &KnowledgeBase,
    store: &VectorStore,
    embedder: &EmbeddingGenerator,
    provider: &dyn LlmProvider,
    settings: &Settings,
) -> ExecuteOutcome {
    if settings.llm_batch_enabled {
        execute_batched(items, kb, store, embedder, provider, settings).await
    } else {
        execute_sequential(items, kb, store, embedder, provider, settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncertain_when_no_opinion() {
        let classified = ClassifiedItem {
            name: "mystery".into(),
            price: 1.0,
            source_image: None,
            is_vegetarian: None,
            confidence: 0.0,
            method: Method::Error,
            reasoning: None,
            evidence: vec![],
            related_ingredients: vec![],
            fallback_chain: vec![],
            category: None,
            currency: "USD".into(),
        };
        assert!(is_uncertain(&classified, 0.4));
    }

    #[test]
    fn confident_when_above_threshold() {
        let classified = ClassifiedItem {
            name: "margherita pizza".into(),
            price: 10.0,
            source_image: None,
            is_vegetarian: Some(true),
            confidence: 0.9,
            method: Method::Keyword,
            reasoning: None,
            evidence: vec![],
            related_ingredients: vec![],
            fallback_chain: vec![],
            category: None,
            currency: "USD".into(),
        };
        assert!(!is_uncertain(&classified, 0.4));
    }
}
