// SPDX-License-Identifier: BUSL-1.1
//! The classifier engine: cascades keyword → RAG → LLM for a single dish,
//! and combines whichever tiers produced an opinion into one verdict.
//! Grounded on the original `LLMClassifier.classify` /
//! `_analyze_rag_evidence` / `_combine_results`.

use crate::classifier::llm::{self, LlmProvider, SYSTEM_PROMPT};
use crate::classifier::keyword;
use crate::config::Settings;
use crate::kb::{EntryKind, KnowledgeBase};
use crate::types::{Method, TierResult};
use crate::vector::{RagHit, VectorStore};
use crate::embeddings::EmbeddingGenerator;

/// A named, weighted opinion fed into [`combine_results`].
pub struct WeightedTier<'a> {
    pub label: &'static str,
    pub result: &'a TierResult,
    pub weight: f32,
}

/// The full outcome of classifying one dish: the final combined verdict,
/// the tiers that ran, and related ingredients surfaced by RAG.
pub struct EngineOutcome {
    pub result: TierResult,
    pub method: Method,
    pub fallback_chain: Vec<String>,
    pub related_ingredients: Vec<String>,
    pub category: Option<String>,
}

/// Relevance below this is noise, not evidence (matches the original
/// `_analyze_rag_evidence` cutoff).
const RAG_RELEVANCE_FLOOR: f32 = 0.3;

/// Score RAG hits into a single tier opinion: each hit's relevance is
/// tallied on its ingredient/dish's side, and confidence reflects how
/// lopsided the tally is.
pub fn analyze_rag_evidence(hits: &[RagHit]) -> TierResult {
    let mut veg_score = 0.0f32;
    let mut non_veg_score = 0.0f32;
    let mut evidence = Vec::new();

    for hit in hits {
        if hit.relevance < RAG_RELEVANCE_FLOOR {
            continue;
        }
        if hit.is_vegetarian {
            veg_score += hit.relevance;
        } else {
            non_veg_score += hit.relevance;
        }
        evidence.push(format!("{} (relevance {:.2})", hit.name, hit.relevance));
    }

    if veg_score == 0.0 && non_veg_score == 0.0 {
        return TierResult {
            reasoning: "No relevant evidence found".to_string(),
            evidence,
            ..TierResult::none()
        };
    }

    let (is_veg, winning, other) = if veg_score > non_veg_score && veg_score > 0.5 {
        (true, veg_score, non_veg_score)
    } else if non_veg_score > veg_score && non_veg_score > 0.5 {
        (false, non_veg_score, veg_score)
    } else {
        // Tied, or neither side cleared the decisiveness floor.
        return TierResult {
            reasoning: "Inconclusive RAG evidence".to_string(),
            confidence: 0.3,
            evidence,
            is_vegetarian: None,
        };
    };

    let confidence = (winning / (winning + other + 0.1)).min(0.85);
    TierResult {
        is_vegetarian: Some(is_veg),
        confidence,
        reasoning: format!(
            "RAG evidence: {} dishes/ingredients suggest {}",
            evidence.len(),
            if is_veg { "vegetarian" } else { "non-vegetarian" }
        ),
        evidence,
    }
}

/// Weighted combination of whichever tiers have an opinion. Tiers with
/// `is_vegetarian: None` are skipped entirely, not treated as 0.5.
pub fn combine_results(tiers: &[WeightedTier]) -> TierResult {
    let mut weighted_sum = 0.0f32;
    let mut total_weight = 0.0f32;
    let mut reasons = Vec::new();
    let mut evidence = Vec::new();

    for tier in tiers {
        if let Some(is_veg) = tier.result.is_vegetarian {
            weighted_sum += tier.weight * if is_veg { 1.0 } else { 0.0 };
            total_weight += tier.weight;
            if !tier.result.reasoning.is_empty() {
                reasons.push(tier.result.reasoning.clone());
            }
            evidence.extend(tier.result.evidence.iter().cloned());
        }
    }

    if total_weight == 0.0 {
        return TierResult {
            reasoning: "No tier produced a confident opinion".to_string(),
            evidence,
            ..TierResult::none()
        };
    }

    let veg_probability = weighted_sum / total_weight;
    let confidence = (((veg_probability - 0.5).abs() * 2.0).clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
    let reasoning = reasons.into_iter().take(2).collect::<Vec<_>>().join("; ");

    TierResult {
        is_vegetarian: Some(veg_probability > 0.5),
        confidence,
        reasoning,
        evidence,
    }
}

/// Up to three related ingredient names surfaced by RAG, for display and
/// for the batch LLM prompt's evidence context.
pub fn related_ingredients(hits: &[RagHit]) -> Vec<String> {
    hits.iter()
        .filter(|h| h.kind == EntryKind::Ingredient)
        .take(3)
        .map(|h| h.name.clone())
        .collect()
}

fn evidence_text(hits: &[RagHit]) -> String {
    if hits.is_empty() {
        return "No related evidence found.".to_string();
    }
    hits.iter()
        .map(|h| format!("- {} ({})", h.document, if h.is_vegetarian { "vegetarian" } else { "non-vegetarian" }))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ask the LLM about a single dish, given whatever RAG evidence was found.
pub async fn llm_classify_single(
    name: &str,
    hits: &[RagHit],
    provider: &dyn LlmProvider,
) -> TierResult {
    let prompt = format!(
        "Dish: {}\n\nRelated evidence:\n{}\n\nIs this dish vegetarian?",
        name,
        evidence_text(hits)
    );

    match provider.generate(SYSTEM_PROMPT, &prompt).await {
        Ok(raw) => match llm::parse_single_response(&raw) {
            Ok(verdict) => TierResult {
                is_vegetarian: verdict.is_vegetarian,
                confidence: verdict.confidence.clamp(0.0, 1.0),
                reasoning: verdict.reasoning,
                evidence: Vec::new(),
            },
            Err(e) => TierResult::error(format!("LLM response parse error: {e}")),
        },
        Err(e) => TierResult::error(format!("LLM request error: {e}")),
    }
}

/// Cascade keyword → RAG → LLM for one dish, short-circuiting as soon as a
/// tier is decisive enough, matching the bucketing thresholds the tool
/// layer also uses (keyword >= 0.9, RAG >= `confidence_threshold`).
pub async fn classify_single(
    name: &str,
    kb: &KnowledgeBase,
    store: &VectorStore,
    embedder: &EmbeddingGenerator,
    provider: &dyn LlmProvider,
    settings: &Settings,
) -> EngineOutcome {
    let mut fallback_chain = Vec::new();
    let kw = keyword::classify(name, &kb.keywords);
    fallback_chain.push(format!("keyword:{:.2}", kw.confidence));

    if kw.confidence >= 0.9 {
        return EngineOutcome {
            result: kw,
            method: Method::Keyword,
            fallback_chain,
            related_ingredients: Vec::new(),
            category: None,
        };
    }

    let hits = store.search(name, settings.rag_top_k, embedder);
    let rag = analyze_rag_evidence(&hits);
    let related = related_ingredients(&hits);
    let category = hits.first().map(|h| h.category.clone());
    fallback_chain.push(format!("rag:{:.2}", rag.confidence));

    if rag.is_vegetarian.is_some() && rag.confidence >= settings.confidence_threshold {
        return EngineOutcome {
            result: rag,
            method: Method::Rag,
            fallback_chain,
            related_ingredients: related,
            category,
        };
    }

    let llm_result = llm_classify_single(name, &hits, provider).await;
    fallback_chain.push(format!("llm:{:.2}", llm_result.confidence));

    let llm_failed = llm_result.confidence == 0.0 || llm_result.is_vegetarian.is_none();
    if llm_failed {
        fallback_chain.push("fallback_to_rag".to_string());
    }

    let combined = combine_results(&[
        WeightedTier { label: "keyword", result: &kw, weight: 0.4 },
        WeightedTier { label: "rag", result: &rag, weight: 0.3 },
        WeightedTier { label: "llm", result: &llm_result, weight: 0.3 },
    ]);

    EngineOutcome {
        result: combined,
        method: Method::Combined,
        fallback_chain,
        related_ingredients: related,
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_ignores_tiers_with_no_opinion() {
        let kw = TierResult::none();
        let rag = TierResult { is_vegetarian: Some(true), confidence: 0.7, reasoning: "rag says veg".into(), evidence: vec![] };
        let llm_result = TierResult { is_vegetarian: Some(true), confidence: 0.8, reasoning: "llm says veg".into(), evidence: vec![] };
        let combined = combine_results(&[
            WeightedTier { label: "keyword", result: &kw, weight: 0.4 },
            WeightedTier { label: "rag", result: &rag, weight: 0.3 },
            WeightedTier { label: "llm", result: &llm_result, weight: 0.3 },
        ]);
        assert_eq!(combined.is_vegetarian, Some(true));
    }

    #[test]
    fn combine_with_no_opinions_returns_none() {
        let kw = TierResult::none();
        let rag = TierResult::none();
        let combined = combine_results(&[
            WeightedTier { label: "keyword", result: &kw, weight: 0.4 },
            WeightedTier { label: "rag", result: &rag, weight: 0.3 },
        ]);
        assert_eq!(combined.is_vegetarian, None);
        assert_eq!(combined.confidence, 0.0);
    }

    #[test]
    fn analyze_rag_evidence_ignores_low_relevance_hits() {
        let hits = vec![RagHit {
            id: "ingredient:tofu".into(),
            name: "tofu".into(),
            is_vegetarian: true,
            category: "protein".into(),
            kind: EntryKind::Ingredient,
            document: "tofu: soybean curd".into(),
            relevance: 0.1,
        }];
        let r = analyze_rag_evidence(&hits);
        assert_eq!(r.is_vegetarian, None);
    }

    #[test]
    fn analyze_rag_evidence_picks_majority_side() {
        let hits = vec![
            RagHit { id: "a".into(), name: "tofu".into(), is_vegetarian: true, category: "protein".into(), kind: EntryKind::Ingredient, document: "".into(), relevance: 0.8 },
            RagHit { id: "b".into(), name: "beef".into(), is_vegetarian: false, category: "meat".into(), kind: EntryKind::Ingredient, document: "".into(), relevance: 0.4 },
        ];
        let r = analyze_rag_evidence(&hits);
        assert_eq!(r.is_vegetarian, Some(true));
    }

    #[test]
    fn related_ingredients_caps_at_three_and_skips_dishes() {
        let hits = vec![
            RagHit { id: "a".into(), name: "tofu".into(), is_vegetarian: true, category: "".into(), kind: EntryKind::Ingredient, document: "".into(), relevance: 0.9 },
            RagHit { id: "b".into(), name: "pho".into(), is_vegetarian: false, category: "".into(), kind: EntryKind::Dish, document: "".into(), relevance: 0.8 },
            RagHit { id: "c".into(), name: "lentils".into(), is_vegetarian: true, category: "".into(), kind: EntryKind::Ingredient, document: "".into(), relevance: 0.7 },
        ];
        let related = related_ingredients(&hits);
        assert_eq!(related, vec!["tofu".to_string(), "lentils".to_string()]);
    }
}
