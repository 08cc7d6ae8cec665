// SPDX-License-Identifier: BUSL-1.1
//! Keyword tier: the cheapest, fastest classifier. Looks for an explicit
//! marker like `(v)`, then a vegetarian keyword, then a non-vegetarian
//! keyword, in that order. Word-boundary matching so "hamburger" doesn't
//! trip on "ham".

use crate::kb::KeywordSets;
use crate::types::TierResult;
use regex::Regex;

fn word_boundary_match(haystack: &str, word: &str) -> bool {
    let pattern = format!(r"\b{}\b", regex::escape(word));
    Regex::new(&pattern)
        .map(|re| re.is_match(haystack))
        .unwrap_or(false)
}

/// Classify a dish name using only the static keyword sets. Never errors:
/// an unmatched name comes back as `TierResult::none()`.
pub fn classify(name: &str, keywords: &KeywordSets) -> TierResult {
    let lower = name.to_lowercase();

    for marker in &keywords.markers {
        if lower.contains(marker.as_str()) {
            return TierResult {
                is_vegetarian: Some(true),
                confidence: 0.95,
                reasoning: format!("Contains vegetarian marker: {marker}"),
                evidence: vec![marker.clone()],
            };
        }
    }

    for kw in &keywords.positive {
        if word_boundary_match(&lower, kw) {
            return TierResult {
                is_vegetarian: Some(true),
                confidence: 0.95,
                reasoning: format!("Contains vegetarian keyword: {kw}"),
                evidence: vec![kw.clone()],
            };
        }
    }

    for kw in &keywords.negative {
        if word_boundary_match(&lower, kw) {
            return TierResult {
                is_vegetarian: Some(false),
                confidence: 0.95,
                reasoning: format!("Contains non-vegetarian keyword: {kw}"),
                evidence: vec![kw.clone()],
            };
        }
    }

    TierResult {
        reasoning: "No keyword match".to_string(),
        ..TierResult::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::knowledge_base;

    #[test]
    fn marker_wins_over_everything() {
        let kb = knowledge_base();
        let r = classify("Chicken Curry (v)", &kb.keywords);
        assert_eq!(r.is_vegetarian, Some(true));
        assert!(r.confidence > 0.9);
    }

    #[test]
    fn positive_keyword_matches() {
        let kb = knowledge_base();
        let r = classify("Vegan Burger", &kb.keywords);
        assert_eq!(r.is_vegetarian, Some(true));
    }

    #[test]
    fn negative_keyword_matches() {
        let kb = knowledge_base();
        let r = classify("Grilled Chicken Breast", &kb.keywords);
        assert_eq!(r.is_vegetarian, Some(false));
    }

    #[test]
    fn word_boundary_avoids_false_positive() {
        // "ham" must not match inside "hamburger"
        let kb = knowledge_base();
        let r = classify("Hamburger Bun", &kb.keywords);
        assert_eq!(r.is_vegetarian, None);
    }

    #[test]
    fn no_match_returns_none() {
        let kb = knowledge_base();
        let r = classify("Mystery Plate", &kb.keywords);
        assert_eq!(r.is_vegetarian, None);
        assert_eq!(r.confidence, 0.0);
    }
}
