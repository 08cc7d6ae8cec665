// SPDX-License-Identifier: BUSL-1.1
//! The calculator tool: sums vegetarian items, and deterministically
//! recomputes a result after human corrections arrive. Grounded on the
//! original `CalculatorTool.execute` / `recompute_with_corrections`.

use crate::types::{ClassifiedItem, Correction, Method};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CalculatorOutcome {
    pub total_sum: f64,
    pub item_count: usize,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum the price of every vegetarian, positively-priced item.
pub fn total(items: &[ClassifiedItem]) -> CalculatorOutcome {
    let vegetarian: Vec<&ClassifiedItem> = items
        .iter()
        .filter(|i| i.is_vegetarian == Some(true) && i.price > 0.0)
        .collect();

    let sum: f64 = vegetarian.iter().map(|i| i.price).sum();

    CalculatorOutcome {
        total_sum: round2(sum),
        item_count: vegetarian.len(),
    }
}

pub struct RecomputeOutcome {
    pub vegetarian_items: Vec<ClassifiedItem>,
    pub total_sum: f64,
    pub corrections_applied: usize,
}

/// Apply human corrections to a full item list and recompute the sum.
/// Corrected items get `confidence: 1.0` and `reasoning: "Human verified"`;
/// uncorrected items keep whatever classification they already had.
/// Matching is case-insensitive on dish name.
pub fn recompute_with_corrections(all_items: &[ClassifiedItem], corrections: &[Correction]) -> RecomputeOutcome {
    let correction_map: HashMap<String, bool> = corrections
        .iter()
        .map(|c| (c.name.to_lowercase(), c.is_vegetarian))
        .collect();

    let mut corrections_applied = 0;
    let mut updated: Vec<ClassifiedItem> = Vec::with_capacity(all_items.len());

    for item in all_items {
        let mut item = item.clone();
        if let Some(&is_veg) = correction_map.get(&item.name.to_lowercase()) {
            item.is_vegetarian = Some(is_veg);
            item.confidence = 1.0;
            item.reasoning = Some("Human verified".to_string());
            item.method = Method::Combined;
            corrections_applied += 1;
        }
        updated.push(item);
    }

    let vegetarian_items: Vec<ClassifiedItem> = updated
        .iter()
        .filter(|i| i.is_vegetarian == Some(true))
        .cloned()
        .collect();

    let total_sum = round2(vegetarian_items.iter().filter(|i| i.price > 0.0).map(|i| i.price).sum());

    RecomputeOutcome { vegetarian_items, total_sum, corrections_applied }
}
