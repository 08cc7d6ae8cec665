// SPDX-License-Identifier: BUSL-1.1
//! Deterministic embedding generation.
//!
//! There is no model download here: embeddings are derived from a small set
//! of food/diet semantic categories mixed with a stable per-character hash,
//! the same trick the teacher's mock `EmbeddingGenerator` uses for its
//! generic topic categories. Same text in, same vector out, every time.

use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub dimension: usize,
    pub normalize: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: 64,
            normalize: true,
        }
    }
}

/// Semantic anchor categories. Each category owns a disjoint band of the
/// vector; a text's membership in a category nudges its band, so texts
/// sharing vocabulary end up closer under cosine distance.
const CATEGORIES: &[(&str, &[&str])] = &[
    ("plant_protein", &["tofu", "tempeh", "seitan", "lentil", "chickpea", "bean", "quinoa", "falafel", "hummus"]),
    ("dairy_egg", &["cheese", "paneer", "halloumi", "egg", "butter", "cream", "milk"]),
    ("meat", &["chicken", "beef", "pork", "lamb", "duck", "turkey", "bacon", "ham", "sausage", "pepperoni", "prosciutto"]),
    ("seafood", &["fish", "salmon", "tuna", "shrimp", "crab", "lobster", "anchov", "oyster", "mussel", "clam", "sushi"]),
    ("hidden_animal", &["gelatin", "lard", "broth", "worcestershire", "fish sauce", "oyster sauce"]),
    ("vegetable", &["mushroom", "eggplant", "cauliflower", "zucchini", "spinach", "vegetable", "jackfruit", "garden"]),
    ("marker_word", &["vegetarian", "veggie", "vegan", "plant-based", "meatless", "meat-free"]),
    ("cuisine", &["italian", "indian", "thai", "japanese", "mexican", "french", "vietnamese", "american", "british", "middle_eastern", "asian"]),
];

fn char_hash(text: &str) -> u64 {
    let mut h: u64 = 1469598103934665603;
    for b in text.bytes() {
        h ^= b as u64;
        h = h.wrapping_mul(1099511628211);
    }
    h
}

#[derive(Debug)]
pub struct EmbeddingGenerator {
    config: EmbeddingConfig,
}

impl EmbeddingGenerator {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Produce a deterministic embedding for `text`.
    pub fn generate(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let dim = self.config.dimension;
        let mut vec = vec![0.0f32; dim];

        // Base signal from a rolling hash of the whole string, spread across
        // every component so unrelated texts don't collide on all zeros.
        let base = char_hash(&lower);
        for (i, slot) in vec.iter_mut().enumerate() {
            let mixed = base.wrapping_add(i as u64).wrapping_mul(2654435761);
            *slot = ((mixed % 2000) as f32 / 1000.0) - 1.0;
        }

        // Category nudges: each matching category keyword pushes the text's
        // vector toward that category's reserved band.
        let band = dim / CATEGORIES.len().max(1);
        for (cat_idx, (_name, keywords)) in CATEGORIES.iter().enumerate() {
            let hits = keywords.iter().filter(|kw| lower.contains(*kw)).count();
            if hits == 0 {
                continue;
            }
            let weight = 1.5 * hits as f32;
            let start = cat_idx * band;
            let end = (start + band).min(dim);
            for slot in vec[start..end].iter_mut() {
                *slot += weight;
            }
        }

        if self.config.normalize {
            normalize(&mut vec);
        }
        vec
    }

    pub fn generate_batch(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.generate(t)).collect()
    }
}

fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

static GENERATOR: OnceLock<EmbeddingGenerator> = OnceLock::new();

/// Process-wide embedder, built once with the default configuration.
pub fn embedder() -> &'static EmbeddingGenerator {
    GENERATOR.get_or_init(|| EmbeddingGenerator::new(EmbeddingConfig::default()))
}
