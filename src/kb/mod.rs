// SPDX-License-Identifier: BUSL-1.1
//! The static knowledge base: ingredients, dishes, and the three keyword
//! lists used by the keyword tier. Immutable for the process lifetime.

use std::collections::HashSet;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Ingredient,
    Dish,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Ingredient => "ingredient",
            EntryKind::Dish => "dish",
        }
    }
}

#[derive(Debug, Clone)]
pub struct KbEntry {
    pub name: &'static str,
    pub is_vegetarian: bool,
    pub category: &'static str,
    pub description: &'static str,
    pub notes: &'static str,
    pub kind: EntryKind,
}

impl KbEntry {
    /// `"${name}: ${description}"`, the text embedded for RAG retrieval.
    pub fn document(&self) -> String {
        format!("{}: {}", self.name, self.description)
    }

    /// Identity derived from kind + slugified name, e.g. `ingredient:black-beans`.
    pub fn id(&self) -> String {
        format!("{}:{}", self.kind.as_str(), slugify(self.name))
    }
}

pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

#[derive(Debug, Clone)]
pub struct KeywordSets {
    pub positive: HashSet<String>,
    pub negative: HashSet<String>,
    pub markers: HashSet<String>,
}

#[derive(Debug)]
pub struct KnowledgeBase {
    pub ingredients: Vec<KbEntry>,
    pub dishes: Vec<KbEntry>,
    pub keywords: KeywordSets,
}

impl KnowledgeBase {
    pub fn entries(&self) -> impl Iterator<Item = &KbEntry> {
        self.ingredients.iter().chain(self.dishes.iter())
    }
}

macro_rules! entry {
    ($kind:expr, $name:expr, $veg:expr, $cat:expr, $desc:expr, $notes:expr) => {
        KbEntry {
            name: $name,
            is_vegetarian: $veg,
            category: $cat,
            description: $desc,
            notes: $notes,
            kind: $kind,
        }
    };
}

fn ingredients() -> Vec<KbEntry> {
    use EntryKind::Ingredient as I;
    vec![
        entry!(I, "tofu", true, "protein", "Soybean curd, plant-based protein source", "Vegan protein alternative"),
        entry!(I, "tempeh", true, "protein", "Fermented soybean product, Indonesian origin", "High protein vegan option"),
        entry!(I, "seitan", true, "protein", "Wheat gluten meat substitute", "Also called wheat meat"),
        entry!(I, "paneer", true, "dairy", "Indian fresh cheese, non-melting", "Vegetarian but not vegan"),
        entry!(I, "halloumi", true, "dairy", "Cypriot cheese that can be grilled", "Check for animal rennet"),
        entry!(I, "mushroom", true, "vegetable", "Fungi, various varieties including portobello, shiitake", "Common meat substitute"),
        entry!(I, "lentils", true, "legume", "Lens-shaped legumes, high protein", "Red, green, brown varieties"),
        entry!(I, "chickpeas", true, "legume", "Garbanzo beans, used in hummus and falafel", "High fiber and protein"),
        entry!(I, "black beans", true, "legume", "Common in Latin American cuisine", "Good protein source"),
        entry!(I, "quinoa", true, "grain", "Protein-rich seed often used as grain", "Complete protein"),
        entry!(I, "falafel", true, "prepared", "Fried chickpea or fava bean balls", "Middle Eastern vegetarian staple"),
        entry!(I, "hummus", true, "prepared", "Chickpea and tahini spread", "Vegan dip"),
        entry!(I, "cheese", true, "dairy", "Dairy product from milk", "Some use animal rennet - check if strict"),
        entry!(I, "eggs", true, "dairy", "Chicken eggs, used in many dishes", "Vegetarian but not vegan"),
        entry!(I, "butter", true, "dairy", "Dairy fat product", "Vegetarian but not vegan"),
        entry!(I, "jackfruit", true, "fruit", "Tropical fruit used as meat substitute when unripe", "Shredded texture similar to pulled pork"),
        entry!(I, "eggplant", true, "vegetable", "Aubergine, used in many cuisines", "Meaty texture when cooked"),
        entry!(I, "cauliflower", true, "vegetable", "Cruciferous vegetable, versatile", "Popular meat substitute"),
        entry!(I, "zucchini", true, "vegetable", "Summer squash, courgette", "Used in vegetarian dishes"),
        entry!(I, "spinach", true, "vegetable", "Leafy green vegetable", "High in iron"),
        entry!(I, "chicken", false, "meat", "Poultry meat", "Common meat, not vegetarian"),
        entry!(I, "beef", false, "meat", "Cattle meat", "Red meat, not vegetarian"),
        entry!(I, "pork", false, "meat", "Pig meat", "Not vegetarian"),
        entry!(I, "bacon", false, "meat", "Cured pork belly or back", "Often hidden in dishes"),
        entry!(I, "ham", false, "meat", "Cured pork leg", "Not vegetarian"),
        entry!(I, "lamb", false, "meat", "Young sheep meat", "Not vegetarian"),
        entry!(I, "duck", false, "meat", "Waterfowl meat", "Not vegetarian"),
        entry!(I, "turkey", false, "meat", "Poultry meat", "Not vegetarian"),
        entry!(I, "fish", false, "seafood", "Various fish species", "Not vegetarian (pescatarian only)"),
        entry!(I, "salmon", false, "seafood", "Fatty fish, pink flesh", "Not vegetarian"),
        entry!(I, "tuna", false, "seafood", "Large ocean fish", "Not vegetarian"),
        entry!(I, "shrimp", false, "seafood", "Crustacean shellfish", "Not vegetarian"),
        entry!(I, "crab", false, "seafood", "Crustacean shellfish", "Not vegetarian"),
        entry!(I, "lobster", false, "seafood", "Large crustacean", "Not vegetarian"),
        entry!(I, "anchovies", false, "seafood", "Small oily fish, often in sauces", "Hidden in Caesar dressing and Worcestershire"),
        entry!(I, "fish sauce", false, "condiment", "Fermented fish condiment", "Common in Thai/Vietnamese cuisine, hidden ingredient"),
        entry!(I, "oyster sauce", false, "condiment", "Sauce made from oyster extracts", "Common in Asian stir-fries"),
        entry!(I, "gelatin", false, "additive", "Derived from animal collagen", "In desserts, gummies, some yogurts"),
        entry!(I, "lard", false, "fat", "Rendered pig fat", "Used in some pastries and refried beans"),
        entry!(I, "bone broth", false, "liquid", "Stock made from animal bones", "Base for many soups"),
        entry!(I, "worcestershire sauce", false, "condiment", "Fermented sauce containing anchovies", "Hidden in many dishes"),
    ]
}

fn dishes() -> Vec<KbEntry> {
    use EntryKind::Dish as D;
    vec![
        entry!(D, "margherita pizza", true, "italian", "Pizza with tomato, mozzarella, and basil", "Classic vegetarian option"),
        entry!(D, "vegetable stir fry", true, "asian", "Mixed vegetables cooked in wok", "Check for oyster sauce"),
        entry!(D, "greek salad", true, "salad", "Tomatoes, cucumber, olives, feta cheese", "Traditional vegetarian salad"),
        entry!(D, "caprese salad", true, "salad", "Tomatoes, mozzarella, basil", "Italian vegetarian starter"),
        entry!(D, "veggie burger", true, "american", "Plant-based burger patty", "Check if bun contains animal products"),
        entry!(D, "mushroom risotto", true, "italian", "Creamy rice dish with mushrooms", "Check stock is vegetable-based"),
        entry!(D, "palak paneer", true, "indian", "Spinach curry with paneer cheese", "Classic Indian vegetarian"),
        entry!(D, "dal", true, "indian", "Lentil curry/soup", "Vegetarian protein staple"),
        entry!(D, "falafel wrap", true, "middle_eastern", "Falafel in pita with vegetables", "Vegan option"),
        entry!(D, "pasta primavera", true, "italian", "Pasta with spring vegetables", "Usually vegetarian"),
        entry!(D, "cheese quesadilla", true, "mexican", "Tortilla with melted cheese", "Vegetarian"),
        entry!(D, "vegetable curry", true, "indian", "Mixed vegetables in curry sauce", "Vegetarian option"),
        entry!(D, "garden salad", true, "salad", "Mixed greens with vegetables", "Check dressing ingredients"),
        entry!(D, "caesar salad", false, "salad", "Romaine lettuce with caesar dressing", "Traditional dressing contains anchovies"),
        entry!(D, "pad thai", false, "thai", "Rice noodles with tamarind sauce", "Usually contains fish sauce and dried shrimp"),
        entry!(D, "chicken wings", false, "american", "Fried or baked chicken wings", "Meat dish"),
        entry!(D, "beef burger", false, "american", "Ground beef patty in bun", "Meat dish"),
        entry!(D, "fish and chips", false, "british", "Battered fish with fries", "Seafood dish"),
        entry!(D, "pepperoni pizza", false, "italian", "Pizza with pepperoni (cured pork/beef)", "Contains meat"),
        entry!(D, "tom yum soup", false, "thai", "Hot and sour Thai soup", "Usually contains shrimp and fish sauce"),
        entry!(D, "pho", false, "vietnamese", "Vietnamese noodle soup", "Usually beef or chicken broth base"),
        entry!(D, "ramen", false, "japanese", "Japanese noodle soup", "Usually pork or chicken broth, contains chashu"),
        entry!(D, "sushi roll", false, "japanese", "Rice and fish wrapped in seaweed", "Contains raw fish unless specified vegetable"),
        entry!(D, "carbonara", false, "italian", "Pasta with egg, cheese, and pancetta", "Contains pork (pancetta/guanciale)"),
        entry!(D, "french onion soup", false, "french", "Caramelized onion soup with cheese", "Usually made with beef broth"),
    ]
}

fn keyword_sets() -> KeywordSets {
    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_lowercase()).collect()
    }

    KeywordSets {
        positive: set(&[
            "vegetarian", "veggie", "vegan", "plant-based", "meatless",
            "meat-free", "tofu", "tempeh", "seitan", "falafel", "hummus",
            "🌱", "🥬", "🥕",
        ]),
        markers: set(&["(v)", "[v]", "(vg)", "[vg]", "(vegan)", "(vegetarian)"]),
        negative: set(&[
            "chicken", "beef", "pork", "lamb", "duck", "turkey",
            "fish", "salmon", "tuna", "shrimp", "crab", "lobster",
            "bacon", "ham", "sausage", "pepperoni", "prosciutto",
            "anchovy", "anchovies", "oyster", "mussel", "clam",
            "caesar",
        ]),
    }
}

static KB: OnceLock<KnowledgeBase> = OnceLock::new();

/// The process-wide knowledge base, built once on first access.
pub fn knowledge_base() -> &'static KnowledgeBase {
    KB.get_or_init(|| KnowledgeBase {
        ingredients: ingredients(),
        dishes: dishes(),
        keywords: keyword_sets(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kb_has_both_ingredients_and_dishes() {
        let kb = knowledge_base();
        assert!(!kb.ingredients.is_empty());
        assert!(!kb.dishes.is_empty());
    }

    #[test]
    fn caesar_salad_is_non_vegetarian() {
        let kb = knowledge_base();
        let caesar = kb.dishes.iter().find(|d| d.name == "caesar salad").unwrap();
        assert!(!caesar.is_vegetarian);
    }

    #[test]
    fn document_formats_name_and_description() {
        let kb = knowledge_base();
        let tofu = kb.ingredients.iter().find(|i| i.name == "tofu").unwrap();
        assert_eq!(tofu.document(), "tofu: Soybean curd, plant-based protein source");
    }

    #[test]
    fn id_is_stable_and_slugified() {
        let entry = KbEntry {
            name: "Black Beans",
            is_vegetarian: true,
            category: "legume",
            description: "",
            notes: "",
            kind: EntryKind::Ingredient,
        };
        assert_eq!(entry.id(), "ingredient:black-beans");
    }
}
