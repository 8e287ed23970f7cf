use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;

use crate::record::CanonicalRecord;

/// Lower-cased ingredient names classified as "active".
const KNOWN_ACTIVES: &[&str] = &[
    "vitamin c",
    "hyaluronic acid",
    "niacinamide",
    "retinol",
    "salicylic acid",
];

const DOSAGE: &str = "2-3 drops";
const TIMING: &str = "Morning before sunscreen";
const DEFAULT_WARNINGS: &[&str] = &[
    "Patch test before use",
    "Discontinue use if irritation persists",
];

// ── Block outputs ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Benefits {
    pub summary: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Usage {
    pub how_to_use: Option<String>,
    pub dosage: String,
    pub timing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Safety {
    pub side_effects: Option<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Active,
    Support,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientEntry {
    pub ingredient: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientComparison {
    pub common: Vec<String>,
    pub only_a: Vec<String>,
    pub only_b: Vec<String>,
}

// ── Blocks ──

pub fn benefits_block(r: &CanonicalRecord) -> Benefits {
    let benefits = r.benefits.as_deref().unwrap_or("");
    Benefits {
        summary: format!("Provides {}.", benefits),
        bullets: benefits
            .split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(String::from)
            .collect(),
    }
}

pub fn usage_block(r: &CanonicalRecord) -> Usage {
    Usage {
        how_to_use: r.how_to_use.clone(),
        dosage: DOSAGE.to_string(),
        timing: TIMING.to_string(),
    }
}

pub fn safety_block(r: &CanonicalRecord) -> Safety {
    Safety {
        side_effects: r.side_effects.clone(),
        warnings: DEFAULT_WARNINGS.iter().map(|w| w.to_string()).collect(),
    }
}

pub fn ingredients_block(r: &CanonicalRecord) -> Vec<IngredientEntry> {
    r.key_ingredients
        .iter()
        .map(|i| IngredientEntry {
            ingredient: i.clone(),
            role: if is_known_active(i) {
                Role::Active
            } else {
                Role::Support
            },
        })
        .collect()
}

/// Intersection and differences of the two records' ingredient names.
///
/// Names are compared lower-cased and trimmed. Each list keeps the order in
/// which names first appear in its source record, without duplicates.
pub fn compare_ingredients_block(a: &CanonicalRecord, b: &CanonicalRecord) -> IngredientComparison {
    let a_names = ingredient_names(a);
    let b_names = ingredient_names(b);
    let a_set: HashSet<&str> = a_names.iter().map(String::as_str).collect();
    let b_set: HashSet<&str> = b_names.iter().map(String::as_str).collect();

    IngredientComparison {
        common: a_names.iter().filter(|n| b_set.contains(n.as_str())).cloned().collect(),
        only_a: a_names.iter().filter(|n| !b_set.contains(n.as_str())).cloned().collect(),
        only_b: b_names.iter().filter(|n| !a_set.contains(n.as_str())).cloned().collect(),
    }
}

pub fn is_known_active(ingredient: &str) -> bool {
    let name = ingredient.trim().to_lowercase();
    KNOWN_ACTIVES.contains(&name.as_str())
}

fn ingredient_names(r: &CanonicalRecord) -> Vec<String> {
    r.key_ingredients
        .iter()
        .map(|i| i.trim().to_lowercase())
        .filter(|i| !i.is_empty())
        .unique()
        .collect()
}

// ── Registry ──

/// Closed set of blocks a template can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockId {
    Benefits,
    Usage,
    Safety,
    Ingredients,
    CompareIngredients,
}

/// A block's entry point, already erased to JSON output.
#[derive(Clone, Copy)]
pub enum BlockFn {
    Unary(fn(&CanonicalRecord) -> Result<Value, serde_json::Error>),
    Binary(fn(&CanonicalRecord, &CanonicalRecord) -> Result<Value, serde_json::Error>),
}

impl BlockId {
    pub const ALL: [BlockId; 5] = [
        BlockId::Benefits,
        BlockId::Usage,
        BlockId::Safety,
        BlockId::Ingredients,
        BlockId::CompareIngredients,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlockId::Benefits => "benefits_block",
            BlockId::Usage => "usage_block",
            BlockId::Safety => "safety_block",
            BlockId::Ingredients => "ingredients_block",
            BlockId::CompareIngredients => "compare_ingredients_block",
        }
    }

    pub fn function(self) -> BlockFn {
        match self {
            BlockId::Benefits => {
                BlockFn::Unary(|r: &CanonicalRecord| serde_json::to_value(benefits_block(r)))
            }
            BlockId::Usage => {
                BlockFn::Unary(|r: &CanonicalRecord| serde_json::to_value(usage_block(r)))
            }
            BlockId::Safety => {
                BlockFn::Unary(|r: &CanonicalRecord| serde_json::to_value(safety_block(r)))
            }
            BlockId::Ingredients => {
                BlockFn::Unary(|r: &CanonicalRecord| serde_json::to_value(ingredients_block(r)))
            }
            BlockId::CompareIngredients => {
                BlockFn::Binary(|a: &CanonicalRecord, b: &CanonicalRecord| {
                    serde_json::to_value(compare_ingredients_block(a, b))
                })
            }
        }
    }

    pub fn takes_second_record(self) -> bool {
        matches!(self.function(), BlockFn::Binary(_))
    }
}

impl FromStr for BlockId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockId::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Tests ──
