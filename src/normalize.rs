use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::record::{CanonicalRecord, Field};

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:₹|\$|€|£|¥|Rs\.?|INR)?\s*(.*?)\s*$").unwrap());

/// "Key Ingredients" → "key_ingredients".
pub fn canonical_key(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "_")
}

/// Map a flat raw record onto the canonical schema.
///
/// Never fails: unparseable prices become `None`, absent fields stay null or
/// empty, unknown keys are kept in `extra`. When two raw keys collapse to the
/// same canonical key the later one wins.
pub fn normalize(raw: &Map<String, Value>) -> CanonicalRecord {
    let mut record = CanonicalRecord::default();

    for (key, value) in raw {
        let key = canonical_key(key);
        let Some(field) = Field::from_key(&key) else {
            record.extra.insert(key, value.clone());
            continue;
        };
        match field {
            Field::ProductName => record.product_name = text_value(value),
            Field::Concentration => record.concentration = text_value(value),
            Field::SkinType => record.skin_type = list_value(value),
            Field::KeyIngredients => record.key_ingredients = list_value(value),
            Field::Benefits => record.benefits = text_value(value),
            Field::HowToUse => record.how_to_use = text_value(value),
            Field::SideEffects => record.side_effects = text_value(value),
            Field::Price => record.price = price_value(value),
        }
    }

    record
}

/// Split a comma-delimited string into trimmed segments.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(|part| part.trim().to_string()).collect()
}

/// Parse a price string such as "₹699", "$ 12.50" or "699". Non-finite values
/// and anything with stray characters (thousands separators included) yield `None`.
pub fn parse_price(s: &str) -> Option<f64> {
    let caps = PRICE_RE.captures(s)?;
    caps[1].parse::<f64>().ok().filter(|p| p.is_finite())
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn list_value(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => split_list(s),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

fn price_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|p| p.is_finite()),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

// ── Tests ──
