use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized product record. Built once per run by `normalize`, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub product_name: Option<String>,
    pub concentration: Option<String>,
    pub skin_type: Vec<String>,
    pub key_ingredients: Vec<String>,
    pub benefits: Option<String>,
    pub how_to_use: Option<String>,
    pub side_effects: Option<String>,
    pub price: Option<f64>,
    /// Keys outside the canonical set, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The eight canonical fields, in record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ProductName,
    Concentration,
    SkinType,
    KeyIngredients,
    Benefits,
    HowToUse,
    SideEffects,
    Price,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::ProductName,
        Field::Concentration,
        Field::SkinType,
        Field::KeyIngredients,
        Field::Benefits,
        Field::HowToUse,
        Field::SideEffects,
        Field::Price,
    ];

    /// snake_case key as it appears in the record and in `{{model.<key>}}`.
    pub fn key(self) -> &'static str {
        match self {
            Field::ProductName => "product_name",
            Field::Concentration => "concentration",
            Field::SkinType => "skin_type",
            Field::KeyIngredients => "key_ingredients",
            Field::Benefits => "benefits",
            Field::HowToUse => "how_to_use",
            Field::SideEffects => "side_effects",
            Field::Price => "price",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl CanonicalRecord {
    /// Text form of a field for interpolation. `None` when the value is null.
    ///
    /// Lists are joined with ", " (an empty list renders as ""), prices keep
    /// their fractional part (`699.0`).
    pub fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::ProductName => self.product_name.clone(),
            Field::Concentration => self.concentration.clone(),
            Field::SkinType => Some(self.skin_type.join(", ")),
            Field::KeyIngredients => Some(self.key_ingredients.join(", ")),
            Field::Benefits => self.benefits.clone(),
            Field::HowToUse => self.how_to_use.clone(),
            Field::SideEffects => self.side_effects.clone(),
            Field::Price => self.price.map(|p| format!("{:?}", p)),
        }
    }

    /// Product name, or a neutral stand-in when the record has none.
    pub fn display_name(&self) -> &str {
        self.product_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("this product")
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

// ── Tests ──
