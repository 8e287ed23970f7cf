use serde::{Deserialize, Serialize};

use crate::record::CanonicalRecord;

/// Lower bound on the number of generated questions.
pub const MIN_QUESTIONS: usize = 15;

const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Informational,
    Usage,
    Safety,
    Purchase,
    Comparison,
    Other,
}

impl Category {
    /// Output order of the groups.
    pub const ORDER: [Category; 6] = [
        Category::Informational,
        Category::Usage,
        Category::Safety,
        Category::Purchase,
        Category::Comparison,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Informational => "Informational",
            Category::Usage => "Usage",
            Category::Safety => "Safety",
            Category::Purchase => "Purchase",
            Category::Comparison => "Comparison",
            Category::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub category: Category,
    pub answer_hint: String,
}

impl Question {
    fn new(
        category: Category,
        question: impl Into<String>,
        answer_hint: impl Into<String>,
    ) -> Self {
        Question {
            question: question.into(),
            category,
            answer_hint: answer_hint.into(),
        }
    }
}

/// Ordered questions, grouped contiguously by category in `Category::ORDER`.
///
/// Informational questions always come first, so any prefix taken with
/// [`QuestionSet::first`] leads with them and then walks the remaining groups
/// in order. Callers that need a shorter list slice it this way before
/// handing it to the resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QuestionSet(Vec<Question>);

impl QuestionSet {
    pub fn as_slice(&self) -> &[Question] {
        &self.0
    }

    /// The first `n` questions (all of them when fewer than `n` exist).
    pub fn first(&self, n: usize) -> &[Question] {
        &self.0[..n.min(self.0.len())]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.0.iter()
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Question> {
        self.0.iter().filter(move |q| q.category == category)
    }
}

/// Build the question list for a record. Pure and deterministic.
pub fn generate(record: &CanonicalRecord) -> QuestionSet {
    let name = record.display_name();
    let mut questions = Vec::with_capacity(MIN_QUESTIONS);

    for category in Category::ORDER {
        questions.extend(questions_for(category, record, name));
    }

    pad_to_minimum(&mut questions, MIN_QUESTIONS);
    QuestionSet(questions)
}

fn questions_for(category: Category, r: &CanonicalRecord, name: &str) -> Vec<Question> {
    use Category::*;

    match category {
        Informational => vec![
            Question::new(
                Informational,
                format!("What is {}?", name),
                format!("{} with {}.", name, or_fallback(r.concentration.as_deref())),
            ),
            Question::new(
                Informational,
                "What are the key ingredients?",
                join_or_fallback(&r.key_ingredients),
            ),
            Question::new(
                Informational,
                "What benefits can I expect?",
                or_fallback(r.benefits.as_deref()),
            ),
            Question::new(
                Informational,
                "Will it help fade dark spots?",
                "Designed to help fade dark spots",
            ),
            Question::new(
                Informational,
                "What skin types is this for?",
                join_or_fallback(&r.skin_type),
            ),
            Question::new(
                Informational,
                "How soon will I see results?",
                "Results may vary; visible improvement over weeks",
            ),
        ],
        Usage => vec![
            Question::new(Usage, "How do I use it?", or_fallback(r.how_to_use.as_deref())),
            Question::new(
                Usage,
                "When should I apply this product?",
                "In the morning before sunscreen",
            ),
            Question::new(Usage, "How much should I apply?", "2-3 drops"),
        ],
        Safety => vec![
            Question::new(
                Safety,
                "Are there any side effects?",
                or_fallback(r.side_effects.as_deref()),
            ),
            Question::new(
                Safety,
                "Is this safe for sensitive skin?",
                "Patch test first; sensitive skin may notice mild tingling",
            ),
            Question::new(
                Safety,
                "Can I use it with other actives (retinol/acid)?",
                "Use caution with strong actives",
            ),
        ],
        Purchase => vec![
            Question::new(Purchase, "How much does it cost?", format_price(r.price)),
            Question::new(Purchase, "Where can I buy it?", "Available from listed retailers"),
        ],
        Comparison => vec![Question::new(
            Comparison,
            format!("How does {} compare to similar products?", name),
            comparison_hint(r),
        )],
        Other => Vec::new(),
    }
}

/// Append `Other` placeholders until `questions` holds at least `min` entries.
pub fn pad_to_minimum(questions: &mut Vec<Question>, min: usize) {
    while questions.len() < min {
        let n = questions.len() + 1;
        questions.push(Question::new(
            Category::Other,
            format!("Additional question {}", n),
            "",
        ));
    }
}

/// "₹699" for a price, "N/A" when unknown. Fractions are truncated.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("₹{}", p.trunc() as i64),
        None => "N/A".to_string(),
    }
}

fn comparison_hint(r: &CanonicalRecord) -> String {
    match (r.concentration.as_deref(), r.key_ingredients.is_empty()) {
        (Some(c), false) => format!("{} and includes {}", c, r.key_ingredients.join(", ")),
        (Some(c), true) => c.to_string(),
        (None, false) => format!("Includes {}", r.key_ingredients.join(", ")),
        (None, true) => NOT_SPECIFIED.to_string(),
    }
}

fn or_fallback(value: Option<&str>) -> String {
    value.unwrap_or(NOT_SPECIFIED).to_string()
}

fn join_or_fallback(items: &[String]) -> String {
    if items.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        items.join(", ")
    }
}

// ── Tests ──
