use serde_json::{json, Map, Value};
use tracing::debug;

use crate::assemble::{Assembler, Documents};
use crate::normalize::normalize;
use crate::questions::generate;
use crate::record::CanonicalRecord;
use crate::template::TemplateError;

/// Normalize → generate questions → assemble, in that order, once per record.
///
/// Holds only compiled, read-only configuration, so one pipeline can serve
/// any number of records, including from several threads at once.
#[derive(Debug, Clone)]
pub struct Pipeline {
    assembler: Assembler,
}

impl Pipeline {
    pub fn new(assembler: Assembler) -> Self {
        Pipeline { assembler }
    }

    pub fn run(&self, raw: &Map<String, Value>) -> Result<Documents, TemplateError> {
        self.run_record(raw).map(|(_, docs)| docs)
    }

    /// Like [`Pipeline::run`], also handing back the normalized record.
    pub fn run_record(
        &self,
        raw: &Map<String, Value>,
    ) -> Result<(CanonicalRecord, Documents), TemplateError> {
        let record = normalize(raw);
        debug!(product = record.display_name(), "Normalized record");

        let questions = generate(&record);
        debug!(count = questions.len(), "Generated questions");

        let docs = self.assembler.assemble(&record, &questions)?;
        Ok((record, docs))
    }
}

/// Reference input record used when no input file is given.
pub fn sample_input() -> Map<String, Value> {
    let sample = json!({
        "Product Name": "GlowBoost Vitamin C Serum",
        "Concentration": "10% Vitamin C",
        "Skin Type": "Oily, Combination",
        "Key Ingredients": "Vitamin C, Hyaluronic Acid",
        "Benefits": "Brightening, Fades dark spots",
        "How to Use": "Apply 2-3 drops in the morning before sunscreen",
        "Side Effects": "Mild tingling for sensitive skin",
        "Price": "₹699",
    });
    match sample {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ── Tests ──
