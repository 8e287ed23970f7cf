use serde::Serialize;
use tracing::debug;

use crate::questions::QuestionSet;
use crate::record::CanonicalRecord;
use crate::template::{render, OutputMapping, Scope, TemplateError, DEFAULT_BINDING};
use crate::templates::{DocumentKind, Templates};

/// Questions the FAQ receives unless configured otherwise.
pub const DEFAULT_FAQ_LIMIT: usize = 10;

/// Extra binding name for the comparison fixture, usable as `"with": "$product_b"`.
pub const PRODUCT_B_BINDING: &str = "product_b";

/// The three rendered documents of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Documents {
    pub faq: OutputMapping,
    pub product_page: OutputMapping,
    pub comparison: OutputMapping,
}

impl Documents {
    pub fn get(&self, kind: DocumentKind) -> &OutputMapping {
        match kind {
            DocumentKind::Faq => &self.faq,
            DocumentKind::ProductPage => &self.product_page,
            DocumentKind::Comparison => &self.comparison,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assembler {
    templates: Templates,
    faq_limit: usize,
}

impl Assembler {
    /// Fails if the FAQ or product description needs a record binding: only
    /// the comparison render is given one.
    pub fn new(templates: Templates) -> Result<Self, TemplateError> {
        for kind in [DocumentKind::Faq, DocumentKind::ProductPage] {
            if let Some(name) = templates.get(kind).flags().bindings.first() {
                return Err(TemplateError::UnboundRecord(format!("{} (in {})", name, kind.name())));
            }
        }
        Ok(Assembler {
            templates,
            faq_limit: DEFAULT_FAQ_LIMIT,
        })
    }

    pub fn with_faq_limit(mut self, limit: usize) -> Self {
        self.faq_limit = limit;
        self
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Render the FAQ, product page and comparison for one record.
    ///
    /// `record` and `questions` are only read. A failure in any document
    /// aborts the whole assembly.
    pub fn assemble(
        &self,
        record: &CanonicalRecord,
        questions: &QuestionSet,
    ) -> Result<Documents, TemplateError> {
        let faq = render(
            &self.templates.faq,
            &Scope::new(record).questions(questions.first(self.faq_limit)),
        )?;
        debug!(document = "faq", fields = faq.len(), "Rendered");

        let product_page = render(
            &self.templates.product_page,
            &Scope::new(record).questions(questions.as_slice()),
        )?;
        debug!(document = "product_page", fields = product_page.len(), "Rendered");

        let comparison = self.comparison(record)?;
        debug!(document = "comparison", fields = comparison.len(), "Rendered");

        Ok(Documents {
            faq,
            product_page,
            comparison,
        })
    }

    fn comparison(&self, record: &CanonicalRecord) -> Result<OutputMapping, TemplateError> {
        let fixture = product_b();
        let bindings = [(DEFAULT_BINDING, &fixture), (PRODUCT_B_BINDING, &fixture)];
        let mut out = render(&self.templates.comparison, &Scope::new(record).bindings(&bindings))?;
        out.insert(PRODUCT_B_BINDING.to_string(), fixture.to_value()?);
        Ok(out)
    }
}

/// Fictional second product used for comparison content. Always the same
/// values, independent of the record being compared.
pub fn product_b() -> CanonicalRecord {
    CanonicalRecord {
        product_name: Some("RadiantBlend Vitamin C Concentrate".into()),
        concentration: Some("12% Vitamin C".into()),
        skin_type: vec!["Dry".into(), "Combination".into()],
        key_ingredients: vec!["Vitamin C".into(), "Niacinamide".into()],
        benefits: Some("Brightening, Hydration".into()),
        how_to_use: Some("Apply at night".into()),
        side_effects: Some("None commonly reported".into()),
        price: Some(899.0),
        ..Default::default()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::generate;
    use crate::template::compile;
    use serde_json::json;

    fn serum() -> CanonicalRecord {
        CanonicalRecord {
            product_name: Some("GlowBoost Vitamin C Serum".into()),
            key_ingredients: vec!["Vitamin C".into(), "Hyaluronic Acid".into()],
            price: Some(699.0),
            ..Default::default()
        }
    }

    fn assembler() -> Assembler {
        Assembler::new(Templates::builtin().unwrap()).unwrap()
    }

    #[test]
    fn faq_gets_prefix_product_gets_all() {
        let r = serum();
        let qs = generate(&r);
        let docs = assembler().assemble(&r, &qs).unwrap();
        assert_eq!(docs.faq["title"], "FAQ - GlowBoost Vitamin C Serum");
        assert_eq!(docs.faq["questions"].as_array().unwrap().len(), 10);
        assert_eq!(docs.product_page["questions"].as_array().unwrap().len(), qs.len());
        assert_eq!(docs.product_page["price"], "699.0");
    }

    #[test]
    fn faq_limit_configurable() {
        let r = serum();
        let qs = generate(&r);
        let docs = assembler().with_faq_limit(3).assemble(&r, &qs).unwrap();
        assert_eq!(docs.faq["questions"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn comparison_has_fixture() {
        let r = serum();
        let docs = assembler().assemble(&r, &generate(&r)).unwrap();
        assert_eq!(docs.comparison["title"], "Comparison");
        assert_eq!(docs.comparison["compare"]["common"], json!(["vitamin c"]));
        assert_eq!(docs.comparison["compare"]["only_a"], json!(["hyaluronic acid"]));
        assert_eq!(docs.comparison["compare"]["only_b"], json!(["niacinamide"]));
        assert_eq!(docs.comparison["product_b"], product_b().to_value().unwrap());
    }

    #[test]
    fn shared_template_untouched() {
        let a = assembler();
        let before = a.templates().comparison.clone();
        let r = serum();
        a.assemble(&r, &generate(&r)).unwrap();
        assert_eq!(a.templates().comparison, before);
    }

    #[test]
    fn product_b_binding_name() {
        let mut templates = Templates::builtin().unwrap();
        templates.comparison = compile(&json!({
            "vs": {"block": "compare_ingredients_block", "with": "$product_b"},
        }))
        .unwrap();
        let r = serum();
        let docs = Assembler::new(templates).unwrap().assemble(&r, &generate(&r)).unwrap();
        assert_eq!(docs.comparison["vs"]["common"], json!(["vitamin c"]));
        assert!(docs.comparison.contains_key("product_b"));
    }

    #[test]
    fn bindings_outside_comparison_rejected() {
        let mut templates = Templates::builtin().unwrap();
        templates.faq = compile(&json!({"x": {"block": "compare_ingredients_block"}})).unwrap();
        assert!(matches!(Assembler::new(templates), Err(TemplateError::UnboundRecord(_))));
    }
}
