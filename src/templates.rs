use std::path::Path;

use serde_json::{json, Value};
use tracing::info;

use crate::template::{compile, compile_str, Template, TemplateError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Faq,
    ProductPage,
    Comparison,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Faq,
        DocumentKind::ProductPage,
        DocumentKind::Comparison,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DocumentKind::Faq => "faq",
            DocumentKind::ProductPage => "product_page",
            DocumentKind::Comparison => "comparison",
        }
    }

    /// Override file looked up in a templates directory.
    pub fn template_file(self) -> &'static str {
        match self {
            DocumentKind::Faq => "faq.json",
            DocumentKind::ProductPage => "product_page.json",
            DocumentKind::Comparison => "comparison.json",
        }
    }

    /// File the rendered document is written to.
    pub fn output_file(self) -> &'static str {
        match self {
            DocumentKind::Faq => "faq.json",
            DocumentKind::ProductPage => "product_page.json",
            DocumentKind::Comparison => "comparison_page.json",
        }
    }

    pub fn builtin_description(self) -> Value {
        match self {
            DocumentKind::Faq => json!({
                "title": "FAQ - {{model.product_name}}",
                "questions": "questions",
            }),
            DocumentKind::ProductPage => json!({
                "name": "{{model.product_name}}",
                "price": "{{model.price}}",
                "concentration": "{{model.concentration}}",
                "ingredients": {"block": "ingredients_block"},
                "benefits": {"block": "benefits_block"},
                "usage": {"block": "usage_block"},
                "safety": {"block": "safety_block"},
                "questions": "questions",
            }),
            DocumentKind::Comparison => json!({
                "title": "Comparison",
                "compare": {"block": "compare_ingredients_block"},
            }),
        }
    }
}

/// The three compiled descriptions the assembler drives.
#[derive(Debug, Clone)]
pub struct Templates {
    pub faq: Template,
    pub product_page: Template,
    pub comparison: Template,
}

impl Templates {
    pub fn builtin() -> Result<Self, TemplateError> {
        Ok(Templates {
            faq: compile(&DocumentKind::Faq.builtin_description())?,
            product_page: compile(&DocumentKind::ProductPage.builtin_description())?,
            comparison: compile(&DocumentKind::Comparison.builtin_description())?,
        })
    }

    /// Built-ins, with any `<kind>.json` found in `dir` taking their place.
    pub fn load(dir: Option<&Path>) -> Result<Self, TemplateError> {
        let Some(dir) = dir else {
            info!("Using built-in templates");
            return Self::builtin();
        };
        Ok(Templates {
            faq: load_one(dir, DocumentKind::Faq)?,
            product_page: load_one(dir, DocumentKind::ProductPage)?,
            comparison: load_one(dir, DocumentKind::Comparison)?,
        })
    }

    pub fn get(&self, kind: DocumentKind) -> &Template {
        match kind {
            DocumentKind::Faq => &self.faq,
            DocumentKind::ProductPage => &self.product_page,
            DocumentKind::Comparison => &self.comparison,
        }
    }
}

fn load_one(dir: &Path, kind: DocumentKind) -> Result<Template, TemplateError> {
    let path = dir.join(kind.template_file());
    if !path.exists() {
        info!(document = kind.name(), "No override in {}, using built-in", dir.display());
        return compile(&kind.builtin_description());
    }
    let source = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
        path: path.clone(),
        source,
    })?;
    info!(document = kind.name(), "Loaded template from {}", path.display());
    compile_str(&source)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockId;

    #[test]
    fn builtins_compile() {
        let t = Templates::builtin().unwrap();
        assert!(t.faq.flags().uses_questions);
        assert_eq!(t.product_page.len(), 8);
        assert!(t.comparison.flags().blocks.contains(&BlockId::CompareIngredients));
    }

    #[test]
    fn overrides_from_directory() {
        let t = Templates::load(Some(Path::new("tests/fixtures/templates"))).unwrap();
        // faq.json is overridden, the rest fall back
        assert!(t.faq.field("subtitle").is_some());
        assert_eq!(t.product_page, Templates::builtin().unwrap().product_page);
    }

    #[test]
    fn broken_override_is_fatal() {
        let err = Templates::load(Some(Path::new("tests/fixtures/templates_broken"))).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownBlock(name) if name == "sparkle_block"));
    }
}
