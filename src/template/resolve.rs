use serde_json::{Map, Value};

use super::ast::{Node, RecordRef, Segment, Template};
use super::error::TemplateError;
use crate::blocks::BlockFn;
use crate::questions::Question;
use crate::record::CanonicalRecord;

/// One rendered document.
pub type OutputMapping = Map<String, Value>;

/// Everything a single render call may read.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    record: &'a CanonicalRecord,
    questions: Option<&'a [Question]>,
    bindings: &'a [(&'a str, &'a CanonicalRecord)],
}

impl<'a> Scope<'a> {
    pub fn new(record: &'a CanonicalRecord) -> Self {
        Scope {
            record,
            questions: None,
            bindings: &[],
        }
    }

    /// Questions for the `"questions"` sentinel, already sliced by the caller.
    pub fn questions(mut self, questions: &'a [Question]) -> Self {
        self.questions = Some(questions);
        self
    }

    /// Named records that two-record blocks can refer to.
    pub fn bindings(mut self, bindings: &'a [(&'a str, &'a CanonicalRecord)]) -> Self {
        self.bindings = bindings;
        self
    }

    fn lookup(&self, name: &str) -> Option<&'a CanonicalRecord> {
        self.bindings.iter().find(|(n, _)| *n == name).map(|(_, r)| *r)
    }
}

/// Resolve every field of `template` against `scope`.
///
/// Fields resolve in description order, each exactly once; nothing is cached
/// between calls, so the same inputs always give the same output. Any error
/// aborts the whole document.
pub fn render(template: &Template, scope: &Scope<'_>) -> Result<OutputMapping, TemplateError> {
    resolve_fields(template.fields(), scope)
}

fn resolve_fields(
    fields: &[(String, Node)],
    scope: &Scope<'_>,
) -> Result<OutputMapping, TemplateError> {
    let mut out = Map::with_capacity(fields.len());
    for (key, node) in fields {
        out.insert(key.clone(), resolve(node, scope)?);
    }
    Ok(out)
}

fn resolve(node: &Node, scope: &Scope<'_>) -> Result<Value, TemplateError> {
    match node {
        Node::Literal(value) => Ok(value.clone()),
        Node::Interpolation(segments) => Ok(Value::String(interpolate(segments, scope.record))),
        Node::QuestionsRef => match scope.questions {
            Some(questions) => Ok(serde_json::to_value(questions)?),
            None => Ok(Value::String("questions".to_string())),
        },
        Node::BlockCall { block, with } => {
            let value = match (block.function(), with) {
                (BlockFn::Unary(f), _) => f(scope.record)?,
                (BlockFn::Binary(f), Some(source)) => {
                    f(scope.record, second_record(source, scope)?)?
                }
                (BlockFn::Binary(_), None) => {
                    return Err(TemplateError::UnboundRecord(block.name().to_string()))
                }
            };
            Ok(value)
        }
        Node::Group(children) => Ok(Value::Object(resolve_fields(children, scope)?)),
    }
}

fn second_record<'s>(
    source: &'s RecordRef,
    scope: &Scope<'s>,
) -> Result<&'s CanonicalRecord, TemplateError> {
    match source {
        RecordRef::Inline(record) => Ok(&**record),
        RecordRef::Bound(name) => scope
            .lookup(name)
            .ok_or_else(|| TemplateError::UnboundRecord(name.clone())),
    }
}

fn interpolate(segments: &[Segment], record: &CanonicalRecord) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Field(field) => {
                if let Some(text) = record.text(*field) {
                    out.push_str(&text);
                }
            }
        }
    }
    out
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::generate;
    use crate::template::compile::compile;
    use crate::template::ast::DEFAULT_BINDING;
    use serde_json::json;

    fn serum() -> CanonicalRecord {
        CanonicalRecord {
            product_name: Some("GlowBoost".into()),
            concentration: Some("10% Vitamin C".into()),
            key_ingredients: vec!["Vitamin C".into(), "Hyaluronic Acid".into()],
            price: Some(699.0),
            ..Default::default()
        }
    }

    fn rival() -> CanonicalRecord {
        CanonicalRecord {
            product_name: Some("Rival".into()),
            key_ingredients: vec!["Vitamin C".into(), "Niacinamide".into()],
            ..Default::default()
        }
    }

    #[test]
    fn interpolation_multiple_and_null() {
        let t = compile(&json!({
            "title": "{{model.product_name}} – {{model.concentration}} at {{model.price}}",
            "empty": "Uses: {{model.how_to_use}}.",
        }))
        .unwrap();
        let out = render(&t, &Scope::new(&serum())).unwrap();
        assert_eq!(out["title"], "GlowBoost – 10% Vitamin C at 699.0");
        assert_eq!(out["empty"], "Uses: .");
        assert!(!out["title"].as_str().unwrap().contains("{{"));
    }

    #[test]
    fn questions_sentinel() {
        let r = serum();
        let qs = generate(&r);
        let t = compile(&json!({"questions": "questions", "also": "questions"})).unwrap();

        let out = render(&t, &Scope::new(&r).questions(qs.first(3))).unwrap();
        assert_eq!(out["questions"].as_array().unwrap().len(), 3);
        assert_eq!(out["also"], out["questions"]);
        assert_eq!(out["questions"][0]["category"], "Informational");

        let bare = render(&t, &Scope::new(&r)).unwrap();
        assert_eq!(bare["questions"], "questions");
    }

    #[test]
    fn blocks_and_groups() {
        let t = compile(&json!({
            "page": {
                "name": "{{model.product_name}}",
                "ingredients": {"block": "ingredients_block"},
                "notes": ["{{model.price}}"],
            },
        }))
        .unwrap();
        let out = render(&t, &Scope::new(&serum())).unwrap();
        assert_eq!(out["page"]["name"], "GlowBoost");
        assert_eq!(
            out["page"]["ingredients"][0],
            json!({"ingredient": "Vitamin C", "role": "active"})
        );
        assert_eq!(out["page"]["notes"], json!(["{{model.price}}"]));
        let keys: Vec<&String> = out["page"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["name", "ingredients", "notes"]);
    }

    #[test]
    fn compare_with_binding() {
        let t = compile(&json!({"compare": {"block": "compare_ingredients_block"}})).unwrap();
        let (a, b) = (serum(), rival());
        let bindings = [(DEFAULT_BINDING, &b)];
        let out = render(&t, &Scope::new(&a).bindings(&bindings)).unwrap();
        assert_eq!(out["compare"]["common"], json!(["vitamin c"]));
        assert_eq!(out["compare"]["only_b"], json!(["niacinamide"]));
    }

    #[test]
    fn compare_with_inline_record() {
        let t = compile(&json!({
            "compare": {"block": "compare_ingredients_block", "with": {"Key Ingredients": "Retinol, Vitamin C"}},
        }))
        .unwrap();
        let out = render(&t, &Scope::new(&serum())).unwrap();
        assert_eq!(out["compare"]["common"], json!(["vitamin c"]));
        assert_eq!(out["compare"]["only_b"], json!(["retinol"]));
    }

    #[test]
    fn unbound_record_aborts() {
        let t = compile(&json!({
            "title": "ok",
            "compare": {"block": "compare_ingredients_block", "with": "$missing"},
        }))
        .unwrap();
        let err = render(&t, &Scope::new(&serum())).unwrap_err();
        assert!(matches!(err, TemplateError::UnboundRecord(name) if name == "missing"));
    }

    #[test]
    fn idempotent() {
        let r = serum();
        let qs = generate(&r);
        let b = rival();
        let bindings = [(DEFAULT_BINDING, &b)];
        let t = compile(&json!({
            "title": "FAQ - {{model.product_name}}",
            "benefits": {"block": "benefits_block"},
            "compare": {"block": "compare_ingredients_block"},
            "questions": "questions",
        }))
        .unwrap();
        let scope = Scope::new(&r).questions(qs.as_slice()).bindings(&bindings);
        let first = serde_json::to_string(&render(&t, &scope).unwrap()).unwrap();
        let second = serde_json::to_string(&render(&t, &scope).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
