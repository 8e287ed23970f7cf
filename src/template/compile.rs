use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::ast::{Node, RecordRef, Segment, Template, DEFAULT_BINDING};
use super::error::TemplateError;
use crate::blocks::BlockId;
use crate::normalize::normalize;
use crate::record::Field;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{model\.([a-z_]+)\}\}").unwrap());

const QUESTIONS_SENTINEL: &str = "questions";

/// Compile a JSON template description. Unknown blocks, unknown placeholder
/// fields and malformed directives are rejected here, before any render.
pub fn compile(description: &Value) -> Result<Template, TemplateError> {
    let Value::Object(map) = description else {
        return Err(TemplateError::NotAMapping);
    };
    Ok(Template {
        fields: compile_fields(map, "")?,
    })
}

pub fn compile_str(source: &str) -> Result<Template, TemplateError> {
    let description: Value = serde_json::from_str(source)?;
    compile(&description)
}

fn compile_fields(
    map: &Map<String, Value>,
    path: &str,
) -> Result<Vec<(String, Node)>, TemplateError> {
    map.iter()
        .map(|(key, value)| {
            let child_path = if path.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", path, key)
            };
            Ok((key.clone(), compile_node(value, &child_path)?))
        })
        .collect()
}

fn compile_node(value: &Value, path: &str) -> Result<Node, TemplateError> {
    match value {
        Value::String(s) if PLACEHOLDER_RE.is_match(s) => Ok(Node::Interpolation(segments(s)?)),
        Value::String(s) if s == QUESTIONS_SENTINEL => Ok(Node::QuestionsRef),
        Value::Object(map) if map.contains_key("block") => compile_directive(map, path),
        Value::Object(map) => Ok(Node::Group(compile_fields(map, path)?)),
        other => Ok(Node::Literal(other.clone())),
    }
}

/// Split text into literal runs and placeholders.
fn segments(s: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut out = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(s) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let name = &caps[1];
        let field = Field::from_key(name)
            .ok_or_else(|| TemplateError::UnknownField(name.to_string()))?;
        if whole.start() > last {
            out.push(Segment::Text(s[last..whole.start()].to_string()));
        }
        out.push(Segment::Field(field));
        last = whole.end();
    }
    if last < s.len() {
        out.push(Segment::Text(s[last..].to_string()));
    }

    Ok(out)
}

fn compile_directive(map: &Map<String, Value>, path: &str) -> Result<Node, TemplateError> {
    let name = map
        .get("block")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(path, "`block` must be a string"))?;
    let block: BlockId = name.parse().map_err(TemplateError::UnknownBlock)?;
    let with = map.get("with").filter(|w| !w.is_null());

    if !block.takes_second_record() {
        if with.is_some() {
            return Err(TemplateError::UnexpectedArgument(block.name().to_string()));
        }
        return Ok(Node::BlockCall { block, with: None });
    }

    let source = match with {
        None => RecordRef::Bound(DEFAULT_BINDING.to_string()),
        Some(Value::String(s)) => match s.strip_prefix('$') {
            Some(binding) if !binding.is_empty() => RecordRef::Bound(binding.to_string()),
            _ => return Err(invalid(path, "`with` must be \"$<binding>\" or a record object")),
        },
        Some(Value::Object(raw)) => RecordRef::Inline(Box::new(normalize(raw))),
        Some(_) => return Err(invalid(path, "`with` must be \"$<binding>\" or a record object")),
    };

    Ok(Node::BlockCall {
        block,
        with: Some(source),
    })
}

fn invalid(path: &str, reason: &str) -> TemplateError {
    TemplateError::InvalidDirective {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

// ── Tests ──
