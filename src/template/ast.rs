use serde_json::Value;

use crate::blocks::BlockId;
use crate::record::{CanonicalRecord, Field};

/// Binding name a two-record block reads when its directive has no `with`.
pub const DEFAULT_BINDING: &str = "compare_with";

/// One compiled node of a template description.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Emitted as-is.
    Literal(Value),
    /// Text with `{{model.<field>}}` placeholders.
    Interpolation(Vec<Segment>),
    /// The `"questions"` sentinel.
    QuestionsRef,
    BlockCall {
        block: BlockId,
        /// Second record source; only set for two-record blocks.
        with: Option<RecordRef>,
    },
    /// Nested mapping, resolved field by field in order.
    Group(Vec<(String, Node)>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Field(Field),
}

/// Where a two-record block gets its second record from.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordRef {
    /// Supplied by the caller at render time under this name.
    Bound(String),
    /// Written into the description itself.
    Inline(Box<CanonicalRecord>),
}

/// A compiled template description: an ordered set of top-level fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub(crate) fields: Vec<(String, Node)>,
}

/// What a template needs from its caller, found by walking the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateFlags {
    pub uses_questions: bool,
    pub blocks: Vec<BlockId>,
    pub bindings: Vec<String>,
}

impl Template {
    pub fn fields(&self) -> &[(String, Node)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Node> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, n)| n)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn flags(&self) -> TemplateFlags {
        let mut flags = TemplateFlags::default();
        scan_nodes(&self.fields, &mut flags);
        flags
    }
}

fn scan_nodes(nodes: &[(String, Node)], flags: &mut TemplateFlags) {
    for (_, node) in nodes {
        match node {
            Node::QuestionsRef => flags.uses_questions = true,
            Node::BlockCall { block, with } => {
                if !flags.blocks.contains(block) {
                    flags.blocks.push(*block);
                }
                if let Some(RecordRef::Bound(name)) = with {
                    if !flags.bindings.contains(name) {
                        flags.bindings.push(name.clone());
                    }
                }
            }
            Node::Group(children) => scan_nodes(children, flags),
            Node::Literal(_) | Node::Interpolation(_) => {}
        }
    }
}

// ── Tests ──
