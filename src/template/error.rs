use std::path::PathBuf;

use thiserror::Error;

/// Configuration defects in a template description, plus the few ways a
/// render can still fail. None of these are data-quality problems: a null
/// field or a bad price never ends up here.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("unknown block `{0}`")]
    UnknownBlock(String),

    #[error("unknown record field `{0}` in placeholder")]
    UnknownField(String),

    #[error("invalid block directive at `{path}`: {reason}")]
    InvalidDirective { path: String, reason: String },

    #[error("block `{0}` takes a single record; remove its `with` key")]
    UnexpectedArgument(String),

    #[error("template description must be a mapping")]
    NotAMapping,

    #[error("no record bound as `{0}` for this render")]
    UnboundRecord(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
