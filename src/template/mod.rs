pub mod ast;
pub mod compile;
pub mod error;
pub mod resolve;

pub use ast::{Node, RecordRef, Segment, Template, TemplateFlags, DEFAULT_BINDING};
pub use compile::{compile, compile_str};
pub use error::TemplateError;
pub use resolve::{render, OutputMapping, Scope};
