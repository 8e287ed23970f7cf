//! Turns a flat product record into an FAQ, a product page and a comparison
//! page by running it through normalization, question generation and a small
//! template engine.

pub mod assemble;
pub mod batch;
pub mod blocks;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod questions;
pub mod record;
pub mod settings;
pub mod template;
pub mod templates;

pub use assemble::{Assembler, Documents};
pub use pipeline::Pipeline;
pub use record::CanonicalRecord;
pub use template::TemplateError;
