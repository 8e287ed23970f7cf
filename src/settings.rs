use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::assemble::DEFAULT_FAQ_LIMIT;

/// Runtime settings: defaults, then `pagegen.toml` if present, then
/// `PAGEGEN_*` environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub templates_dir: Option<PathBuf>,
    pub faq_limit: usize,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder(Environment::with_prefix("PAGEGEN"))?.build()?.try_deserialize()
    }

    fn builder(
        env: Environment,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("output_dir", "outputs")?
            .set_default("faq_limit", DEFAULT_FAQ_LIMIT as i64)?
            .add_source(File::with_name("pagegen").required(false))
            .add_source(env))
    }
}

// ── Tests ──
