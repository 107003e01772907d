//! Engine configuration

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Engine configuration loaded from environment
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding `rules/*.json` and `templates/*.json`
    pub data_dir: PathBuf,
    /// Input limits enforced by the use cases
    pub limits: EngineLimits,
}

/// Bounds on request size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    /// Max tags plus plot blocks in one pathway
    pub max_pathway_items: usize,
    /// Max active rules evaluated in one pass
    pub max_rules: usize,
    /// Max parameter values supplied to one instantiation
    pub max_template_parameters: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_pathway_items: 500,
            max_rules: 1000,
            max_template_parameters: 64,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = EngineLimits::default();
        Ok(Self {
            data_dir: lookup("PATHWISE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            limits: EngineLimits {
                max_pathway_items: parse_var(
                    &lookup,
                    "PATHWISE_MAX_PATHWAY_ITEMS",
                    defaults.max_pathway_items,
                )?,
                max_rules: parse_var(&lookup, "PATHWISE_MAX_RULES", defaults.max_rules)?,
                max_template_parameters: parse_var(
                    &lookup,
                    "PATHWISE_MAX_TEMPLATE_PARAMETERS",
                    defaults.max_template_parameters,
                )?,
            },
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a non-negative integer, got '{}'", name, raw)),
    }
}
