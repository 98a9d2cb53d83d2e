use crate::reader::DEFAULT_MAX_DECOMPRESSED_BYTES;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// How the `stack` field of pprof derived records is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GraphStackMode {
    /// Callers of the function, nearest first, taken from the first sample
    /// that contained it.
    #[default]
    Callers,
    /// Leave `stack` empty.
    Omit,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    /// Upper bound on the inflated size of a gzip wrapped pprof payload.
    pub max_decompressed_bytes: usize,
    pub graph_stack: GraphStackMode,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
            graph_stack: GraphStackMode::default(),
        }
    }
}

impl DecoderConfig {
    /// Load the decoder configuration from a YAML file. Missing keys keep
    /// their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;

        Self::from_yaml(&data).with_context(|| format!("loading config file {}", path.display()))
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        // an empty document deserializes as null
        let cfg: Self = if data.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(data).context("parsing config")?
        };

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_decompressed_bytes == 0 {
            bail!("max_decompressed_bytes must be positive");
        }

        Ok(())
    }
}
