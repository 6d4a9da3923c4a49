//! Thin, typed YAML configuration for the `ips` daemon.
//!
//! Grounded on `synaptik-core::config::CoreConfig::load` (teacher): a
//! `Deserialize` struct with a per-field `#[serde(default = "...")]`, a
//! `load(path) -> Result<Self>` that falls back to `Default` when the file
//! is absent, and `anyhow::Context` on every fallible step. The teacher
//! loads TOML; spec.md names YAML explicitly for this config, so
//! `serde_yaml` replaces `toml` here while the loading *shape* stays the
//! teacher's.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct IpsConfig {
    #[serde(default = "IpsConfig::default_rules_path")]
    pub rules_path: PathBuf,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub log_path: Option<PathBuf>,
    #[serde(default)]
    pub packets: PacketSourceConfig,
}

impl IpsConfig {
    /// Loads `path` as YAML, falling back to `IpsConfig::default()` when it
    /// doesn't exist — config is optional ambient plumbing, not a hard
    /// requirement to run.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(
                "No config file found at {}. Using IpsConfig::default().",
                path.display()
            );
            return Ok(IpsConfig::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    fn default_rules_path() -> PathBuf {
        PathBuf::from("configs/rules.json")
    }
}

impl Default for IpsConfig {
    fn default() -> Self {
        Self {
            rules_path: Self::default_rules_path(),
            verbose: false,
            log_path: None,
            packets: PacketSourceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PacketSourceConfig {
    #[serde(default = "PacketSourceConfig::default_kind")]
    pub source: PacketSourceKind,
    /// Required when `source` is `File`; ignored for `Stdin`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl PacketSourceConfig {
    fn default_kind() -> PacketSourceKind {
        PacketSourceKind::Stdin
    }
}

impl Default for PacketSourceConfig {
    fn default() -> Self {
        Self { source: Self::default_kind(), path: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketSourceKind {
    Stdin,
    File,
}
