//! Configuration loading and path helpers.
//!
//! Uses Figment to merge built-in defaults, `ragdb.toml`, and `RAGDB_*`
//! environment variables (nested keys split on `__`, e.g.
//! `RAGDB_CHUNKING__CHUNK_SIZE=800`). Provides helpers to expand `~` and
//! `${VAR}` and to resolve relative paths against a base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::EmbeddingMethod;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Where the backing store keeps its data; recorded in stats output.
    pub db_path: String,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            db_path: "./ragdb".to_string(),
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub method: EmbeddingMethod,
    /// Dimensionality of the local feature-hash backend.
    pub dim: usize,
    pub openai_model: String,
    pub openai_base_url: String,
    /// Explicit key; falls back to `OPENAI_API_KEY` when absent.
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            method: EmbeddingMethod::LocalHash,
            dim: 384,
            openai_model: "text-embedding-3-small".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
        }
    }
}

impl RagConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("ragdb.toml"))
    }

    pub fn load_from(toml_path: &Path) -> anyhow::Result<Self> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(toml_path))
            .merge(Env::prefixed("RAGDB_").split("__"))
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after
/// expansion. If `p` is absolute it is returned as-is.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
