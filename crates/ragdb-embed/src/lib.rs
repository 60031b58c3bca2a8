//! Embedding backends and their construction.
//!
//! Two backends: a deterministic local feature-hash embedder and a remote
//! OpenAI-compatible client. Both implement `ragdb_core::traits::Embedder`;
//! the selection is made once, at construction time, from configuration.

pub mod hash;
pub mod openai;

pub use hash::HashEmbedder;
pub use openai::OpenAiEmbedder;

use ragdb_core::config::EmbeddingConfig;
use ragdb_core::error::{Error, Result};
use ragdb_core::traits::Embedder;
use ragdb_core::types::EmbeddingMethod;

const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Build the configured embedding backend.
///
/// The remote backend needs a credential: an explicit `api_key` in the
/// config wins, then the `OPENAI_API_KEY` environment variable; absence is
/// `Error::MissingCredential`.
pub fn build_embedder(cfg: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    match cfg.method {
        EmbeddingMethod::LocalHash => Ok(Box::new(HashEmbedder::new(cfg.dim))),
        EmbeddingMethod::OpenAi => {
            let key = cfg
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .or_else(|| {
                    std::env::var(OPENAI_KEY_ENV)
                        .ok()
                        .filter(|k| !k.trim().is_empty())
                })
                .ok_or_else(|| {
                    Error::MissingCredential(EmbeddingMethod::OpenAi.label().to_string())
                })?;
            let embedder =
                OpenAiEmbedder::new(&key, &cfg.openai_base_url, &cfg.openai_model, cfg.dim)
                    .map_err(|e| Error::Configuration(e.to_string()))?;
            Ok(Box::new(embedder))
        }
    }
}
