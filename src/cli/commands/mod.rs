pub mod add;
pub mod extract;
pub mod index;
pub mod init;
pub mod locate;
pub mod show;
pub mod stats;

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::corpus::CorpusStore;

/// Load the configuration and open the corpus it points at.
pub(crate) fn open_store(corpus_dir: Option<PathBuf>) -> Result<(Config, CorpusStore)> {
    let config = Config::load_or_default().context("Failed to load configuration")?;
    let store = CorpusStore::new(config.corpus_path(corpus_dir), config.alias_registry());
    Ok((config, store))
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}
