use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::identity::SlugAliasRegistry;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the corpus JSON files
    #[serde(default = "default_corpus_dir")]
    pub corpus_dir: String,
    /// Blocks shorter than this are treated as noise by the segmenter
    #[serde(default = "default_min_block_len")]
    pub min_block_len: usize,
    #[serde(default = "default_min_question_len")]
    pub min_question_len: usize,
    /// Documents extracted in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub aliases: AliasConfig,
}

fn default_corpus_dir() -> String {
    "practice-questions".to_string()
}

fn default_min_block_len() -> usize {
    20
}

fn default_min_question_len() -> usize {
    10
}

fn default_concurrency() -> usize {
    4
}

/// Site-specific slug aliases merged over the built-in registry
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AliasConfig {
    /// book slug -> (raw chapter slug -> canonical chapter slug)
    #[serde(default)]
    pub chapters: BTreeMap<String, BTreeMap<String, String>>,
    /// loose book slug -> file prefix
    #[serde(default)]
    pub books: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_dir: default_corpus_dir(),
            min_block_len: default_min_block_len(),
            min_question_len: default_min_question_len(),
            concurrency: default_concurrency(),
            aliases: AliasConfig::default(),
        }
    }
}

impl Config {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("mcqcorpus");
        Ok(config_dir)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or the defaults if there is none
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!(
                "No configuration at {}, using defaults",
                config_path.display()
            );
            let mut config = Config::default();
            config.expand_env_vars();
            return Ok(config);
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file at {}", config_path.display()))
    }

    fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.expand_env_vars();
        Ok(config)
    }

    /// Expand environment variables in path values
    fn expand_env_vars(&mut self) {
        self.corpus_dir = expand_env_var(&self.corpus_dir);
    }

    /// Corpus directory, with a command-line override taking precedence
    pub fn corpus_path(&self, corpus_dir: Option<PathBuf>) -> PathBuf {
        corpus_dir.unwrap_or_else(|| PathBuf::from(&self.corpus_dir))
    }

    /// Built-in aliases plus the ones from this configuration
    pub fn alias_registry(&self) -> SlugAliasRegistry {
        let mut registry = SlugAliasRegistry::builtin();
        registry.extend(&self.aliases.chapters, &self.aliases.books);
        registry
    }
}

/// Expand environment variable references like ${VAR_NAME}
fn expand_env_var(value: &str) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).unwrap_or_default()
    } else if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_default()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_var_braces() {
        // SAFETY: test is single-threaded
        unsafe { std::env::set_var("MCQ_TEST_VAR_A", "value_a") };
        assert_eq!(expand_env_var("${MCQ_TEST_VAR_A}"), "value_a");
        unsafe { std::env::remove_var("MCQ_TEST_VAR_A") };
    }

    #[test]
    fn test_expand_env_var_dollar() {
        unsafe { std::env::set_var("MCQ_TEST_VAR_B", "value_b") };
        assert_eq!(expand_env_var("$MCQ_TEST_VAR_B"), "value_b");
        unsafe { std::env::remove_var("MCQ_TEST_VAR_B") };
    }

    #[test]
    fn test_expand_env_var_literal() {
        assert_eq!(expand_env_var("practice-questions"), "practice-questions");
    }

    #[test]
    fn test_expand_env_var_missing_returns_empty() {
        assert_eq!(expand_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), "");
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            corpus_dir = "/srv/corpus"
            min_block_len = 30
            concurrency = 8

            [aliases.chapters.ic-joshi]
            jetstreams = "jet-streams"

            [aliases.books]
            joshi = "ic-joshi"
        "#;
        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(config.corpus_dir, "/srv/corpus");
        assert_eq!(config.min_block_len, 30);
        assert_eq!(config.min_question_len, 10);
        assert_eq!(config.concurrency, 8);

        let registry = config.alias_registry();
        assert_eq!(registry.resolve_slug("ic-joshi", "jetstreams"), "jet-streams");
        assert_eq!(registry.book_prefix("joshi"), "ic-joshi");
    }

    #[test]
    fn test_config_default_values() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.corpus_dir, "practice-questions");
        assert_eq!(config.min_block_len, 20);
        assert_eq!(config.min_question_len, 10);
        assert_eq!(config.concurrency, 4);
        assert!(config.aliases.chapters.is_empty());
    }

    #[test]
    fn test_corpus_dir_env_expansion() {
        unsafe { std::env::set_var("MCQ_TEST_CORPUS", "/data/mcq") };
        let config = Config::from_toml(r#"corpus_dir = "${MCQ_TEST_CORPUS}""#).unwrap();
        assert_eq!(config.corpus_dir, "/data/mcq");
        unsafe { std::env::remove_var("MCQ_TEST_CORPUS") };
    }

    #[test]
    fn test_corpus_path_override() {
        let config = Config::default();
        assert_eq!(config.corpus_path(None), PathBuf::from("practice-questions"));
        assert_eq!(
            config.corpus_path(Some(PathBuf::from("/tmp/x"))),
            PathBuf::from("/tmp/x")
        );
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let mut config = Config::default();
        config
            .aliases
            .books
            .insert("met".into(), "cae-oxford".into());

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.corpus_dir, "practice-questions");
        assert_eq!(deserialized.aliases.books["met"], "cae-oxford");
    }

    #[test]
    fn test_malformed_config_is_error() {
        assert!(Config::from_toml("concurrency = \"many\"").is_err());
    }
}
