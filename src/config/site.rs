//! Site configuration (_config.yml)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid exclude pattern {pattern:?}: {source}")]
    ExcludePattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Unsupported value for front matter default {key:?}")]
    UnsupportedDefault { key: String },
}

/// How a document identity is derived from its path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    /// File name without extension
    #[default]
    Stem,
    /// Slugified file name without extension
    Slug,
    /// Path relative to the source directory, without extension
    Path,
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub url: String,
    pub baseurl: String,

    // Directory
    pub source: String,
    pub destination: String,
    pub posts_dir: String,
    pub drafts_dir: String,
    #[serde(default)]
    pub exclude: Vec<String>,

    // Reading
    pub markdown_ext: String,
    pub show_drafts: bool,
    pub unpublished: bool,
    pub identity: IdentityMode,

    // Writing
    pub excerpt_separator: String,
    #[serde(default)]
    pub defaults: Vec<FrontMatterDefaults>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            baseurl: String::new(),

            source: ".".to_string(),
            destination: "_postrev".to_string(),
            posts_dir: "_posts".to_string(),
            drafts_dir: "_drafts".to_string(),
            exclude: Vec::new(),

            markdown_ext: "markdown,mkdown,mkdn,mkd,md".to_string(),
            show_drafts: false,
            unpublished: false,
            identity: IdentityMode::default(),

            excerpt_separator: "\n\n".to_string(),
            defaults: Vec::new(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        // An empty file is a valid, all-default configuration
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Lowercased Markdown extensions, without dots
    pub fn markdown_extensions(&self) -> Vec<String> {
        self.markdown_ext
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }

    /// Compiled `exclude` patterns
    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>, ConfigError> {
        self.exclude
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|source| ConfigError::ExcludePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }
}

/// Front-matter values applied to documents under a path prefix
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatterDefaults {
    pub scope: DefaultsScope,
    pub values: IndexMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsScope {
    /// Source path prefix; empty matches everything
    pub path: String,
}

impl DefaultsScope {
    pub fn matches(&self, source: &Path) -> bool {
        let prefix = self.path.trim_matches('/');
        prefix.is_empty() || source.starts_with(prefix)
    }
}
