//! postrev: a versioned front-matter document store for Jekyll-style blogs
//!
//! Posts are read from the source tree, split into front matter and body,
//! and stored as an append-only revision history per document. The latest
//! revision of every document is then handed to the external site generator.

pub mod commands;
pub mod config;
pub mod content;
pub mod diagnostics;
pub mod publish;
pub mod store;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::loader::ContentLoader;
use content::{IngestReport, Resolver};
use store::ContentStore;

/// Name of the site configuration file
pub const CONFIG_FILE: &str = "_config.yml";

/// The main application
#[derive(Debug, Clone)]
pub struct Postrev {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    /// Destination (output) directory
    pub destination_dir: PathBuf,
}

/// A populated store and the report of the run that built it
#[derive(Debug)]
pub struct Ingestion {
    pub store: ContentStore,
    pub report: IngestReport,
}

impl Postrev {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let source_dir = base_dir.join(&config.source);
        let destination_dir = base_dir.join(&config.destination);

        Self {
            config,
            base_dir,
            source_dir,
            destination_dir,
        }
    }

    /// Discover, parse and resolve all content units into a fresh store
    pub async fn ingest(&self) -> Result<Ingestion> {
        let loader = ContentLoader::new(self)?;
        let (units, unreadable) = loader.load_parsed().await?;

        let mut store = ContentStore::new();
        let mut report = Resolver::new(&mut store, self.config.identity).ingest_parsed(units);
        report.failed += unreadable.len();
        report.diagnostics.merge(unreadable);

        Ok(Ingestion { store, report })
    }

    /// Publisher configured from the site configuration
    pub fn publisher(&self) -> Result<publish::Publisher> {
        Ok(publish::Publisher::new(&self.config)?)
    }
}
