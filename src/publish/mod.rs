//! Publish adapter - hands the canonical revision of every document to the
//! external renderer
//!
//! The adapter only reads the store. For each document it takes the latest
//! revision, applies front-matter defaults from the site configuration and
//! computes an excerpt. Documents with more than one revision are reported
//! but never second-guessed: the latest revision is always the one published.

use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{ConfigError, DefaultsScope, SiteConfig};
use crate::content::{DocumentId, FrontMatter, FrontMatterValue, Revision};
use crate::diagnostics::{Diagnostic, DuplicateRevisionWarning};
use crate::store::ContentStore;

/// Name of the manifest written next to published documents
pub const MANIFEST_FILE: &str = "manifest.json";

/// Canonical revision of one document, ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedDocument<'a> {
    pub identity: &'a DocumentId,
    /// Front matter with site defaults applied
    pub front_matter: FrontMatter,
    pub body: &'a str,
    pub excerpt: String,
    /// The revision this was built from
    pub revision: &'a Revision,
    /// Number of stored revisions for the document
    pub history_len: usize,
}

impl PublishedDocument<'_> {
    /// Serialize back into a Markdown unit with a front-matter block
    pub fn to_markdown(&self) -> Result<String, serde_yaml::Error> {
        let yaml = self.front_matter.to_yaml()?;
        Ok(format!("---\n{}---\n{}", yaml, self.body))
    }

    /// Output path under the destination directory
    pub fn output_path(&self, destination: &Path) -> PathBuf {
        destination.join(format!("{}.md", self.identity))
    }
}

/// Front-matter defaults after validation
#[derive(Debug, Clone)]
struct ScopedDefaults {
    scope: DefaultsScope,
    values: FrontMatter,
}

/// Builds published documents from a content store
#[derive(Debug, Clone)]
pub struct Publisher {
    defaults: Vec<ScopedDefaults>,
    show_unpublished: bool,
    excerpt_separator: String,
    site_title: String,
}

impl Publisher {
    pub fn new(config: &SiteConfig) -> Result<Self, ConfigError> {
        let mut defaults = Vec::new();
        for entry in &config.defaults {
            let mut values = FrontMatter::new();
            for (key, value) in &entry.values {
                let value = FrontMatterValue::from_yaml(value.clone())
                    .ok_or_else(|| ConfigError::UnsupportedDefault { key: key.clone() })?;
                values.insert(key.clone(), value);
            }
            defaults.push(ScopedDefaults {
                scope: entry.scope.clone(),
                values,
            });
        }

        Ok(Self {
            defaults,
            show_unpublished: config.unpublished,
            excerpt_separator: config.excerpt_separator.clone(),
            site_title: config.title.clone(),
        })
    }

    /// Lazily yield the latest revision of every document, in store order
    pub fn publish<'a>(
        &'a self,
        store: &'a ContentStore,
    ) -> impl Iterator<Item = PublishedDocument<'a>> + 'a {
        store.documents().filter_map(move |document| {
            let revision = document.latest()?;
            if !self.show_unpublished && !revision.front_matter.is_published() {
                tracing::debug!("Skipping unpublished {}", revision.identity);
                return None;
            }
            Some(PublishedDocument {
                identity: document.identity(),
                front_matter: self.apply_defaults(revision),
                body: &revision.body,
                excerpt: self.excerpt(revision),
                revision,
                history_len: document.len(),
            })
        })
    }

    /// One warning per document whose history holds more than one revision
    pub fn diagnostics(&self, store: &ContentStore) -> Vec<Diagnostic> {
        store
            .documents()
            .filter(|document| document.len() > 1)
            .map(|document| {
                Diagnostic::DuplicateRevision(DuplicateRevisionWarning {
                    identity: document.identity().clone(),
                    revisions: document.len(),
                    sources: document
                        .history()
                        .iter()
                        .map(|rev| rev.source.clone())
                        .collect(),
                })
            })
            .collect()
    }

    /// Write every published document and a manifest under `destination`.
    /// Documents left over from earlier runs are removed.
    pub fn write(&self, store: &ContentStore, destination: &Path) -> Result<Manifest> {
        fs::create_dir_all(destination)?;

        let mut entries = Vec::new();
        let mut written = HashSet::new();
        for document in self.publish(store) {
            let output = document.output_path(destination);
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output, document.to_markdown()?)?;
            tracing::debug!("Wrote {:?}", output);
            written.insert(output.clone());

            entries.push(ManifestEntry {
                identity: document.identity.clone(),
                title: document.revision.title().to_string(),
                sequence: document.revision.sequence,
                revisions: document.history_len,
                source: document.revision.source.clone(),
                output: output
                    .strip_prefix(destination)
                    .unwrap_or(&output)
                    .to_path_buf(),
                excerpt: document.excerpt,
            });
        }

        remove_stale(destination, &written)?;

        let manifest = Manifest {
            site: self.site_title.clone(),
            generated_at: Local::now(),
            documents: entries,
        };
        let content = serde_json::to_string_pretty(&manifest)?;
        fs::write(destination.join(MANIFEST_FILE), content)?;

        tracing::info!(
            "Published {} documents to {:?}",
            manifest.documents.len(),
            destination
        );
        Ok(manifest)
    }

    /// Defaults fill keys the revision does not set
    fn apply_defaults(&self, revision: &Revision) -> FrontMatter {
        let mut front_matter = revision.front_matter.clone();
        for defaults in &self.defaults {
            if !defaults.scope.matches(&revision.source) {
                continue;
            }
            for (key, value) in defaults.values.iter() {
                if !front_matter.contains_key(key) {
                    front_matter.insert(key.clone(), value.clone());
                }
            }
        }
        front_matter
    }

    fn excerpt(&self, revision: &Revision) -> String {
        let front_matter = &revision.front_matter;
        if let Some(excerpt) = front_matter.get("excerpt").and_then(FrontMatterValue::as_str) {
            return excerpt.to_string();
        }

        let separator = front_matter
            .get("excerpt_separator")
            .and_then(FrontMatterValue::as_str)
            .unwrap_or(&self.excerpt_separator);

        let body = revision.body.trim_start();
        if separator.is_empty() {
            return body.to_string();
        }
        match body.find(separator) {
            Some(pos) => body[..pos].to_string(),
            None => body.to_string(),
        }
    }
}

/// Delete published documents that this run did not write
fn remove_stale(destination: &Path, written: &HashSet<PathBuf>) -> Result<()> {
    let stale: Vec<PathBuf> = WalkDir::new(destination)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "md"))
        .filter(|path| !written.contains(path))
        .collect();

    for path in stale {
        fs::remove_file(&path)?;
        tracing::debug!("Removed stale {:?}", path);
    }
    Ok(())
}

/// Index of a publication, written as JSON
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub site: String,
    pub generated_at: DateTime<Local>,
    pub documents: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub identity: DocumentId,
    pub title: String,
    pub sequence: usize,
    pub revisions: usize,
    pub source: PathBuf,
    pub output: PathBuf,
    pub excerpt: String,
}
