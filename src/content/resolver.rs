//! Revision resolver - assigns sequence positions and deduplicates submissions
//!
//! Units are applied in discovery order. A unit whose front matter and body
//! bytes match a stored revision of the same identity is not stored again.

use std::path::PathBuf;

use super::{frontmatter, DocumentId, ParseError, ParsedDocument, RevisionCandidate};
use crate::config::IdentityMode;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::store::ContentStore;

/// One raw content unit as discovered on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    /// Path relative to the source directory
    pub path: PathBuf,
    pub raw: String,
}

impl ContentUnit {
    pub fn new(path: impl Into<PathBuf>, raw: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            raw: raw.into(),
        }
    }
}

/// A unit after the parsing step
#[derive(Debug, Clone)]
pub struct ParsedUnit {
    pub path: PathBuf,
    pub parsed: Result<ParsedDocument, ParseError>,
}

impl ParsedUnit {
    pub fn parse(unit: ContentUnit) -> Self {
        let parsed = frontmatter::parse(&unit.raw);
        Self {
            path: unit.path,
            parsed,
        }
    }
}

/// Outcome of resolving one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Stored as a new revision at this position
    Appended(usize),
    /// Identical to the stored revision at this position
    Duplicate(usize),
}

impl Resolution {
    pub fn sequence(&self) -> usize {
        match self {
            Resolution::Appended(seq) | Resolution::Duplicate(seq) => *seq,
        }
    }
}

/// Summary of an ingestion run
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub appended: usize,
    pub deduplicated: usize,
    pub failed: usize,
    pub diagnostics: Diagnostics,
}

impl IngestReport {
    pub fn processed(&self) -> usize {
        self.appended + self.deduplicated + self.failed
    }
}

/// Applies candidates to a store in discovery order
pub struct Resolver<'a> {
    store: &'a mut ContentStore,
    mode: IdentityMode,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a mut ContentStore, mode: IdentityMode) -> Self {
        Self { store, mode }
    }

    /// Store a candidate unless an identical revision already exists
    pub fn resolve(&mut self, identity: DocumentId, candidate: RevisionCandidate) -> Resolution {
        if let Some(existing) = self.store.find_identical(identity.as_str(), &candidate) {
            tracing::debug!(
                "{} from {:?} duplicates revision {}",
                identity,
                candidate.source,
                existing.sequence
            );
            return Resolution::Duplicate(existing.sequence);
        }
        Resolution::Appended(self.store.put(identity, candidate))
    }

    /// Resolve parsed units, collecting failures instead of stopping
    pub fn ingest_parsed<I>(&mut self, units: I) -> IngestReport
    where
        I: IntoIterator<Item = ParsedUnit>,
    {
        let mut report = IngestReport::default();

        for unit in units {
            let identity = match DocumentId::from_path(&unit.path, self.mode) {
                Ok(identity) => identity,
                Err(error) => {
                    report.failed += 1;
                    report.diagnostics.push(Diagnostic::Resolution(error));
                    continue;
                }
            };

            let mut parsed = match unit.parsed {
                Ok(parsed) => parsed,
                Err(error) => {
                    report.failed += 1;
                    report.diagnostics.push(Diagnostic::Parse {
                        path: unit.path,
                        error,
                    });
                    continue;
                }
            };

            let warnings = std::mem::take(&mut parsed.warnings);
            match self.resolve(identity, RevisionCandidate::new(parsed, unit.path.clone())) {
                Resolution::Appended(_) => {
                    report.appended += 1;
                    // Only stored revisions report their duplicate keys
                    for warning in warnings {
                        report.diagnostics.push(Diagnostic::DuplicateKey {
                            path: unit.path.clone(),
                            warning,
                        });
                    }
                }
                Resolution::Duplicate(_) => report.deduplicated += 1,
            }
        }

        tracing::info!(
            "Ingested {} units: {} stored, {} duplicates, {} failed",
            report.processed(),
            report.appended,
            report.deduplicated,
            report.failed
        );

        report
    }

    /// Parse and resolve raw units in order
    pub fn ingest<I>(&mut self, units: I) -> IngestReport
    where
        I: IntoIterator<Item = ContentUnit>,
    {
        self.ingest_parsed(units.into_iter().map(ParsedUnit::parse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingest(store: &mut ContentStore, units: Vec<ContentUnit>) -> IngestReport {
        Resolver::new(store, IdentityMode::Stem).ingest(units)
    }

    #[test]
    fn test_positions_follow_discovery_order() {
        let mut store = ContentStore::new();
        let report = ingest(
            &mut store,
            vec![
                ContentUnit::new("a.md", "---\ntitle: A\n---\none"),
                ContentUnit::new("b.md", "---\ntitle: B\n---\none"),
                ContentUnit::new("a.md", "---\ntitle: A\n---\ntwo"),
            ],
        );
        assert_eq!(report.appended, 3);
        let history = store.get_history("a").unwrap();
        assert_eq!(history[0].body, "one");
        assert_eq!(history[1].body, "two");
        assert_eq!(history[1].sequence, 1);
    }

    #[test]
    fn test_identical_unit_is_deduplicated() {
        let mut store = ContentStore::new();
        let raw = "---\ntitle: Same\n---\nbody";
        let mut resolver = Resolver::new(&mut store, IdentityMode::Stem);
        let report = resolver.ingest(vec![
            ContentUnit::new("_posts/same.md", raw),
            ContentUnit::new("_drafts/same.md", raw),
        ]);
        assert_eq!(report.appended, 1);
        assert_eq!(report.deduplicated, 1);
        assert!(report.diagnostics.is_empty());
        assert_eq!(store.get_history("same").unwrap().len(), 1);
    }

    #[test]
    fn test_reingesting_older_content_returns_existing() {
        let mut store = ContentStore::new();
        let mut resolver = Resolver::new(&mut store, IdentityMode::Stem);
        let id = || DocumentId::new("p").unwrap();
        let v1 = || {
            RevisionCandidate::new(frontmatter::parse("---\n---\nv1").unwrap(), "p.md")
        };
        let v2 = RevisionCandidate::new(frontmatter::parse("---\n---\nv2").unwrap(), "p.md");

        assert_eq!(resolver.resolve(id(), v1()), Resolution::Appended(0));
        assert_eq!(resolver.resolve(id(), v2), Resolution::Appended(1));
        assert_eq!(resolver.resolve(id(), v1()), Resolution::Duplicate(0));
        assert_eq!(store.get_latest("p").unwrap().body, "v2");
    }

    #[test]
    fn test_failures_are_isolated() {
        let mut store = ContentStore::new();
        let report = ingest(
            &mut store,
            vec![
                ContentUnit::new("broken.md", "---\ntitle: no end\n"),
                ContentUnit::new("", "---\ntitle: no path\n---\n"),
                ContentUnit::new("fine.md", "---\ntitle: Fine\n---\nok"),
            ],
        );
        assert_eq!(report.failed, 2);
        assert_eq!(report.appended, 1);
        assert_eq!(report.diagnostics.error_count(), 2);
        assert!(store.get_latest("fine").is_ok());
        assert!(store.get_latest("broken").is_err());
    }

    #[test]
    fn test_duplicate_keys_become_warnings() {
        let mut store = ContentStore::new();
        let report = ingest(
            &mut store,
            vec![ContentUnit::new("dup.md", "---\ntitle: A\ntitle: B\n---\n")],
        );
        assert_eq!(report.appended, 1);
        assert_eq!(report.diagnostics.warning_count(), 1);
        assert_eq!(store.get_latest("dup").unwrap().front_matter.title(), Some("B"));
    }

    #[test]
    fn test_duplicate_key_reported_once_for_identical_copies() {
        let mut store = ContentStore::new();
        let raw = "---\ntitle: A\ntitle: B\n---\n";
        let report = ingest(
            &mut store,
            vec![
                ContentUnit::new("_posts/dup.md", raw),
                ContentUnit::new("_drafts/dup.md", raw),
            ],
        );
        assert_eq!(report.appended, 1);
        assert_eq!(report.deduplicated, 1);
        assert_eq!(report.diagnostics.warning_count(), 1);
        assert!(report.diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::DuplicateKey { path, .. } if path == &PathBuf::from("_posts/dup.md")
        )));
    }
}
