//! Diagnostics collected during an ingestion run
//!
//! Nothing here aborts a run. Callers decide whether a report is fatal.

use std::fmt;
use std::path::PathBuf;

use crate::content::{DocumentId, ParseError, ParseWarning, ResolutionError};

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// A document that has more than one stored revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRevisionWarning {
    pub identity: DocumentId,
    /// Length of the document's history
    pub revisions: usize,
    /// Source of every revision, in sequence order
    pub sources: Vec<PathBuf>,
}

impl fmt::Display for DuplicateRevisionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} has {} revisions; publishing sequence {}",
            self.identity,
            self.revisions,
            self.revisions.saturating_sub(1)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The unit could not be read from disk
    Unreadable { path: PathBuf, message: String },
    Parse { path: PathBuf, error: ParseError },
    Resolution(ResolutionError),
    DuplicateKey { path: PathBuf, warning: ParseWarning },
    DuplicateRevision(DuplicateRevisionWarning),
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::Unreadable { .. } | Diagnostic::Parse { .. } | Diagnostic::Resolution(_) => {
                Severity::Error
            }
            Diagnostic::DuplicateKey { .. } | Diagnostic::DuplicateRevision(_) => Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Unreadable { path, message } => {
                write!(f, "{}: unreadable: {}", path.display(), message)
            }
            Diagnostic::Parse { path, error } => write!(f, "{}: {}", path.display(), error),
            Diagnostic::Resolution(error) => write!(f, "{}", error),
            Diagnostic::DuplicateKey { path, warning } => {
                write!(f, "{}: {}", path.display(), warning)
            }
            Diagnostic::DuplicateRevision(warning) => write!(f, "{}", warning),
        }
    }
}

/// Ordered list of diagnostics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Error => tracing::warn!("{}", diagnostic),
            Severity::Warning => tracing::debug!("{}", diagnostic),
        }
        self.0.push(diagnostic);
    }

    /// Move already-logged diagnostics from another report
    pub fn merge(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.0.iter().filter(|d| d.severity() == severity).count()
    }

    pub fn duplicate_revisions(&self) -> impl Iterator<Item = &DuplicateRevisionWarning> {
        self.0.iter().filter_map(|d| match d {
            Diagnostic::DuplicateRevision(w) => Some(w),
            _ => None,
        })
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        for diagnostic in iter {
            self.push(diagnostic);
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
