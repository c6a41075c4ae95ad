//! Revision model

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use super::{DocumentId, FrontMatter, ParsedDocument};

/// Parsed content that has not been assigned a sequence position yet
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionCandidate {
    pub front_matter: FrontMatter,
    /// Front-matter block text, used for byte-for-byte comparison
    pub raw_front_matter: String,
    pub body: String,
    /// Source path relative to the source directory
    pub source: PathBuf,
}

impl RevisionCandidate {
    pub fn new(parsed: ParsedDocument, source: impl Into<PathBuf>) -> Self {
        Self {
            front_matter: parsed.front_matter,
            raw_front_matter: parsed.raw_front_matter,
            body: parsed.body,
            source: source.into(),
        }
    }

    pub fn content_hash(&self) -> u64 {
        content_hash(&self.raw_front_matter, &self.body)
    }
}

/// One stored version of a document
#[derive(Debug, Clone, PartialEq)]
pub struct Revision {
    pub identity: DocumentId,

    /// Position in the document's history, starting at 0
    pub sequence: usize,

    pub front_matter: FrontMatter,

    pub raw_front_matter: String,

    pub body: String,

    /// Source path of the unit this revision came from
    pub source: PathBuf,

    pub content_hash: u64,
}

impl Revision {
    pub fn new(identity: DocumentId, sequence: usize, candidate: RevisionCandidate) -> Self {
        let content_hash = candidate.content_hash();
        Self {
            identity,
            sequence,
            front_matter: candidate.front_matter,
            raw_front_matter: candidate.raw_front_matter,
            body: candidate.body,
            source: candidate.source,
            content_hash,
        }
    }

    /// Whether the candidate carries exactly the same front matter and body bytes
    pub fn is_identical_to(&self, candidate: &RevisionCandidate) -> bool {
        self.content_hash == candidate.content_hash()
            && self.raw_front_matter == candidate.raw_front_matter
            && self.body == candidate.body
    }

    /// Title from front matter, falling back to the identity
    pub fn title(&self) -> &str {
        self.front_matter
            .title()
            .unwrap_or_else(|| self.identity.title_part())
    }
}

fn content_hash(front_matter: &str, body: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    front_matter.hash(&mut hasher);
    body.hash(&mut hasher);
    hasher.finish()
}
