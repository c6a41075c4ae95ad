//! In-memory content store
//!
//! Maps each document identity to its append-only revision history. Entries
//! are never reordered or removed; the canonical revision of a document is
//! always the one appended last.

use indexmap::IndexMap;
use thiserror::Error;

use crate::content::{DocumentId, Revision, RevisionCandidate};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
}

/// A logical document and its revisions, in sequence order
#[derive(Debug, Clone)]
pub struct Document {
    identity: DocumentId,
    revisions: Vec<Revision>,
}

impl Document {
    fn new(identity: DocumentId) -> Self {
        Self {
            identity,
            revisions: Vec::new(),
        }
    }

    pub fn identity(&self) -> &DocumentId {
        &self.identity
    }

    pub fn history(&self) -> &[Revision] {
        &self.revisions
    }

    pub fn latest(&self) -> Option<&Revision> {
        self.revisions.last()
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    fn append(&mut self, candidate: RevisionCandidate) -> usize {
        let sequence = self.revisions.len();
        self.revisions
            .push(Revision::new(self.identity.clone(), sequence, candidate));
        sequence
    }
}

/// All documents of one ingestion run, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    documents: IndexMap<DocumentId, Document>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a revision and return its sequence position
    pub fn put(&mut self, identity: DocumentId, candidate: RevisionCandidate) -> usize {
        let sequence = self
            .documents
            .entry(identity.clone())
            .or_insert_with(|| Document::new(identity.clone()))
            .append(candidate);
        tracing::debug!("Stored {} revision {}", identity, sequence);
        sequence
    }

    /// Revision with the highest sequence position
    pub fn get_latest(&self, identity: &str) -> Result<&Revision, StoreError> {
        self.documents
            .get(identity)
            .and_then(Document::latest)
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))
    }

    /// Full history in sequence order
    pub fn get_history(&self, identity: &str) -> Result<&[Revision], StoreError> {
        self.documents
            .get(identity)
            .map(Document::history)
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))
    }

    /// Known identities in first-seen order.
    ///
    /// The iterator is `Clone`, so it can be walked again from the start.
    pub fn list_identities(&self) -> impl Iterator<Item = &DocumentId> + Clone + '_ {
        self.documents.keys()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> + Clone + '_ {
        self.documents.values()
    }

    pub fn document(&self, identity: &str) -> Option<&Document> {
        self.documents.get(identity)
    }

    /// Stored revision with exactly the candidate's content, if any
    pub fn find_identical(
        &self,
        identity: &str,
        candidate: &RevisionCandidate,
    ) -> Option<&Revision> {
        self.documents
            .get(identity)?
            .history()
            .iter()
            .find(|rev| rev.is_identical_to(candidate))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Total number of revisions across all documents
    pub fn revision_count(&self) -> usize {
        self.documents.values().map(Document::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::frontmatter;

    fn candidate(body: &str) -> RevisionCandidate {
        let raw = format!("---\ntitle: X\n---\n{}", body);
        RevisionCandidate::new(frontmatter::parse(&raw).unwrap(), "post.md")
    }

    fn id(key: &str) -> DocumentId {
        DocumentId::new(key).unwrap()
    }

    #[test]
    fn test_put_assigns_positions() {
        let mut store = ContentStore::new();
        assert_eq!(store.put(id("a"), candidate("1")), 0);
        assert_eq!(store.put(id("b"), candidate("1")), 0);
        assert_eq!(store.put(id("a"), candidate("2")), 1);
        assert_eq!(store.put(id("a"), candidate("3")), 2);

        let history = store.get_history("a").unwrap();
        let positions: Vec<_> = history.iter().map(|r| r.sequence).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(store.revision_count(), 4);
    }

    #[test]
    fn test_latest_is_last_of_history() {
        let mut store = ContentStore::new();
        for body in ["v1", "v2", "v3"] {
            store.put(id("post"), candidate(body));
        }
        let latest = store.get_latest("post").unwrap();
        assert_eq!(latest, store.get_history("post").unwrap().last().unwrap());
        assert_eq!(latest.body, "v3");
    }

    #[test]
    fn test_not_found() {
        let store = ContentStore::new();
        assert_eq!(
            store.get_latest("missing"),
            Err(StoreError::NotFound("missing".to_string()))
        );
        assert!(store.get_history("missing").is_err());
    }

    #[test]
    fn test_list_identities_is_restartable() {
        let mut store = ContentStore::new();
        store.put(id("b"), candidate("1"));
        store.put(id("a"), candidate("1"));
        store.put(id("b"), candidate("2"));

        let identities = store.list_identities();
        let first: Vec<_> = identities.clone().map(DocumentId::as_str).collect();
        let second: Vec<_> = identities.map(DocumentId::as_str).collect();
        assert_eq!(first, vec!["b", "a"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_find_identical() {
        let mut store = ContentStore::new();
        store.put(id("a"), candidate("v1"));
        store.put(id("a"), candidate("v2"));

        let found = store.find_identical("a", &candidate("v1")).unwrap();
        assert_eq!(found.sequence, 0);
        assert!(store.find_identical("a", &candidate("v3")).is_none());
        assert!(store.find_identical("b", &candidate("v1")).is_none());
    }
}
