//! End-to-end ingestion scenarios against the public API

use postrev::config::{IdentityMode, SiteConfig};
use postrev::content::{ContentUnit, FrontMatterValue, IngestReport, ParseError, Resolver};
use postrev::diagnostics::Diagnostic;
use postrev::publish::Publisher;
use postrev::store::ContentStore;

fn ingest(units: Vec<ContentUnit>) -> (ContentStore, IngestReport) {
    let mut store = ContentStore::new();
    let mut report = Resolver::new(&mut store, IdentityMode::Stem).ingest(units);
    let publisher = Publisher::new(&SiteConfig::default()).unwrap();
    report.diagnostics.extend(publisher.diagnostics(&store));
    (store, report)
}

#[test]
fn single_unit_is_revision_zero() {
    let (store, report) = ingest(vec![ContentUnit::new(
        "post-1.md",
        "---\ntitle: \"X\"\n---\nhello",
    )]);

    let latest = store.get_latest("post-1").unwrap();
    assert_eq!(latest.sequence, 0);
    assert_eq!(latest.front_matter.len(), 1);
    assert_eq!(
        latest.front_matter.get("title"),
        Some(&FrontMatterValue::from("X"))
    );
    assert_eq!(latest.body, "hello");
    assert!(report.diagnostics.is_empty());
}

#[test]
fn differing_bodies_keep_both_revisions() {
    let (store, report) = ingest(vec![
        ContentUnit::new("post-1.md", "---\ntitle: X\n---\nv1"),
        ContentUnit::new("post-1.md", "---\ntitle: X\n---\nv2"),
    ]);

    assert_eq!(store.get_history("post-1").unwrap().len(), 2);
    assert_eq!(store.get_latest("post-1").unwrap().body, "v2");

    let notices: Vec<_> = report.diagnostics.duplicate_revisions().collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].identity.as_str(), "post-1");
    assert_eq!(notices[0].revisions, 2);
}

#[test]
fn missing_closing_marker_does_not_stop_the_run() {
    let (store, report) = ingest(vec![
        ContentUnit::new("a.md", "---\ntitle: A\n---\nfine"),
        ContentUnit::new("broken.md", "---\ntitle: Broken\n\nno closing marker\n"),
        ContentUnit::new("c.md", "---\ntitle: C\n---\nalso fine"),
    ]);

    assert_eq!(report.failed, 1);
    assert_eq!(report.appended, 2);
    assert!(report.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::Parse {
            error: ParseError::MissingFrontMatter,
            path,
        } if path.to_str() == Some("broken.md")
    )));
    assert!(store.get_latest("a").is_ok());
    assert!(store.get_latest("c").is_ok());
    assert!(store.get_latest("broken").is_err());
}

#[test]
fn identical_bytes_are_deduplicated() {
    let raw = "---\ntitle: Same\ntags: [a, b]\n---\nbody\n";
    let (store, report) = ingest(vec![
        ContentUnit::new("post-2.md", raw),
        ContentUnit::new("post-2.md", raw),
    ]);

    assert_eq!(store.get_history("post-2").unwrap().len(), 1);
    assert_eq!(report.deduplicated, 1);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn histories_are_gapless_and_latest_is_last() {
    let mut units = Vec::new();
    for round in 0..4 {
        for name in ["a", "b", "c"] {
            // "b" never changes after its first revision
            let body = if name == "b" { 0 } else { round };
            units.push(ContentUnit::new(
                format!("_posts/{}.md", name),
                format!("---\ntitle: {}\n---\n{}", name, body),
            ));
        }
    }
    let (store, _) = ingest(units);

    let identities: Vec<_> = store.list_identities().map(|id| id.to_string()).collect();
    assert_eq!(identities, vec!["a", "b", "c"]);

    for identity in &identities {
        let history = store.get_history(identity).unwrap();
        for (position, revision) in history.iter().enumerate() {
            assert_eq!(revision.sequence, position);
        }
        assert_eq!(
            store.get_latest(identity).unwrap(),
            history.last().unwrap()
        );
    }
    assert_eq!(store.get_history("a").unwrap().len(), 4);
    assert_eq!(store.get_history("b").unwrap().len(), 1);
}

#[test]
fn publish_yields_one_document_per_identity() {
    let (store, _) = ingest(vec![
        ContentUnit::new("x.md", "---\ntitle: X\n---\n1"),
        ContentUnit::new("y.md", "---\ntitle: Y\n---\n1"),
        ContentUnit::new("x.md", "---\ntitle: X2\n---\n2"),
    ]);
    let publisher = Publisher::new(&SiteConfig::default()).unwrap();

    let published: Vec<_> = publisher
        .publish(&store)
        .map(|doc| (doc.identity.to_string(), doc.front_matter.title().map(String::from), doc.body))
        .collect();
    assert_eq!(
        published,
        vec![
            ("x".to_string(), Some("X2".to_string()), "2"),
            ("y".to_string(), Some("Y".to_string()), "1"),
        ]
    );
    // Publishing is repeatable
    assert_eq!(publisher.publish(&store).count(), 2);
}
