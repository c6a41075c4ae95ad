//! Show the revision history of one document

use anyhow::Result;

use crate::Postrev;

/// Print every stored revision of a document, oldest first
pub async fn run(app: &Postrev, identity: &str) -> Result<()> {
    let ingestion = app.ingest().await?;
    let history = ingestion.store.get_history(identity)?;

    println!("{} ({} revisions):", identity, history.len());
    for revision in history {
        let marker = if revision.sequence + 1 == history.len() {
            " (canonical)"
        } else {
            ""
        };
        println!(
            "  #{} {} - {} ({} bytes){}",
            revision.sequence,
            revision.source.display(),
            revision.title(),
            revision.body.len(),
            marker
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_history() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("_posts")).unwrap();
        fs::write(dir.path().join("_posts/a.md"), "---\ntitle: A\n---\n").unwrap();

        let app = Postrev::new(dir.path()).unwrap();
        assert!(run(&app, "a").await.is_ok());

        let err = run(&app, "missing").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::NotFound(identity)) if identity == "missing"
        ));
    }
}
