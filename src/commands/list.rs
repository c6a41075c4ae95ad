//! List stored documents

use anyhow::Result;

use crate::store::Document;
use crate::Postrev;

/// List documents in discovery or date order
pub async fn run(app: &Postrev, sort: &str) -> Result<()> {
    let ingestion = app.ingest().await?;
    let store = &ingestion.store;

    let mut documents: Vec<&Document> = store.documents().collect();
    sort_documents(&mut documents, sort)?;

    println!("Documents ({}):", documents.len());
    for document in documents {
        let Some(latest) = document.latest() else {
            continue;
        };
        let date = document
            .identity()
            .date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        let tags = latest.front_matter.tags();

        print!("  {} - {} [{}]", date, latest.title(), document.identity());
        if document.len() > 1 {
            print!(" ({} revisions)", document.len());
        }
        if !tags.is_empty() {
            print!(" #{}", tags.join(" #"));
        }
        println!();
    }

    Ok(())
}

/// Reorder documents in place; discovery order is the store's own order
fn sort_documents(documents: &mut [&Document], sort: &str) -> Result<()> {
    match sort {
        "discovery" => {}
        "date" => {
            // Newest first, undated last
            documents.sort_by(|a, b| b.identity().date().cmp(&a.identity().date()));
        }
        "revisions" => {
            documents.sort_by(|a, b| b.len().cmp(&a.len()));
        }
        _ => {
            anyhow::bail!(
                "Unknown sort order: {}. Available: discovery, date, revisions",
                sort
            );
        }
    }
    Ok(())
}
