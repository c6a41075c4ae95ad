//! Check content without publishing

use anyhow::Result;

use super::{prepare, print_diagnostics, Strictness};
use crate::Postrev;

/// Ingest the site and report diagnostics
pub async fn run(app: &Postrev, strictness: Strictness) -> Result<()> {
    let (ingestion, publisher) = prepare(app).await?;
    let report = &ingestion.report;

    print_diagnostics(&report.diagnostics);

    let published = publisher.publish(&ingestion.store).count();
    println!(
        "{} documents ({} revisions, {} published) from {} units: {} errors, {} warnings",
        ingestion.store.len(),
        ingestion.store.revision_count(),
        published,
        report.processed(),
        report.diagnostics.error_count(),
        report.diagnostics.warning_count()
    );

    strictness.enforce(&report.diagnostics)
}
