//! CLI commands

pub mod check;
pub mod clean;
pub mod history;
pub mod list;
pub mod publish;

use anyhow::Result;

use crate::diagnostics::{Diagnostics, Severity};
use crate::publish::Publisher;
use crate::{Ingestion, Postrev};

/// Host-level policy deciding which diagnostics fail a command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Strictness {
    /// Fail on errors
    pub strict: bool,
    /// Fail on warnings too (implies `strict`)
    pub deny_warnings: bool,
}

impl Strictness {
    pub fn enforce(&self, diagnostics: &Diagnostics) -> Result<()> {
        let errors = diagnostics.error_count();
        let warnings = diagnostics.warning_count();

        if (self.strict || self.deny_warnings) && errors > 0 {
            anyhow::bail!("{} error(s) found in content", errors);
        }
        if self.deny_warnings && warnings > 0 {
            anyhow::bail!("{} warning(s) found in content", warnings);
        }
        Ok(())
    }
}

/// Ingest the site and add the publisher's duplicate-revision warnings
pub(crate) async fn prepare(app: &Postrev) -> Result<(Ingestion, Publisher)> {
    let mut ingestion = app.ingest().await?;
    let publisher = app.publisher()?;
    ingestion
        .report
        .diagnostics
        .extend(publisher.diagnostics(&ingestion.store));
    Ok((ingestion, publisher))
}

/// Print diagnostics to stderr
pub(crate) fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        let label = match diagnostic.severity() {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        eprintln!("{}: {}", label, diagnostic);
    }
}
