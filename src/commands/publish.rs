//! Publish canonical documents for the site generator

use anyhow::Result;
use notify::Watcher;
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

use super::{prepare, print_diagnostics, Strictness};
use crate::publish::Manifest;
use crate::{Postrev, CONFIG_FILE};

/// Ingest the site and write the latest revision of every document
pub async fn run(app: &Postrev, strictness: Strictness) -> Result<Manifest> {
    let start = std::time::Instant::now();

    let (ingestion, publisher) = prepare(app).await?;
    let diagnostics = &ingestion.report.diagnostics;
    print_diagnostics(diagnostics);
    strictness.enforce(diagnostics)?;

    let manifest = publisher.write(&ingestion.store, &app.destination_dir)?;

    let duration = start.elapsed();
    tracing::info!("Published in {:.2}s", duration.as_secs_f64());

    Ok(manifest)
}

/// Watch for file changes and republish
pub async fn watch(base_dir: &Path, strictness: Strictness) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    // Only content directories are watched so our own output never triggers a run
    let app = Postrev::new(base_dir)?;
    let loader = crate::content::loader::ContentLoader::new(&app)?;
    for dir in loader.content_dirs() {
        if dir.exists() {
            watcher.watch(&dir, notify::RecursiveMode::Recursive)?;
        }
    }

    let config_path = base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    // Debounce events
    let mut last_run = std::time::Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_event) => {
                if last_run.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, republishing...");
                    // Configuration is reloaded on every run
                    let result = match Postrev::new(base_dir) {
                        Ok(app) => run(&app, strictness).await.map(|_| ()),
                        Err(e) => Err(e),
                    };
                    if let Err(e) = result {
                        tracing::error!("Publishing failed: {}", e);
                    }
                    last_run = std::time::Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}
