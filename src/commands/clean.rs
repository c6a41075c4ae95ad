//! Clean the destination directory

use anyhow::Result;
use std::fs;

use crate::Postrev;

/// Remove published output
pub fn run(app: &Postrev) -> Result<()> {
    if app.destination_dir.exists() {
        fs::remove_dir_all(&app.destination_dir)?;
        tracing::info!("Deleted: {:?}", app.destination_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_destination() {
        let dir = TempDir::new().unwrap();
        let app = Postrev::new(dir.path()).unwrap();
        fs::create_dir_all(app.destination_dir.join("nested")).unwrap();
        fs::write(app.destination_dir.join("a.md"), "x").unwrap();

        run(&app).unwrap();
        assert!(!app.destination_dir.exists());
        // Cleaning twice is fine
        run(&app).unwrap();
    }
}
