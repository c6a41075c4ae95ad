//! Content loader - discovers content units in the source directory

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use walkdir::WalkDir;

use super::{ContentUnit, ParsedUnit};
use crate::config::ConfigError;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::Postrev;

/// Loads content units from the source directory
pub struct ContentLoader<'a> {
    app: &'a Postrev,
    extensions: Vec<String>,
    exclude: Vec<glob::Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(app: &'a Postrev) -> Result<Self, ConfigError> {
        Ok(Self {
            app,
            extensions: app.config.markdown_extensions(),
            exclude: app.config.exclude_patterns()?,
        })
    }

    /// Directories scanned for content, in discovery order
    pub fn content_dirs(&self) -> Vec<PathBuf> {
        let config = &self.app.config;
        let mut dirs = vec![self.app.source_dir.join(&config.posts_dir)];
        if config.show_drafts {
            dirs.push(self.app.source_dir.join(&config.drafts_dir));
        }
        dirs
    }

    /// Content files in discovery order: posts before drafts, by file name within each directory
    pub fn discover(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for dir in self.content_dirs() {
            if !dir.exists() {
                tracing::debug!("Skipping missing directory {:?}", dir);
                continue;
            }

            // Excluded directories are pruned with everything below them
            for entry in WalkDir::new(&dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !self.is_excluded(e.path()))
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && self.is_content_file(path) {
                    files.push(path.to_path_buf());
                }
            }
        }

        files
    }

    /// Read every discovered file. Unreadable files are reported, not fatal.
    pub fn load_units(&self) -> (Vec<ContentUnit>, Diagnostics) {
        let mut units = Vec::new();
        let mut diagnostics = Diagnostics::new();

        for path in self.discover() {
            let relative = self.relative(&path);
            match fs::read_to_string(&path) {
                Ok(raw) => units.push(ContentUnit::new(relative, raw)),
                Err(e) => diagnostics.push(Diagnostic::Unreadable {
                    path: relative,
                    message: e.to_string(),
                }),
            }
        }

        tracing::debug!("Discovered {} content units", units.len());
        (units, diagnostics)
    }

    /// Read and parse every discovered unit, parsing concurrently
    pub async fn load_parsed(&self) -> Result<(Vec<ParsedUnit>, Diagnostics)> {
        let (units, diagnostics) = self.load_units();
        let parsed = parse_concurrently(units).await?;
        Ok((parsed, diagnostics))
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.app.source_dir)
            .unwrap_or(path)
            .to_path_buf()
    }

    fn is_content_file(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(true);
        if hidden {
            return false;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        self.exclude
            .iter()
            .any(|pattern| pattern.matches_path(&relative))
    }
}

/// Parse units on blocking tasks; results keep the input order
pub async fn parse_concurrently(units: Vec<ContentUnit>) -> Result<Vec<ParsedUnit>> {
    let mut set = JoinSet::new();
    let count = units.len();

    for (index, unit) in units.into_iter().enumerate() {
        set.spawn_blocking(move || (index, ParsedUnit::parse(unit)));
    }

    let mut slots: Vec<Option<ParsedUnit>> = vec![None; count];
    while let Some(joined) = set.join_next().await {
        let (index, parsed) = joined?;
        slots[index] = Some(parsed);
    }

    Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(config: SiteConfig) -> (TempDir, Postrev) {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "_posts/2020-01-02-b.md", "---\ntitle: B\n---\n");
        write(dir.path(), "_posts/2020-01-01-a.markdown", "---\ntitle: A\n---\n");
        write(dir.path(), "_posts/notes.txt", "not content");
        write(dir.path(), "_posts/.swap.md", "---\n---\n");
        write(dir.path(), "_posts/old/2010-01-01-c.md", "---\ntitle: C\n---\n");
        write(dir.path(), "_drafts/d.md", "---\ntitle: D\n---\n");
        let app = Postrev::with_config(dir.path(), config);
        (dir, app)
    }

    fn names(app: &Postrev) -> Vec<PathBuf> {
        let loader = ContentLoader::new(app).unwrap();
        let (units, diagnostics) = loader.load_units();
        assert!(diagnostics.is_empty());
        units.into_iter().map(|u| u.path).collect()
    }

    #[test]
    fn test_discovery_order() {
        let (_dir, app) = site(SiteConfig::default());
        assert_eq!(
            names(&app),
            vec![
                PathBuf::from("_posts/2020-01-01-a.markdown"),
                PathBuf::from("_posts/2020-01-02-b.md"),
                PathBuf::from("_posts/old/2010-01-01-c.md"),
            ]
        );
    }

    #[test]
    fn test_drafts_and_exclude() {
        let config = SiteConfig {
            show_drafts: true,
            exclude: vec!["_posts/old/*".to_string()],
            ..Default::default()
        };
        let (_dir, app) = site(config);
        assert_eq!(
            names(&app),
            vec![
                PathBuf::from("_posts/2020-01-01-a.markdown"),
                PathBuf::from("_posts/2020-01-02-b.md"),
                PathBuf::from("_drafts/d.md"),
            ]
        );
    }

    #[test]
    fn test_exclude_directory() {
        for pattern in ["_posts/old", "_posts/ol?"] {
            let config = SiteConfig {
                exclude: vec![pattern.to_string()],
                ..Default::default()
            };
            let (_dir, app) = site(config);
            assert_eq!(
                names(&app),
                vec![
                    PathBuf::from("_posts/2020-01-01-a.markdown"),
                    PathBuf::from("_posts/2020-01-02-b.md"),
                ]
            );
        }
    }

    #[test]
    fn test_exclude_single_file() {
        let config = SiteConfig {
            exclude: vec!["_posts/2020-01-02-b.md".to_string()],
            ..Default::default()
        };
        let (_dir, app) = site(config);
        assert_eq!(
            names(&app),
            vec![
                PathBuf::from("_posts/2020-01-01-a.markdown"),
                PathBuf::from("_posts/old/2010-01-01-c.md"),
            ]
        );
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let (dir, app) = site(SiteConfig::default());
        fs::write(dir.path().join("_posts/binary.md"), [0xff, 0xfe, 0x00]).unwrap();
        let loader = ContentLoader::new(&app).unwrap();
        let (units, diagnostics) = loader.load_units();
        assert_eq!(units.len(), 3);
        assert_eq!(diagnostics.error_count(), 1);
    }

    #[tokio::test]
    async fn test_parse_concurrently_keeps_order() {
        let units: Vec<_> = (0..32)
            .map(|i| ContentUnit::new(format!("p{}.md", i), format!("---\nn: {}\n---\n", i)))
            .collect();
        let parsed = parse_concurrently(units).await.unwrap();
        assert_eq!(parsed.len(), 32);
        for (i, unit) in parsed.iter().enumerate() {
            assert_eq!(unit.path, PathBuf::from(format!("p{}.md", i)));
            let doc = unit.parsed.as_ref().unwrap();
            assert_eq!(
                doc.front_matter.get("n"),
                Some(&crate::content::FrontMatterValue::Integer(i as i64))
            );
        }
    }
}
