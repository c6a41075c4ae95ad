//! Document identities derived from source paths

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::config::IdentityMode;

lazy_static! {
    /// Jekyll post file name: `YYYY-MM-DD-title`
    static ref POST_NAME: Regex = Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)$").unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("cannot derive a document identity from {path:?}")]
    UnresolvableIdentity { path: PathBuf },
}

/// Stable key of a logical document, shared by all of its revisions
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Validate a key that was already derived
    pub fn new(key: impl Into<String>) -> Result<Self, ResolutionError> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty()
            || trimmed == "."
            || trimmed == ".."
            || trimmed.chars().any(char::is_control)
        {
            return Err(ResolutionError::UnresolvableIdentity { path: key.into() });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derive the identity of a unit from its path relative to the source root
    pub fn from_path(path: &Path, mode: IdentityMode) -> Result<Self, ResolutionError> {
        let unresolvable = || ResolutionError::UnresolvableIdentity {
            path: path.to_path_buf(),
        };

        let key = match mode {
            IdentityMode::Stem => path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(unresolvable)?
                .to_string(),
            IdentityMode::Slug => {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .ok_or_else(unresolvable)?;
                slug::slugify(stem)
            }
            IdentityMode::Path => {
                let without_ext = path.with_extension("");
                let mut parts = Vec::new();
                for component in without_ext.components() {
                    match component {
                        Component::Normal(part) => {
                            parts.push(part.to_str().ok_or_else(unresolvable)?)
                        }
                        Component::CurDir => {}
                        _ => return Err(unresolvable()),
                    }
                }
                parts.join("/")
            }
        };

        Self::new(key).map_err(|_| unresolvable())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final segment of the identity (the file name part)
    fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Date encoded in a Jekyll post name, if any
    pub fn date(&self) -> Option<NaiveDate> {
        let caps = POST_NAME.captures(self.name())?;
        NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()
    }

    /// Title part of a Jekyll post name, or the whole name
    pub fn title_part(&self) -> &str {
        let name = self.name();
        match POST_NAME.captures(name).and_then(|caps| caps.get(2)) {
            Some(m) => &name[m.start()..],
            None => name,
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for DocumentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
