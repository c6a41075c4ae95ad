//! Front-matter parsing
//!
//! A content unit is an opening `---` line, a YAML key/value block, a closing
//! `---` (or `...`) line, then the body. Values are restricted to scalars and
//! flat sequences of scalars.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced while splitting a content unit into front matter and body
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("missing front matter block")]
    MissingFrontMatter,

    #[error("malformed front matter marker on line {line}: {found:?}")]
    MalformedMarker { line: usize, found: String },

    #[error("invalid front matter: {0}")]
    InvalidMetadata(String),

    #[error("unsupported value for front matter key {key:?}")]
    UnsupportedValue { key: String },
}

/// Non-fatal findings recorded while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A top-level key appeared more than once; the later value was kept
    DuplicateKey { key: String, line: usize },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::DuplicateKey { key, line } => {
                write!(f, "duplicate front matter key {:?} on line {}", key, line)
            }
        }
    }
}

/// A single front-matter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontMatterValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<FrontMatterValue>),
}

impl FrontMatterValue {
    /// Convert a YAML value, rejecting mappings, tags and nested sequences
    pub fn from_yaml(value: serde_yaml::Value) -> Option<Self> {
        match value {
            serde_yaml::Value::Sequence(items) => items
                .into_iter()
                .map(Self::scalar_from_yaml)
                .collect::<Option<Vec<_>>>()
                .map(FrontMatterValue::Sequence),
            other => Self::scalar_from_yaml(other),
        }
    }

    fn scalar_from_yaml(value: serde_yaml::Value) -> Option<Self> {
        match value {
            serde_yaml::Value::Null => Some(FrontMatterValue::Null),
            serde_yaml::Value::Bool(b) => Some(FrontMatterValue::Bool(b)),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(FrontMatterValue::Integer(i)),
                None => n.as_f64().map(FrontMatterValue::Float),
            },
            serde_yaml::Value::String(s) => Some(FrontMatterValue::String(s)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FrontMatterValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FrontMatterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Render a scalar the way it would read in a listing
    fn display_scalar(&self) -> Option<String> {
        match self {
            FrontMatterValue::Null | FrontMatterValue::Sequence(_) => None,
            FrontMatterValue::Bool(b) => Some(b.to_string()),
            FrontMatterValue::Integer(i) => Some(i.to_string()),
            FrontMatterValue::Float(f) => Some(f.to_string()),
            FrontMatterValue::String(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for FrontMatterValue {
    fn from(s: &str) -> Self {
        FrontMatterValue::String(s.to_string())
    }
}

/// Ordered front-matter mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrontMatter(IndexMap<String, FrontMatterValue>);

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FrontMatterValue> {
        self.0.get(key)
    }

    /// Insert a value; an existing key keeps its position
    pub fn insert(&mut self, key: impl Into<String>, value: FrontMatterValue) {
        self.0.insert(key.into(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FrontMatterValue)> {
        self.0.iter()
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(FrontMatterValue::as_str)
    }

    /// Documents are published unless `published: false` is set
    pub fn is_published(&self) -> bool {
        self.get("published")
            .and_then(FrontMatterValue::as_bool)
            .unwrap_or(true)
    }

    /// Tags as a list; a plain string is split on whitespace like Jekyll does
    pub fn tags(&self) -> Vec<String> {
        match self.get("tags") {
            Some(FrontMatterValue::String(s)) => s.split_whitespace().map(String::from).collect(),
            Some(FrontMatterValue::Sequence(items)) => {
                items.iter().filter_map(|v| v.display_scalar()).collect()
            }
            Some(other) => other.display_scalar().into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Serialize as a YAML block (without markers)
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        if self.is_empty() {
            return Ok(String::new());
        }
        serde_yaml::to_string(&self.0)
    }
}

impl FromIterator<(String, FrontMatterValue)> for FrontMatter {
    fn from_iter<T: IntoIterator<Item = (String, FrontMatterValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Result of parsing one content unit
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub front_matter: FrontMatter,
    /// The metadata block exactly as it appeared between the markers
    pub raw_front_matter: String,
    pub body: String,
    pub warnings: Vec<ParseWarning>,
}

/// Split a content unit into front matter and body
pub fn parse(raw: &str) -> Result<ParsedDocument, ParseError> {
    let content = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let (opening, rest) = next_line(content);
    if !opening.starts_with("---") {
        return Err(ParseError::MissingFrontMatter);
    }
    if opening.trim_end() != "---" {
        return Err(ParseError::MalformedMarker {
            line: 1,
            found: opening.to_string(),
        });
    }

    // Find the closing marker
    let mut offset = 0;
    let (block, body) = loop {
        if offset >= rest.len() {
            return Err(ParseError::MissingFrontMatter);
        }
        let (line, remainder) = next_line(&rest[offset..]);
        if is_closing_marker(line) {
            break (&rest[..offset], remainder);
        }
        offset = rest.len() - remainder.len();
    };

    let (yaml, warnings) = dedupe_top_level_keys(block);
    let front_matter = parse_metadata(&yaml)?;

    Ok(ParsedDocument {
        front_matter,
        raw_front_matter: block.to_string(),
        body: body.to_string(),
        warnings,
    })
}

/// Returns the first line (without its terminator) and everything after it
fn next_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(pos) => (s[..pos].trim_end_matches('\r'), &s[pos + 1..]),
        None => (s.trim_end_matches('\r'), ""),
    }
}

fn is_closing_marker(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed == "---" || trimmed == "..."
}

fn parse_metadata(yaml: &str) -> Result<FrontMatter, ParseError> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::new());
    }

    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| ParseError::InvalidMetadata(e.to_string()))?;

    let mapping = match value {
        serde_yaml::Value::Mapping(mapping) => mapping,
        // A block holding only comments
        serde_yaml::Value::Null => return Ok(FrontMatter::new()),
        _ => {
            return Err(ParseError::InvalidMetadata(
                "front matter must be a mapping".to_string(),
            ))
        }
    };

    let mut front_matter = FrontMatter::new();
    for (key, value) in mapping {
        let key = match key {
            serde_yaml::Value::String(s) => s,
            other => {
                return Err(ParseError::InvalidMetadata(format!(
                    "front matter keys must be strings, found {:?}",
                    other
                )))
            }
        };
        let value = FrontMatterValue::from_yaml(value)
            .ok_or_else(|| ParseError::UnsupportedValue { key: key.clone() })?;
        front_matter.insert(key, value);
    }

    Ok(front_matter)
}

/// Extract the key from a top-level `key: value` line
fn top_level_key(line: &str) -> Option<String> {
    let first = line.chars().next()?;
    if first.is_whitespace() || matches!(first, '#' | '-' | '{' | '[' | '?' | '|' | '>') {
        return None;
    }

    if first == '"' || first == '\'' {
        let close = line[1..].find(first)? + 1;
        let after = &line[close + 1..];
        return after
            .trim_start()
            .starts_with(':')
            .then(|| line[1..close].to_string());
    }

    let colon = line
        .char_indices()
        .find(|(i, c)| *c == ':' && line[i + 1..].chars().next().map_or(true, char::is_whitespace))
        .map(|(i, _)| i)?;
    let key = line[..colon].trim_end();
    (!key.is_empty()).then(|| key.to_string())
}

/// Collapse repeated top-level keys so the last value wins.
///
/// The block is returned untouched when no key repeats.
fn dedupe_top_level_keys(block: &str) -> (String, Vec<ParseWarning>) {
    let mut preamble: Vec<&str> = Vec::new();
    let mut entries: IndexMap<String, Vec<&str>> = IndexMap::new();
    let mut current: Option<String> = None;
    let mut warnings = Vec::new();

    for (index, line) in block.lines().enumerate() {
        if let Some(key) = top_level_key(line) {
            if entries.contains_key(&key) {
                warnings.push(ParseWarning::DuplicateKey {
                    key: key.clone(),
                    // Marker is line 1
                    line: index + 2,
                });
            }
            entries.insert(key.clone(), vec![line]);
            current = Some(key);
            continue;
        }

        match current.as_ref().and_then(|key| entries.get_mut(key)) {
            Some(lines) => lines.push(line),
            None => preamble.push(line),
        }
    }

    if warnings.is_empty() {
        return (block.to_string(), warnings);
    }

    let mut yaml = String::with_capacity(block.len());
    for line in preamble.into_iter().chain(entries.into_values().flatten()) {
        yaml.push_str(line);
        yaml.push('\n');
    }
    (yaml, warnings)
}
