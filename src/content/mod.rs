//! Content module - parsing, identities, revisions and resolution

pub mod frontmatter;
mod identity;
pub mod loader;
pub mod resolver;
mod revision;

pub use frontmatter::{FrontMatter, FrontMatterValue, ParseError, ParseWarning, ParsedDocument};
pub use identity::{DocumentId, ResolutionError};
pub use resolver::{ContentUnit, IngestReport, ParsedUnit, Resolution, Resolver};
pub use revision::{Revision, RevisionCandidate};
