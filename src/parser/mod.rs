//! Parser for TOML family documents

pub mod document;

pub use document::{Document, LayoutOverrides, PartnershipEntry, PersonEntry};

use tracing::debug;

use crate::error::ParseError;

/// Parse a family document
pub fn parse(input: &str) -> Result<Document, ParseError> {
    let document: Document = toml::from_str(input)?;
    debug!(
        people = document.people.len(),
        partnerships = document.partnerships.len(),
        "document parsed"
    );
    Ok(document)
}
