//! Lookup response payload.
//!
//! A lookup answers with a JSON object whose `page` field lists page entries:
//!
//! ```json
//! {"page": [{"pid": "PP1", "src": "https://.../img?pg=PP1"}, {"pid": "PP2"}]}
//! ```
//!
//! Entries without `src` are pages the preview does not (yet) reveal.

use serde::{Deserialize, Serialize};

use super::ResolveError;
use crate::page::PageId;

/// Decoded lookup response. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupPayload {
    /// Page entries; `None` when the field is absent.
    #[serde(default)]
    pub page: Option<Vec<LookupEntry>>,
}

/// One page entry of a lookup response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    /// Page id token, e.g. `PA12`.
    pub pid: String,
    /// Image URL, present only for pages the preview reveals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

impl LookupEntry {
    /// Creates an entry that carries an image URL.
    #[must_use]
    pub fn sourced(pid: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            pid: pid.into(),
            src: Some(src.into()),
        }
    }

    /// Creates an entry without an image URL.
    #[must_use]
    pub fn gap(pid: impl Into<String>) -> Self {
        Self {
            pid: pid.into(),
            src: None,
        }
    }
}

impl LookupPayload {
    /// Creates a payload with the given entries.
    #[must_use]
    pub fn from_entries(entries: Vec<LookupEntry>) -> Self {
        Self {
            page: Some(entries),
        }
    }

    /// Parses every entry's id.
    ///
    /// `cursor` is only used for error context.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MalformedResponse`] when the page list is absent
    /// or empty, and [`ResolveError::InvalidPageId`] for an unparseable token.
    pub fn parse_entries(&self, cursor: PageId) -> Result<Vec<ParsedEntry>, ResolveError> {
        let entries = self
            .page
            .as_ref()
            .ok_or_else(|| ResolveError::malformed(cursor, "expected a 'page' list but it was not found"))?;
        if entries.is_empty() {
            return Err(ResolveError::malformed(cursor, "'page' list is empty"));
        }

        entries
            .iter()
            .map(|entry| -> Result<ParsedEntry, ResolveError> {
                Ok(ParsedEntry {
                    id: entry.pid.parse()?,
                    source_url: entry.src.clone().filter(|src| !src.is_empty()),
                })
            })
            .collect()
    }
}

/// A lookup entry with its id parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    /// Page id.
    pub id: PageId,
    /// Image URL, if revealed.
    pub source_url: Option<String>,
}
