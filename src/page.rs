//! Page identifiers and resolved pages.
//!
//! A [`PageId`] is the position of a page in a book: a [`PageKind`] (the
//! section of the book) and a sequence number within that section. Ids are
//! written as a two-letter code followed by digits, e.g. `PP1`, `PA42`.
//!
//! # Example
//!
//! ```
//! use gbooks_dl_core::page::{PageId, PageKind};
//!
//! let id: PageId = "PA12".parse().unwrap();
//! assert_eq!(id.kind(), PageKind::Body);
//! assert_eq!(id.number(), 12);
//! assert_eq!(id.next().to_string(), "PA13");
//! assert!("PP3".parse::<PageId>().unwrap() < id);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::ParseError;

#[allow(clippy::expect_used)]
static PAGE_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<kind>[A-Z]{2})(?P<num>\d+)$").expect("page id regex is valid") // Static pattern, safe to panic
});

/// Section of a book a page belongs to.
///
/// Declaration order is the reading order, so the derived `Ord` sorts
/// front cover < inserts < body < back cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageKind {
    /// Front cover and front matter (`PP`).
    CoverFront,
    /// Inserts between front matter and body (`PR`).
    CoverInsert,
    /// Body of the book (`PA`).
    Body,
    /// Back cover and back matter (`PT`).
    CoverBack,
}

impl PageKind {
    /// All kinds in reading order.
    pub const ALL: [PageKind; 4] = [
        PageKind::CoverFront,
        PageKind::CoverInsert,
        PageKind::Body,
        PageKind::CoverBack,
    ];

    /// Returns the two-letter code used in page tokens.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            PageKind::CoverFront => "PP",
            PageKind::CoverInsert => "PR",
            PageKind::Body => "PA",
            PageKind::CoverBack => "PT",
        }
    }

    /// Looks up a kind by its two-letter code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

/// Position of a page within a book.
///
/// Ordered by kind first, then by sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageId {
    kind: PageKind,
    number: u32,
}

impl PageId {
    /// Creates a page id.
    #[must_use]
    pub const fn new(kind: PageKind, number: u32) -> Self {
        Self { kind, number }
    }

    /// The first page of a book, `PP1`.
    #[must_use]
    pub const fn first() -> Self {
        Self::new(PageKind::CoverFront, 1)
    }

    /// Returns the section this page belongs to.
    #[must_use]
    pub fn kind(self) -> PageKind {
        self.kind
    }

    /// Returns the sequence number within the section.
    #[must_use]
    pub fn number(self) -> u32 {
        self.number
    }

    /// Returns the id with the same kind and the next sequence number.
    ///
    /// Never moves to another kind.
    #[must_use]
    pub fn next(self) -> Self {
        Self::new(self.kind, self.number.saturating_add(1))
    }
}

impl FromStr for PageId {
    type Err = ParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let caps = PAGE_ID_PATTERN.captures(token).ok_or_else(|| {
            ParseError::invalid_page_id(token, "expected a two-letter code followed by digits")
        })?;

        let code = &caps["kind"];
        let kind = PageKind::from_code(code).ok_or_else(|| {
            ParseError::invalid_page_id(
                token,
                format!("unknown category code '{code}' (known: PP, PR, PA, PT)"),
            )
        })?;

        let number = caps["num"].parse::<u32>().map_err(|e| {
            ParseError::invalid_page_id(token, format!("sequence number out of range: {e}"))
        })?;

        Ok(Self::new(kind, number))
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.code(), self.number)
    }
}

/// A page whose image can be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Position of the page in the book.
    pub id: PageId,
    /// URL of the page image.
    pub source_url: String,
}

impl Page {
    /// Creates a page.
    #[must_use]
    pub fn new(id: PageId, source_url: impl Into<String>) -> Self {
        Self {
            id,
            source_url: source_url.into(),
        }
    }
}
