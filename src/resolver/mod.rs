//! Page discovery through repeated lookups.
//!
//! The lookup endpoint reveals page ids in irregular chunks: a response lists
//! many ids but only carries image URLs for some of them. [`PageResolver`]
//! keeps querying, merging what each response reveals, until the next page it
//! would query is already the largest id the server has admitted to.
//!
//! # Architecture
//!
//! - [`LookupSource`] - Async trait for "send one lookup for this page id"
//! - [`LookupPayload`] / [`LookupEntry`] - Decoded lookup response
//! - [`PageResolver`] - The resolution loop
//!
//! # Cursor policy
//!
//! After every response the cursor either jumps to the largest page collected
//! so far (when the response proves there is more ahead and the jump moves
//! forward) or steps by one. Stepping stays within the cursor's section unless
//! nothing more of that section has been revealed, in which case it moves to
//! the first revealed id of a later section.

mod error;
mod payload;

pub use error::ResolveError;
pub use payload::{LookupEntry, LookupPayload, ParsedEntry};

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::config::DEFAULT_MAX_LOOKUPS;
use crate::page::{Page, PageId};
use crate::progress::ProgressObserver;

/// A source of lookup responses, usually an HTTP endpoint.
///
/// Implementations own the transport concerns: status checks, session
/// cookies, body decoding.
#[async_trait]
pub trait LookupSource: Send + Sync {
    /// Sends one lookup for `cursor` and returns the decoded payload.
    async fn lookup(&self, cursor: PageId) -> Result<LookupPayload, ResolveError>;
}

/// Drives lookups until the page set is exhausted.
pub struct PageResolver<'a> {
    source: &'a dyn LookupSource,
    max_lookups: usize,
}

impl<'a> PageResolver<'a> {
    /// Creates a resolver over `source` with the default lookup budget.
    #[must_use]
    pub fn new(source: &'a dyn LookupSource) -> Self {
        Self {
            source,
            max_lookups: DEFAULT_MAX_LOOKUPS,
        }
    }

    /// Sets the maximum number of lookups before giving up.
    #[must_use]
    pub fn with_max_lookups(mut self, max_lookups: usize) -> Self {
        self.max_lookups = max_lookups.max(1);
        self
    }

    /// Resolves every downloadable page, sorted by page id.
    ///
    /// # Errors
    ///
    /// Any lookup failure, malformed payload, or an exhausted lookup budget
    /// aborts resolution; no partial list is returned.
    #[instrument(skip(self, observer), fields(max_lookups = self.max_lookups))]
    pub async fn resolve(&self, observer: &dyn ProgressObserver) -> Result<Vec<Page>, ResolveError> {
        let mut state = ResolutionState::new();

        for _ in 0..self.max_lookups {
            observer.lookup_issued(state.cursor);
            let payload = self.source.lookup(state.cursor).await?;
            let entries = payload.parse_entries(state.cursor)?;

            let step = state.absorb(&entries);
            if step.max_changed {
                observer.max_page_found(step.response_max);
            }
            debug!(
                cursor = %state.cursor,
                response_max = %step.response_max,
                collected = state.collected.len(),
                "Lookup merged"
            );

            if step.done {
                let pages = state.into_pages();
                info!(pages = pages.len(), "Resolution complete");
                return Ok(pages);
            }
        }

        Err(ResolveError::LookupBudgetExhausted {
            limit: self.max_lookups,
            cursor: state.cursor,
        })
    }
}

/// Outcome of merging one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    response_max: PageId,
    max_changed: bool,
    done: bool,
}

/// Resolver bookkeeping. `collected` only grows; `cursor` only moves forward.
#[derive(Debug)]
struct ResolutionState {
    collected: BTreeMap<PageId, Page>,
    revealed: BTreeSet<PageId>,
    cursor: PageId,
    known_max: Option<PageId>,
}

impl ResolutionState {
    fn new() -> Self {
        Self {
            collected: BTreeMap::new(),
            revealed: BTreeSet::new(),
            cursor: PageId::first(),
            known_max: None,
        }
    }

    /// Merges a non-empty entry list and advances the cursor.
    fn absorb(&mut self, entries: &[ParsedEntry]) -> Step {
        let mut any_sourced = false;
        for entry in entries {
            self.revealed.insert(entry.id);
            if let Some(url) = &entry.source_url {
                any_sourced = true;
                self.collected.insert(entry.id, Page::new(entry.id, url.clone()));
            }
        }

        let response_max = entries
            .iter()
            .map(|entry| entry.id)
            .max()
            .unwrap_or(self.cursor);

        let max_changed = self.known_max != Some(response_max);
        if max_changed {
            self.known_max = Some(response_max);
        }

        let next = if any_sourced && response_max > self.cursor {
            match self.collected.keys().next_back() {
                Some(&furthest) if furthest > self.cursor => furthest,
                _ => self.fallback_step(),
            }
        } else {
            self.fallback_step()
        };
        self.cursor = next;

        Step {
            response_max,
            max_changed,
            done: next >= response_max,
        }
    }

    /// Steps one page forward, crossing into a later section only when the
    /// current section has nothing more revealed.
    fn fallback_step(&self) -> PageId {
        let next = self.cursor.next();
        match self.revealed.range(next..).next() {
            Some(&ahead) if ahead.kind() != self.cursor.kind() => ahead,
            _ => next,
        }
    }

    fn into_pages(self) -> Vec<Page> {
        self.collected.into_values().collect()
    }
}
