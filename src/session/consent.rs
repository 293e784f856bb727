//! Regional consent gate acknowledgement.
//!
//! Some providers set a consent cookie to a pending marker (for Google,
//! `CONSENT=PENDING+987`) and withhold content until the browser answers with
//! an acknowledgement token. [`ConsentGate`] describes that cookie and builds
//! the answer.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

#[allow(clippy::expect_used)]
static CONSENT_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+(?P<id>\d+)").expect("consent id regex is valid") // Static pattern, safe to panic
});

/// Description of a provider's consent cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentGate {
    /// Cookie that carries the consent state.
    pub cookie_name: &'static str,
    /// Substring identifying a not-yet-acknowledged value.
    pub pending_marker: &'static str,
    /// Acknowledgement prefix; the consent id is appended.
    pub token_prefix: &'static str,
}

impl ConsentGate {
    /// Returns true if `value` is still waiting for an acknowledgement.
    #[must_use]
    pub fn is_pending(&self, value: &str) -> bool {
        value.contains(self.pending_marker)
    }

    /// Extracts the numeric id embedded after the pending marker, if any.
    #[must_use]
    pub fn pending_id<'v>(&self, value: &'v str) -> Option<&'v str> {
        let rest = &value[value.find(self.pending_marker)? + self.pending_marker.len()..];
        CONSENT_ID_PATTERN
            .captures(rest)
            .and_then(|caps| caps.name("id"))
            .map(|m| m.as_str())
    }

    /// Builds the acknowledgement token for a pending value.
    ///
    /// Reuses the pending id when present, otherwise draws a random
    /// three-digit id.
    #[must_use]
    pub fn acknowledge(&self, pending_value: &str) -> String {
        self.acknowledge_with(pending_value, || rand::thread_rng().gen_range(100..=999))
    }

    /// Same as [`acknowledge`](Self::acknowledge) with an explicit id source.
    #[must_use]
    pub fn acknowledge_with(&self, pending_value: &str, fallback_id: impl FnOnce() -> u16) -> String {
        match self.pending_id(pending_value) {
            Some(id) => format!("{}{id}", self.token_prefix),
            None => format!("{}{}", self.token_prefix, fallback_id()),
        }
    }
}
