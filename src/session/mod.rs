//! Session continuity across lookup and download requests.
//!
//! A [`SessionState`] keeps the cookies every response hands out in a
//! [`reqwest::cookie::Jar`] and replays the ones that match the next request's
//! URL. It is created once per book and shared by both phases through
//! [`SharedSession`].
//!
//! # Example
//!
//! ```
//! use gbooks_dl_core::session::SessionState;
//! use reqwest::header::{COOKIE, HeaderMap, HeaderValue, SET_COOKIE};
//! use url::Url;
//!
//! let url = Url::parse("https://books.google.com/books?id=abc").unwrap();
//! let mut session = SessionState::new();
//! let mut response = HeaderMap::new();
//! response.insert(SET_COOKIE, HeaderValue::from_static("NID=42; path=/"));
//! session.absorb(&response, &url);
//!
//! let mut request = HeaderMap::new();
//! session.apply_to(&mut request, &url);
//! assert_eq!(request.get(COOKIE).unwrap(), "NID=42");
//! ```

mod consent;
mod cookies;

pub use consent::ConsentGate;
pub use cookies::{SessionDelta, SetCookie, absorb_session_headers, cookie_value};

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{COOKIE, HeaderMap};
use tracing::{debug, info, warn};
use url::Url;

/// Session state shared by every request of one run.
///
/// Lock it only for the duration of an `apply_to` or `absorb` call; never
/// hold the guard across an await point.
pub type SharedSession = Arc<Mutex<SessionState>>;

/// Cookie jar and consent progress for one remote session.
#[derive(Default)]
pub struct SessionState {
    jar: Jar,
    consent: Option<ConsentGate>,
    consent_applied: bool,
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("consent", &self.consent)
            .field("consent_applied", &self.consent_applied)
            .finish_non_exhaustive()
    }
}

impl SessionState {
    /// Creates an empty session with no consent handling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty session that answers the given consent gate.
    #[must_use]
    pub fn with_consent_gate(gate: ConsentGate) -> Self {
        Self {
            consent: Some(gate),
            ..Self::default()
        }
    }

    /// Wraps the session for sharing between the resolver and downloader.
    #[must_use]
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Returns the value of a cookie that would be sent to `url`.
    #[must_use]
    pub fn cookie(&self, name: &str, url: &Url) -> Option<String> {
        self.jar.cookies(url).and_then(|header| cookie_value(&header, name))
    }

    /// Returns true once a consent acknowledgement has been stored.
    #[must_use]
    pub fn consent_applied(&self) -> bool {
        self.consent_applied
    }

    /// Sets the `Cookie` header of a request to `url` from the jar.
    ///
    /// A `Cookie` header already on the request is replaced; every other
    /// request header is left as is.
    pub fn apply_to(&self, headers: &mut HeaderMap, url: &Url) {
        if let Some(cookie) = self.jar.cookies(url) {
            headers.insert(COOKIE, cookie);
        }
    }

    /// Stores the cookies of a response received from `url`.
    pub fn absorb(&mut self, response_headers: &HeaderMap, url: &Url) {
        let delta = absorb_session_headers(response_headers);
        self.merge(delta, url);
    }

    /// Merges a delta into the jar as if received from `url`.
    ///
    /// A pending consent cookie is replaced by its acknowledgement before it
    /// reaches the jar. Once an acknowledgement is stored, later pending
    /// values are ignored for the rest of the session.
    pub fn merge(&mut self, delta: SessionDelta, url: &Url) {
        let mut accepted = Vec::new();

        for cookie in delta.cookies {
            let cookie = match self.consent.as_ref() {
                Some(gate) if cookie.name == gate.cookie_name && gate.is_pending(&cookie.value) => {
                    if self.consent_applied {
                        debug!(cookie = %cookie.name, "Ignoring pending consent after acknowledgement");
                        continue;
                    }
                    let token = gate.acknowledge(&cookie.value);
                    info!(cookie = gate.cookie_name, "Acknowledged consent gate");
                    self.consent_applied = true;
                    cookie.with_value(token)
                }
                _ => cookie,
            };
            match cookie.to_header_value() {
                Some(value) => accepted.push(value),
                None => warn!(cookie = %cookie.name, "Skipping cookie with invalid characters"),
            }
        }

        if !accepted.is_empty() {
            self.jar.set_cookies(&mut accepted.iter(), url);
        }
    }
}

/// Runs `f` with the session locked.
///
/// A poisoned lock is recovered: session data stays usable even if another
/// task panicked while holding it.
pub fn with_session<T>(session: &SharedSession, f: impl FnOnce(&mut SessionState) -> T) -> T {
    let mut guard = session.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::header::{ACCEPT, HeaderValue, SET_COOKIE};

    fn google_gate() -> ConsentGate {
        ConsentGate {
            cookie_name: "CONSENT",
            pending_marker: "PENDING",
            token_prefix: "YES+cb.20210328-17-p0.en+FX+",
        }
    }

    fn books_url() -> Url {
        Url::parse("https://books.google.com/books?id=abc").unwrap()
    }

    fn set_cookies(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(SET_COOKIE, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    fn sent_cookie(session: &SessionState, url: &Url) -> Option<String> {
        let mut request = HeaderMap::new();
        session.apply_to(&mut request, url);
        request.get(COOKIE).map(|v| v.to_str().unwrap().to_string())
    }

    #[test]
    fn test_absorb_then_apply_sends_every_cookie() {
        let url = books_url();
        let mut session = SessionState::new();
        session.absorb(&set_cookies(&["A=1; path=/", "B=2; path=/"]), &url);

        let mut pairs: Vec<String> = sent_cookie(&session, &url)
            .unwrap()
            .split("; ")
            .map(str::to_owned)
            .collect();
        pairs.sort();
        assert_eq!(pairs, ["A=1", "B=2"]);
    }

    #[test]
    fn test_later_cookie_overwrites_earlier() {
        let url = books_url();
        let mut session = SessionState::new();
        session.absorb(&set_cookies(&["A=1; path=/"]), &url);
        session.absorb(&set_cookies(&["A=2; path=/"]), &url);
        assert_eq!(sent_cookie(&session, &url).as_deref(), Some("A=2"));
    }

    #[test]
    fn test_cookie_deleted_by_server_is_no_longer_sent() {
        let url = books_url();
        let mut session = SessionState::new();
        session.absorb(&set_cookies(&["SID=secret; path=/"]), &url);
        assert_eq!(session.cookie("SID", &url).as_deref(), Some("secret"));

        session.absorb(
            &set_cookies(&["SID=deleted; Max-Age=0; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/"]),
            &url,
        );
        assert_eq!(sent_cookie(&session, &url), None);
        assert_eq!(session.cookie("SID", &url), None);
    }

    #[test]
    fn test_cookie_with_past_expiry_is_not_stored() {
        let url = books_url();
        let mut session = SessionState::new();
        session.absorb(&set_cookies(&["OLD=1; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/"]), &url);
        assert_eq!(sent_cookie(&session, &url), None);
    }

    #[test]
    fn test_cookie_is_not_sent_to_other_hosts() {
        let url = books_url();
        let mut session = SessionState::new();
        session.absorb(&set_cookies(&["NID=42; path=/"]), &url);

        let other = Url::parse("https://books.example.org/books?id=abc").unwrap();
        assert_eq!(sent_cookie(&session, &other), None);
    }

    #[test]
    fn test_domain_cookie_is_sent_to_sibling_host() {
        let url = books_url();
        let mut session = SessionState::new();
        session.absorb(&set_cookies(&["NID=42; domain=.google.com; path=/"]), &url);

        let images = Url::parse("https://books.googleusercontent.com/x").unwrap();
        let sibling = Url::parse("https://www.google.com/books/content?id=abc").unwrap();
        assert_eq!(sent_cookie(&session, &sibling).as_deref(), Some("NID=42"));
        assert_eq!(sent_cookie(&session, &images), None);
    }

    #[test]
    fn test_apply_to_keeps_unrelated_request_headers() {
        let url = books_url();
        let mut session = SessionState::new();
        session.absorb(&set_cookies(&["A=1; path=/"]), &url);
        let mut request = HeaderMap::new();
        request.insert(ACCEPT, HeaderValue::from_static("application/json"));

        session.apply_to(&mut request, &url);
        assert_eq!(request.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(request.get(COOKIE).unwrap(), "A=1");
    }

    #[test]
    fn test_apply_to_session_cookie_replaces_request_cookie() {
        let url = books_url();
        let mut session = SessionState::new();
        session.absorb(&set_cookies(&["A=1; path=/"]), &url);
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_static("stale=1"));

        session.apply_to(&mut request, &url);
        assert_eq!(request.get(COOKIE).unwrap(), "A=1");
    }

    #[test]
    fn test_apply_to_without_cookies_leaves_cookie_header_alone() {
        let session = SessionState::new();
        assert_eq!(sent_cookie(&session, &books_url()), None);
    }

    #[test]
    fn test_pending_consent_acknowledged_with_embedded_id() {
        let url = books_url();
        let mut session = SessionState::with_consent_gate(google_gate());
        session.absorb(&set_cookies(&["CONSENT=PENDING+555; path=/"]), &url);
        assert_eq!(
            session.cookie("CONSENT", &url).as_deref(),
            Some("YES+cb.20210328-17-p0.en+FX+555")
        );
        assert!(session.consent_applied());
    }

    #[test]
    fn test_acknowledged_consent_keeps_cookie_domain() {
        let url = books_url();
        let mut session = SessionState::with_consent_gate(google_gate());
        session.absorb(&set_cookies(&["CONSENT=PENDING+555; domain=.google.com; path=/"]), &url);

        let sibling = Url::parse("https://www.google.com/").unwrap();
        assert_eq!(
            session.cookie("CONSENT", &sibling).as_deref(),
            Some("YES+cb.20210328-17-p0.en+FX+555")
        );
    }

    #[test]
    fn test_pending_consent_without_id_gets_random_three_digits() {
        let url = books_url();
        let mut session = SessionState::with_consent_gate(google_gate());
        session.absorb(&set_cookies(&["CONSENT=PENDING; path=/"]), &url);
        let value = session.cookie("CONSENT", &url).unwrap();
        let id: u16 = value
            .strip_prefix("YES+cb.20210328-17-p0.en+FX+")
            .unwrap()
            .parse()
            .unwrap();
        assert!((100..=999).contains(&id));
    }

    #[test]
    fn test_consent_applied_once_per_session() {
        let url = books_url();
        let mut session = SessionState::with_consent_gate(google_gate());
        session.absorb(&set_cookies(&["CONSENT=PENDING+111; path=/"]), &url);
        session.absorb(&set_cookies(&["CONSENT=PENDING+222; path=/"]), &url);
        assert_eq!(
            session.cookie("CONSENT", &url).as_deref(),
            Some("YES+cb.20210328-17-p0.en+FX+111")
        );
    }

    #[test]
    fn test_non_pending_consent_left_untouched() {
        let url = books_url();
        let mut session = SessionState::with_consent_gate(google_gate());
        session.absorb(&set_cookies(&["CONSENT=YES+already; path=/"]), &url);
        assert_eq!(session.cookie("CONSENT", &url).as_deref(), Some("YES+already"));
        assert!(!session.consent_applied());
    }

    #[test]
    fn test_session_without_gate_keeps_pending_value() {
        let url = books_url();
        let mut session = SessionState::new();
        session.absorb(&set_cookies(&["CONSENT=PENDING+1; path=/"]), &url);
        assert_eq!(session.cookie("CONSENT", &url).as_deref(), Some("PENDING+1"));
    }

    #[test]
    fn test_with_session_mutates_shared_state() {
        let url = books_url();
        let shared = SessionState::new().into_shared();
        with_session(&shared, |s| s.absorb(&set_cookies(&["A=1; path=/"]), &url));
        assert_eq!(with_session(&shared, |s| s.cookie("A", &url)).as_deref(), Some("1"));
    }
}
