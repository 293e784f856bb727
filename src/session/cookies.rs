//! `Set-Cookie` handling on top of reqwest's cookie jar.
//!
//! The jar owns attribute parsing (domain, path, expiry). This module only
//! locates the name and value of a header so the session can rewrite the
//! consent cookie before the jar sees it.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
use tracing::{debug, warn};

/// One `Set-Cookie` header, split into its leading pair and the attributes.
///
/// The value is redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct SetCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value, exactly as sent.
    pub value: String,
    attributes: String,
}

impl SetCookie {
    /// Splits a raw `name=value; attr...` header.
    ///
    /// Returns `None` when there is no `=` or the name is empty.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (pair, attributes) = match raw.find(';') {
            Some(index) => raw.split_at(index),
            None => (raw, ""),
        };
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
            attributes: attributes.to_string(),
        })
    }

    /// Same cookie with a different value; attributes are kept.
    #[must_use]
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..self.clone()
        }
    }

    /// Renders the header back for the cookie jar.
    #[must_use]
    pub fn to_header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&format!("{}={}{}", self.name, self.value, self.attributes)).ok()
    }
}

impl fmt::Debug for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetCookie")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// Session-affecting values carried by one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDelta {
    /// `Set-Cookie` headers in response order.
    pub cookies: Vec<SetCookie>,
}

impl SessionDelta {
    /// Returns true if the response carried nothing session-affecting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Collects every well-formed `Set-Cookie` header of a response, in order.
#[must_use]
pub fn absorb_session_headers(headers: &HeaderMap) -> SessionDelta {
    let mut cookies = Vec::new();

    for raw in headers.get_all(SET_COOKIE) {
        let Ok(raw) = raw.to_str() else {
            warn!("Skipping Set-Cookie header with non-ASCII content");
            continue;
        };
        match SetCookie::parse(raw) {
            Some(cookie) => {
                debug!(cookie = %cookie.name, "Received session cookie");
                cookies.push(cookie);
            }
            None => warn!("Skipping malformed Set-Cookie header"),
        }
    }

    SessionDelta { cookies }
}

/// Finds a cookie's value in a `Cookie` request header value.
#[must_use]
pub fn cookie_value(header: &HeaderValue, name: &str) -> Option<String> {
    header
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers_with(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(SET_COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn test_parse_keeps_value_and_attributes() {
        let cookie = SetCookie::parse("NID=511=abc; expires=Fri, 01-Jan-2038 00:00:00 GMT; path=/; HttpOnly").unwrap();
        assert_eq!(cookie.name, "NID");
        assert_eq!(cookie.value, "511=abc");
        assert_eq!(
            cookie.to_header_value().unwrap(),
            "NID=511=abc; expires=Fri, 01-Jan-2038 00:00:00 GMT; path=/; HttpOnly"
        );
    }

    #[test]
    fn test_parse_leaves_quoted_value_alone() {
        let cookie = SetCookie::parse("A=\"quoted\"; path=/").unwrap();
        assert_eq!(cookie.value, "\"quoted\"");
    }

    #[test]
    fn test_with_value_keeps_domain_and_path() {
        let cookie = SetCookie::parse("CONSENT=PENDING+1; domain=.google.com; path=/").unwrap();
        assert_eq!(
            cookie.with_value("YES+1").to_header_value().unwrap(),
            "CONSENT=YES+1; domain=.google.com; path=/"
        );
    }

    #[test]
    fn test_absorb_session_headers_keeps_order_and_skips_malformed() {
        let headers = headers_with(&["NID=1; path=/", "no-equals-sign", "=nameless", "CONSENT=PENDING+123"]);
        let names: Vec<String> = absorb_session_headers(&headers).cookies.into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["NID", "CONSENT"]);
    }

    #[test]
    fn test_absorb_session_headers_empty() {
        assert!(absorb_session_headers(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn test_cookie_value_finds_named_pair() {
        let header = HeaderValue::from_static("A=1; NID=511=abc");
        assert_eq!(cookie_value(&header, "NID").as_deref(), Some("511=abc"));
        assert_eq!(cookie_value(&header, "B"), None);
    }

    #[test]
    fn test_set_cookie_debug_redacts_value() {
        let cookie = SetCookie::parse("SID=top-secret; path=/").unwrap();
        let rendered = format!("{cookie:?}");
        assert!(rendered.contains("SID"));
        assert!(!rendered.contains("top-secret"), "value leaked: {rendered}");
    }
}
