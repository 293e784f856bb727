//! Request header profiles for Google Books.
//!
//! Lookups and image fetches carry different `Accept` and `Sec-Fetch-Dest`
//! values; everything else is shared so both phases look like one browser tab.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, USER_AGENT,
};
use tracing::{debug, warn};

use crate::user_agent::random_user_agent;

/// `Accept-Language` used when the locale cannot be determined.
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.6";

const LOOKUP_ACCEPT: &str = "application/json";
const PAGE_IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

/// Environment variables consulted for the locale, in priority order.
const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_MESSAGES", "LANG"];

#[allow(clippy::expect_used)]
static LOCALE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<lang>[A-Za-z]{2})_(?P<region>[A-Za-z]{2})").expect("locale regex is valid") // Static pattern, safe to panic
});

/// Kind of request a header profile is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// JSON page lookups.
    Lookup,
    /// Page image fetches.
    PageImage,
}

/// Pre-built header maps for both request kinds of one book.
#[derive(Debug, Clone)]
pub struct HeaderProfiles {
    lookup: HeaderMap,
    page_image: HeaderMap,
}

impl HeaderProfiles {
    /// Builds both profiles with a fixed User-Agent and `Accept-Language`.
    #[must_use]
    pub fn new(user_agent: &str, accept_language: &str) -> Self {
        Self {
            lookup: build_profile(HeaderKind::Lookup, user_agent, accept_language),
            page_image: build_profile(HeaderKind::PageImage, user_agent, accept_language),
        }
    }

    /// Builds both profiles with a random browser User-Agent and the
    /// `Accept-Language` of the current locale.
    #[must_use]
    pub fn from_environment() -> Self {
        let user_agent = random_user_agent();
        let accept_language = accept_language_from_env();
        debug!(user_agent, accept_language = %accept_language, "Built request header profiles");
        Self::new(user_agent, &accept_language)
    }

    /// Returns the header map for `kind`.
    #[must_use]
    pub fn get(&self, kind: HeaderKind) -> &HeaderMap {
        match kind {
            HeaderKind::Lookup => &self.lookup,
            HeaderKind::PageImage => &self.page_image,
        }
    }
}

fn build_profile(kind: HeaderKind, user_agent: &str, accept_language: &str) -> HeaderMap {
    let (accept, fetch_dest) = match kind {
        HeaderKind::Lookup => (LOOKUP_ACCEPT, "empty"),
        HeaderKind::PageImage => (PAGE_IMAGE_ACCEPT, "image"),
    };

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(accept));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static(fetch_dest),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(HeaderName::from_static("sec-gpc"), HeaderValue::from_static("1"));

    match HeaderValue::from_str(accept_language) {
        Ok(value) => {
            headers.insert(ACCEPT_LANGUAGE, value);
        }
        Err(_) => {
            warn!(accept_language, "Invalid Accept-Language; using default");
            headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE));
        }
    }
    match HeaderValue::from_str(user_agent) {
        Ok(value) => {
            headers.insert(USER_AGENT, value);
        }
        Err(_) => warn!("Invalid User-Agent; sending request without one"),
    }

    headers
}

/// Derives `Accept-Language` from `LC_ALL`, `LC_MESSAGES` or `LANG`.
#[must_use]
pub fn accept_language_from_env() -> String {
    LOCALE_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
        .and_then(|locale| accept_language_for_locale(&locale))
        .unwrap_or_else(|| DEFAULT_ACCEPT_LANGUAGE.to_string())
}

/// Maps a POSIX locale such as `en_GB.UTF-8` to `en-GB,en;q=0.6`.
///
/// Returns `None` for locales without a language and region (`C`, `POSIX`).
#[must_use]
pub fn accept_language_for_locale(locale: &str) -> Option<String> {
    let captures = LOCALE_PATTERN.captures(locale)?;
    let lang = captures.name("lang")?.as_str().to_ascii_lowercase();
    let region = captures.name("region")?.as_str().to_ascii_uppercase();
    Some(format!("{lang}-{region},{lang};q=0.6"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Test";

    #[test]
    fn test_accept_language_for_locale() {
        assert_eq!(accept_language_for_locale("en_GB.UTF-8").unwrap(), "en-GB,en;q=0.6");
        assert_eq!(accept_language_for_locale("de_AT").unwrap(), "de-AT,de;q=0.6");
        assert_eq!(accept_language_for_locale("fr_ca.ISO-8859-1@euro").unwrap(), "fr-CA,fr;q=0.6");
    }

    #[test]
    fn test_accept_language_for_bare_locales() {
        assert_eq!(accept_language_for_locale("C"), None);
        assert_eq!(accept_language_for_locale("POSIX"), None);
        assert_eq!(accept_language_for_locale("C.UTF-8"), None);
    }

    #[test]
    fn test_lookup_profile() {
        let profiles = HeaderProfiles::new(UA, "en-GB,en;q=0.6");
        let lookup = profiles.get(HeaderKind::Lookup);
        assert_eq!(lookup.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(lookup.get("sec-fetch-dest").unwrap(), "empty");
        assert_eq!(lookup.get(ACCEPT_LANGUAGE).unwrap(), "en-GB,en;q=0.6");
    }

    #[test]
    fn test_page_image_profile() {
        let profiles = HeaderProfiles::new(UA, "en-GB,en;q=0.6");
        let image = profiles.get(HeaderKind::PageImage);
        assert!(image.get(ACCEPT).unwrap().to_str().unwrap().starts_with("image/avif"));
        assert_eq!(image.get("sec-fetch-dest").unwrap(), "image");
    }

    #[test]
    fn test_profiles_share_browser_identity() {
        let profiles = HeaderProfiles::new(UA, "en-US,en;q=0.6");
        for kind in [HeaderKind::Lookup, HeaderKind::PageImage] {
            let headers = profiles.get(kind);
            assert_eq!(headers.get(USER_AGENT).unwrap(), UA);
            assert_eq!(headers.get(ACCEPT_ENCODING).unwrap(), "gzip");
            assert_eq!(headers.get("sec-fetch-mode").unwrap(), "cors");
            assert_eq!(headers.get("sec-fetch-site").unwrap(), "same-origin");
            assert_eq!(headers.get("sec-gpc").unwrap(), "1");
        }
    }

    #[test]
    fn test_invalid_accept_language_falls_back() {
        let profiles = HeaderProfiles::new(UA, "en\nGB");
        assert_eq!(
            profiles.get(HeaderKind::Lookup).get(ACCEPT_LANGUAGE).unwrap(),
            DEFAULT_ACCEPT_LANGUAGE
        );
    }

    #[test]
    fn test_from_environment_sets_user_agent() {
        let profiles = HeaderProfiles::from_environment();
        let ua = profiles.get(HeaderKind::Lookup).get(USER_AGENT).unwrap();
        assert!(ua.to_str().unwrap().starts_with("Mozilla/5.0"));
    }
}
