//! Book URL validation and query extraction.

use tracing::debug;
use url::Url;

use super::error::{MAX_URL_LENGTH, ParseError};

/// Validates a book URL and returns it parsed.
///
/// # Validation rules:
/// - Must not exceed `MAX_URL_LENGTH` (2000 chars)
/// - Must be parseable by the `url` crate
/// - Must use http or https scheme
/// - Must have a host
///
/// # Errors
///
/// Returns [`ParseError::InvalidUrl`] when any rule is violated.
pub fn parse_book_url(raw: &str) -> Result<Url, ParseError> {
    let raw = raw.trim();
    if raw.len() > MAX_URL_LENGTH {
        return Err(ParseError::too_long(raw));
    }

    let parsed = Url::parse(raw).map_err(|e| ParseError::malformed(raw, &e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(ParseError::unsupported_scheme(raw, scheme)),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ParseError::no_host(raw));
    }

    debug!(url = %parsed, "book URL validated");
    Ok(parsed)
}

/// Returns the first non-empty value of query parameter `name`.
///
/// # Errors
///
/// Returns [`ParseError::MissingQueryParam`] when the parameter is absent or empty.
pub fn required_query_param(url: &Url, name: &str) -> Result<String, ParseError> {
    url.query_pairs()
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| ParseError::missing_query_param(url.as_str(), name))
}

/// Splits the URL's hostname on `.` and returns the first label found in `known`.
///
/// `books.google.co.uk` yields `google` when `google` is known.
#[must_use]
pub fn match_host_label<'a>(url: &Url, known: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let host = url.host_str()?;
    let known: Vec<&'a str> = known.into_iter().collect();
    host.split('.')
        .find_map(|label| known.iter().copied().find(|name| name.eq_ignore_ascii_case(label)))
}
