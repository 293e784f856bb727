//! Placeholder image detection.
//!
//! Some providers answer `200 OK` with a fixed "page not available" image
//! instead of an error. Those images are recognised by their MD5 fingerprint.

/// Set of fingerprints identifying placeholder images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderFilter {
    fingerprints: Vec<String>,
}

impl PlaceholderFilter {
    /// Creates a filter that accepts everything.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a filter from lowercase hex MD5 digests.
    #[must_use]
    pub fn from_fingerprints<I, S>(fingerprints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fingerprints: fingerprints
                .into_iter()
                .map(|f| f.into().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Returns the hex MD5 digest of `data`.
    #[must_use]
    pub fn fingerprint(data: &[u8]) -> String {
        format!("{:x}", md5::compute(data))
    }

    /// Returns true if `data` is a known placeholder image.
    #[must_use]
    pub fn is_placeholder(&self, data: &[u8]) -> bool {
        if self.fingerprints.is_empty() {
            return false;
        }
        let digest = Self::fingerprint(data);
        self.fingerprints.iter().any(|known| *known == digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_md5_hex() {
        assert_eq!(
            PlaceholderFilter::fingerprint(b""),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn test_placeholder_detected() {
        let placeholder = b"not available".as_slice();
        let filter = PlaceholderFilter::from_fingerprints([PlaceholderFilter::fingerprint(placeholder)]);
        assert!(filter.is_placeholder(placeholder));
        assert!(!filter.is_placeholder(b"a real page"));
    }

    #[test]
    fn test_fingerprints_case_insensitive() {
        let filter = PlaceholderFilter::from_fingerprints(["D41D8CD98F00B204E9800998ECF8427E"]);
        assert!(filter.is_placeholder(b""));
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        assert!(!PlaceholderFilter::none().is_placeholder(b""));
    }
}
