//! Content URI - the address of every record set the store exposes
//!
//! Format: `<scheme>://<authority>/<segment>/<segment>...`
//!
//! Examples:
//! - `content://com.example.android.exampleprovider.app/friends`
//! - `content://com.example.android.exampleprovider.app/friends/7`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Structured address naming a collection of records or a single record.
///
/// Empty path segments are dropped while parsing, so `friends/` and
/// `friends` are the same address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentUri {
    /// URI scheme, e.g. `content`
    pub scheme: String,
    /// Authority naming the store, e.g. `com.example.android.exampleprovider.app`
    pub authority: String,
    /// Decoded path segments
    pub segments: Vec<String>,
}

impl ContentUri {
    /// Create a URI with no path segments
    pub fn new(scheme: impl Into<String>, authority: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            authority: authority.into(),
            segments: Vec::new(),
        }
    }

    /// Parse a URI string into a ContentUri
    ///
    /// Expected format: `<scheme>://<authority>[/<segment>...]`
    pub fn parse(uri: &str) -> Result<Self> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| Error::InvalidUri(format!("missing scheme separator: {}", uri)))?;

        if scheme.is_empty() {
            return Err(Error::InvalidUri(format!("empty scheme: {}", uri)));
        }
        if rest.contains(['?', '#']) || rest.chars().any(char::is_whitespace) {
            return Err(Error::InvalidUri(format!("unsupported characters in: {}", uri)));
        }

        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        if authority.is_empty() {
            return Err(Error::InvalidUri(format!("empty authority: {}", uri)));
        }

        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            scheme: scheme.to_string(),
            authority: authority.to_string(),
            segments,
        })
    }

    /// Return a copy with one more path segment
    pub fn with_appended_path(&self, segment: impl Into<String>) -> Self {
        let mut uri = self.clone();
        uri.segments.push(segment.into());
        uri
    }

    /// Return a copy with `id` appended as the last path segment
    pub fn with_appended_id(&self, id: i64) -> Self {
        self.with_appended_path(id.to_string())
    }

    /// Parse the last path segment as a record id
    ///
    /// Returns `None` when there are no segments or the last one is not an integer.
    pub fn parse_id(&self) -> Option<i64> {
        self.segments.last().and_then(|s| s.parse().ok())
    }

    /// Path without the leading slash, e.g. `friends/7`
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// True when `self` lies strictly below `ancestor` in the URI hierarchy
    pub fn is_descendant_of(&self, ancestor: &ContentUri) -> bool {
        self.scheme == ancestor.scheme
            && self.authority == ancestor.authority
            && self.segments.len() > ancestor.segments.len()
            && self.segments.starts_with(&ancestor.segments)
    }

    /// Convert to URI string
    pub fn to_uri_string(&self) -> String {
        let mut out = format!("{}://{}", self.scheme, self.authority);
        for segment in &self.segments {
            out.push('/');
            out.push_str(segment);
        }
        out
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri_string())
    }
}

impl FromStr for ContentUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ContentUri {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_uri_string())
    }
}

impl<'de> Deserialize<'de> for ContentUri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ContentUri::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_roundtrip() {
        let uri = ContentUri::new("content", "example.app")
            .with_appended_path("friends")
            .with_appended_id(42);
        let uri_str = uri.to_uri_string();
        assert_eq!(uri_str, "content://example.app/friends/42");

        let parsed = ContentUri::parse(&uri_str).unwrap();
        assert_eq!(parsed, uri);
        assert_eq!(parsed.parse_id(), Some(42));
    }

    #[test]
    fn test_uri_parse() {
        let uri = ContentUri::parse("content://example.app/friends/").unwrap();
        assert_eq!(uri.scheme, "content");
        assert_eq!(uri.authority, "example.app");
        assert_eq!(uri.segments, vec!["friends".to_string()]);
        assert_eq!(uri.path(), "friends");
        assert_eq!(uri.parse_id(), None);
    }

    #[test]
    fn test_invalid_uri() {
        assert!(ContentUri::parse("invalid").is_err());
        assert!(ContentUri::parse("://example.app/friends").is_err());
        assert!(ContentUri::parse("content:///friends").is_err());
        assert!(ContentUri::parse("content://example.app/friends?x=1").is_err());
    }

    #[test]
    fn test_descendants() {
        let table = ContentUri::parse("content://example.app/friends").unwrap();
        let item = table.with_appended_id(3);
        assert!(item.is_descendant_of(&table));
        assert!(!table.is_descendant_of(&item));
        assert!(!table.is_descendant_of(&table));

        let elsewhere = ContentUri::parse("content://other.app/friends/3").unwrap();
        assert!(!elsewhere.is_descendant_of(&table));
    }

    #[test]
    fn test_serde_as_string() {
        let uri = ContentUri::parse("content://example.app/friends/9").unwrap();
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, "\"content://example.app/friends/9\"");
        let back: ContentUri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uri);
    }
}
