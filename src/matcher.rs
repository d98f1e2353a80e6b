//! URI matcher - immutable dispatch table from address shape to route code
//!
//! Patterns are `/`-separated path templates registered per authority:
//! - `#` matches one segment made only of ASCII digits
//! - anything else matches the segment literally

use crate::uri::ContentUri;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Literal(String),
    Number,
}

impl PatternSegment {
    fn parse(raw: &str) -> Self {
        match raw {
            "#" => PatternSegment::Number,
            other => PatternSegment::Literal(other.to_string()),
        }
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            PatternSegment::Literal(expected) => expected == segment,
            PatternSegment::Number => {
                !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Route<C> {
    authority: String,
    pattern: Vec<PatternSegment>,
    code: C,
}

/// Maps URIs to route codes.
///
/// Built once with [`UriMatcher::with_route`] and never mutated afterwards;
/// the first registered route that matches wins.
#[derive(Debug, Clone)]
pub struct UriMatcher<C> {
    routes: Vec<Route<C>>,
}

impl<C: Copy> UriMatcher<C> {
    /// Create an empty matcher (matches nothing)
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register `pattern` under `authority`, returning the extended matcher
    pub fn with_route(mut self, authority: &str, pattern: &str, code: C) -> Self {
        let pattern = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(PatternSegment::parse)
            .collect();
        self.routes.push(Route {
            authority: authority.to_string(),
            pattern,
            code,
        });
        self
    }

    /// Find the route code for a URI, if any route matches
    pub fn match_uri(&self, uri: &ContentUri) -> Option<C> {
        self.routes
            .iter()
            .find(|route| {
                route.authority == uri.authority
                    && route.pattern.len() == uri.segments.len()
                    && route
                        .pattern
                        .iter()
                        .zip(&uri.segments)
                        .all(|(p, s)| p.matches(s))
            })
            .map(|route| route.code)
    }

    /// Number of registered routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<C: Copy> Default for UriMatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}
