//! Compiles route patterns into a static prefix and a list of typed parts.
//!
//! ```ignore
//!  Pattern: /api/v1/files/:bucket/raw/*path
//!
//!  prefix   /api/v1/files
//!  parts    :bucket (param), raw (literal), *path (wildcard)
//! ```
//!
//! The prefix is everything before the first `:` or `*` segment. It is the key
//! the route is stored under, so lookups only ever compare the variable tail
//! of a request path against the parts.
use crate::error::RouteError;

/// What a single path part matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// A fixed segment that must be equal to the request segment.
    Literal,
    /// `:name`, captures exactly one segment.
    Param,
    /// `*name`, captures the rest of the path including any `/`.
    Wildcard,
}

/// A segment of a route pattern that follows the static prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPart {
    name: String,
    kind: PartKind,
}

impl PathPart {
    /// The literal text for literal parts, the capture name otherwise.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }
}

/// A compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    prefix: String,
    parts: Vec<PathPart>,
    params: usize,
}

impl Pattern {
    /// Compiles `pattern`.
    ///
    /// ```rust
    /// use jumprouter::pattern::{Pattern, PartKind};
    ///
    /// let pattern = Pattern::compile("/users/:id/*rest").unwrap();
    /// assert_eq!(pattern.prefix(), "/users");
    /// assert_eq!(pattern.param_count(), 2);
    /// assert_eq!(pattern.parts()[1].kind(), PartKind::Wildcard);
    /// ```
    pub fn compile(pattern: &str) -> Result<Pattern, RouteError> {
        if !pattern.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash {
                pattern: pattern.to_owned(),
            });
        }

        let mut prefix_end = None;
        let mut parts = Vec::new();
        let mut wildcards = 0;

        // index of the '/' in front of the current segment
        let mut sep = 0;
        for segment in pattern[1..].split('/') {
            let start = sep + 1;
            sep = start + segment.len();

            let kind = match segment.as_bytes().first() {
                Some(b':') => PartKind::Param,
                Some(b'*') => PartKind::Wildcard,
                _ => PartKind::Literal,
            };

            if prefix_end.is_none() {
                if kind == PartKind::Literal {
                    continue;
                }
                prefix_end = Some(start);
            }

            let name = match kind {
                PartKind::Literal if segment.is_empty() => continue,
                PartKind::Literal => segment,
                PartKind::Param | PartKind::Wildcard => &segment[1..],
            };
            if name.is_empty() {
                return Err(RouteError::EmptyName {
                    pattern: pattern.to_owned(),
                });
            }
            if kind == PartKind::Wildcard {
                wildcards += 1;
            }

            parts.push(PathPart {
                name: name.to_owned(),
                kind,
            });
        }

        if wildcards > 1 {
            return Err(RouteError::TooManyWildcards {
                pattern: pattern.to_owned(),
            });
        }
        if wildcards == 1 && parts.last().map(PathPart::kind) != Some(PartKind::Wildcard) {
            return Err(RouteError::WildcardNotLast {
                pattern: pattern.to_owned(),
            });
        }

        // A purely static pattern is its own key. Otherwise the '/' in front of
        // the first variable segment is not part of the prefix, except at the root.
        let prefix = match prefix_end {
            None => pattern,
            Some(1) => "/",
            Some(end) => &pattern[..end - 1],
        };

        let params = parts.iter().filter(|p| p.kind != PartKind::Literal).count();

        Ok(Pattern {
            prefix: prefix.to_owned(),
            parts,
            params,
        })
    }

    /// The literal lead-in of the pattern. For patterns with parameters the
    /// separator in front of the first one is dropped unless it is the root.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn parts(&self) -> &[PathPart] {
        &self.parts
    }

    /// Number of values a match of this pattern captures.
    pub fn param_count(&self) -> usize {
        self.params
    }

    pub fn has_wildcard(&self) -> bool {
        self.parts.last().map_or(false, |p| p.kind == PartKind::Wildcard)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<PathPart>) {
        (self.prefix, self.parts)
    }
}
