use thiserror::Error;

/// Errors raised while registering a route.
///
/// Lookups never fail; a missing route is reported as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The pattern contains more than one `*name` segment.
    #[error("too many wildcards in route '{pattern}'")]
    TooManyWildcards { pattern: String },

    /// A `*name` segment is followed by other segments.
    #[error("wildcard must be the last part of route '{pattern}'")]
    WildcardNotLast { pattern: String },

    #[error("expected route beginning with '/', found '{pattern}'")]
    MissingLeadingSlash { pattern: String },

    /// A `:` or `*` segment without a name.
    #[error("unnamed parameter in route '{pattern}'")]
    EmptyName { pattern: String },
}

impl RouteError {
    /// The pattern that failed to register.
    pub fn pattern(&self) -> &str {
        match self {
            RouteError::TooManyWildcards { pattern }
            | RouteError::WildcardNotLast { pattern }
            | RouteError::MissingLeadingSlash { pattern }
            | RouteError::EmptyName { pattern } => pattern,
        }
    }
}
