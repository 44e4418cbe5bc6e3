use serde::Deserialize;

use crate::params::DEFAULT_MAX_IDLE;

/// Router options.
///
/// All fields have defaults, so a config file only needs the ones it changes:
///
/// ```rust
/// use jumprouter::Config;
///
/// let config = Config::default().strict(false).head_to_get(false);
/// assert!(!config.strict);
/// assert!(config.clean_path);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Panic on an invalid route instead of returning the error from
    /// `add_route`. On by default so that a broken route table cannot start
    /// serving.
    pub strict: bool,

    /// Clean request paths (see [`path::clean`](crate::path::clean)) before
    /// matching them.
    pub clean_path: bool,

    /// Answer `HEAD` requests with the `GET` route when no `HEAD` route matches.
    pub head_to_get: bool,

    /// Redirect to the same path with (or without) a trailing slash when only
    /// that variant has a route. `GET` requests get a 301, others a 308.
    pub redirect_trailing_slash: bool,

    /// Answer with 405 Method Not Allowed when the path has a route under
    /// another method.
    pub handle_method_not_allowed: bool,

    /// Answer `OPTIONS` requests automatically. Explicit `OPTIONS` routes take
    /// priority.
    pub handle_options: bool,

    /// How many parameter buffers the pool keeps for reuse.
    pub max_idle_params: usize,
}

impl Config {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn clean_path(mut self, clean: bool) -> Self {
        self.clean_path = clean;
        self
    }

    pub fn head_to_get(mut self, enabled: bool) -> Self {
        self.head_to_get = enabled;
        self
    }

    pub fn redirect_trailing_slash(mut self, enabled: bool) -> Self {
        self.redirect_trailing_slash = enabled;
        self
    }

    pub fn handle_method_not_allowed(mut self, enabled: bool) -> Self {
        self.handle_method_not_allowed = enabled;
        self
    }

    pub fn handle_options(mut self, enabled: bool) -> Self {
        self.handle_options = enabled;
        self
    }

    pub fn max_idle_params(mut self, max: usize) -> Self {
        self.max_idle_params = max;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strict: true,
            clean_path: true,
            head_to_get: true,
            redirect_trailing_slash: true,
            handle_method_not_allowed: true,
            handle_options: true,
            max_idle_params: DEFAULT_MAX_IDLE,
        }
    }
}
