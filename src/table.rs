//! The per-method route table and the matcher that walks it.
//!
//! Routes are stored under their static prefix, the literal lead-in before
//! the first `:` or `*` segment. Several routes can share a prefix
//! (`/users/:id` and `/users/:id/:action` both live under `/users`) and are
//! kept in registration order.
//!
//! A lookup scans the request path from its end toward its start, trying the
//! whole path first and then every `/` boundary, until the leading portion is a
//! known prefix. The deepest prefix therefore wins without a trie. The first
//! route at that prefix with exactly as many parts as there are segments left,
//! or ending in a wildcard, is the match:
//!
//! ```ignore
//!  Routes:  /users/:id          (1)
//!           /users/:id/:action  (2)
//!           /static/*fp         (3)
//!
//!  /users/42          prefix /users, 1 segment left   -> (1), id="42"
//!  /users/42/delete   prefix /users, 2 segments left  -> (2), id="42", action="delete"
//!  /static/css/a.css  prefix /static, 2 segments left -> (3), fp="css/a.css"
//!  /static/           prefix /static, 1 segment left  -> (3), fp=""
//!  /static            prefix /static, 0 segments left -> (3), no params
//! ```
//!
//! Only the segment count is compared. Literal parts after the first parameter
//! take up a position but their text is not checked, and a parameter captures
//! an empty segment as `""`.
//!
//! Overlapping routes are not rejected. Once a prefix is found, resolution is
//! purely by registration order, so registering `/files/*path` before
//! `/files/:name` means the wildcard also answers `/files/readme`, and
//! `/a/:x/b` registered before `/a/:x/c` answers `/a/V/c` as well.
use std::collections::HashMap;
use std::sync::Arc;

use hyper::Method;
use tracing::{debug, trace};

use crate::error::RouteError;
use crate::params::{Capture, Params, ParamsPool};
use crate::pattern::{PartKind, PathPart, Pattern};

struct RouteNode<H> {
    value: H,
    pattern: String,
    parts: Vec<PathPart>,
}

impl<H> RouteNode<H> {
    fn has_wildcard(&self) -> bool {
        self.parts
            .last()
            .map_or(false, |p| p.kind() == PartKind::Wildcard)
    }

    fn accepts(&self, segments: usize) -> bool {
        self.has_wildcard() || self.parts.len() == segments
    }

    // Walks the segments after `boundary`. Parts left over once the path runs
    // out capture nothing.
    fn capture(&self, path: &str, boundary: usize, captures: &mut Vec<Capture>) {
        let mut sep = boundary;
        for (index, part) in self.parts.iter().enumerate() {
            if sep >= path.len() {
                return;
            }

            let start = sep + 1;
            if part.kind() == PartKind::Wildcard {
                captures.push(Capture::new(index, start, path.len()));
                return;
            }

            let end = path[start..].find('/').map_or(path.len(), |i| start + i);
            if part.kind() == PartKind::Param {
                captures.push(Capture::new(index, start, end));
            }
            sep = end;
        }
    }
}

type Buckets<H> = HashMap<String, Vec<RouteNode<H>>>;

/// The result of a successful lookup.
pub struct Match<'a, H> {
    /// The value registered for the route, usually a handler.
    pub value: &'a H,
    pub params: Params<'a>,
}

/// Maps `(method, path)` pairs to values.
///
/// Routes are added during a build phase through `&mut self`; afterwards the
/// table is read-only and can be shared between threads.
///
/// ```rust
/// use jumprouter::RouteTable;
/// use hyper::Method;
///
/// let mut table = RouteTable::new();
/// table.insert(Method::GET, "/users/:id", "user").unwrap();
/// table.insert(Method::GET, "/static/*fp", "static").unwrap();
///
/// let found = table.lookup(&Method::GET, "/users/42").unwrap();
/// assert_eq!(*found.value, "user");
/// assert_eq!(found.params.get("id"), Some("42"));
///
/// let found = table.lookup(&Method::GET, "/static/css/site.css").unwrap();
/// assert_eq!(found.params.get("fp"), Some("css/site.css"));
///
/// assert!(table.lookup(&Method::POST, "/users/42").is_none());
/// ```
pub struct RouteTable<H> {
    methods: HashMap<Method, Buckets<H>>,
    pool: Arc<ParamsPool>,
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::with_pool(Arc::new(ParamsPool::default()))
    }

    /// Creates a table that takes its parameter buffers from `pool`.
    pub fn with_pool(pool: Arc<ParamsPool>) -> Self {
        RouteTable {
            methods: HashMap::new(),
            pool,
        }
    }

    /// Registers `value` for `pattern` under `method`.
    ///
    /// Routes sharing a static prefix are tried in the order they were inserted.
    pub fn insert(&mut self, method: Method, pattern: &str, value: H) -> Result<(), RouteError> {
        let compiled = Pattern::compile(pattern)?;
        self.pool.reserve(compiled.param_count());

        debug!(
            %method,
            pattern,
            prefix = compiled.prefix(),
            params = compiled.param_count(),
            "route registered"
        );

        let (prefix, parts) = compiled.into_parts();
        self.methods
            .entry(method)
            .or_default()
            .entry(prefix)
            .or_default()
            .push(RouteNode {
                value,
                pattern: pattern.to_owned(),
                parts,
            });

        Ok(())
    }

    /// Finds the value registered for `method` and `path`.
    ///
    /// `path` is expected to be clean already, see [`clean`](crate::path::clean).
    pub fn lookup<'a>(&'a self, method: &Method, path: &'a str) -> Option<Match<'a, H>> {
        let (node, boundary) = match self.find(method, path) {
            Some(found) => found,
            None => {
                trace!(%method, path, "no route");
                return None;
            }
        };

        if node.parts.is_empty() {
            return Some(Match {
                value: &node.value,
                params: Params::empty(),
            });
        }

        let mut captures = self.pool.acquire();
        node.capture(path, boundary, &mut captures);

        Some(Match {
            value: &node.value,
            params: Params::pooled(path, &node.parts, captures, &self.pool),
        })
    }

    /// Reports whether `lookup` would succeed, without capturing anything.
    pub fn contains(&self, method: &Method, path: &str) -> bool {
        self.find(method, path).is_some()
    }

    /// The methods that have at least one route.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.keys()
    }

    /// Every registered `(method, pattern)` pair. Routes of one prefix are
    /// listed in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.methods.iter().flat_map(|(method, buckets)| {
            buckets
                .values()
                .flatten()
                .map(move |node| (method, node.pattern.as_str()))
        })
    }

    /// The largest number of parameters any registered route captures.
    pub fn max_params(&self) -> usize {
        self.pool.max_params()
    }

    pub fn pool(&self) -> &Arc<ParamsPool> {
        &self.pool
    }

    fn find(&self, method: &Method, path: &str) -> Option<(&RouteNode<H>, usize)> {
        if !path.starts_with('/') {
            return None;
        }

        let buckets = self.methods.get(method)?;
        let (nodes, boundary, segments) = find_bucket(buckets, path)?;

        nodes
            .iter()
            .find(|node| node.accepts(segments))
            .map(|node| (node, boundary))
    }
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

// Returns the routes of the deepest registered prefix of `path`, the byte
// offset where that prefix ends and the number of segments after it.
fn find_bucket<'t, H>(buckets: &'t Buckets<H>, path: &str) -> Option<(&'t [RouteNode<H>], usize, usize)> {
    let mut end = path.len();
    let mut segments = 0;

    loop {
        if let Some(nodes) = buckets.get(&path[..end]) {
            return Some((nodes.as_slice(), end, segments));
        }

        match path[..end].rfind('/') {
            Some(i) => {
                end = i;
                segments += 1;
            }
            None => break,
        }
    }

    buckets
        .get("/")
        .map(|nodes| (nodes.as_slice(), 0, path.matches('/').count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(routes: &[(&str, &'static str)]) -> RouteTable<&'static str> {
        let mut table = RouteTable::new();
        for (pattern, value) in routes {
            table.insert(Method::GET, pattern, *value).unwrap();
        }
        table
    }

    fn get<'a>(table: &'a RouteTable<&'static str>, path: &'a str) -> Option<(&'static str, Vec<(String, String)>)> {
        table.lookup(&Method::GET, path).map(|m| {
            let params = m
                .params
                .iter()
                .map(|p| (p.key.to_owned(), p.value.to_owned()))
                .collect();
            (*m.value, params)
        })
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn static_routes() {
        let t = table(&[("/", "root"), ("/dashboard", "dash"), ("/a/b/c", "abc")]);

        assert_eq!(get(&t, "/"), Some(("root", vec![])));
        assert_eq!(get(&t, "/dashboard"), Some(("dash", vec![])));
        assert_eq!(get(&t, "/a/b/c"), Some(("abc", vec![])));
        assert_eq!(get(&t, "/a/b"), None);
        assert_eq!(get(&t, "/dashboard/x"), None);
    }

    #[test]
    fn static_route_leaves_the_pool_alone() {
        let t = table(&[("/dashboard", "dash"), ("/users/:id", "user")]);
        let m = t.lookup(&Method::GET, "/dashboard").unwrap();
        drop(m);
        assert_eq!(t.pool().idle(), 0);

        let m = t.lookup(&Method::GET, "/users/1").unwrap();
        drop(m);
        assert_eq!(t.pool().idle(), 1);
    }

    #[test]
    fn param_between_literals() {
        let t = table(&[("/a/:x/b", "axb")]);
        assert_eq!(get(&t, "/a/V/b"), Some(("axb", params(&[("x", "V")]))));
        assert_eq!(get(&t, "/a/V"), None);
    }

    #[test]
    fn literal_text_is_not_compared() {
        let t = table(&[("/a/:x/b", "b"), ("/a/:x/c", "c")]);
        assert_eq!(get(&t, "/a/V/c"), Some(("b", params(&[("x", "V")]))));
        assert_eq!(get(&t, "/a/V/anything"), Some(("b", params(&[("x", "V")]))));
    }

    #[test]
    fn routes_sharing_a_prefix() {
        let t = table(&[("/users/:id", "h1"), ("/users/:id/:action", "h2")]);

        assert_eq!(get(&t, "/users/42"), Some(("h1", params(&[("id", "42")]))));
        assert_eq!(
            get(&t, "/users/42/delete"),
            Some(("h2", params(&[("id", "42"), ("action", "delete")])))
        );
        assert_eq!(get(&t, "/users/42/delete/now"), None);
    }

    #[test]
    fn deepest_prefix_wins() {
        let t = table(&[("/users/:id", "user"), ("/users/me", "me")]);
        assert_eq!(get(&t, "/users/me"), Some(("me", vec![])));
        assert_eq!(get(&t, "/users/you"), Some(("user", params(&[("id", "you")]))));
    }

    #[test]
    fn prefix_hit_without_fitting_route_does_not_backtrack() {
        let t = table(&[("/a/:x/:y", "xy"), ("/a/b", "ab")]);
        // "/a/b" is a prefix, but nothing under it takes one more segment.
        assert_eq!(get(&t, "/a/b/c"), None);
        assert_eq!(get(&t, "/a/c/d"), Some(("xy", params(&[("x", "c"), ("y", "d")]))));
    }

    #[test]
    fn params_capture_empty_segments() {
        let t = table(&[("/users/:id", "h1"), ("/users/:id/:action", "h2")]);
        assert_eq!(
            get(&t, "/users/42/"),
            Some(("h2", params(&[("id", "42"), ("action", "")])))
        );
        assert_eq!(get(&t, "/users/"), Some(("h1", params(&[("id", "")]))));
    }

    #[test]
    fn wildcard() {
        let t = table(&[("/files/*rest", "files")]);
        assert_eq!(
            get(&t, "/files/a/b/c.txt"),
            Some(("files", params(&[("rest", "a/b/c.txt")])))
        );
        assert_eq!(get(&t, "/files/x"), Some(("files", params(&[("rest", "x")]))));
    }

    #[test]
    fn wildcard_with_empty_remainder() {
        let t = table(&[("/static/*fp", "static")]);
        assert_eq!(get(&t, "/static/"), Some(("static", params(&[("fp", "")]))));
        assert_eq!(get(&t, "/static"), Some(("static", vec![])));
    }

    #[test]
    fn wildcard_after_params() {
        let t = table(&[("/api/:version/*path", "api")]);
        assert_eq!(
            get(&t, "/api/v1/users/7"),
            Some(("api", params(&[("version", "v1"), ("path", "users/7")])))
        );
        assert_eq!(get(&t, "/api/v1/"), Some(("api", params(&[("version", "v1"), ("path", "")]))));
        assert_eq!(get(&t, "/api/v1"), Some(("api", params(&[("version", "v1")]))));
        assert_eq!(get(&t, "/api"), Some(("api", vec![])));
    }

    #[test]
    fn wildcard_route_accepts_any_depth_in_registration_order() {
        let t = table(&[("/api/:v/*p", "wild"), ("/api", "static")]);
        assert_eq!(get(&t, "/api"), Some(("wild", vec![])));

        let t = table(&[("/api", "static"), ("/api/:v/*p", "wild")]);
        assert_eq!(get(&t, "/api"), Some(("static", vec![])));
        assert_eq!(get(&t, "/api/v2"), Some(("wild", params(&[("v", "v2")]))));
    }

    #[test]
    fn registration_order_decides_between_param_and_wildcard() {
        let t = table(&[("/files/:name", "param"), ("/files/*path", "wild")]);
        assert_eq!(get(&t, "/files/readme"), Some(("param", params(&[("name", "readme")]))));
        assert_eq!(get(&t, "/files/a/b"), Some(("wild", params(&[("path", "a/b")]))));

        let t = table(&[("/files/*path", "wild"), ("/files/:name", "param")]);
        assert_eq!(get(&t, "/files/readme"), Some(("wild", params(&[("path", "readme")]))));
    }

    #[test]
    fn static_and_wildcard_share_a_prefix() {
        let t = table(&[("/home", "home"), ("/home/*path", "wild")]);
        assert_eq!(get(&t, "/home"), Some(("home", vec![])));
        assert_eq!(get(&t, "/home/file"), Some(("wild", params(&[("path", "file")]))));
        assert_eq!(
            get(&t, "/home/file/file2/report.json"),
            Some(("wild", params(&[("path", "file/file2/report.json")])))
        );
    }

    #[test]
    fn root_prefix_fallback() {
        let t = table(&[("/:id", "id"), ("/:a/:b", "ab")]);
        assert_eq!(get(&t, "/42"), Some(("id", params(&[("id", "42")]))));
        assert_eq!(get(&t, "/x/y"), Some(("ab", params(&[("a", "x"), ("b", "y")]))));
        assert_eq!(get(&t, "/"), None);

        let t = table(&[("/*all", "all")]);
        assert_eq!(get(&t, "/"), Some(("all", vec![])));
        assert_eq!(get(&t, "/a/b"), Some(("all", params(&[("all", "a/b")]))));
    }

    #[test]
    fn many_params() {
        let t = table(&[("/api/files/:bkt/:type/:filename", "file")]);
        let m = t.lookup(&Method::GET, "/api/files/Personal/data/hi.txt").unwrap();
        assert_eq!(m.params.len(), 3);
        assert_eq!(m.params.get("bkt"), Some("Personal"));
        assert_eq!(m.params.get("type"), Some("data"));
        assert_eq!(m.params.get("filename"), Some("hi.txt"));
        assert_eq!(m.params.get_ext("filename"), Some(("hi", "txt")));
        assert_eq!(m.params.get("missing"), None);
    }

    #[test]
    fn methods_are_independent() {
        let mut t = RouteTable::new();
        t.insert(Method::GET, "/users/:id", "get").unwrap();
        t.insert(Method::from_bytes(b"OTHER").unwrap(), "/users/:id", "other").unwrap();

        assert!(t.lookup(&Method::POST, "/users/42").is_none());
        let m = t.lookup(&Method::from_bytes(b"OTHER").unwrap(), "/users/42").unwrap();
        assert_eq!(*m.value, "other");
        assert!(t.contains(&Method::GET, "/users/42"));
        assert!(!t.contains(&Method::PUT, "/users/42"));
    }

    #[test]
    fn relative_paths_never_match() {
        let t = table(&[("/", "root"), ("/:id", "id")]);
        assert_eq!(get(&t, ""), None);
        assert_eq!(get(&t, "users"), None);
    }

    #[test]
    fn max_params_tracks_largest_route() {
        let t = table(&[("/a/:x", "a"), ("/b/:x/:y/*z", "b"), ("/c/:x", "c")]);
        assert_eq!(t.max_params(), 3);
    }

    #[test]
    fn routes_are_listed() {
        let t = table(&[("/users/:id", "h1"), ("/users/:id/:action", "h2")]);
        let routes: Vec<_> = t.routes().collect();
        assert_eq!(
            routes,
            vec![(&Method::GET, "/users/:id"), (&Method::GET, "/users/:id/:action")]
        );
    }

    #[test]
    fn invalid_route_is_not_inserted() {
        let mut t = RouteTable::new();
        assert!(t.insert(Method::GET, "/a/*x/b", "bad").is_err());
        assert_eq!(t.routes().count(), 0);
        assert_eq!(t.max_params(), 0);
    }
}
