//! # JumpRouter
//!
//! JumpRouter is a lightweight HTTP request router for [hyper](https://hyper.rs).
//!
//! Routes are stored under their *static prefix*, the literal part of the pattern
//! before the first parameter. A request path is matched by jumping backwards
//! over its `/` boundaries until the leading portion is a known prefix, then
//! walking the few remaining segments forward. There is no trie to descend and
//! no regex to run, and static routes resolve with a single hash lookup.
//!
//! ## Features
//!
//! **Parameters in your routing pattern:** Give a path segment a name and the
//! router delivers its value to you. Parameters are captured as byte ranges of
//! the request path into buffers recycled through a [`ParamsPool`], so a lookup
//! does not allocate.
//!
//! **Predictable resolution:** Several patterns may share a prefix, e.g.
//! `/users/:id` and `/users/:id/:action`. The first one registered that has as
//! many parts as the request has segments left, or that ends in a wildcard,
//! wins. Nothing is reordered behind your back.
//!
//! **Path cleaning:** Superfluous path elements like `../` or `//` are removed
//! before matching, see [`path::clean`].
//!
//! Of course you can also set **custom not found and method not allowed
//! handlers**, and **automatically respond to OPTIONS and HEAD requests**.
//!
//! ## Usage
//!
//! Here is a simple example:
//!
//! ```rust,no_run
//! use jumprouter::{Router, PathParams};
//! use hyper::{Request, Response, Body, Error};
//!
//! async fn index(_: Request<Body>) -> Result<Response<Body>, Error> {
//!     Ok(Response::new("Hello, World!".into()))
//! }
//!
//! async fn hello(req: Request<Body>) -> Result<Response<Body>, Error> {
//!     let params = req.extensions().get::<PathParams>().unwrap();
//!     Ok(Response::new(format!("Hello, {}", params.get("user").unwrap()).into()))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut router = Router::default();
//!     router.get("/", index).unwrap();
//!     router.get("/hello/:user", hello).unwrap();
//!
//!     hyper::Server::bind(&([127, 0, 0, 1], 3000).into())
//!         .serve(router.into_service())
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! ### Named parameters
//!
//! As you can see, `:user` is a *named parameter*. The values are accessible via
//! `req.extensions().get::<PathParams>()`.
//!
//! Named parameters only match a single path segment, which may be empty:
//!
//! ```ignore
//! Pattern: /user/:user
//!
//!  /user/gordon              match: user="gordon"
//!  /user/you                 match: user="you"
//!  /user/gordon/profile      no match
//!  /user/                    match: user=""
//! ```
//!
//! Static routes and parameters may overlap. The route with the longer static
//! prefix wins, so `/user/new` answers `/user/new` even when `/user/:user` is
//! also registered.
//!
//! ### Wildcard parameters
//!
//! The second type are *wildcard* parameters and have the form `*name`. Like the
//! name suggests, they match everything, including an empty remainder.
//! Therefore they must always be at the **end** of the pattern:
//!
//! ```ignore
//! Pattern: /src/*filepath
//!
//!  /src                      match, filepath not set
//!  /src/                     match: filepath=""
//!  /src/somefile.rs          match: filepath="somefile.rs"
//!  /src/subdir/somefile.rs   match: filepath="subdir/somefile.rs"
//! ```
//!
//! ### Using the table directly
//!
//! [`RouteTable`] is the matching core without any hyper glue. It maps routes to
//! any value and hands out borrowed [`Params`]:
//!
//! ```rust
//! use jumprouter::RouteTable;
//! use hyper::Method;
//!
//! let mut table = RouteTable::new();
//! table.insert(Method::GET, "/api/files/:bucket/:name", 1).unwrap();
//!
//! let found = table.lookup(&Method::GET, "/api/files/personal/report.json").unwrap();
//! assert_eq!(*found.value, 1);
//! assert_eq!(found.params.get_ext("name"), Some(("report", "json")));
//! ```
//!
//! `Params` returns its buffer to the pool when dropped; call
//! [`Params::to_owned_params`] to keep the values longer.
//!
//! ### Not Found Handler
//!
//! You can use another handler to handle requests which could not be matched by
//! this router by using the [`Router::not_found`] handler:
//!
//! ```rust
//! use jumprouter::Router;
//! use hyper::{Response, Body};
//!
//! let router = Router::default().not_found(|_| async {
//!     Ok(Response::builder()
//!         .status(404)
//!         .body(Body::from("nothing here"))
//!         .unwrap())
//! });
//! ```

#![forbid(unsafe_code)]

mod config;
mod error;
mod params;
pub mod path;
pub mod pattern;
mod table;

#[doc(hidden)]
pub mod router;

#[doc(inline)]
pub use config::Config;
#[doc(inline)]
pub use error::RouteError;
#[doc(inline)]
pub use params::{Param, Params, ParamsPool, PathParams};
#[doc(inline)]
pub use router::{Handler, Router};
#[doc(inline)]
pub use table::{Match, RouteTable};

// test the code examples in README.md
#[cfg(doctest)]
mod test_readme {
    macro_rules! doc_comment {
        ($x:expr) => {
            #[doc = $x]
            extern "C" {}
        };
    }

    doc_comment!(include_str!("../README.md"));
}
