//! Captured path parameters and the pool their buffers are recycled through.
//!
//! A [`Params`] value borrows both the route it matched and the request path,
//! so reading a parameter never copies. Its buffer is taken from a
//! [`ParamsPool`] and handed back when the `Params` is dropped. Call
//! [`Params::to_owned_params`] to keep the values around for longer.
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use crate::pattern::PathPart;

/// The default number of idle buffers a pool keeps.
pub const DEFAULT_MAX_IDLE: usize = 1000;

/// A single captured parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// Position of a captured value: the part it belongs to and its byte range in the path.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Capture {
    part: usize,
    start: usize,
    end: usize,
}

impl Capture {
    pub(crate) fn new(part: usize, start: usize, end: usize) -> Self {
        Capture { part, start, end }
    }
}

/// The parameters captured by a single lookup.
///
/// `Params` is only valid while the route table and the path it was matched
/// against are borrowed. The underlying buffer goes back to the pool on drop.
pub struct Params<'a> {
    path: &'a str,
    parts: &'a [PathPart],
    captures: Vec<Capture>,
    pool: Option<&'a ParamsPool>,
}

impl<'a> Params<'a> {
    pub(crate) fn empty() -> Self {
        Params {
            path: "",
            parts: &[],
            captures: Vec::new(),
            pool: None,
        }
    }

    pub(crate) fn pooled(
        path: &'a str,
        parts: &'a [PathPart],
        captures: Vec<Capture>,
        pool: &'a ParamsPool,
    ) -> Self {
        Params {
            path,
            parts,
            captures,
            pool: Some(pool),
        }
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// Returns the value of the first parameter named `name`.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.iter().find(|p| p.key == name).map(|p| p.value)
    }

    /// Returns the value of `name` split at its last `.`:
    /// `report.json` becomes `("report", "json")`. Values without a `.` have an
    /// empty extension.
    pub fn get_ext(&self, name: &str) -> Option<(&'a str, &'a str)> {
        self.get(name).map(split_ext)
    }

    /// Iterates over the parameters in the order they appear in the route.
    pub fn iter(&self) -> impl Iterator<Item = Param<'a>> + '_ {
        let path = self.path;
        let parts = self.parts;
        self.captures.iter().map(move |c| Param {
            key: parts[c.part].name(),
            value: &path[c.start..c.end],
        })
    }

    /// Copies the parameters out, detaching them from the request.
    pub fn to_owned_params(&self) -> PathParams {
        PathParams(
            self.iter()
                .map(|p| (p.key.to_owned(), p.value.to_owned()))
                .collect(),
        )
    }
}

impl Drop for Params<'_> {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.release(std::mem::take(&mut self.captures));
        }
    }
}

impl fmt::Debug for Params<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|p| (p.key, p.value)))
            .finish()
    }
}

/// An owned copy of [`Params`].
///
/// This is what [`Router`](crate::Router) stores in the request extensions, since
/// handler futures outlive the lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// See [`Params::get_ext`].
    pub fn get_ext(&self, name: &str) -> Option<(&str, &str)> {
        self.get(name).map(split_ext)
    }

    pub fn iter(&self) -> impl Iterator<Item = Param<'_>> {
        self.0.iter().map(|(key, value)| Param {
            key: key.as_str(),
            value: value.as_str(),
        })
    }
}

fn split_ext(value: &str) -> (&str, &str) {
    match value.rfind('.') {
        Some(i) => (&value[..i], &value[i + 1..]),
        None => (value, ""),
    }
}

/// A free list of parameter buffers.
///
/// Every buffer is allocated with a capacity equal to the largest parameter
/// count registered so far, so filling it during a lookup never reallocates.
/// Buffers sized before that maximum grew are dropped instead of reused.
///
/// A pool can be shared between route tables through an `Arc`; the maximum is
/// then taken over all of them.
#[derive(Debug)]
pub struct ParamsPool {
    free: Mutex<Vec<Vec<Capture>>>,
    max_params: AtomicUsize,
    max_idle: usize,
}

impl ParamsPool {
    /// Creates a pool that keeps at most `max_idle` buffers around.
    pub fn new(max_idle: usize) -> Self {
        ParamsPool {
            free: Mutex::new(Vec::new()),
            max_params: AtomicUsize::new(0),
            max_idle,
        }
    }

    /// The capacity of the buffers this pool hands out.
    pub fn max_params(&self) -> usize {
        self.max_params.load(Ordering::Acquire)
    }

    /// Number of buffers waiting to be reused.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    /// Raises the buffer capacity to at least `count`.
    pub(crate) fn reserve(&self, count: usize) {
        self.max_params.fetch_max(count, Ordering::AcqRel);
    }

    pub(crate) fn acquire(&self) -> Vec<Capture> {
        let max = self.max_params();
        loop {
            match self.free.lock().pop() {
                Some(buf) if buf.capacity() >= max => return buf,
                Some(_) => continue,
                None => return Vec::with_capacity(max),
            }
        }
    }

    pub(crate) fn release(&self, mut buf: Vec<Capture>) {
        let max = self.max_params();
        if buf.capacity() < max {
            trace!(
                capacity = buf.capacity(),
                max_params = max,
                "dropping undersized params buffer"
            );
            return;
        }

        buf.clear();
        let mut free = self.free.lock();
        if free.len() < self.max_idle {
            free.push(buf);
        }
    }
}

impl Default for ParamsPool {
    fn default() -> Self {
        ParamsPool::new(DEFAULT_MAX_IDLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reacquired_buffer_is_empty() {
        let pool = ParamsPool::default();
        pool.reserve(3);

        let mut buf = pool.acquire();
        assert_eq!(buf.capacity(), 3);
        buf.push(Capture::new(0, 1, 2));
        buf.push(Capture::new(1, 3, 4));
        pool.release(buf);
        assert_eq!(pool.idle(), 1);

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 3);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn undersized_buffers_are_dropped() {
        let pool = ParamsPool::default();
        pool.reserve(2);
        let buf = pool.acquire();

        pool.reserve(4);
        pool.release(buf);
        assert_eq!(pool.idle(), 0);
        assert_eq!(pool.acquire().capacity(), 4);
    }

    #[test]
    fn stale_idle_buffers_are_skipped() {
        let pool = ParamsPool::default();
        pool.reserve(1);
        pool.release(pool.acquire());
        assert_eq!(pool.idle(), 1);

        pool.reserve(5);
        let buf = pool.acquire();
        assert_eq!(buf.capacity(), 5);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn reserve_never_shrinks() {
        let pool = ParamsPool::default();
        pool.reserve(4);
        pool.reserve(2);
        assert_eq!(pool.max_params(), 4);
    }

    #[test]
    fn idle_list_is_bounded() {
        let pool = ParamsPool::new(2);
        pool.reserve(1);
        let bufs: Vec<_> = (0..4).map(|_| pool.acquire()).collect();
        for buf in bufs {
            pool.release(buf);
        }
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn ext() {
        assert_eq!(split_ext("report.json"), ("report", "json"));
        assert_eq!(split_ext("archive.tar.gz"), ("archive.tar", "gz"));
        assert_eq!(split_ext("README"), ("README", ""));
    }

    #[test]
    fn owned_params() {
        let params = PathParams(vec![("id".into(), "42".into())]);
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.len(), 1);
        assert_eq!(
            params.iter().next(),
            Some(Param {
                key: "id",
                value: "42"
            })
        );
    }
}
