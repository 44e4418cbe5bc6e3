use std::borrow::Cow;

/// Returns the canonical URL path for `p`, eliminating `.` and `..` elements.
///
/// The following rules are applied iteratively until no further processing can be done:
///   1. Replace multiple slashes with a single slash.
///   2. Eliminate each `.` path name element (the current directory).
///   3. Eliminate each inner `..` path name element (the parent directory)
///      along with the non-`..` element that precedes it.
///   4. Eliminate `..` elements that begin a rooted path:
///      that is, replace `/..` by `/` at the beginning of a path.
///
/// A missing leading slash is added, and a trailing slash (or a trailing `.`
/// element) is kept. If the path is already clean it is returned as is.
///
/// ```rust
/// use jumprouter::path::clean;
///
/// assert_eq!(clean("/abc//def/../ghi/"), "/abc/ghi/");
/// assert_eq!(clean("../../abc"), "/abc");
/// assert_eq!(clean(""), "/");
/// ```
pub fn clean(p: &str) -> Cow<'_, str> {
    if is_clean(p) {
        return Cow::Borrowed(p);
    }

    let mut trailing = p.len() > 1 && p.ends_with('/');
    let mut stack: Vec<&str> = Vec::new();

    let mut elements = p.split('/').peekable();
    while let Some(element) = elements.next() {
        match element {
            "" => {}
            "." => {
                if elements.peek().is_none() {
                    trailing = true;
                }
            }
            ".." => {
                stack.pop();
            }
            name => stack.push(name),
        }
    }

    let mut buf = String::with_capacity(p.len() + 1);
    for name in &stack {
        buf.push('/');
        buf.push_str(name);
    }
    if buf.is_empty() || trailing {
        buf.push('/');
    }

    Cow::Owned(buf)
}

fn is_clean(p: &str) -> bool {
    if !p.starts_with('/') {
        return false;
    }

    let mut elements = p[1..].split('/').peekable();
    while let Some(element) = elements.next() {
        let last = elements.peek().is_none();
        match element {
            "" if last => {}
            "" | "." | ".." => return false,
            _ => {}
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    // path, result
    fn clean_tests() -> Vec<(&'static str, &'static str)> {
        vec![
            // Already clean
            ("/", "/"),
            ("/abc", "/abc"),
            ("/a/b/c", "/a/b/c"),
            ("/abc/", "/abc/"),
            ("/a/b/c/", "/a/b/c/"),
            // missing root
            ("", "/"),
            ("a/", "/a/"),
            ("abc", "/abc"),
            ("abc/def", "/abc/def"),
            ("a/b/c", "/a/b/c"),
            // Remove doubled slash
            ("//", "/"),
            ("/abc//", "/abc/"),
            ("/abc/def//", "/abc/def/"),
            ("/a/b/c//", "/a/b/c/"),
            ("/abc//def//ghi", "/abc/def/ghi"),
            ("//abc", "/abc"),
            ("///abc", "/abc"),
            ("//abc//", "/abc/"),
            // Remove . elements
            (".", "/"),
            ("./", "/"),
            ("/abc/./def", "/abc/def"),
            ("/./abc/def", "/abc/def"),
            ("/abc/.", "/abc/"),
            // Remove .. elements
            ("..", "/"),
            ("../", "/"),
            ("../../", "/"),
            ("../..", "/"),
            ("../../abc", "/abc"),
            ("/abc/def/ghi/../jkl", "/abc/def/jkl"),
            ("/abc/def/../ghi/../jkl", "/abc/jkl"),
            ("/abc/def/..", "/abc"),
            ("/abc/def/../..", "/"),
            ("/abc/def/../../..", "/"),
            ("/abc/def/../../../ghi/jkl/../../../mno", "/mno"),
            // Combinations
            ("abc/./../def", "/def"),
            ("abc//./../def", "/def"),
            ("abc/../../././../def", "/def"),
        ]
    }

    #[test]
    fn test_path_clean() {
        for (path, expected) in clean_tests() {
            assert_eq!(clean(path), expected, "clean({:?})", path);
            assert_eq!(clean(expected), expected, "clean({:?})", expected);
        }
    }

    #[test]
    fn clean_paths_are_borrowed() {
        assert!(matches!(clean("/a/b/c/"), Cow::Borrowed(_)));
        assert!(matches!(clean("/a//b"), Cow::Owned(_)));
    }
}
