//! Slash-delimited tree path codec.
//!
//! A node's path is the `/`-joined sequence of names from the root. There is
//! no escaping: a name containing `/` cannot be addressed.

/// Path separator used by every tree path.
pub const SEPARATOR: char = '/';

/// Joins segments into a path.
pub fn encode<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join("/")
}

/// Splits a path into its segments.
///
/// Empty segments (leading, trailing or doubled separators) are dropped, so
/// `""` and `"/"` both decode to the empty list, which tree operations treat
/// as the root.
pub fn decode(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

/// Builds the path of a child named `name` under `parent`.
pub fn child_path(parent: &str, name: &str) -> String {
    let mut segments = decode(parent);
    segments.push(name);
    encode(&segments)
}

/// Returns the parent portion of `path` (empty for root-level nodes).
pub fn parent_path(path: &str) -> String {
    let segments = decode(path);
    match segments.split_last() {
        Some((_, parent)) => encode(parent),
        None => String::new(),
    }
}

/// Returns the last segment of `path`.
pub fn file_name(path: &str) -> Option<&str> {
    decode(path).last().copied()
}

/// True when `path` equals `ancestor` or lies underneath it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    let path = decode(path);
    let ancestor = decode(ancestor);
    path.len() >= ancestor.len() && path[..ancestor.len()] == ancestor[..]
}

/// Rewrites the `from` prefix of `path` to `to`.
///
/// Returns `None` when `path` is not within `from`.
pub fn rebase(path: &str, from: &str, to: &str) -> Option<String> {
    if !is_within(path, from) {
        return None;
    }
    let rest = decode(path).split_off(decode(from).len());
    let mut segments = decode(to);
    segments.extend(rest);
    Some(encode(&segments))
}
