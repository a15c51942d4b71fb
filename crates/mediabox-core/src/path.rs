//! Backend-neutral path joining.
//!
//! Every path handed to a storage backend is produced here: forward slashes
//! only, a single leading `/`, no empty segments.

/// Joins path segments into a normalized absolute path.
///
/// Both `/` and `\` separate segments; empty segments are skipped, so
/// `combine(["/a/", "", "b\\c"])` yields `/a/b/c`.
pub fn combine<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = String::new();
    for segment in segments {
        for part in segment.as_ref().split(['/', '\\']) {
            if part.is_empty() {
                continue;
            }
            path.push('/');
            path.push_str(part);
        }
    }

    if path.is_empty() {
        path.push('/');
    }
    path
}

/// Strips leading and trailing separators from a single relative segment.
///
/// Returns `None` when nothing remains.
pub fn trim_segment(segment: &str) -> Option<String> {
    let parts: Vec<&str> = segment
        .split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .collect();

    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Returns the final segment of a path.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or_default()
}

/// Returns the path without its leading separator, as object stores expect.
pub fn relative(path: &str) -> &str {
    path.trim_start_matches(['/', '\\'])
}
