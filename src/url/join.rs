//! Slash-normalizing URL joining.

/// Joins `base` and `segments` so exactly one slash separates every part.
///
/// Leading and trailing slashes of each segment are trimmed before joining,
/// and empty segments are ignored. A trailing slash is kept only when the
/// last segment explicitly ends with `/`.
///
/// Absolute bases (containing `://`) are parsed and only their path is
/// edited, so any query string or fragment on the base survives. Anything
/// else is joined textually.
///
/// # Example
///
/// ```rust
/// use taskmaster_sdk::url::join;
///
/// assert_eq!(
///     join("https://host/api/", &["v1", "/tasks/"]),
///     "https://host/api/v1/tasks/"
/// );
/// assert_eq!(join("https://host", &["/api/health"]), "https://host/api/health");
/// ```
#[must_use]
pub fn join<S: AsRef<str>>(base: &str, segments: &[S]) -> String {
    if base.is_empty() {
        return String::new();
    }
    if segments.is_empty() {
        return base.to_string();
    }

    let preserve_trailing_slash = segments
        .last()
        .is_some_and(|segment| segment.as_ref().ends_with('/'));

    if base.contains("://") {
        if let Ok(mut url) = reqwest::Url::parse(base) {
            if !url.cannot_be_a_base() {
                let path = join_path(url.path(), segments, preserve_trailing_slash);
                url.set_path(&path);
                return url.to_string();
            }
        }
    }

    join_path(base, segments, preserve_trailing_slash)
}

fn join_path<S: AsRef<str>>(base: &str, segments: &[S], preserve_trailing_slash: bool) -> String {
    let mut result = base.to_string();
    for segment in segments {
        let clean = segment.as_ref().trim_matches('/');
        if clean.is_empty() {
            continue;
        }
        let kept = result.trim_end_matches('/').len();
        result.truncate(kept);
        result.push('/');
        result.push_str(clean);
    }
    if preserve_trailing_slash && !result.ends_with('/') {
        result.push('/');
    }
    result
}
