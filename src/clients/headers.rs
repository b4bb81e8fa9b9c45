//! Header values, header merging and per-attempt header resolution.
//!
//! A header value is either a literal string or a *supplier*: a zero-argument
//! async producer invoked once per request attempt. Suppliers let
//! time-sensitive values (freshly signed tokens, request IDs) be regenerated
//! on every retry.
//!
//! Header names are compared ASCII case-insensitively.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::JoinSet;

/// Boxed future returned by a header supplier.
pub type SupplierFuture = Pin<Box<dyn Future<Output = Option<String>> + Send + 'static>>;

type SupplierFn = dyn Fn() -> SupplierFuture + Send + Sync;

/// A literal header value or a deferred producer of one.
///
/// # Example
///
/// ```rust
/// use taskmaster_sdk::clients::HeaderValue;
///
/// let literal = HeaderValue::from("application/json");
/// let deferred = HeaderValue::supplier(|| async { Some("Bearer fresh-token".to_string()) });
/// # let _ = (literal, deferred);
/// ```
#[derive(Clone)]
pub enum HeaderValue {
    /// A fixed value.
    Static(String),
    /// A producer resolved once per attempt. `None` omits the header.
    Supplier(Arc<SupplierFn>),
}

impl HeaderValue {
    /// Wraps an async closure as a supplier.
    pub fn supplier<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<String>> + Send + 'static,
    {
        Self::Supplier(Arc::new(move || -> SupplierFuture { Box::pin(producer()) }))
    }

    /// Produces the value for one attempt.
    pub async fn resolve(&self) -> Option<String> {
        match self {
            Self::Static(value) => Some(value.clone()),
            Self::Supplier(producer) => producer().await,
        }
    }

    /// Returns the literal value, or `None` for suppliers.
    #[must_use]
    pub fn as_static(&self) -> Option<&str> {
        match self {
            Self::Static(value) => Some(value),
            Self::Supplier(_) => None,
        }
    }
}

impl fmt::Debug for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Supplier(_) => f.write_str("Supplier(..)"),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Static(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Static(value)
    }
}

/// An ordered set of headers in which an entry may be a removal marker.
///
/// A removal marker (`None`) deletes an earlier value when sets are combined
/// with [`merge_headers`]; [`merge_defined_headers`] ignores it.
#[derive(Clone, Debug, Default)]
pub struct Headers {
    entries: Vec<(String, Option<HeaderValue>)>,
}

impl Headers {
    /// Creates an empty header set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets `name` to `value`, replacing any entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<HeaderValue>) {
        self.set(name, Some(value.into()));
    }

    /// Records a removal marker for `name`.
    pub fn remove(&mut self, name: impl Into<String>) {
        self.set(name, None);
    }

    /// Sets `name` to a value or a removal marker.
    pub fn set(&mut self, name: impl Into<String>, value: Option<HeaderValue>) {
        let name = name.into();
        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            *slot = (name, value);
        } else {
            self.entries.push((name, value));
        }
    }

    /// Returns the value for `name`, ignoring removal markers.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_ref())
    }

    /// Returns `true` if `name` has a value.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over all entries, removal markers included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&HeaderValue>)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    /// Number of entries with a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|(_, v)| v.is_some()).count()
    }

    /// Returns `true` if no entry has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Into<String>, V: Into<HeaderValue>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Merges header sets; later sets win and removal markers delete.
///
/// The result contains values only.
pub fn merge_headers<'a, I>(sources: I) -> Headers
where
    I: IntoIterator<Item = &'a Headers>,
{
    let mut result = Headers::new();
    for (name, value) in sources.into_iter().flat_map(Headers::iter) {
        match value {
            Some(value) => result.insert(name, value.clone()),
            None => result
                .entries
                .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name)),
        }
    }
    result
}

/// Merges header sets; later sets win and removal markers are skipped.
pub fn merge_defined_headers<'a, I>(sources: I) -> Headers
where
    I: IntoIterator<Item = &'a Headers>,
{
    let mut result = Headers::new();
    for (name, value) in sources.into_iter().flat_map(Headers::iter) {
        if let Some(value) = value {
            result.insert(name, value.clone());
        }
    }
    result
}

/// Resolves every value in `headers` for one attempt.
///
/// Suppliers run concurrently, each invoked exactly once. Entries whose
/// supplier yields `None` are dropped. Output order follows `headers`.
///
/// # Panics
///
/// Re-raises a panic from a supplier.
pub async fn resolve_headers(headers: &Headers) -> Vec<(String, String)> {
    let mut resolved: Vec<Option<(String, String)>> = Vec::with_capacity(headers.entries.len());
    let mut pending = JoinSet::new();

    for (index, (name, value)) in headers.entries.iter().enumerate() {
        match value {
            Some(HeaderValue::Static(value)) => resolved.push(Some((name.clone(), value.clone()))),
            Some(HeaderValue::Supplier(producer)) => {
                resolved.push(None);
                let future = producer();
                pending.spawn(async move { (index, future.await) });
            }
            None => resolved.push(None),
        }
    }

    while let Some(joined) = pending.join_next().await {
        match joined {
            Ok((index, Some(value))) => {
                resolved[index] = Some((headers.entries[index].0.clone(), value));
            }
            Ok((_, None)) => {}
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => tracing::debug!("Header supplier task did not complete: {err}"),
        }
    }

    resolved.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn headers(pairs: &[(&str, Option<&str>)]) -> Headers {
        let mut result = Headers::new();
        for (name, value) in pairs {
            result.set(*name, value.map(HeaderValue::from));
        }
        result
    }

    fn static_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(HeaderValue::as_static)
    }

    #[test]
    fn test_later_sources_take_precedence() {
        let defaults = headers(&[("Accept", Some("application/json")), ("X-A", Some("1"))]);
        let overrides = headers(&[("x-a", Some("2"))]);
        let merged = merge_headers([&defaults, &overrides]);

        assert_eq!(static_value(&merged, "X-A"), Some("2"));
        assert_eq!(static_value(&merged, "Accept"), Some("application/json"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_removal_marker_deletes_earlier_value() {
        let defaults = headers(&[("Authorization", Some("Bearer x")), ("Accept", Some("*/*"))]);
        let overrides = headers(&[("authorization", None)]);
        let merged = merge_headers([&defaults, &overrides]);

        assert!(!merged.contains_key("Authorization"));
        assert!(merged.contains_key("Accept"));
    }

    #[test]
    fn test_defined_only_merge_skips_removal_markers() {
        let first = headers(&[("Content-Type", Some("application/json"))]);
        let second = headers(&[("Content-Type", None), ("X-B", Some("b"))]);
        let merged = merge_defined_headers([&first, &second]);

        assert_eq!(static_value(&merged, "content-type"), Some("application/json"));
        assert_eq!(static_value(&merged, "X-B"), Some("b"));
    }

    #[test]
    fn test_insert_replaces_case_insensitively_in_place() {
        let mut h = Headers::new();
        h.insert("X-One", "1");
        h.insert("X-Two", "2");
        h.insert("x-one", "3");

        let names: Vec<&str> = h.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["x-one", "X-Two"]);
        assert_eq!(static_value(&h, "X-ONE"), Some("3"));
    }

    #[test]
    fn test_suppliers_are_invoked_once_per_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut h = Headers::new();
        h.insert("Accept", "application/json");
        h.insert(
            "X-Token",
            HeaderValue::supplier(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Some(format!("token-{n}")) }
            }),
        );

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let first = rt.block_on(resolve_headers(&h));
        let second = rt.block_on(resolve_headers(&h));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            first,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("X-Token".to_string(), "token-1".to_string()),
            ]
        );
        assert_eq!(second[1].1, "token-2");
    }

    #[tokio::test]
    async fn test_supplier_returning_none_omits_header() {
        let mut h = Headers::new();
        h.insert("X-Optional", HeaderValue::supplier(|| async { None }));
        h.insert("X-Present", "yes");

        let resolved = resolve_headers(&h).await;
        assert_eq!(resolved, vec![("X-Present".to_string(), "yes".to_string())]);
    }

    #[test]
    fn test_static_only_resolution_with_tokio_test() {
        let h: Headers = [("A", "1"), ("B", "2")].into_iter().collect();
        let resolved = tokio_test::block_on(resolve_headers(&h));
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_supplier_debug_is_opaque() {
        let value = HeaderValue::supplier(|| async { Some("secret".to_string()) });
        assert_eq!(format!("{value:?}"), "Supplier(..)");
    }
}
