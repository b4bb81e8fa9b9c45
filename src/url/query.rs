//! Query-string serialization for nested parameters.
//!
//! Parameters are a JSON object (`serde_json::Map`). With the crate's
//! `preserve_order` serde_json feature the map keeps insertion order, which
//! makes serialization deterministic.

use serde_json::{Map, Value};

/// How array values are laid out in a query string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArrayFormat {
    /// `key[0]=a&key[1]=b`
    #[default]
    Indices,
    /// `key=a&key=b`
    Repeat,
}

/// Options controlling [`to_query_string`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryOptions {
    /// Layout of array values.
    pub array_format: ArrayFormat,
    /// Whether keys and values are percent-encoded.
    pub encode: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            array_format: ArrayFormat::Indices,
            encode: true,
        }
    }
}

impl QueryOptions {
    /// Returns default options with the given array format.
    #[must_use]
    pub const fn with_array_format(array_format: ArrayFormat) -> Self {
        Self {
            array_format,
            encode: true,
        }
    }
}

/// Serializes `params` into a query string (without the leading `?`).
///
/// - scalars become `key=value`
/// - arrays follow [`QueryOptions::array_format`]
/// - nested objects are flattened as `outer[inner]=value`
/// - `null` values, empty arrays and empty objects are omitted
///
/// Bracket delimiters are never percent-encoded; the key names between them
/// and the values are, unless [`QueryOptions::encode`] is `false`.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use taskmaster_sdk::url::{to_query_string, ArrayFormat, QueryOptions};
///
/// let params = json!({"a": [1, 2], "b": {"c": "x"}});
/// let params = params.as_object().unwrap();
///
/// assert_eq!(
///     to_query_string(params, QueryOptions::default()),
///     "a[0]=1&a[1]=2&b[c]=x"
/// );
/// assert_eq!(
///     to_query_string(params, QueryOptions::with_array_format(ArrayFormat::Repeat)),
///     "a=1&a=2&b[c]=x"
/// );
/// ```
#[must_use]
pub fn to_query_string(params: &Map<String, Value>, options: QueryOptions) -> String {
    let mut parts = Vec::new();
    for (key, value) in params {
        let key = encode(key, options.encode);
        push_pairs(&mut parts, &key, value, options);
    }
    parts.join("&")
}

/// Appends the serialized `query` to `url`, if it serializes to anything.
#[must_use]
pub fn create_request_url(
    url: &str,
    query: Option<&Map<String, Value>>,
    options: QueryOptions,
) -> String {
    let query_string = query.map(|q| to_query_string(q, options)).unwrap_or_default();
    if query_string.is_empty() {
        url.to_string()
    } else {
        format!("{url}?{query_string}")
    }
}

fn push_pairs(parts: &mut Vec<String>, key: &str, value: &Value, options: QueryOptions) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                match options.array_format {
                    ArrayFormat::Indices => {
                        push_pairs(parts, &format!("{key}[{index}]"), item, options);
                    }
                    ArrayFormat::Repeat => push_pairs(parts, key, item, options),
                }
            }
        }
        Value::Object(map) => {
            for (child, child_value) in map {
                let child_key = format!("{key}[{}]", encode(child, options.encode));
                push_pairs(parts, &child_key, child_value, options);
            }
        }
        Value::String(s) => parts.push(format!("{key}={}", encode(s, options.encode))),
        Value::Bool(_) | Value::Number(_) => {
            parts.push(format!("{key}={}", encode(&value.to_string(), options.encode)));
        }
    }
}

fn encode(raw: &str, enabled: bool) -> String {
    if enabled {
        urlencoding::encode(raw).into_owned()
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_nested_params_with_indices() {
        let p = params(json!({"a": [1, 2], "b": {"c": "x"}}));
        assert_eq!(
            to_query_string(&p, QueryOptions::default()),
            "a[0]=1&a[1]=2&b[c]=x"
        );
    }

    #[test]
    fn test_nested_params_with_repeat() {
        let p = params(json!({"a": [1, 2], "b": {"c": "x"}}));
        assert_eq!(
            to_query_string(&p, QueryOptions::with_array_format(ArrayFormat::Repeat)),
            "a=1&a=2&b[c]=x"
        );
    }

    #[test]
    fn test_empty_collections_and_nulls_are_omitted() {
        let p = params(json!({"empty": [], "obj": {}, "gone": null, "kept": "y"}));
        assert_eq!(to_query_string(&p, QueryOptions::default()), "kept=y");
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let p = params(json!({"zeta": 1, "alpha": 2, "mid": 3}));
        assert_eq!(
            to_query_string(&p, QueryOptions::default()),
            "zeta=1&alpha=2&mid=3"
        );
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let p = params(json!({"q": "a b&c", "k y": "v"}));
        assert_eq!(
            to_query_string(&p, QueryOptions::default()),
            "q=a%20b%26c&k%20y=v"
        );
    }

    #[test]
    fn test_encoding_can_be_disabled() {
        let p = params(json!({"q": "a b"}));
        let options = QueryOptions {
            encode: false,
            ..QueryOptions::default()
        };
        assert_eq!(to_query_string(&p, options), "q=a b");
    }

    #[test]
    fn test_booleans_and_array_of_objects() {
        let p = params(json!({"flag": true, "items": [{"id": 1}, {"id": 2}]}));
        assert_eq!(
            to_query_string(&p, QueryOptions::default()),
            "flag=true&items[0][id]=1&items[1][id]=2"
        );
        assert_eq!(
            to_query_string(&p, QueryOptions::with_array_format(ArrayFormat::Repeat)),
            "flag=true&items[id]=1&items[id]=2"
        );
    }

    #[test]
    fn test_null_array_items_are_skipped() {
        let p = params(json!({"a": ["x", null, "z"]}));
        assert_eq!(
            to_query_string(&p, QueryOptions::default()),
            "a[0]=x&a[2]=z"
        );
    }

    #[test]
    fn test_create_request_url() {
        let p = params(json!({"limit": 10}));
        assert_eq!(
            create_request_url("https://host/x", Some(&p), QueryOptions::default()),
            "https://host/x?limit=10"
        );
        assert_eq!(
            create_request_url("https://host/x", None, QueryOptions::default()),
            "https://host/x"
        );
        let empty = params(json!({"none": null}));
        assert_eq!(
            create_request_url("https://host/x", Some(&empty), QueryOptions::default()),
            "https://host/x"
        );
    }
}
