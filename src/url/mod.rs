//! URL construction helpers.
//!
//! - [`join`]: joins a base URL and path segments with single slashes
//! - [`to_query_string`]: serializes nested query parameters
//! - [`create_request_url`]: appends a serialized query to a URL

mod join;
mod query;

pub use join::join;
pub use query::{create_request_url, to_query_string, ArrayFormat, QueryOptions};
