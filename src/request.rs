//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use indexmap::IndexMap;

/// An incoming HTTP request, as handlers see it.
///
/// The query string is percent-decoded into an insertion-ordered map at
/// construction time, so handlers read typed-ish values while the audit log
/// can still render the query object in URL order. Repeated keys keep the
/// last value.
pub struct Request {
    method: Method,
    path: String,
    query: IndexMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        uri: &Uri,
        headers: HeaderMap,
        body: Bytes,
        params: HashMap<String, String>,
    ) -> Self {
        let query = uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method,
            path: uri.path().to_owned(),
            query,
            headers,
            body,
            params,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the decoded value of a query parameter.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// The full decoded query map, in URL order.
    pub fn query_map(&self) -> &IndexMap<String, String> {
        &self.query
    }

    /// Case-insensitive header lookup. Non-UTF-8 values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request {
        Request::new(
            Method::GET,
            &uri.parse::<Uri>().unwrap(),
            HeaderMap::new(),
            Bytes::new(),
            HashMap::new(),
        )
    }

    #[test]
    fn query_is_decoded_in_url_order() {
        let req = request("/add?num1=4&num2=6");
        assert_eq!(req.query("num1"), Some("4"));
        assert_eq!(req.query("num2"), Some("6"));
        let keys: Vec<&str> = req.query_map().keys().map(String::as_str).collect();
        assert_eq!(keys, ["num1", "num2"]);
    }

    #[test]
    fn query_values_are_percent_decoded() {
        let req = request("/add?num1=%202.5%20&num2=1e3");
        assert_eq!(req.query("num1"), Some(" 2.5 "));
        assert_eq!(req.query("num2"), Some("1e3"));
    }

    #[test]
    fn missing_query_string_is_empty_map() {
        let req = request("/add");
        assert!(req.query_map().is_empty());
        assert_eq!(req.query("num1"), None);
    }

    #[test]
    fn repeated_keys_keep_the_last_value() {
        let req = request("/add?num1=1&num1=2&num2=3");
        assert_eq!(req.query("num1"), Some("2"));
    }
}
