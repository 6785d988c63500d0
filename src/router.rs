//! Radix-tree request router.
//!
//! One [`matchit`] tree per HTTP method, O(path-length) lookup. You register
//! a path, you get a handler. That is all — cross-cutting concerns live in
//! [`middleware`](crate::middleware), not in a stack threaded through here.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for
    /// chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves
    /// them.
    ///
    /// # Panics
    ///
    /// Panics at startup on a malformed route pattern.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Register a GET handler — every calculator route is one.
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;
    use crate::Request;

    async fn ok(_req: Request) -> Response {
        Response::text("ok")
    }

    #[test]
    fn lookup_matches_registered_method_and_path() {
        let router = Router::new().get("/add", ok);
        assert!(router.lookup(&Method::GET, "/add").is_some());
        assert!(router.lookup(&Method::GET, "/subtract").is_none());
        assert!(router.lookup(&Method::POST, "/add").is_none());
    }

    #[test]
    fn lookup_extracts_path_params() {
        let router = Router::new().get("/users/{id}", ok);
        let (_, params) = router.lookup(&Method::GET, "/users/42").unwrap();
        assert_eq!(params["id"], "42");
    }
}
