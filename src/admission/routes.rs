//! Route matching for the admission policy.

use crate::request::Method;

/// Selects which requests are subject to admission control.
///
/// A request matches when its method is in the configured set and its path
/// starts with one of the configured prefixes. An empty method list matches
/// every method, and an empty prefix list matches every path; non-matching
/// requests bypass all admission stages.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    methods: Vec<Method>,
    path_prefixes: Vec<String>,
}

impl RouteMatcher {
    /// Create a matcher over the given methods and path prefixes.
    pub fn new(methods: Vec<Method>, path_prefixes: Vec<String>) -> Self {
        Self {
            methods,
            path_prefixes,
        }
    }

    /// Whether a request with this method and path is in scope.
    pub fn matches(&self, method: Method, path: &str) -> bool {
        if !self.methods.is_empty() && !self.methods.contains(&method) {
            return false;
        }
        self.path_prefixes.is_empty()
            || self
                .path_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messaging_routes() -> RouteMatcher {
        RouteMatcher::new(
            vec![Method::Post],
            vec!["/api/messages".to_string(), "/chats".to_string()],
        )
    }

    #[test]
    fn test_matching_method_and_prefix() {
        let routes = messaging_routes();

        assert!(routes.matches(Method::Post, "/api/messages/42"));
        assert!(routes.matches(Method::Post, "/chats/7/messages"));
    }

    #[test]
    fn test_non_matching_method_is_exempt() {
        let routes = messaging_routes();

        assert!(!routes.matches(Method::Get, "/api/messages/42"));
        assert!(!routes.matches(Method::Delete, "/chats/7"));
    }

    #[test]
    fn test_non_matching_path_is_exempt() {
        let routes = messaging_routes();

        assert!(!routes.matches(Method::Post, "/health"));
        assert!(!routes.matches(Method::Post, "/api/users"));
    }

    #[test]
    fn test_empty_lists_match_everything() {
        let routes = RouteMatcher::new(Vec::new(), Vec::new());

        assert!(routes.matches(Method::Get, "/anything"));
        assert!(routes.matches(Method::Post, "/"));
    }

    #[test]
    fn test_prefix_is_anchored_at_path_start() {
        let routes = messaging_routes();

        // "/chats" appearing mid-path is not a prefix match.
        assert!(!routes.matches(Method::Post, "/v2/chats/7"));
    }
}
