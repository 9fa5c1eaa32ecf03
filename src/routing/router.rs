//! Route lookup and upstream URI construction.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up the matching route for a request
//! - Rewrite the request URI onto the route's upstream
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Longest prefix wins; ties keep configuration order
//! - Explicit no-match rather than a silent default

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{Method, Request, Uri};

use crate::config::{ConfigError, RouteConfig};
use crate::routing::matcher::{AndMatcher, Matcher, MethodMatcher, PathPrefixMatcher};

/// Upstream base URL split into the parts needed for rewriting.
#[derive(Debug, Clone)]
pub struct Upstream {
    scheme: Scheme,
    authority: Authority,
    base_path: String,
}

impl Upstream {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let uri: Uri = raw.parse().map_err(|e: axum::http::uri::InvalidUri| e.to_string())?;
        let parts = uri.into_parts();
        let scheme = parts.scheme.ok_or("missing scheme")?;
        let authority = parts.authority.ok_or("missing host")?;
        let base_path = parts
            .path_and_query
            .map(|pq| pq.path().trim_end_matches('/').to_string())
            .unwrap_or_default();

        Ok(Self {
            scheme,
            authority,
            base_path,
        })
    }

    /// Host header value for origin-changing requests.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Join `path` (starting with `/`) and `query` onto the base URL.
    pub fn uri_for(&self, path: &str, query: Option<&str>) -> Result<Uri, axum::http::Error> {
        let mut target = format!("{}{}", self.base_path, path);
        if target.is_empty() {
            target.push('/');
        }
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(target.parse::<PathAndQuery>()?)
            .build()
    }
}

/// A compiled route.
#[derive(Debug)]
pub struct Route {
    pub name: String,
    prefix: PathPrefixMatcher,
    matcher: AndMatcher,
    upstream: Upstream,
    strip_prefix: bool,
}

impl Route {
    pub fn from_config(config: &RouteConfig) -> Result<Self, ConfigError> {
        let methods = config
            .methods
            .iter()
            .map(|m| m.to_ascii_uppercase().parse::<Method>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::Invalid {
                key: "routes",
                reason: format!("route '{}': {}", config.name, e),
            })?;

        let upstream = Upstream::parse(&config.upstream).map_err(|reason| ConfigError::Invalid {
            key: "routes",
            reason: format!("route '{}': {}", config.name, reason),
        })?;

        let prefix = PathPrefixMatcher::new(config.path_prefix.as_str());
        let matcher = AndMatcher::new(vec![
            Box::new(prefix.clone()),
            Box::new(MethodMatcher::new(methods)),
        ]);

        Ok(Self {
            name: config.name.clone(),
            prefix,
            matcher,
            upstream,
            strip_prefix: config.strip_prefix,
        })
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    /// Upstream URI for an inbound request URI matched by this route.
    pub fn target_uri(&self, uri: &Uri) -> Result<Uri, axum::http::Error> {
        let path = uri.path();
        let forwarded = if self.strip_prefix {
            self.prefix.remainder(path).unwrap_or(path)
        } else {
            path
        };
        self.upstream.uri_for(forwarded, uri.query())
    }
}

/// Immutable route table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Compile routes, ordered longest prefix first.
    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, ConfigError> {
        let mut routes = routes
            .iter()
            .map(Route::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        // Stable sort keeps configuration order among equal prefixes.
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Ok(Self { routes })
    }

    /// First route whose prefix and method both match.
    pub fn match_request(&self, req: &Request<Body>) -> Option<&Route> {
        self.routes.iter().find(|r| r.matcher.matches(req))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str, prefix: &str, upstream: &str, methods: &[&str]) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            path_prefix: prefix.into(),
            upstream: upstream.into(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            strip_prefix: true,
        }
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::default())
            .unwrap()
    }

    #[test]
    fn test_default_users_route() {
        let router = Router::from_config(&[RouteConfig::users("http://usermanagement:8080")]).unwrap();

        let route = router.match_request(&request(Method::GET, "/users")).unwrap();
        assert_eq!(route.name, "users");
        assert!(router.match_request(&request(Method::POST, "/users")).is_none());
        assert!(router.match_request(&request(Method::GET, "/feedback")).is_none());
    }

    #[test]
    fn test_longest_prefix_wins() {
        let router = Router::from_config(&[
            route("root", "/", "http://web:3000", &[]),
            route("users", "/users", "http://users:8080", &[]),
            route("admins", "/users/admins", "http://admins:8080", &[]),
        ])
        .unwrap();

        let name = |uri| router.match_request(&request(Method::GET, uri)).map(|r| r.name.as_str());
        assert_eq!(name("/users/admins/3"), Some("admins"));
        assert_eq!(name("/users/3"), Some("users"));
        assert_eq!(name("/feedback"), Some("root"));
    }

    #[test]
    fn test_method_falls_through_to_shorter_prefix() {
        let router = Router::from_config(&[
            route("read", "/users", "http://users:8080", &["get"]),
            route("any", "/", "http://web:3000", &[]),
        ])
        .unwrap();

        let matched = router.match_request(&request(Method::DELETE, "/users/1")).unwrap();
        assert_eq!(matched.name, "any");
    }

    #[test]
    fn test_target_uri_strips_prefix() {
        let router = Router::from_config(&[RouteConfig::users("http://usermanagement:8080")]).unwrap();
        let route = &router.routes()[0];

        let uri: Uri = "/users".parse().unwrap();
        assert_eq!(route.target_uri(&uri).unwrap(), "http://usermanagement:8080/");

        let uri: Uri = "/users/7?active=true".parse().unwrap();
        assert_eq!(
            route.target_uri(&uri).unwrap(),
            "http://usermanagement:8080/7?active=true"
        );

        let uri: Uri = "/USERS/7".parse().unwrap();
        assert_eq!(route.target_uri(&uri).unwrap(), "http://usermanagement:8080/7");
    }

    #[test]
    fn test_target_uri_with_base_path() {
        let mut config = route("feedback", "/feedback", "http://feedback:8000/api/", &[]);
        let stripped = Route::from_config(&config).unwrap();
        config.strip_prefix = false;
        let kept = Route::from_config(&config).unwrap();

        let uri: Uri = "/feedback/12?x=1".parse().unwrap();
        assert_eq!(stripped.target_uri(&uri).unwrap(), "http://feedback:8000/api/12?x=1");
        assert_eq!(kept.target_uri(&uri).unwrap(), "http://feedback:8000/api/feedback/12?x=1");
        assert_eq!(stripped.upstream().authority().as_str(), "feedback:8000");
    }

    #[test]
    fn test_invalid_upstream() {
        let err = Router::from_config(&[route("bad", "/bad", "/relative", &[])]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "routes", .. }));
    }
}
