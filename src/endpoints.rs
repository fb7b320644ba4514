// Endpoint classification
// Ordered rule table deciding which 401s are worth a session refresh

use once_cell::sync::Lazy;

/// How a 401 on a path should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Login, register, refresh, logout. Excluded from the retry machinery
    /// entirely, so a failed login is never mistaken for an expired session.
    AuthLifecycle,

    /// Legitimately callable without a session. A 401 here is an expected
    /// "not logged in" signal, not a recoverable error.
    Public,

    /// Requires a valid session. A 401 here may be fixable by a refresh.
    Protected,
}

#[derive(Debug, Clone)]
enum PathMatch {
    Exact(String),
    Prefix(String),
}

/// One classification rule: a path matcher paired with the kind it yields.
#[derive(Debug, Clone)]
pub struct RouteRule {
    matcher: PathMatch,
    kind: EndpointKind,
}

impl RouteRule {
    pub fn exact(path: impl Into<String>, kind: EndpointKind) -> Self {
        Self {
            matcher: PathMatch::Exact(path.into()),
            kind,
        }
    }

    pub fn prefix(path: impl Into<String>, kind: EndpointKind) -> Self {
        Self {
            matcher: PathMatch::Prefix(path.into()),
            kind,
        }
    }

    fn matches(&self, path: &str) -> bool {
        match &self.matcher {
            PathMatch::Exact(expected) => path == expected,
            // A prefix only matches on a `/` segment boundary, so `/products`
            // covers `/products/42` but never `/productsale`.
            PathMatch::Prefix(expected) => {
                path == expected
                    || path
                        .strip_prefix(expected.as_str())
                        .map_or(false, |rest| rest.starts_with('/'))
            }
        }
    }
}

/// Ordered, most-specific-first classification table. The first matching
/// rule wins; paths matching no rule are protected.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Classification table for the storefront API. Exact auth-lifecycle
    /// rules come first so that `/auth/profile`, a session-backed resource
    /// under the same prefix, still classifies as protected.
    pub fn storefront() -> Self {
        STOREFRONT_ROUTES.clone()
    }

    pub fn classify(&self, path: &str) -> EndpointKind {
        let path = path.split('?').next().unwrap_or(path);
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map(|rule| rule.kind)
            .unwrap_or(EndpointKind::Protected)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::storefront()
    }
}

static STOREFRONT_ROUTES: Lazy<RouteTable> = Lazy::new(|| {
    RouteTable::new(vec![
        RouteRule::exact("/auth/login", EndpointKind::AuthLifecycle),
        RouteRule::exact("/auth/register", EndpointKind::AuthLifecycle),
        RouteRule::exact("/auth/refresh", EndpointKind::AuthLifecycle),
        RouteRule::exact("/auth/logout", EndpointKind::AuthLifecycle),
        RouteRule::prefix("/products", EndpointKind::Public),
        RouteRule::prefix("/categories", EndpointKind::Public),
    ])
});
