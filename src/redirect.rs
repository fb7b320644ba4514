// Redirect policy
// Last-resort navigation fallback for auth failures refresh could not fix

/// Capability to observe and change the current location.
///
/// `assign` must update `location()` synchronously. The home target sits on
/// the safe allowlist, so once a failure storm forces one navigation every
/// later caller in the same storm observes a safe location and leaves the
/// user alone.
pub trait Navigator: Send + Sync {
    fn location(&self) -> String;
    fn assign(&self, target: &str);
}

/// Navigator for headless consumers: pinned to the home location, discards
/// assignments.
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn location(&self) -> String {
        "/".to_string()
    }

    fn assign(&self, _target: &str) {}
}

/// Decides whether an unrecoverable auth failure forces a navigation.
///
/// Safe locations are places where the user may be intentionally browsing
/// anonymously; an expired session there must not throw the user out.
#[derive(Debug, Clone)]
pub struct RedirectPolicy {
    safe_locations: Vec<String>,
    home: String,
}

impl RedirectPolicy {
    pub fn new(safe_locations: Vec<String>, home: impl Into<String>) -> Self {
        Self {
            safe_locations,
            home: home.into(),
        }
    }

    /// Allowlist for the storefront: home, the auth entry pages and the
    /// public catalog views including their sub-paths.
    pub fn storefront() -> Self {
        Self::new(
            ["/", "/login", "/register", "/products", "/categories"]
                .into_iter()
                .map(String::from)
                .collect(),
            "/",
        )
    }

    /// Runs only after classification has already excluded public-endpoint
    /// 401s. Returns whether a navigation was issued.
    pub fn on_unrecoverable(&self, navigator: &dyn Navigator) -> bool {
        let current = navigator.location();
        if self.is_safe(&current) {
            tracing::debug!(location = %current, "auth failure on safe location, staying put");
            return false;
        }

        tracing::warn!(from = %current, to = %self.home, "unrecoverable auth failure, navigating home");
        navigator.assign(&self.home);
        true
    }

    fn is_safe(&self, location: &str) -> bool {
        let location = location.split('?').next().unwrap_or(location);
        self.safe_locations.iter().any(|safe| {
            // Home is exact-only; everything else covers its sub-paths on a
            // `/` segment boundary.
            if safe == "/" {
                location == "/"
            } else {
                location == safe
                    || location
                        .strip_prefix(safe.as_str())
                        .map_or(false, |rest| rest.starts_with('/'))
            }
        })
    }
}
