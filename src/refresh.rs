// Session refresh coordination
// A storm of concurrent 401s produces exactly one refresh call

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use reqwest::Client;

use crate::error::ApiError;

/// A credential-refresh operation shared by every caller that joins while it
/// is pending. Awaiting a clone yields the same outcome for all of them.
pub type SharedRefresh = Shared<BoxFuture<'static, Result<(), ApiError>>>;

/// Coordinates the session-refresh call so that at most one is in flight at
/// any instant.
///
/// The refresh endpoint is invoked with no body; credentials travel as
/// cookies and are rotated by the transport, not by this layer.
pub struct RefreshCoordinator {
    http: Client,
    refresh_url: String,
    in_flight: Arc<Mutex<Option<SharedRefresh>>>,
}

impl RefreshCoordinator {
    pub fn new(http: Client, refresh_url: String) -> Self {
        Self {
            http,
            refresh_url,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Join the pending refresh operation, or start one if none is pending.
    ///
    /// The check-and-set happens synchronously under the slot lock, so two
    /// callers can never both observe an empty slot. The operation clears
    /// the slot before any waiter resumes, so a 401 observed after this one
    /// settles starts a fresh refresh instead of replaying a stale outcome.
    pub fn refresh(&self) -> SharedRefresh {
        let mut slot = self.in_flight.lock().expect("refresh slot lock poisoned");
        if let Some(pending) = slot.as_ref() {
            tracing::debug!("session refresh already in flight, joining it");
            return pending.clone();
        }

        let http = self.http.clone();
        let url = self.refresh_url.clone();
        let shared_slot = Arc::clone(&self.in_flight);
        let operation = async move {
            let outcome = call_refresh_endpoint(&http, &url).await;
            shared_slot
                .lock()
                .expect("refresh slot lock poisoned")
                .take();
            outcome
        }
        .boxed()
        .shared();

        *slot = Some(operation.clone());
        operation
    }
}

async fn call_refresh_endpoint(http: &Client, url: &str) -> Result<(), ApiError> {
    tracing::debug!(url = %url, "refreshing session");

    let response = http.post(url).send().await.map_err(ApiError::transport)?;

    let status = response.status();
    if status.is_success() {
        tracing::info!("session refresh succeeded");
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!(status = status.as_u16(), "session refresh rejected");
    Err(ApiError::from_status(status.as_u16(), &body))
}
