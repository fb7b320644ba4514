// Transport wrapper
// Single entry/exit point for all outbound API calls

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::endpoints::EndpointKind;
use crate::error::{ApiError, Result};
use crate::redirect::{Navigator, NullNavigator};
use crate::refresh::RefreshCoordinator;

/// A single outbound request: target, payload and the one-shot retry flag.
///
/// The body is pre-serialized so a replay is byte-identical. The flag is set
/// before the replay is dispatched and never cleared.
#[derive(Debug, Clone)]
struct RequestDescriptor {
    method: Method,
    path: String,
    body: Option<Value>,
    retried: bool,
}

impl RequestDescriptor {
    fn new(method: Method, path: &str, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.to_string(),
            body,
            retried: false,
        }
    }
}

/// Storefront API client with session-expiry recovery.
///
/// Every call resolves with the deserialized payload or rejects with a
/// normalized [`ApiError`]. A 401 on a protected endpoint is recovered
/// transparently, at most once per request, through a single shared refresh.
pub struct StoreClient {
    http: Client,
    config: ClientConfig,
    refresher: RefreshCoordinator,
    navigator: Arc<dyn Navigator>,
}

impl StoreClient {
    /// Client without a navigation capability, for headless consumers.
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        Self::with_navigator(config, Arc::new(NullNavigator))
    }

    pub fn with_navigator(
        config: ClientConfig,
        navigator: Arc<dyn Navigator>,
    ) -> anyhow::Result<Self> {
        // Cookie store shared with the refresh call, so a successful refresh
        // rotates the credentials every later request attempt carries.
        let http = Client::builder()
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        let refresher = RefreshCoordinator::new(http.clone(), config.refresh_url());

        Ok(Self {
            http,
            config,
            refresher,
            navigator,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.run(RequestDescriptor::new(Method::GET, path, None)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.run(RequestDescriptor::new(Method::DELETE, path, None)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serialize_body(body)?;
        self.run(RequestDescriptor::new(Method::POST, path, Some(body))).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serialize_body(body)?;
        self.run(RequestDescriptor::new(Method::PATCH, path, Some(body))).await
    }

    /// Completion path every response goes through: successes pass straight
    /// to the caller, a 401 on a protected endpoint gets one refresh-and-
    /// replay, everything else is surfaced as-is.
    async fn run<T: DeserializeOwned>(
        &self,
        mut descriptor: RequestDescriptor,
    ) -> Result<T> {
        loop {
            let failure = match self.dispatch(&descriptor).await {
                Ok(response) => return decode(response).await,
                Err(failure) => failure,
            };

            if !failure.is_unauthorized() {
                return Err(failure);
            }

            match self.config.routes.classify(&descriptor.path) {
                EndpointKind::AuthLifecycle => {
                    tracing::debug!(path = %descriptor.path, "401 on auth-lifecycle endpoint, not refreshable");
                    return Err(failure);
                }
                EndpointKind::Public => {
                    tracing::debug!(path = %descriptor.path, "401 on public endpoint, surfacing as-is");
                    return Err(failure);
                }
                EndpointKind::Protected => {}
            }

            if descriptor.retried {
                tracing::error!(path = %descriptor.path, "still unauthorized after retry, giving up");
                self.config.redirect.on_unrecoverable(self.navigator.as_ref());
                return Err(failure);
            }

            tracing::warn!(path = %descriptor.path, "session expired on protected endpoint, refreshing");
            if let Err(refresh_failure) = self.refresher.refresh().await {
                tracing::error!(error = %refresh_failure, "session refresh failed");
                self.config.redirect.on_unrecoverable(self.navigator.as_ref());
                // Callers see the original failure, not the refresh endpoint's.
                return Err(failure);
            }

            // Set before the replay goes out: if the replay itself comes
            // back 401, the next iteration gives up instead of refreshing
            // again.
            descriptor.retried = true;
        }
    }

    async fn dispatch(&self, descriptor: &RequestDescriptor) -> Result<Response> {
        let url = self.config.api_url(&descriptor.path);
        tracing::debug!(
            method = %descriptor.method,
            url = %url,
            retry = descriptor.retried,
            "sending request"
        );

        let mut request = self.http.request(descriptor.method.clone(), &url);
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), url = %url, "request failed");
        Err(ApiError::from_status(status.as_u16(), &body))
    }
}

fn serialize_body<B: Serialize + ?Sized>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|err| ApiError {
        message: format!("failed to serialize request body: {}", err),
        status: None,
        data: None,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(ApiError::transport)?;
    // Empty success bodies decode as JSON null so unit-shaped payloads work.
    let raw: &[u8] = if body.is_empty() { &b"null"[..] } else { body.as_ref() };
    serde_json::from_slice(raw).map_err(|err| ApiError::decode(status, err))
}
