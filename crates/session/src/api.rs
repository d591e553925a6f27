//! Management API abstraction for the scan daemon.
//!
//! The [`ManagementApi`] trait abstracts the daemon's HTTP control
//! surface, allowing production code to use [`HttpManagementApi`] while
//! tests use a mock. The surface is consumed, never implemented, by this
//! crate: three calls cover the whole session lifecycle.
//!
//! # Wire format
//!
//! The alert inventory is a JSON object with an `alerts` array; each
//! record exposes at least `alert` (the identity string) and `risk` (one
//! of `"High"`, `"Medium"`, `"Low"`, `"Informational"`, exact match,
//! case-sensitive). Anything else is malformed.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use scangate_core::types::{Alert, Severity};

use crate::command::API_KEY;
use crate::error::ApiError;

const ALERTS_ENDPOINT: &str = "/api/v1/alerts";
const LOAD_SESSION_ENDPOINT: &str = "/api/v1/session/load";
const SHUTDOWN_ENDPOINT: &str = "/api/v1/shutdown";

/// Per-request timeout for management calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Trait abstracting the daemon management API.
///
/// `Send + Sync + 'static` so the client can be shared across async
/// contexts.
///
/// # Implementations
///
/// - [`HttpManagementApi`]: production implementation over `reqwest`
/// - `MockManagementApi`: configurable test implementation (tests only)
pub trait ManagementApi: Send + Sync + 'static {
    /// Loads a pre-built session file into the daemon.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails or the daemon rejects the
    /// session file.
    fn load_session(&self, path: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Fetches the alert inventory.
    ///
    /// Empty `base_url`/`start`/`count` fetch the full unfiltered list in
    /// daemon order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails or a record is malformed
    /// (missing `alert`/`risk`, or an unknown `risk` value).
    fn alerts(
        &self,
        base_url: &str,
        start: &str,
        count: &str,
    ) -> impl Future<Output = Result<Vec<Alert>, ApiError>> + Send;

    /// Terminates the daemon.
    ///
    /// The remote side does not guarantee idempotence; call at most once
    /// per session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails.
    fn shutdown(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Production management API client over HTTP.
pub struct HttpManagementApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpManagementApi {
    /// Creates a client for the daemon at `host:port`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(host: &str, port: u16) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Request {
                endpoint: String::new(),
                reason: format!("failed to build http client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: format!("http://{host}:{port}"),
        })
    }

    /// Issues one GET and returns the decoded JSON body.
    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!(endpoint, "management api call");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("apikey", API_KEY)])
            .send()
            .await
            .map_err(|e| ApiError::Request {
                endpoint: endpoint.to_owned(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_owned(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| ApiError::Malformed {
            endpoint: endpoint.to_owned(),
            reason: format!("undecodable body: {e}"),
        })
    }
}

impl ManagementApi for HttpManagementApi {
    async fn load_session(&self, path: &str) -> Result<(), ApiError> {
        self.get(LOAD_SESSION_ENDPOINT, &[("name", path)]).await?;
        Ok(())
    }

    async fn alerts(
        &self,
        base_url: &str,
        start: &str,
        count: &str,
    ) -> Result<Vec<Alert>, ApiError> {
        let body = self
            .get(
                ALERTS_ENDPOINT,
                &[("baseurl", base_url), ("start", start), ("count", count)],
            )
            .await?;
        parse_alerts(ALERTS_ENDPOINT, &body)
    }

    async fn shutdown(&self) -> Result<(), ApiError> {
        self.get(SHUTDOWN_ENDPOINT, &[]).await?;
        Ok(())
    }
}

/// Decodes the alert inventory body into typed alerts.
///
/// Record order is preserved; it carries meaning downstream (the
/// aggregator counts only first occurrences).
fn parse_alerts(endpoint: &str, body: &Value) -> Result<Vec<Alert>, ApiError> {
    let items = body
        .get("alerts")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::Malformed {
            endpoint: endpoint.to_owned(),
            reason: "missing 'alerts' array".to_owned(),
        })?;

    let mut alerts = Vec::with_capacity(items.len());
    for item in items {
        let name = item
            .get("alert")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Malformed {
                endpoint: endpoint.to_owned(),
                reason: "record missing 'alert' field".to_owned(),
            })?;
        let risk = item
            .get("risk")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Malformed {
                endpoint: endpoint.to_owned(),
                reason: "record missing 'risk' field".to_owned(),
            })?;
        let severity = Severity::from_risk(risk).ok_or_else(|| ApiError::Malformed {
            endpoint: endpoint.to_owned(),
            reason: format!("unknown risk value '{risk}'"),
        })?;
        alerts.push(Alert::new(name, severity));
    }
    Ok(alerts)
}

/// Configurable mock client for tests.
#[cfg(test)]
pub struct MockManagementApi {
    /// Alerts returned by `alerts`.
    pub alert_list: Vec<Alert>,
    /// Simulate a failing `alerts` call.
    pub fail_alerts: bool,
    /// Simulate a failing `shutdown` call.
    pub fail_shutdown: bool,
    /// Number of `shutdown` calls observed.
    shutdown_calls: std::sync::atomic::AtomicUsize,
    /// Session paths passed to `load_session`.
    loaded_sessions: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockManagementApi {
    pub fn new() -> Self {
        Self {
            alert_list: Vec::new(),
            fail_alerts: false,
            fail_shutdown: false,
            shutdown_calls: std::sync::atomic::AtomicUsize::new(0),
            loaded_sessions: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_alerts(mut self, alerts: Vec<Alert>) -> Self {
        self.alert_list = alerts;
        self
    }

    pub fn with_failing_alerts(mut self) -> Self {
        self.fail_alerts = true;
        self
    }

    pub fn with_failing_shutdown(mut self) -> Self {
        self.fail_shutdown = true;
        self
    }

    pub fn shutdown_calls(&self) -> usize {
        self.shutdown_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn loaded_sessions(&self) -> Vec<String> {
        self.loaded_sessions.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ManagementApi for MockManagementApi {
    async fn load_session(&self, path: &str) -> Result<(), ApiError> {
        self.loaded_sessions.lock().unwrap().push(path.to_owned());
        Ok(())
    }

    async fn alerts(
        &self,
        _base_url: &str,
        _start: &str,
        _count: &str,
    ) -> Result<Vec<Alert>, ApiError> {
        if self.fail_alerts {
            return Err(ApiError::Request {
                endpoint: ALERTS_ENDPOINT.to_owned(),
                reason: "mock failure".to_owned(),
            });
        }
        Ok(self.alert_list.clone())
    }

    async fn shutdown(&self) -> Result<(), ApiError> {
        self.shutdown_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_shutdown {
            return Err(ApiError::Status {
                endpoint: SHUTDOWN_ENDPOINT.to_owned(),
                status: 500,
            });
        }
        Ok(())
    }
}
