//! Remote store adapter for the spreadsheet backend.
//!
//! Every persistence operation in this system is a single HTTP POST to one
//! Apps Script endpoint with a JSON body `{ "action": ..., ...payload }`,
//! answered by a `{ success, data?, message? }` envelope. This module owns
//! that bridge: the [`RemoteStore`] trait is the seam the catalog and
//! transaction components talk to, and [`SheetsClient`] is the production
//! implementation over `reqwest`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{PosError, Result};
use crate::models::User;

/// Default timeout for store requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout used specifically for the lightweight connectivity test.
const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// The reply envelope every action returns.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    /// Only the `login` action populates this.
    #[serde(default)]
    pub user: Option<User>,
}

impl ApiResponse {
    /// Treat `success: false` as a remote failure. Status-transition callers
    /// map it to [`PosError::StaleState`] instead, so this is opt-in.
    pub fn into_success(self) -> Result<ApiResponse> {
        if self.success {
            Ok(self)
        } else {
            Err(PosError::Remote(
                self.message
                    .unwrap_or_else(|| "unknown error from spreadsheet".to_string()),
            ))
        }
    }

    /// Deserialize the `data` field, failing when it is missing or malformed.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        let data = self
            .data
            .clone()
            .ok_or_else(|| PosError::Remote("response is missing the data field".to_string()))?;
        serde_json::from_value(data)
            .map_err(|e| PosError::Remote(format!("malformed data from spreadsheet: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// Action-keyed request/response bridge to the spreadsheet.
///
/// Implementations must return `Err` only for transport-level failures;
/// a parsed `success: false` envelope comes back as `Ok` so each caller
/// decides how to classify it.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn call(&self, action: &str, payload: Value) -> Result<ApiResponse>;
}

/// Merge the action name into the payload object, producing the wire body.
pub(crate) fn action_body(action: &str, payload: Value) -> Value {
    let mut body = match payload {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            // Non-object payloads are a programming error upstream; wrap them
            // so the request still carries the data for diagnosis.
            let mut map = serde_json::Map::new();
            map.insert("payload".to_string(), other);
            map
        }
    };
    body.insert("action".to_string(), Value::String(action.to_string()));
    Value::Object(body)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Convert a `reqwest::Error` into a user-friendly message.
fn friendly_error(url: &str, err: &reqwest::Error) -> String {
    if err.is_connect() {
        return format!("Cannot reach the spreadsheet endpoint at {url}");
    }
    if err.is_timeout() {
        return format!("Connection to {url} timed out");
    }
    if err.is_builder() {
        return format!("Invalid spreadsheet endpoint URL: {url}");
    }
    format!("Network error communicating with {url}: {err}")
}

/// Convert an HTTP status code into a user-friendly message.
fn status_error(status: StatusCode) -> String {
    match status.as_u16() {
        401 | 403 => "Spreadsheet script rejected the request (check deployment access)".to_string(),
        404 => "Spreadsheet endpoint not found (check the script URL)".to_string(),
        s if s >= 500 => format!("Spreadsheet script error (HTTP {s})"),
        s => format!("Unexpected response from spreadsheet (HTTP {s})"),
    }
}

// ---------------------------------------------------------------------------
// Production client
// ---------------------------------------------------------------------------

/// `reqwest`-backed [`RemoteStore`] talking to a deployed Apps Script web app.
pub struct SheetsClient {
    http: Client,
    script_url: String,
}

impl SheetsClient {
    /// Build a client for the configured endpoint.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| PosError::Remote(format!("failed to create HTTP client: {e}")))?;
        Ok(SheetsClient {
            http,
            script_url: config.script_url.clone(),
        })
    }

    /// Authenticate against the spreadsheet's user sheet.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let resp = self
            .call(
                "login",
                serde_json::json!({ "username": username, "password": password }),
            )
            .await?
            .into_success()?;
        match resp.user {
            Some(user) => {
                info!(username = %user.username, "login succeeded");
                Ok(user)
            }
            None => Err(PosError::Remote(
                "login reply is missing the user record".to_string(),
            )),
        }
    }

    /// Lightweight connectivity probe against the endpoint.
    pub async fn test_connection(&self) -> ConnectivityResult {
        let client = match Client::builder().timeout(CONNECTIVITY_TIMEOUT).build() {
            Ok(c) => c,
            Err(e) => {
                return ConnectivityResult {
                    success: false,
                    latency_ms: None,
                    error: Some(format!("failed to create HTTP client: {e}")),
                };
            }
        };

        let start = Instant::now();
        let resp = client
            .post(&self.script_url)
            .json(&action_body("test", Value::Null))
            .send()
            .await;
        let latency = start.elapsed().as_millis() as u64;

        match resp {
            Ok(r) if r.status().is_success() => {
                let ok = r
                    .json::<ApiResponse>()
                    .await
                    .map(|body| body.success)
                    .unwrap_or(false);
                if ok {
                    info!(latency_ms = latency, "connectivity test passed");
                }
                ConnectivityResult {
                    success: ok,
                    latency_ms: Some(latency),
                    error: if ok {
                        None
                    } else {
                        Some("endpoint reachable but the test action failed".to_string())
                    },
                }
            }
            Ok(r) => ConnectivityResult {
                success: false,
                latency_ms: Some(latency),
                error: Some(status_error(r.status())),
            },
            Err(e) => ConnectivityResult {
                success: false,
                latency_ms: None,
                error: Some(friendly_error(&self.script_url, &e)),
            },
        }
    }
}

/// Result of a connectivity test.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConnectivityResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[async_trait]
impl RemoteStore for SheetsClient {
    async fn call(&self, action: &str, payload: Value) -> Result<ApiResponse> {
        debug!(action, "remote store call");
        let resp = self
            .http
            .post(&self.script_url)
            .json(&action_body(action, payload))
            .send()
            .await
            .map_err(|e| {
                warn!(action, error = %e, "remote store transport failure");
                PosError::Remote(friendly_error(&self.script_url, &e))
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(action, status = status.as_u16(), "remote store HTTP failure");
            return Err(PosError::Remote(status_error(status)));
        }

        resp.json::<ApiResponse>()
            .await
            .map_err(|e| PosError::Remote(format!("invalid JSON from spreadsheet: {e}")))
    }
}

// ===========================================================================
// Test double
// ===========================================================================


// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_body_merges_action_into_payload() {
        let body = action_body("saveProduct", serde_json::json!({ "product": { "id": "1" } }));
        assert_eq!(body["action"], "saveProduct");
        assert_eq!(body["product"]["id"], "1");
    }

    #[test]
    fn test_action_body_with_empty_payload() {
        let body = action_body("getProducts", Value::Null);
        assert_eq!(body, serde_json::json!({ "action": "getProducts" }));
    }

    #[test]
    fn test_into_success_maps_failure_message() {
        let resp = ApiResponse {
            success: false,
            data: None,
            message: Some("Sheet is locked".to_string()),
            user: None,
        };
        let err = resp.into_success().unwrap_err();
        assert!(matches!(err, PosError::Remote(m) if m.contains("Sheet is locked")));
    }

    #[test]
    fn test_envelope_parses_with_missing_fields() {
        let resp: ApiResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(resp.success);
        assert!(resp.data.is_none());
        assert!(resp.message.is_none());
    }

    #[test]
    fn test_status_error_messages() {
        assert!(status_error(StatusCode::NOT_FOUND).contains("not found"));
        assert!(status_error(StatusCode::INTERNAL_SERVER_ERROR).contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_fake_sheet_round_trip() {
        use crate::models::Product;
        use super::fake::FakeSheet;

        let sheet = FakeSheet::default();
        let product = Product {
            id: "1".to_string(),
            name: "Kopi Susu Gula Aren".to_string(),
            category: "Minuman".to_string(),
            price: 18_000,
            cost: 6_000,
            stock: 50,
        };
        sheet
            .call(
                "saveProduct",
                serde_json::json!({ "product": product.clone() }),
            )
            .await
            .unwrap()
            .into_success()
            .unwrap();

        let resp = sheet.call("getProducts", Value::Null).await.unwrap();
        let products: Vec<Product> = resp.data_as().unwrap();
        assert_eq!(products, vec![product]);
    }
}
