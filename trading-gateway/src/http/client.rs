//! HTTP client for venue REST APIs.
//!
//! This module provides a generic HTTP client that handles:
//! - Request signing via the `RequestSigner` trait
//! - Query, form and JSON request bodies
//! - Timeout handling
//! - Mapping of non-success statuses and undecodable bodies to `VenueError`
//!
//! The client never retries; every failure goes straight back to the caller.

use std::sync::Arc;

use chrono::Utc;
use reqwest::{header, Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::signer::{build_query_string, RequestSigner, SignableRequest};
use crate::config::RestConfig;
use crate::error::{VenueError, VenueResult};

/// Longest response excerpt carried in a decode error.
const BODY_EXCERPT_LEN: usize = 512;

/// How request parameters travel.
#[derive(Debug)]
enum Payload {
    /// Parameters in the query string
    Query,
    /// Parameters form-encoded in the body
    Form,
    /// Serialized JSON body; parameters (if any) stay in the query
    Json(String),
}

/// HTTP client for venue REST APIs.
///
/// # Example
///
/// ```ignore
/// let signer = PassphraseSigner::new(key, secret, passphrase).with_header_prefix("OK-ACCESS-");
/// let client = HttpClient::new("https://www.okx.com", Some(Box::new(signer)), RestConfig::default())?;
///
/// let balance: OkxResponse<OkxBalance> = client
///     .get_signed("/api/v5/account/balance", &[("ccy", "USDT")])
///     .await?;
/// ```
pub struct HttpClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for all requests
    base_url: String,
    /// Request signer for authenticated calls
    signer: Option<Arc<dyn RequestSigner>>,
    /// Configuration
    config: RestConfig,
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for all requests (e.g., "https://api.binance.com")
    /// * `signer` - Request signer, `None` for public-only clients
    /// * `config` - REST configuration
    pub fn new(
        base_url: impl Into<String>,
        signer: Option<Box<dyn RequestSigner>>,
        config: RestConfig,
    ) -> VenueResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| VenueError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            signer: signer.map(Arc::from),
            config,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the REST configuration.
    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Build the full URL with query parameters.
    fn build_url(&self, endpoint: &str, params: &[(String, String)]) -> String {
        let base = format!("{}{}", self.base_url, endpoint);
        if params.is_empty() {
            base
        } else {
            format!("{}?{}", base, build_query_string(params))
        }
    }

    fn owned_params(params: &[(&str, &str)]) -> Vec<(String, String)> {
        params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Make a public (unsigned) GET request.
    pub async fn get_public<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> VenueResult<T> {
        self.execute(Method::GET, endpoint, Self::owned_params(params), Payload::Query, false)
            .await
    }

    /// Make a signed GET request.
    pub async fn get_signed<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> VenueResult<T> {
        self.execute(Method::GET, endpoint, Self::owned_params(params), Payload::Query, true)
            .await
    }

    /// Make a signed POST request with form-encoded parameters.
    pub async fn post_signed<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> VenueResult<T> {
        self.execute(Method::POST, endpoint, Self::owned_params(params), Payload::Form, true)
            .await
    }

    /// Make a signed POST request with a JSON body.
    pub async fn post_json_signed<T, B>(&self, endpoint: &str, body: &B) -> VenueResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let json = serde_json::to_string(body)
            .map_err(|e| VenueError::InvalidRequest(format!("Failed to encode request body: {}", e)))?;
        self.execute(Method::POST, endpoint, Vec::new(), Payload::Json(json), true)
            .await
    }

    /// Make a signed DELETE request.
    pub async fn delete_signed<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> VenueResult<T> {
        self.execute(Method::DELETE, endpoint, Self::owned_params(params), Payload::Query, true)
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        mut params: Vec<(String, String)>,
        payload: Payload,
        signed: bool,
    ) -> VenueResult<T> {
        let mut headers = header::HeaderMap::new();

        if signed {
            let signer = self.signer.as_ref().ok_or_else(|| {
                VenueError::Configuration(format!("{} requires credentials", endpoint))
            })?;
            let body = match &payload {
                Payload::Json(json) => json.as_str(),
                _ => "",
            };
            let auth = signer.sign(
                SignableRequest {
                    method: &method,
                    path: endpoint,
                    params: &mut params,
                    body,
                },
                Utc::now(),
            )?;
            for (name, value) in auth {
                let name = header::HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| VenueError::Configuration(format!("invalid header name: {}", e)))?;
                let value = header::HeaderValue::from_str(&value)
                    .map_err(|e| VenueError::Configuration(format!("invalid header value: {}", e)))?;
                headers.insert(name, value);
            }
        }

        debug!(
            "{} ({}) {}",
            method,
            if signed { "signed" } else { "public" },
            endpoint
        );

        let request = match payload {
            Payload::Query => self
                .client
                .request(method, self.build_url(endpoint, &params)),
            Payload::Form => self
                .client
                .request(method, format!("{}{}", self.base_url, endpoint))
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(build_query_string(&params)),
            Payload::Json(json) => self
                .client
                .request(method, self.build_url(endpoint, &params))
                .header(header::CONTENT_TYPE, "application/json")
                .body(json),
        };

        let response = request.headers(headers).send().await?;
        self.handle_response(response).await
    }

    /// Handle the HTTP response.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> VenueResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VenueError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(http_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            VenueError::Decode(format!("{} - body: {}", e, excerpt(&body)))
        })
    }
}

/// Build the error for a non-success response, lifting `code`/`msg` out of a
/// JSON error body when there is one.
fn http_error(status: u16, body: &str) -> VenueError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|v| match v.get("code") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    });
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("msg").or_else(|| v.get("message")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| excerpt(body).to_string());

    VenueError::Http {
        status,
        code,
        message,
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
