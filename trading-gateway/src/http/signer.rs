//! Request signing for authenticated API calls.
//!
//! Each venue implements [`RequestSigner`] with its own scheme. The
//! timestamp-prefixed HMAC-SHA256/base64 scheme used by passphrase venues is
//! provided here as [`PassphraseSigner`] and the pure [`sign_request`].

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::Sha256;

use crate::error::{VenueError, VenueResult};

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Timestamp format of the prehash string: ISO-8601, millisecond precision, UTC.
pub const ISO_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A request about to be signed.
#[derive(Debug)]
pub struct SignableRequest<'a> {
    /// HTTP method
    pub method: &'a Method,
    /// Endpoint path without host (e.g. "/api/v5/account/balance")
    pub path: &'a str,
    /// Query (GET/DELETE) or form (POST) parameters, in send order
    pub params: &'a mut Vec<(String, String)>,
    /// JSON body, empty when none
    pub body: &'a str,
}

/// Trait for signing HTTP requests.
///
/// A signer may append parameters (timestamps, signatures) and returns the
/// headers to attach. Signing is computed fresh for every request because
/// the timestamp is part of the signed material.
pub trait RequestSigner: Send + Sync {
    /// Sign a request at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError::Configuration`] if the secret cannot key the MAC.
    fn sign(&self, request: SignableRequest<'_>, now: DateTime<Utc>) -> VenueResult<Vec<(String, String)>>;

    /// Returns the API key value.
    fn api_key(&self) -> &str;
}

/// Build a query string from parameters.
///
/// Values are joined verbatim in the given order; the signed string and the
/// string sent on the wire must be byte-identical.
pub fn build_query_string(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Format a timestamp for the prehash string.
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.format(ISO_TIMESTAMP_FORMAT).to_string()
}

/// base64(HMAC-SHA256(secret, timestamp + method + path + body)).
pub fn sign_prehash(secret: &str, timestamp: &str, method: &str, path: &str, body: &str) -> VenueResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| VenueError::Configuration(format!("invalid HMAC key: {}", e)))?;
    mac.update(timestamp.as_bytes());
    mac.update(method.as_bytes());
    mac.update(path.as_bytes());
    mac.update(body.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Sign a request at `now`, returning `(timestamp, signature)`.
///
/// `path` must include the query string for GET requests; `body` is empty
/// when the request has none.
pub fn sign_request(
    secret: &str,
    method: &str,
    path: &str,
    body: &str,
    now: DateTime<Utc>,
) -> VenueResult<(String, String)> {
    let timestamp = iso_timestamp(now);
    let signature = sign_prehash(secret, &timestamp, method, path, body)?;
    Ok((timestamp, signature))
}

/// Signer for venues authenticating with key, passphrase, signature and
/// timestamp headers (`{prefix}KEY`, `{prefix}PASSPHRASE`, `{prefix}SIGN`,
/// `{prefix}TIMESTAMP`).
#[derive(Clone)]
pub struct PassphraseSigner {
    api_key: String,
    secret: String,
    passphrase: String,
    header_prefix: &'static str,
}

impl PassphraseSigner {
    /// Header prefix of the generic scheme.
    pub const DEFAULT_PREFIX: &'static str = "ACCESS-";

    /// Create a signer with the generic `ACCESS-` headers.
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>, passphrase: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
            header_prefix: Self::DEFAULT_PREFIX,
        }
    }

    /// Use a venue-specific header prefix (e.g. `OK-ACCESS-`).
    pub fn with_header_prefix(mut self, prefix: &'static str) -> Self {
        self.header_prefix = prefix;
        self
    }

    /// The path that is signed: endpoint plus query string when present.
    fn request_path(path: &str, params: &[(String, String)]) -> String {
        if params.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, build_query_string(params))
        }
    }
}

impl std::fmt::Debug for PassphraseSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassphraseSigner")
            .field("api_key", &self.api_key)
            .field("header_prefix", &self.header_prefix)
            .finish_non_exhaustive()
    }
}

impl RequestSigner for PassphraseSigner {
    fn sign(&self, request: SignableRequest<'_>, now: DateTime<Utc>) -> VenueResult<Vec<(String, String)>> {
        let path = Self::request_path(request.path, request.params);
        let (timestamp, signature) =
            sign_request(&self.secret, request.method.as_str(), &path, request.body, now)?;
        let prefix = self.header_prefix;
        Ok(vec![
            (format!("{}KEY", prefix), self.api_key.clone()),
            (format!("{}PASSPHRASE", prefix), self.passphrase.clone()),
            (format!("{}SIGN", prefix), signature),
            (format!("{}TIMESTAMP", prefix), timestamp),
        ])
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FIXED_SIGNATURE: &str = "9uRorNfb5vbGUkiY22fW9HFaGMjlY+FispWhVQR86x0=";

    fn new_year() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_iso_timestamp_has_millis() {
        assert_eq!(iso_timestamp(new_year()), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_sign_request_is_deterministic() {
        let (ts, sig) = sign_request("s3cr3t", "GET", "/api/v5/account/balance", "", new_year()).unwrap();
        assert_eq!(ts, "2024-01-01T00:00:00.000Z");
        assert_eq!(sig, FIXED_SIGNATURE);

        let (_, again) = sign_request("s3cr3t", "GET", "/api/v5/account/balance", "", new_year()).unwrap();
        assert_eq!(again, sig);
    }

    #[test]
    fn test_any_changed_input_changes_signature() {
        let ts = "2024-01-01T00:00:00.000Z";
        let base = sign_prehash("s3cr3t", ts, "GET", "/api/v5/account/balance", "").unwrap();
        let variants = [
            sign_prehash("s3cr3T", ts, "GET", "/api/v5/account/balance", "").unwrap(),
            sign_prehash("s3cr3t", "2024-01-01T00:00:00.001Z", "GET", "/api/v5/account/balance", "").unwrap(),
            sign_prehash("s3cr3t", ts, "POST", "/api/v5/account/balance", "").unwrap(),
            sign_prehash("s3cr3t", ts, "GET", "/api/v5/account/config", "").unwrap(),
            sign_prehash("s3cr3t", ts, "GET", "/api/v5/account/balance", "{}").unwrap(),
        ];
        for variant in variants {
            assert_ne!(variant, base);
        }
    }

    #[test]
    fn test_passphrase_signer_headers() {
        let signer = PassphraseSigner::new("key", "s3cr3t", "phrase");
        let mut params = Vec::new();
        let headers = signer
            .sign(
                SignableRequest {
                    method: &Method::GET,
                    path: "/api/v5/account/balance",
                    params: &mut params,
                    body: "",
                },
                new_year(),
            )
            .unwrap();

        let names: Vec<_> = headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            ["ACCESS-KEY", "ACCESS-PASSPHRASE", "ACCESS-SIGN", "ACCESS-TIMESTAMP"]
        );
        assert_eq!(headers[2].1, FIXED_SIGNATURE);
        assert!(params.is_empty());
    }

    #[test]
    fn test_query_string_is_part_of_signed_path() {
        let signer = PassphraseSigner::new("key", "s3cr3t", "phrase").with_header_prefix("OK-ACCESS-");
        let mut params = vec![("ccy".to_string(), "USDT".to_string())];
        let headers = signer
            .sign(
                SignableRequest {
                    method: &Method::GET,
                    path: "/api/v5/account/balance",
                    params: &mut params,
                    body: "",
                },
                new_year(),
            )
            .unwrap();

        assert_eq!(headers[0].0, "OK-ACCESS-KEY");
        assert_ne!(headers[2].1, FIXED_SIGNATURE);
        let expected = sign_prehash(
            "s3cr3t",
            "2024-01-01T00:00:00.000Z",
            "GET",
            "/api/v5/account/balance?ccy=USDT",
            "",
        )
        .unwrap();
        assert_eq!(headers[2].1, expected);
    }

    #[test]
    fn test_build_query_string() {
        let params = vec![
            ("symbol".to_string(), "BTCUSDT".to_string()),
            ("side".to_string(), "BUY".to_string()),
        ];
        assert_eq!(build_query_string(&params), "symbol=BTCUSDT&side=BUY");
        assert_eq!(build_query_string(&[]), "");
    }
}
