//! HMAC-SHA256 request signing for Binance API.
//!
//! Binance signs the full query (or form) string:
//! 1. Add `recvWindow` and `timestamp` parameters
//! 2. Compute hex HMAC-SHA256 of the query string
//! 3. Append the signature as the last parameter
//!
//! The API key travels in the `X-MBX-APIKEY` header.

use chrono::{DateTime, Utc};
use hmac::Mac;

use crate::error::{VenueError, VenueResult};
use crate::http::signer::HmacSha256;
use crate::http::{build_query_string, RequestSigner, SignableRequest};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// HMAC-SHA256 request signer for Binance API.
#[derive(Clone)]
pub struct BinanceHmacSigner {
    api_key: String,
    api_secret: String,
    recv_window_ms: u64,
}

impl BinanceHmacSigner {
    /// Create a new Binance HMAC signer.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            recv_window_ms: 5_000,
        }
    }

    /// Set the receive window sent with every signed request.
    pub fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window_ms = recv_window_ms;
        self
    }

    /// Compute hex HMAC-SHA256 of `data`.
    fn compute_signature(&self, data: &str) -> VenueResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| VenueError::Configuration(format!("invalid Binance secret: {}", e)))?;
        mac.update(data.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for BinanceHmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceHmacSigner")
            .field("api_key", &self.api_key)
            .field("recv_window_ms", &self.recv_window_ms)
            .finish_non_exhaustive()
    }
}

impl RequestSigner for BinanceHmacSigner {
    fn sign(&self, request: SignableRequest<'_>, now: DateTime<Utc>) -> VenueResult<Vec<(String, String)>> {
        let params = request.params;
        if !params.iter().any(|(k, _)| k == "recvWindow") {
            params.push(("recvWindow".to_string(), self.recv_window_ms.to_string()));
        }
        params.push(("timestamp".to_string(), now.timestamp_millis().to_string()));

        let signature = self.compute_signature(&build_query_string(params))?;
        params.push(("signature".to_string(), signature));

        Ok(vec![(API_KEY_HEADER.to_string(), self.api_key.clone())])
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reqwest::Method;

    fn sign(signer: &BinanceHmacSigner, params: &mut Vec<(String, String)>, millis: i64) -> Vec<(String, String)> {
        let now = Utc.timestamp_millis_opt(millis).unwrap();
        signer
            .sign(
                SignableRequest {
                    method: &Method::POST,
                    path: "/api/v3/order",
                    params,
                    body: "",
                },
                now,
            )
            .unwrap()
    }

    #[test]
    fn test_signature_computation() {
        // Test vector from Binance documentation
        let signer = BinanceHmacSigner::new(
            "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A",
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j",
        );
        let data = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";

        assert_eq!(
            signer.compute_signature(data).unwrap(),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_sign_appends_window_timestamp_and_signature() {
        let signer = BinanceHmacSigner::new(
            "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A",
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j",
        );
        let mut params: Vec<(String, String)> = [
            ("symbol", "LTCBTC"),
            ("side", "BUY"),
            ("type", "LIMIT"),
            ("timeInForce", "GTC"),
            ("quantity", "1"),
            ("price", "0.1"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let headers = sign(&signer, &mut params, 1499827319559);

        assert_eq!(headers, [(API_KEY_HEADER.to_string(), signer.api_key().to_string())]);
        let keys: Vec<_> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(&keys[6..], ["recvWindow", "timestamp", "signature"]);
        assert_eq!(
            params[8].1,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_existing_recv_window_is_kept() {
        let signer = BinanceHmacSigner::new("key", "secret").with_recv_window(10_000);
        let mut params = vec![("recvWindow".to_string(), "2500".to_string())];
        sign(&signer, &mut params, 1000);
        assert_eq!(params.iter().filter(|(k, _)| k == "recvWindow").count(), 1);
        assert_eq!(params[0].1, "2500");
    }

    #[test]
    fn test_deterministic_signature() {
        let signer = BinanceHmacSigner::new("key", "secret");
        let mut params1 = vec![("a".to_string(), "1".to_string())];
        let mut params2 = vec![("a".to_string(), "1".to_string())];

        sign(&signer, &mut params1, 1000);
        sign(&signer, &mut params2, 1000);

        assert_eq!(params1.last(), params2.last());
        assert_eq!(params1.last().map(|(_, sig)| sig.len()), Some(64));
    }
}
