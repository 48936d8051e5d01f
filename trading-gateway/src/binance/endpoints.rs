//! Binance API hosts and endpoint paths.
//!
//! Spot, wallet (`/sapi`) and USDT-M futures calls live on two hosts:
//! `api.binance.com` for spot and wallet, `fapi.binance.com` for futures.

/// Spot production host.
pub const SPOT_REST_URL: &str = "https://api.binance.com";

/// USDT-M futures production host.
pub const FUTURES_REST_URL: &str = "https://fapi.binance.com";

/// Spot testnet host.
pub const SPOT_TESTNET_URL: &str = "https://testnet.binance.vision";

/// USDT-M futures testnet host.
pub const FUTURES_TESTNET_URL: &str = "https://testnet.binancefuture.com";

/// Base URLs used by one adapter instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinanceEndpoints {
    /// Spot and wallet REST base URL
    pub spot_url: String,
    /// USDT-M futures REST base URL
    pub futures_url: String,
}

impl Default for BinanceEndpoints {
    fn default() -> Self {
        Self::production()
    }
}

impl BinanceEndpoints {
    /// Binance.com production hosts.
    pub fn production() -> Self {
        Self {
            spot_url: SPOT_REST_URL.to_string(),
            futures_url: FUTURES_REST_URL.to_string(),
        }
    }

    /// Binance.com testnet hosts.
    pub fn testnet() -> Self {
        Self {
            spot_url: SPOT_TESTNET_URL.to_string(),
            futures_url: FUTURES_TESTNET_URL.to_string(),
        }
    }

    /// Hosts from an init payload: `url` overrides the spot host and
    /// `futures_url` the futures host; when only `url` is given both use it.
    pub fn from_urls(url: &str, futures_url: Option<&str>) -> Self {
        let defaults = Self::production();
        let spot_url = if url.is_empty() { defaults.spot_url } else { url.to_string() };
        let futures_url = match futures_url {
            Some(f) if !f.is_empty() => f.to_string(),
            _ if !url.is_empty() => url.to_string(),
            _ => defaults.futures_url,
        };
        Self { spot_url, futures_url }
    }
}

/// REST API endpoint paths for Binance Spot.
pub mod spot {
    /// Account information
    pub const ACCOUNT: &str = "/api/v3/account";

    /// New, query and cancel order
    pub const ORDER: &str = "/api/v3/order";

    /// Open orders / cancel all open orders
    pub const OPEN_ORDERS: &str = "/api/v3/openOrders";

    /// Exchange information
    pub const EXCHANGE_INFO: &str = "/api/v3/exchangeInfo";

    /// Order book
    pub const DEPTH: &str = "/api/v3/depth";

    /// Latest price
    pub const TICKER_PRICE: &str = "/api/v3/ticker/price";

    /// 24h statistics
    pub const TICKER_24HR: &str = "/api/v3/ticker/24hr";
}

/// REST API endpoint paths for the Binance wallet.
pub mod sapi {
    /// Spot trade fee
    pub const TRADE_FEE: &str = "/sapi/v1/asset/tradeFee";

    /// Deposit address
    pub const DEPOSIT_ADDRESS: &str = "/sapi/v1/capital/deposit/address";

    /// Withdraw
    pub const WITHDRAW: &str = "/sapi/v1/capital/withdraw/apply";
}

/// REST API endpoint paths for Binance USDT-M Futures.
pub mod futures {
    /// Account balance (v2)
    pub const BALANCE: &str = "/fapi/v2/balance";

    /// Position risk (v2)
    pub const POSITION_RISK: &str = "/fapi/v2/positionRisk";

    /// New, query and cancel order
    pub const ORDER: &str = "/fapi/v1/order";

    /// Cancel all open orders
    pub const ALL_OPEN_ORDERS: &str = "/fapi/v1/allOpenOrders";

    /// Open orders
    pub const OPEN_ORDERS: &str = "/fapi/v1/openOrders";

    /// Set leverage
    pub const LEVERAGE: &str = "/fapi/v1/leverage";

    /// Set margin type
    pub const MARGIN_TYPE: &str = "/fapi/v1/marginType";

    /// Modify isolated position margin
    pub const POSITION_MARGIN: &str = "/fapi/v1/positionMargin";

    /// Set / query position mode (hedge or one-way)
    pub const POSITION_MODE: &str = "/fapi/v1/positionSide/dual";

    /// Order book
    pub const DEPTH: &str = "/fapi/v1/depth";

    /// Latest price
    pub const TICKER_PRICE: &str = "/fapi/v1/ticker/price";

    /// Mark price and funding
    pub const PREMIUM_INDEX: &str = "/fapi/v1/premiumIndex";

    /// Account commission rate
    pub const COMMISSION_RATE: &str = "/fapi/v1/commissionRate";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_endpoints() {
        let endpoints = BinanceEndpoints::default();
        assert_eq!(endpoints.spot_url, "https://api.binance.com");
        assert_eq!(endpoints.futures_url, "https://fapi.binance.com");
    }

    #[test]
    fn test_from_urls() {
        assert_eq!(BinanceEndpoints::from_urls("", None), BinanceEndpoints::production());

        let single = BinanceEndpoints::from_urls("http://127.0.0.1:9000", None);
        assert_eq!(single.spot_url, "http://127.0.0.1:9000");
        assert_eq!(single.futures_url, "http://127.0.0.1:9000");

        let split = BinanceEndpoints::from_urls("", Some(FUTURES_TESTNET_URL));
        assert_eq!(split.spot_url, SPOT_REST_URL);
        assert_eq!(split.futures_url, FUTURES_TESTNET_URL);
    }
}
