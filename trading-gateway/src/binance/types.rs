//! Binance REST response types.
//!
//! Numeric fields stay as the decimal strings Binance sends. Enum-like fields
//! stay as raw strings here and are classified by the normalizer, so an
//! unknown value surfaces as `UnmappedEnum` rather than a decode failure.

use serde::Deserialize;

// ============================================================================
// Spot
// ============================================================================

/// Spot account information (`GET /api/v3/account`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceAccount {
    #[serde(default)]
    pub balances: Vec<BinanceAssetBalance>,
}

/// One asset of the spot account.
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceAssetBalance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

/// Acknowledgement of a new order (spot or futures).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceOrderAck {
    pub symbol: String,
    pub order_id: i64,
    #[serde(default)]
    pub client_order_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Spot order as returned by order queries.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceSpotOrder {
    pub symbol: String,
    pub order_id: i64,
    #[serde(default)]
    pub client_order_id: String,
    pub price: String,
    pub orig_qty: String,
    pub executed_qty: String,
    /// Cumulative quote quantity (Binance's spelling)
    #[serde(default)]
    pub cummulative_quote_qty: String,
    pub status: String,
    #[serde(default)]
    pub time_in_force: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
    #[serde(default)]
    pub iceberg_qty: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub update_time: i64,
}

/// Spot cancel response. OCO legs in a bulk cancel carry no `orderId`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceCancelResponse {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub status: String,
}

/// Order book snapshot (spot and futures).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceDepth {
    #[serde(default)]
    pub last_update_id: i64,
    /// Transaction time, futures only
    #[serde(rename = "T", default)]
    pub transaction_time: Option<i64>,
    pub bids: Vec<Vec<String>>,
    pub asks: Vec<Vec<String>>,
}

/// Latest price of a symbol (spot and futures).
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceTickerPrice {
    pub symbol: String,
    pub price: String,
}

/// 24h rolling statistics (`GET /api/v3/ticker/24hr`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTicker24h {
    pub symbol: String,
    pub price_change_percent: String,
    pub volume: String,
    pub last_price: String,
}

/// Exchange information (`GET /api/v3/exchangeInfo`).
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceExchangeInfo {
    pub symbols: Vec<BinanceSymbolInfo>,
}

/// Trading rules of one symbol.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceSymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub filters: Vec<BinanceSymbolFilter>,
}

/// One entry of a symbol's `filters` list. Only the fields used for
/// precision and minimums are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceSymbolFilter {
    pub filter_type: String,
    #[serde(default)]
    pub tick_size: Option<String>,
    #[serde(default)]
    pub step_size: Option<String>,
    #[serde(default)]
    pub min_qty: Option<String>,
    #[serde(default)]
    pub min_notional: Option<String>,
}

impl BinanceSymbolInfo {
    /// Returns the filter of the given type, if present.
    pub fn filter(&self, filter_type: &str) -> Option<&BinanceSymbolFilter> {
        self.filters.iter().find(|f| f.filter_type == filter_type)
    }
}

// ============================================================================
// Wallet
// ============================================================================

/// Spot trade fee of one symbol (`GET /sapi/v1/asset/tradeFee`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTradeFee {
    pub symbol: String,
    pub maker_commission: String,
    pub taker_commission: String,
}

/// Deposit address (`GET /sapi/v1/capital/deposit/address`).
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceDepositAddress {
    pub address: String,
    #[serde(default)]
    pub coin: String,
    #[serde(default)]
    pub tag: String,
}

/// Withdrawal acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceWithdrawResponse {
    pub id: String,
}

// ============================================================================
// USDT-M Futures
// ============================================================================

/// Futures order as returned by order queries.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceFuturesOrder {
    pub symbol: String,
    pub order_id: i64,
    pub status: String,
    pub price: String,
    #[serde(default)]
    pub avg_price: String,
    pub orig_qty: String,
    pub executed_qty: String,
    #[serde(default)]
    pub cum_quote: String,
    #[serde(default)]
    pub time_in_force: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
    pub position_side: String,
    #[serde(default)]
    pub stop_price: String,
    #[serde(default)]
    pub reduce_only: bool,
    #[serde(default)]
    pub close_position: bool,
    #[serde(default)]
    pub price_protect: bool,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub update_time: i64,
}

/// Futures wallet balance of one asset (`GET /fapi/v2/balance`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceFuturesBalance {
    pub asset: String,
    pub balance: String,
    pub cross_wallet_balance: String,
    pub available_balance: String,
}

/// Position risk entry (`GET /fapi/v2/positionRisk`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinancePositionRisk {
    pub symbol: String,
    pub position_amt: String,
    pub entry_price: String,
    pub mark_price: String,
    #[serde(rename = "unRealizedProfit")]
    pub unrealized_profit: String,
    pub liquidation_price: String,
    pub leverage: String,
    /// `isolated` or `cross`
    pub margin_type: String,
    #[serde(default)]
    pub isolated_margin: String,
    pub position_side: String,
    #[serde(default)]
    pub notional: String,
    #[serde(default)]
    pub update_time: i64,
}

/// Leverage change acknowledgement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceLeverageResponse {
    pub leverage: u32,
    pub symbol: String,
}

/// Generic `{code, msg}` acknowledgement used by several futures endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceCodeResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
}

/// Current position mode (`GET /fapi/v1/positionSide/dual`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinancePositionMode {
    pub dual_side_position: bool,
}

/// Mark price and funding (`GET /fapi/v1/premiumIndex`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinancePremiumIndex {
    pub symbol: String,
    pub mark_price: String,
    #[serde(default)]
    pub index_price: String,
    pub last_funding_rate: String,
    pub next_funding_time: i64,
    #[serde(default)]
    pub time: i64,
}

/// Futures commission rate (`GET /fapi/v1/commissionRate`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceCommissionRate {
    pub symbol: String,
    pub maker_commission_rate: String,
    pub taker_commission_rate: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spot_order() {
        let json = r#"{
            "symbol": "LTCBTC",
            "orderId": 1,
            "orderListId": -1,
            "clientOrderId": "myOrder1",
            "price": "0.1",
            "origQty": "1.0",
            "executedQty": "0.0",
            "cummulativeQuoteQty": "0.0",
            "status": "NEW",
            "timeInForce": "GTC",
            "type": "LIMIT",
            "side": "BUY",
            "stopPrice": "0.0",
            "icebergQty": "0.0",
            "time": 1499827319559,
            "updateTime": 1499827319559,
            "isWorking": true
        }"#;

        let order: BinanceSpotOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.order_id, 1);
        assert_eq!(order.order_type, "LIMIT");
        assert_eq!(order.cummulative_quote_qty, "0.0");
    }

    #[test]
    fn test_parse_futures_depth_with_transaction_time() {
        let json = r#"{
            "lastUpdateId": 1027024,
            "E": 1589436922972,
            "T": 1589436922959,
            "bids": [["4.00000000", "431.00000000"]],
            "asks": [["4.00000200", "12.00000000"]]
        }"#;

        let depth: BinanceDepth = serde_json::from_str(json).unwrap();
        assert_eq!(depth.transaction_time, Some(1589436922959));
        assert_eq!(depth.bids[0][1], "431.00000000");
    }

    #[test]
    fn test_parse_position_risk() {
        let json = r#"[{
            "entryPrice": "0.00000",
            "marginType": "isolated",
            "isAutoAddMargin": "false",
            "isolatedMargin": "0.00000000",
            "leverage": "10",
            "liquidationPrice": "0",
            "markPrice": "6679.50671178",
            "maxNotionalValue": "20000000",
            "positionAmt": "0.000",
            "notional": "0",
            "isolatedWallet": "0",
            "symbol": "BTCUSDT",
            "unRealizedProfit": "0.00000000",
            "positionSide": "BOTH",
            "updateTime": 0
        }]"#;

        let positions: Vec<BinancePositionRisk> = serde_json::from_str(json).unwrap();
        assert_eq!(positions[0].margin_type, "isolated");
        assert_eq!(positions[0].unrealized_profit, "0.00000000");
    }

    #[test]
    fn test_symbol_filter_lookup() {
        let json = r#"{"symbols":[{"symbol":"BTCUSDT","status":"TRADING","filters":[
            {"filterType":"PRICE_FILTER","minPrice":"0.01","maxPrice":"1000000.00","tickSize":"0.01"},
            {"filterType":"LOT_SIZE","minQty":"0.00001000","maxQty":"9000.00000000","stepSize":"0.00001000"},
            {"filterType":"NOTIONAL","minNotional":"5.00000000","applyMinToMarket":true}
        ]}]}"#;

        let info: BinanceExchangeInfo = serde_json::from_str(json).unwrap();
        let symbol = &info.symbols[0];
        assert_eq!(
            symbol.filter("LOT_SIZE").and_then(|f| f.step_size.as_deref()),
            Some("0.00001000")
        );
        assert!(symbol.filter("ICEBERG_PARTS").is_none());
    }
}
