//! OKX v5 REST request and response types.
//!
//! Every v5 response is wrapped in a `{code, msg, data}` envelope where
//! `code == "0"` means success. Trade endpoints additionally report a status
//! per item (`sCode`/`sMsg`), which is how a batch call can partly succeed.
//!
//! OKX sends numbers and timestamps as strings; both stay strings here.

use serde::{Deserialize, Serialize};

use crate::error::{VenueError, VenueResult};

/// Success code of the envelope and of per-item statuses.
pub const SUCCESS_CODE: &str = "0";

/// Envelope codes meaning "some items failed" (1) and "all items failed" (2)
/// on trade endpoints; `data` still carries the per-item status.
const ITEM_FAILURE_CODES: [&str; 2] = ["1", "2"];

// ============================================================================
// Envelope
// ============================================================================

/// The `{code, msg, data}` wrapper of every v5 response.
#[derive(Debug, Clone, Deserialize)]
pub struct OkxResponse<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> OkxResponse<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Unwrap the data, failing with `Api` on a non-zero code.
    pub fn into_data(self) -> VenueResult<Vec<T>> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(VenueError::api(self.code, self.msg))
        }
    }

    /// Unwrap the first data item.
    pub fn into_first(self) -> VenueResult<T> {
        self.into_data()?
            .into_iter()
            .next()
            .ok_or_else(|| VenueError::Decode("OKX response has no data".to_string()))
    }
}

impl<T: ItemStatus> OkxResponse<T> {
    /// Unwrap the data of a trade endpoint.
    ///
    /// Item-level failures are returned as data so the caller can tell which
    /// items went through; any other non-zero code fails the call.
    pub fn into_items(self) -> VenueResult<Vec<T>> {
        if self.is_success() || (ITEM_FAILURE_CODES.contains(&self.code.as_str()) && !self.data.is_empty()) {
            Ok(self.data)
        } else {
            Err(VenueError::api(self.code, self.msg))
        }
    }

    /// Unwrap the single item of a trade endpoint, failing with the item's
    /// own code when it was rejected.
    pub fn into_accepted(self) -> VenueResult<T> {
        let item = self
            .into_items()?
            .into_iter()
            .next()
            .ok_or_else(|| VenueError::Decode("OKX response has no data".to_string()))?;
        item.check()?;
        Ok(item)
    }
}

/// Per-item status of trade endpoints.
pub trait ItemStatus {
    fn s_code(&self) -> &str;
    fn s_msg(&self) -> &str;

    fn is_accepted(&self) -> bool {
        self.s_code() == SUCCESS_CODE
    }

    fn check(&self) -> VenueResult<()> {
        if self.is_accepted() {
            Ok(())
        } else {
            Err(VenueError::api(self.s_code(), self.s_msg()))
        }
    }
}

// ============================================================================
// Trade
// ============================================================================

/// Body of `POST /api/v5/trade/order` and one item of `batch-orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxPlaceOrder {
    pub inst_id: String,
    pub td_mode: String,
    pub side: String,
    pub ord_type: String,
    pub sz: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub px: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tgt_ccy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl_trigger_px: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl_ord_px: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp_trigger_px: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp_ord_px: Option<String>,
}

impl OkxPlaceOrder {
    /// Order with the mandatory fields only.
    pub fn new(inst_id: &str, td_mode: &str, side: &str, ord_type: &str, sz: &str) -> Self {
        Self {
            inst_id: inst_id.to_string(),
            td_mode: td_mode.to_string(),
            side: side.to_string(),
            ord_type: ord_type.to_string(),
            sz: sz.to_string(),
            px: None,
            tgt_ccy: None,
            pos_side: None,
            reduce_only: None,
            sl_trigger_px: None,
            sl_ord_px: None,
            tp_trigger_px: None,
            tp_ord_px: None,
        }
    }
}

/// Body of `cancel-order` and one item of `cancel-batch-orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxCancelOrder {
    pub inst_id: String,
    pub ord_id: String,
}

/// Per-order result of place and cancel endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxOrderAck {
    #[serde(default)]
    pub ord_id: String,
    #[serde(default)]
    pub cl_ord_id: String,
    #[serde(rename = "sCode")]
    pub s_code: String,
    #[serde(rename = "sMsg", default)]
    pub s_msg: String,
}

impl ItemStatus for OkxOrderAck {
    fn s_code(&self) -> &str {
        &self.s_code
    }

    fn s_msg(&self) -> &str {
        &self.s_msg
    }
}

/// Order details (spot and swap).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxOrder {
    pub inst_id: String,
    pub ord_id: String,
    #[serde(default)]
    pub px: String,
    pub sz: String,
    pub ord_type: String,
    pub side: String,
    #[serde(default)]
    pub pos_side: String,
    pub state: String,
    #[serde(default)]
    pub acc_fill_sz: String,
    #[serde(default)]
    pub avg_px: String,
    #[serde(default)]
    pub sl_trigger_px: String,
    #[serde(default)]
    pub sl_ord_px: String,
    #[serde(default)]
    pub tp_trigger_px: String,
    #[serde(default)]
    pub tp_ord_px: String,
    /// "true" or "false"
    #[serde(default)]
    pub reduce_only: String,
    #[serde(default)]
    pub c_time: String,
    #[serde(default)]
    pub u_time: String,
}

// ============================================================================
// Account
// ============================================================================

/// Trading account balance.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxBalance {
    #[serde(default)]
    pub details: Vec<OkxBalanceDetail>,
    #[serde(default)]
    pub u_time: String,
}

/// Balance of one currency.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxBalanceDetail {
    pub ccy: String,
    #[serde(default)]
    pub avail_bal: String,
    #[serde(default)]
    pub frozen_bal: String,
    #[serde(default)]
    pub cash_bal: String,
    #[serde(default)]
    pub eq: String,
    #[serde(default)]
    pub avail_eq: String,
}

/// Account configuration (only the position mode is used).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxAccountConfig {
    pub pos_mode: String,
}

/// Leverage acknowledgement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxLeverage {
    pub lever: String,
    #[serde(default)]
    pub mgn_mode: String,
    #[serde(default)]
    pub inst_id: String,
    #[serde(default)]
    pub pos_side: String,
}

/// Body of `set-leverage`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxSetLeverage {
    pub inst_id: String,
    pub lever: String,
    pub mgn_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_side: Option<String>,
}

/// Body of `position/margin-balance`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxMarginBalanceRequest {
    pub inst_id: String,
    pub pos_side: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amt: String,
}

/// Margin adjustment acknowledgement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxMarginBalance {
    #[serde(default)]
    pub inst_id: String,
    #[serde(default)]
    pub amt: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Open position.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxPosition {
    pub inst_id: String,
    pub pos: String,
    #[serde(default)]
    pub avg_px: String,
    #[serde(default)]
    pub mark_px: String,
    #[serde(default)]
    pub liq_px: String,
    #[serde(default)]
    pub upl: String,
    #[serde(default)]
    pub lever: String,
    pub mgn_mode: String,
    /// Margin of an isolated position, empty for cross
    #[serde(default)]
    pub margin: String,
    pub pos_side: String,
    #[serde(default)]
    pub notional_usd: String,
    #[serde(default)]
    pub u_time: String,
}

/// Fee rates. Spot rates are in `maker`/`taker`, USDT-margined swap rates
/// in `makerU`/`takerU`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxTradeFee {
    #[serde(default)]
    pub maker: String,
    #[serde(default)]
    pub taker: String,
    #[serde(rename = "makerU", default)]
    pub maker_u: String,
    #[serde(rename = "takerU", default)]
    pub taker_u: String,
}

// ============================================================================
// Market data
// ============================================================================

/// Order book. Levels are `[price, size, "0", order count]`.
#[derive(Debug, Clone, Deserialize)]
pub struct OkxBook {
    pub asks: Vec<Vec<String>>,
    pub bids: Vec<Vec<String>>,
    pub ts: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxTicker {
    pub inst_id: String,
    pub last: String,
    #[serde(default)]
    pub open24h: String,
    #[serde(default)]
    pub vol24h: String,
    #[serde(default)]
    pub ts: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxIndexTicker {
    pub inst_id: String,
    pub idx_px: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxMarkPrice {
    pub inst_id: String,
    pub mark_px: String,
    pub ts: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxFundingRate {
    pub inst_id: String,
    pub funding_rate: String,
    #[serde(default)]
    pub next_funding_rate: String,
    /// Settlement time of `funding_rate`
    pub funding_time: String,
    #[serde(default)]
    pub next_funding_time: String,
}

/// Instrument trading rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxInstrument {
    pub inst_id: String,
    pub tick_sz: String,
    pub lot_sz: String,
    pub min_sz: String,
}

/// Result of `convert-contract-coin`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxContractSize {
    pub inst_id: String,
    pub sz: String,
}

// ============================================================================
// Funding account
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxDepositAddress {
    pub addr: String,
    pub chain: String,
    pub ccy: String,
    /// Account credited by deposits to this address
    #[serde(default)]
    pub to: String,
}

/// Body of `asset/transfer`.
#[derive(Debug, Clone, Serialize)]
pub struct OkxTransferRequest {
    pub ccy: String,
    pub amt: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxTransfer {
    pub trans_id: String,
}

/// One chain of a currency.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxCurrency {
    pub ccy: String,
    pub chain: String,
    #[serde(default)]
    pub min_fee: String,
}

/// Body of `asset/withdrawal`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxWithdrawalRequest {
    pub ccy: String,
    pub amt: String,
    pub dest: String,
    pub to_addr: String,
    pub fee: String,
    pub chain: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxWithdrawal {
    pub wd_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_error_code() {
        let response: OkxResponse<OkxTicker> =
            serde_json::from_str(r#"{"code":"51001","msg":"Instrument ID does not exist","data":[]}"#).unwrap();
        let err = response.into_data().unwrap_err();
        assert_eq!(err.venue_code(), Some("51001"));
    }

    #[test]
    fn test_envelope_without_data() {
        let response: OkxResponse<OkxTicker> =
            serde_json::from_str(r#"{"code":"50011","msg":"Too Many Requests"}"#).unwrap();
        assert!(response.data.is_empty());
        assert!(response.into_first().is_err());
    }

    #[test]
    fn test_rejected_order_uses_item_code() {
        let response: OkxResponse<OkxOrderAck> = serde_json::from_str(
            r#"{"code":"1","msg":"Operation failed.","data":[
                {"clOrdId":"","ordId":"","sCode":"51008","sMsg":"Order failed. Insufficient balance","tag":""}
            ]}"#,
        )
        .unwrap();
        let err = response.into_accepted().unwrap_err();
        assert_eq!(err.venue_code(), Some("51008"));
    }

    #[test]
    fn test_partial_batch_items_are_returned() {
        let response: OkxResponse<OkxOrderAck> = serde_json::from_str(
            r#"{"code":"1","msg":"","data":[
                {"ordId":"111","sCode":"0","sMsg":""},
                {"ordId":"","sCode":"51121","sMsg":"Order quantity must be a multiple of the lot size"}
            ]}"#,
        )
        .unwrap();
        let items = response.into_items().unwrap();
        assert!(items[0].is_accepted());
        assert!(!items[1].is_accepted());
    }

    #[test]
    fn test_place_order_skips_unset_fields() {
        let mut order = OkxPlaceOrder::new("BTC-USDT", "cash", "buy", "limit", "0.01");
        order.px = Some("25000".to_string());
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["instId"], "BTC-USDT");
        assert_eq!(json["tdMode"], "cash");
        assert_eq!(json["px"], "25000");
        assert!(json.get("tgtCcy").is_none());
        assert!(json.get("slTriggerPx").is_none());
    }
}
