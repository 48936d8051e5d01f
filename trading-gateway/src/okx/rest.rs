//! REST client for the OKX v5 API.
//!
//! Spot and perpetual swaps share one host and one signed client. Methods
//! unwrap the `{code, msg, data}` envelope: plain endpoints fail on a
//! non-zero code, trade endpoints hand back per-item results.

use std::sync::Arc;

use tracing::debug;

use crate::error::{VenueError, VenueResult};
use crate::http::HttpClient;

use super::endpoints::{account, asset, market, public, trade, PENDING_PAGE_LIMIT};
use super::types::{
    OkxAccountConfig, OkxBalance, OkxBook, OkxCancelOrder, OkxContractSize, OkxCurrency,
    OkxDepositAddress, OkxFundingRate, OkxIndexTicker, OkxInstrument, OkxLeverage,
    OkxMarginBalance, OkxMarginBalanceRequest, OkxMarkPrice, OkxOrder, OkxOrderAck,
    OkxPlaceOrder, OkxPosition, OkxResponse, OkxSetLeverage, OkxTicker, OkxTradeFee,
    OkxTransfer, OkxTransferRequest, OkxWithdrawal, OkxWithdrawalRequest,
};

/// REST client for OKX.
pub struct OkxRestClient {
    http_client: Arc<HttpClient>,
}

impl OkxRestClient {
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }

    // ========================================================================
    // Trade
    // ========================================================================

    /// Place one order. A rejected order fails with the item's `sCode`.
    pub async fn place_order(&self, order: &OkxPlaceOrder) -> VenueResult<OkxOrderAck> {
        debug!("Submitting OKX order: {:?}", order);
        let response: OkxResponse<OkxOrderAck> =
            self.http_client.post_json_signed(trade::ORDER, order).await?;
        response.into_accepted()
    }

    /// Place up to 20 orders. Results come back in request order.
    pub async fn place_batch(&self, orders: &[OkxPlaceOrder]) -> VenueResult<Vec<OkxOrderAck>> {
        debug!("Submitting {} OKX orders in one batch", orders.len());
        let response: OkxResponse<OkxOrderAck> =
            self.http_client.post_json_signed(trade::BATCH_ORDERS, orders).await?;
        let acks = response.into_items()?;
        if acks.len() != orders.len() {
            return Err(VenueError::Decode(format!(
                "OKX batch returned {} results for {} orders",
                acks.len(),
                orders.len()
            )));
        }
        Ok(acks)
    }

    pub async fn cancel_order(&self, inst_id: &str, ord_id: &str) -> VenueResult<OkxOrderAck> {
        let body = OkxCancelOrder {
            inst_id: inst_id.to_string(),
            ord_id: ord_id.to_string(),
        };
        let response: OkxResponse<OkxOrderAck> =
            self.http_client.post_json_signed(trade::CANCEL_ORDER, &body).await?;
        response.into_accepted()
    }

    /// Cancel up to 20 orders.
    pub async fn cancel_batch(&self, orders: &[OkxCancelOrder]) -> VenueResult<Vec<OkxOrderAck>> {
        let response: OkxResponse<OkxOrderAck> = self
            .http_client
            .post_json_signed(trade::CANCEL_BATCH_ORDERS, orders)
            .await?;
        response.into_items()
    }

    pub async fn order(&self, inst_id: &str, ord_id: &str) -> VenueResult<OkxOrder> {
        let params = [("instId", inst_id), ("ordId", ord_id)];
        let response: OkxResponse<OkxOrder> = self.http_client.get_signed(trade::ORDER, &params).await?;
        response.into_first()
    }

    /// All open orders of one instrument, newest first.
    ///
    /// Pages backwards with `after=<last ordId>` until a page comes back
    /// short.
    pub async fn pending_orders(&self, inst_type: &str, inst_id: &str) -> VenueResult<Vec<OkxOrder>> {
        let limit = PENDING_PAGE_LIMIT.to_string();
        let mut orders: Vec<OkxOrder> = Vec::new();
        loop {
            let cursor = orders.last().map(|o| o.ord_id.clone());
            let mut params = vec![("instType", inst_type), ("instId", inst_id), ("limit", limit.as_str())];
            if let Some(after) = cursor.as_deref() {
                params.push(("after", after));
            }
            let response: OkxResponse<OkxOrder> =
                self.http_client.get_signed(trade::ORDERS_PENDING, &params).await?;
            let page = response.into_data()?;
            let full_page = page.len() >= PENDING_PAGE_LIMIT;
            let stalled = cursor.is_some() && page.last().map(|o| &o.ord_id) == cursor.as_ref();
            debug!("OKX orders-pending page of {} on {}", page.len(), inst_id);
            orders.extend(page);
            if !full_page || stalled {
                return Ok(orders);
            }
        }
    }

    // ========================================================================
    // Account
    // ========================================================================

    pub async fn balance(&self, ccy: &str) -> VenueResult<OkxBalance> {
        let response: OkxResponse<OkxBalance> =
            self.http_client.get_signed(account::BALANCE, &[("ccy", ccy)]).await?;
        response.into_first()
    }

    pub async fn account_config(&self) -> VenueResult<OkxAccountConfig> {
        let response: OkxResponse<OkxAccountConfig> =
            self.http_client.get_signed(account::CONFIG, &[]).await?;
        response.into_first()
    }

    /// Switch position mode. Returns the mode OKX reports afterwards.
    pub async fn set_position_mode(&self, pos_mode: &str) -> VenueResult<OkxAccountConfig> {
        let body = serde_json::json!({ "posMode": pos_mode });
        let response: OkxResponse<OkxAccountConfig> = self
            .http_client
            .post_json_signed(account::SET_POSITION_MODE, &body)
            .await?;
        response.into_first()
    }

    pub async fn set_leverage(&self, request: &OkxSetLeverage) -> VenueResult<OkxLeverage> {
        let response: OkxResponse<OkxLeverage> = self
            .http_client
            .post_json_signed(account::SET_LEVERAGE, request)
            .await?;
        response.into_first()
    }

    pub async fn margin_balance(&self, request: &OkxMarginBalanceRequest) -> VenueResult<OkxMarginBalance> {
        let response: OkxResponse<OkxMarginBalance> = self
            .http_client
            .post_json_signed(account::MARGIN_BALANCE, request)
            .await?;
        response.into_first()
    }

    pub async fn positions(&self, inst_id: &str) -> VenueResult<Vec<OkxPosition>> {
        let response: OkxResponse<OkxPosition> = self
            .http_client
            .get_signed(account::POSITIONS, &[("instId", inst_id)])
            .await?;
        response.into_data()
    }

    /// Fee rates of an instrument type. `filter` is `instId` for spot and
    /// `instFamily` for swaps.
    pub async fn trade_fee(&self, inst_type: &str, filter: (&str, &str)) -> VenueResult<OkxTradeFee> {
        let params = [("instType", inst_type), filter];
        let response: OkxResponse<OkxTradeFee> =
            self.http_client.get_signed(account::TRADE_FEE, &params).await?;
        response.into_first()
    }

    // ========================================================================
    // Market data
    // ========================================================================

    pub async fn books(&self, inst_id: &str, size: u32) -> VenueResult<OkxBook> {
        let size = size.to_string();
        let params = [("instId", inst_id), ("sz", size.as_str())];
        let response: OkxResponse<OkxBook> = self.http_client.get_public(market::BOOKS, &params).await?;
        response.into_first()
    }

    pub async fn ticker(&self, inst_id: &str) -> VenueResult<OkxTicker> {
        let response: OkxResponse<OkxTicker> = self
            .http_client
            .get_public(market::TICKER, &[("instId", inst_id)])
            .await?;
        response.into_first()
    }

    pub async fn tickers(&self, inst_type: &str) -> VenueResult<Vec<OkxTicker>> {
        let response: OkxResponse<OkxTicker> = self
            .http_client
            .get_public(market::TICKERS, &[("instType", inst_type)])
            .await?;
        response.into_data()
    }

    pub async fn index_ticker(&self, index_id: &str) -> VenueResult<OkxIndexTicker> {
        let response: OkxResponse<OkxIndexTicker> = self
            .http_client
            .get_public(market::INDEX_TICKERS, &[("instId", index_id)])
            .await?;
        response.into_first()
    }

    pub async fn mark_price(&self, inst_type: &str, inst_id: &str) -> VenueResult<OkxMarkPrice> {
        let params = [("instType", inst_type), ("instId", inst_id)];
        let response: OkxResponse<OkxMarkPrice> =
            self.http_client.get_public(public::MARK_PRICE, &params).await?;
        response.into_first()
    }

    pub async fn funding_rate(&self, inst_id: &str) -> VenueResult<OkxFundingRate> {
        let response: OkxResponse<OkxFundingRate> = self
            .http_client
            .get_public(public::FUNDING_RATE, &[("instId", inst_id)])
            .await?;
        response.into_first()
    }

    pub async fn instrument(&self, inst_type: &str, inst_id: &str) -> VenueResult<Option<OkxInstrument>> {
        let params = [("instType", inst_type), ("instId", inst_id)];
        let response: OkxResponse<OkxInstrument> =
            self.http_client.get_public(public::INSTRUMENTS, &params).await?;
        Ok(response.into_data()?.into_iter().find(|i| i.inst_id == inst_id))
    }

    /// Convert a coin amount to a swap contract count.
    pub async fn contract_size(&self, inst_id: &str, coin_amount: &str) -> VenueResult<OkxContractSize> {
        let params = [
            ("type", "1"),
            ("instId", inst_id),
            ("sz", coin_amount),
            ("unit", "coin"),
        ];
        let response: OkxResponse<OkxContractSize> = self
            .http_client
            .get_public(public::CONVERT_CONTRACT_COIN, &params)
            .await?;
        response.into_first()
    }

    // ========================================================================
    // Funding account
    // ========================================================================

    pub async fn deposit_addresses(&self, ccy: &str) -> VenueResult<Vec<OkxDepositAddress>> {
        let response: OkxResponse<OkxDepositAddress> = self
            .http_client
            .get_signed(asset::DEPOSIT_ADDRESS, &[("ccy", ccy)])
            .await?;
        response.into_data()
    }

    pub async fn transfer(&self, request: &OkxTransferRequest) -> VenueResult<OkxTransfer> {
        let response: OkxResponse<OkxTransfer> =
            self.http_client.post_json_signed(asset::TRANSFER, request).await?;
        response.into_first()
    }

    pub async fn currencies(&self, ccy: &str) -> VenueResult<Vec<OkxCurrency>> {
        let response: OkxResponse<OkxCurrency> = self
            .http_client
            .get_signed(asset::CURRENCIES, &[("ccy", ccy)])
            .await?;
        response.into_data()
    }

    pub async fn withdrawal(&self, request: &OkxWithdrawalRequest) -> VenueResult<OkxWithdrawal> {
        let response: OkxResponse<OkxWithdrawal> =
            self.http_client.post_json_signed(asset::WITHDRAWAL, request).await?;
        response.into_first()
    }
}
