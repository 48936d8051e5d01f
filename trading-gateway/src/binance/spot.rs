//! REST client for Binance Spot and wallet APIs.

use std::sync::Arc;

use tracing::debug;

use crate::error::{VenueError, VenueResult};
use crate::http::HttpClient;
use crate::vocabulary::{OrderType, Side};

use super::endpoints::{sapi, spot};
use super::types::{
    BinanceAccount, BinanceCancelResponse, BinanceDepositAddress, BinanceDepth,
    BinanceExchangeInfo, BinanceOrderAck, BinanceSpotOrder, BinanceTicker24h, BinanceTickerPrice,
    BinanceTradeFee, BinanceWithdrawResponse,
};
use super::vocabulary::BINANCE;

/// REST client for Binance Spot API.
pub struct SpotRestClient {
    http_client: Arc<HttpClient>,
}

impl SpotRestClient {
    /// Create a new Spot REST client.
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }

    /// Get account information.
    pub async fn account(&self) -> VenueResult<BinanceAccount> {
        self.http_client.get_signed(spot::ACCOUNT, &[]).await
    }

    /// Submit a new order.
    ///
    /// `Taker` goes out as `LIMIT` + `IOC` and `Iceberg` as `LIMIT` + `GTC`
    /// with `icebergQty`. Types Binance cannot express are `Unsupported`.
    pub async fn submit_order(
        &self,
        symbol: &str,
        side: Side,
        order_type: OrderType,
        price: Option<&str>,
        quantity: &str,
        iceberg_qty: Option<&str>,
    ) -> VenueResult<BinanceOrderAck> {
        let (wire_type, time_in_force) = match order_type {
            OrderType::Limit | OrderType::Iceberg => {
                (BINANCE.order_type.denormalize(OrderType::Limit)?, Some("GTC"))
            }
            OrderType::Taker => (BINANCE.order_type.denormalize(OrderType::Limit)?, Some("IOC")),
            other => (BINANCE.order_type.denormalize(other)?, None),
        };

        let mut params = vec![
            ("symbol", symbol),
            ("side", BINANCE.side.denormalize(side)?),
            ("type", wire_type),
        ];
        if let Some(tif) = time_in_force {
            params.push(("timeInForce", tif));
        }
        params.push(("quantity", quantity));

        if order_type.requires_price() {
            let price = price.ok_or_else(|| {
                VenueError::InvalidRequest(format!("{} order requires a price", order_type))
            })?;
            params.push(("price", price));
        }

        if order_type == OrderType::Iceberg {
            let visible = iceberg_qty.ok_or_else(|| {
                VenueError::InvalidRequest("iceberg order requires a visible size".to_string())
            })?;
            params.push(("icebergQty", visible));
        }

        debug!("Submitting spot order: {:?}", params);
        self.http_client.post_signed(spot::ORDER, &params).await
    }

    /// Cancel an order.
    pub async fn cancel_order(&self, symbol: &str, order_id: &str) -> VenueResult<BinanceCancelResponse> {
        let params = [("symbol", symbol), ("orderId", order_id)];
        self.http_client.delete_signed(spot::ORDER, &params).await
    }

    /// Cancel all open orders on a symbol.
    pub async fn cancel_all_orders(&self, symbol: &str) -> VenueResult<Vec<BinanceCancelResponse>> {
        self.http_client
            .delete_signed(spot::OPEN_ORDERS, &[("symbol", symbol)])
            .await
    }

    /// Query an order.
    pub async fn query_order(&self, symbol: &str, order_id: &str) -> VenueResult<BinanceSpotOrder> {
        let params = [("symbol", symbol), ("orderId", order_id)];
        self.http_client.get_signed(spot::ORDER, &params).await
    }

    /// Get open orders on a symbol.
    pub async fn open_orders(&self, symbol: &str) -> VenueResult<Vec<BinanceSpotOrder>> {
        self.http_client
            .get_signed(spot::OPEN_ORDERS, &[("symbol", symbol)])
            .await
    }

    /// Get the order book.
    pub async fn depth(&self, symbol: &str, limit: u32) -> VenueResult<BinanceDepth> {
        let limit = limit.to_string();
        self.http_client
            .get_public(spot::DEPTH, &[("symbol", symbol), ("limit", limit.as_str())])
            .await
    }

    /// Get the latest price.
    pub async fn ticker_price(&self, symbol: &str) -> VenueResult<BinanceTickerPrice> {
        self.http_client
            .get_public(spot::TICKER_PRICE, &[("symbol", symbol)])
            .await
    }

    /// Get 24h statistics of every symbol.
    pub async fn tickers_24h(&self) -> VenueResult<Vec<BinanceTicker24h>> {
        self.http_client.get_public(spot::TICKER_24HR, &[]).await
    }

    /// Get the trading rules of one symbol.
    pub async fn exchange_info(&self, symbol: &str) -> VenueResult<BinanceExchangeInfo> {
        self.http_client
            .get_public(spot::EXCHANGE_INFO, &[("symbol", symbol)])
            .await
    }

    /// Get the account's trade fee on a symbol.
    pub async fn trade_fee(&self, symbol: &str) -> VenueResult<Vec<BinanceTradeFee>> {
        self.http_client
            .get_signed(sapi::TRADE_FEE, &[("symbol", symbol)])
            .await
    }

    /// Get the deposit address of a coin on a network.
    pub async fn deposit_address(&self, coin: &str, network: &str) -> VenueResult<BinanceDepositAddress> {
        let mut params = vec![("coin", coin)];
        if !network.is_empty() {
            params.push(("network", network));
        }
        self.http_client.get_signed(sapi::DEPOSIT_ADDRESS, &params).await
    }

    /// Submit a withdrawal.
    pub async fn withdraw(
        &self,
        coin: &str,
        network: &str,
        address: &str,
        amount: &str,
    ) -> VenueResult<BinanceWithdrawResponse> {
        let mut params = vec![("coin", coin), ("address", address), ("amount", amount)];
        if !network.is_empty() {
            params.push(("network", network));
        }
        debug!("Submitting {} withdrawal of {} on '{}'", coin, amount, network);
        self.http_client.post_signed(sapi::WITHDRAW, &params).await
    }
}
