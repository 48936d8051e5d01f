//! REST client for Binance USDT-M Futures API.

use std::sync::Arc;

use tracing::debug;

use crate::error::{VenueError, VenueResult};
use crate::http::HttpClient;
use crate::types::FutureOrderRequest;
use crate::vocabulary::{MarginAdjustment, MarginMode, OrderType, PositionSide};

use super::endpoints::futures;
use super::types::{
    BinanceCodeResponse, BinanceCommissionRate, BinanceDepth, BinanceFuturesBalance,
    BinanceFuturesOrder, BinanceLeverageResponse, BinanceOrderAck, BinancePositionMode,
    BinancePositionRisk, BinancePremiumIndex, BinanceTickerPrice,
};
use super::vocabulary::BINANCE;

/// REST client for Binance USDT-M Futures API.
pub struct FuturesRestClient {
    http_client: Arc<HttpClient>,
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

impl FuturesRestClient {
    /// Create a new Futures REST client.
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }

    /// Submit a new order with an already resolved wire position side.
    pub async fn submit_order(
        &self,
        request: &FutureOrderRequest,
        position_side: PositionSide,
    ) -> VenueResult<BinanceOrderAck> {
        let mut params = vec![
            ("symbol", request.symbol.as_str()),
            ("side", BINANCE.side.denormalize(request.side)?),
            ("positionSide", BINANCE.position_side.denormalize(position_side)?),
            ("type", BINANCE.future_order_type.denormalize(request.order_type)?),
        ];

        if request.order_type == OrderType::Limit {
            params.push(("timeInForce", "GTC"));
        }
        if !request.close_position {
            params.push(("quantity", request.size.as_str()));
        }
        if request.order_type.requires_price() {
            let price = request.price.as_deref().ok_or_else(|| {
                VenueError::InvalidRequest(format!("{} order requires a price", request.order_type))
            })?;
            params.push(("price", price));
        }
        if request.order_type.requires_stop_price() {
            let stop_price = request.stop_price.as_deref().ok_or_else(|| {
                VenueError::InvalidRequest(format!("{} order requires a stop price", request.order_type))
            })?;
            params.push(("stopPrice", stop_price));
        }
        if request.close_position {
            params.push(("closePosition", "true"));
        }
        if request.reduce_only && position_side == PositionSide::Net {
            params.push(("reduceOnly", "true"));
        }
        if request.price_protect {
            params.push(("priceProtect", "TRUE"));
        }

        debug!("Submitting futures order: {:?}", params);
        self.http_client.post_signed(futures::ORDER, &params).await
    }

    /// Cancel an order.
    pub async fn cancel_order(&self, symbol: &str, order_id: &str) -> VenueResult<BinanceFuturesOrder> {
        let params = [("symbol", symbol), ("orderId", order_id)];
        self.http_client.delete_signed(futures::ORDER, &params).await
    }

    /// Cancel all open orders on a symbol.
    pub async fn cancel_all_orders(&self, symbol: &str) -> VenueResult<BinanceCodeResponse> {
        self.http_client
            .delete_signed(futures::ALL_OPEN_ORDERS, &[("symbol", symbol)])
            .await
    }

    /// Query an order.
    pub async fn query_order(&self, symbol: &str, order_id: &str) -> VenueResult<BinanceFuturesOrder> {
        let params = [("symbol", symbol), ("orderId", order_id)];
        self.http_client.get_signed(futures::ORDER, &params).await
    }

    /// Get open orders on a symbol.
    pub async fn open_orders(&self, symbol: &str) -> VenueResult<Vec<BinanceFuturesOrder>> {
        self.http_client
            .get_signed(futures::OPEN_ORDERS, &[("symbol", symbol)])
            .await
    }

    /// Set the initial leverage of a symbol.
    pub async fn change_leverage(&self, symbol: &str, leverage: u32) -> VenueResult<BinanceLeverageResponse> {
        let leverage = leverage.to_string();
        let params = [("symbol", symbol), ("leverage", leverage.as_str())];
        self.http_client.post_signed(futures::LEVERAGE, &params).await
    }

    /// Set the margin type of a symbol.
    pub async fn change_margin_type(&self, symbol: &str, margin_mode: MarginMode) -> VenueResult<BinanceCodeResponse> {
        let params = [
            ("symbol", symbol),
            ("marginType", BINANCE.margin_mode.denormalize(margin_mode)?),
        ];
        self.http_client.post_signed(futures::MARGIN_TYPE, &params).await
    }

    /// Add (`type=1`) or reduce (`type=2`) isolated margin.
    pub async fn change_position_margin(
        &self,
        symbol: &str,
        position_side: PositionSide,
        amount: &str,
        adjustment: MarginAdjustment,
    ) -> VenueResult<BinanceCodeResponse> {
        let kind = match adjustment {
            MarginAdjustment::Add => "1",
            MarginAdjustment::Reduce => "2",
        };
        let params = [
            ("symbol", symbol),
            ("positionSide", BINANCE.position_side.denormalize(position_side)?),
            ("amount", amount),
            ("type", kind),
        ];
        self.http_client.post_signed(futures::POSITION_MARGIN, &params).await
    }

    /// Get position risk of a symbol.
    pub async fn position_risk(&self, symbol: &str) -> VenueResult<Vec<BinancePositionRisk>> {
        self.http_client
            .get_signed(futures::POSITION_RISK, &[("symbol", symbol)])
            .await
    }

    /// Switch hedge mode on or off.
    pub async fn set_position_mode(&self, dual_side: bool) -> VenueResult<BinanceCodeResponse> {
        self.http_client
            .post_signed(futures::POSITION_MODE, &[("dualSidePosition", flag(dual_side))])
            .await
    }

    /// Get the current position mode.
    pub async fn position_mode(&self) -> VenueResult<BinancePositionMode> {
        self.http_client.get_signed(futures::POSITION_MODE, &[]).await
    }

    /// Get wallet balances.
    pub async fn balances(&self) -> VenueResult<Vec<BinanceFuturesBalance>> {
        self.http_client.get_signed(futures::BALANCE, &[]).await
    }

    /// Get the order book.
    pub async fn depth(&self, symbol: &str, limit: u32) -> VenueResult<BinanceDepth> {
        let limit = limit.to_string();
        self.http_client
            .get_public(futures::DEPTH, &[("symbol", symbol), ("limit", limit.as_str())])
            .await
    }

    /// Get the latest price.
    pub async fn ticker_price(&self, symbol: &str) -> VenueResult<BinanceTickerPrice> {
        self.http_client
            .get_public(futures::TICKER_PRICE, &[("symbol", symbol)])
            .await
    }

    /// Get mark price and funding.
    pub async fn premium_index(&self, symbol: &str) -> VenueResult<BinancePremiumIndex> {
        self.http_client
            .get_public(futures::PREMIUM_INDEX, &[("symbol", symbol)])
            .await
    }

    /// Get the account's commission rate on a symbol.
    pub async fn commission_rate(&self, symbol: &str) -> VenueResult<BinanceCommissionRate> {
        self.http_client
            .get_signed(futures::COMMISSION_RATE, &[("symbol", symbol)])
            .await
    }
}

