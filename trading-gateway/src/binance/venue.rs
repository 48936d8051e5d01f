//! Binance venue adapter.
//!
//! [`BinanceVenue`] implements every capability trait against Binance Spot,
//! the Binance wallet (`/sapi`) and Binance USDT-M Futures.
//!
//! Binance has no native multi-order endpoint for these order types, so
//! plural submissions go one order at a time through the
//! [`BatchOrchestrator`] with its fixed inter-order delay.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::batch::BatchOrchestrator;
use crate::config::VenueConfig;
use crate::error::{VenueError, VenueResult};
use crate::http::HttpClient;
use crate::traits::{
    AccountVenue, FuturesTradingVenue, MarketDataVenue, SpotTradingVenue, TreasuryVenue,
    VenueConnection,
};
use crate::types::{
    Balance, Depth, FundingRate, FutureBalance, FutureOrder, FutureOrderRequest, Order, OrderList,
    PairInfo, PositionInfo, SymbolTicker, TradingFee, VenueInfo,
};
use crate::vocabulary::{
    resolve_position_side, MarginAdjustment, MarginMode, OrderType, PositionSide, Side, VenueId,
};

use super::endpoints::BinanceEndpoints;
use super::futures::FuturesRestClient;
use super::normalizer::{
    normalize_balance, normalize_commission_rate, normalize_depth, normalize_funding,
    normalize_future_balance, normalize_future_order, normalize_pair_info, normalize_position,
    normalize_spot_order, normalize_ticker, normalize_trade_fee,
};
use super::signer::BinanceHmacSigner;
use super::spot::SpotRestClient;

/// "No need to change margin type."
const MARGIN_TYPE_UNCHANGED: &str = "-4046";

/// "No need to change position side."
const POSITION_MODE_UNCHANGED: &str = "-4059";

/// Margin asset of USDT-M futures.
const FUTURES_MARGIN_ASSET: &str = "USDT";

/// Code of a successful futures cancel-all.
const CANCEL_ALL_DONE: i64 = 200;

/// REST clients created by `init`.
struct BinanceClients {
    endpoints: BinanceEndpoints,
    spot: SpotRestClient,
    futures: FuturesRestClient,
}

/// Binance venue adapter.
///
/// # Example
///
/// ```ignore
/// let mut venue = BinanceVenue::new();
/// venue.init(VenueConfig::new(api_key, secret_key))?;
///
/// let balance = venue.get_balance("USDT").await?;
/// let order_id = venue.limit_order("BTCUSDT", Side::Bid, "25000", "0.001").await?;
/// ```
pub struct BinanceVenue {
    info: VenueInfo,
    clients: Option<BinanceClients>,
    orchestrator: BatchOrchestrator,
}

impl Default for BinanceVenue {
    fn default() -> Self {
        Self::new()
    }
}

impl BinanceVenue {
    /// Create an uninitialized adapter.
    pub fn new() -> Self {
        let info = VenueInfo::new(VenueId::Binance, "Binance")
            .with_order_types(vec![
                OrderType::Market,
                OrderType::Limit,
                OrderType::Maker,
                OrderType::Taker,
                OrderType::Iceberg,
            ])
            .with_future_order_types(vec![
                OrderType::Market,
                OrderType::Limit,
                OrderType::Stop,
                OrderType::StopMarket,
                OrderType::TakeProfit,
                OrderType::TakeProfitMarket,
            ]);

        Self {
            info,
            clients: None,
            orchestrator: BatchOrchestrator::new(),
        }
    }

    /// Replace the batch orchestrator (delay between sequential orders).
    pub fn with_orchestrator(mut self, orchestrator: BatchOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    /// Hosts in use, once initialized.
    pub fn endpoints(&self) -> Option<&BinanceEndpoints> {
        self.clients.as_ref().map(|c| &c.endpoints)
    }

    fn clients(&self) -> VenueResult<&BinanceClients> {
        self.clients
            .as_ref()
            .ok_or(VenueError::NotInitialized(VenueId::Binance))
    }

    fn spot(&self) -> VenueResult<&SpotRestClient> {
        Ok(&self.clients()?.spot)
    }

    fn futures(&self) -> VenueResult<&FuturesRestClient> {
        Ok(&self.clients()?.futures)
    }

    fn create_http_client(base_url: &str, config: &VenueConfig) -> VenueResult<Arc<HttpClient>> {
        let signer = BinanceHmacSigner::new(config.api_key.as_str(), config.secret_key.as_str())
            .with_recv_window(config.rest.recv_window_ms);
        Ok(Arc::new(HttpClient::new(
            base_url,
            Some(Box::new(signer)),
            config.rest.clone(),
        )?))
    }

    async fn place_spot_order(
        &self,
        symbol: &str,
        side: Side,
        order_type: OrderType,
        price: Option<&str>,
        size: &str,
        iceberg_qty: Option<&str>,
    ) -> VenueResult<String> {
        let ack = self
            .spot()?
            .submit_order(symbol, side, order_type, price, size, iceberg_qty)
            .await?;
        info!(
            "Binance {} {} order placed on {}: {}",
            side, order_type, symbol, ack.order_id
        );
        Ok(ack.order_id.to_string())
    }

    async fn place_spot_orders(
        &self,
        symbol: &str,
        orders: &[OrderList],
        default_type: OrderType,
    ) -> VenueResult<Vec<String>> {
        self.spot()?;
        self.orchestrator
            .submit_sequential(orders, |item| {
                let item = item.clone();
                async move {
                    self.place_spot_order(
                        symbol,
                        item.side,
                        item.order_type.unwrap_or(default_type),
                        Some(item.price.as_str()),
                        &item.size,
                        None,
                    )
                    .await
                }
            })
            .await
    }
}

impl VenueConnection for BinanceVenue {
    fn info(&self) -> &VenueInfo {
        &self.info
    }

    fn init(&mut self, config: VenueConfig) -> VenueResult<()> {
        if self.clients.is_some() {
            return Err(VenueError::AlreadyInitialized(VenueId::Binance));
        }
        let config = config.resolve_credentials();
        config.validate(false)?;

        let endpoints = BinanceEndpoints::from_urls(&config.url, config.futures_url.as_deref());
        let spot_http = Self::create_http_client(&endpoints.spot_url, &config)?;
        let futures_http = Self::create_http_client(&endpoints.futures_url, &config)?;

        info!(
            "Binance adapter initialized (spot: {}, futures: {})",
            endpoints.spot_url, endpoints.futures_url
        );

        self.clients = Some(BinanceClients {
            endpoints,
            spot: SpotRestClient::new(spot_http),
            futures: FuturesRestClient::new(futures_http),
        });
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.clients.is_some()
    }
}

#[async_trait]
impl AccountVenue for BinanceVenue {
    async fn get_balance(&self, currency: &str) -> VenueResult<Balance> {
        let account = self.spot()?.account().await?;
        let balance = account
            .balances
            .iter()
            .find(|b| b.asset == currency)
            .ok_or_else(|| VenueError::NotFound(format!("Binance spot balance for {}", currency)))?;
        normalize_balance(balance)
    }

    async fn get_future_balance(&self) -> VenueResult<FutureBalance> {
        let balances = self.futures()?.balances().await?;
        balances
            .iter()
            .find(|b| b.asset == FUTURES_MARGIN_ASSET)
            .map(normalize_future_balance)
            .ok_or_else(|| {
                VenueError::NotFound(format!("Binance futures balance for {}", FUTURES_MARGIN_ASSET))
            })
    }
}

#[async_trait]
impl SpotTradingVenue for BinanceVenue {
    async fn market_order(&self, symbol: &str, side: Side, size: &str) -> VenueResult<String> {
        self.place_spot_order(symbol, side, OrderType::Market, None, size, None)
            .await
    }

    async fn limit_order(&self, symbol: &str, side: Side, price: &str, size: &str) -> VenueResult<String> {
        self.place_spot_order(symbol, side, OrderType::Limit, Some(price), size, None)
            .await
    }

    async fn maker_order(&self, symbol: &str, side: Side, price: &str, size: &str) -> VenueResult<String> {
        self.place_spot_order(symbol, side, OrderType::Maker, Some(price), size, None)
            .await
    }

    async fn taker_order(&self, symbol: &str, side: Side, price: &str, size: &str) -> VenueResult<String> {
        self.place_spot_order(symbol, side, OrderType::Taker, Some(price), size, None)
            .await
    }

    async fn limit_hidden_order(&self, symbol: &str, side: Side, price: &str, size: &str) -> VenueResult<String> {
        self.place_spot_order(symbol, side, OrderType::LimitHidden, Some(price), size, None)
            .await
    }

    async fn iceberg_order(
        &self,
        symbol: &str,
        side: Side,
        order_type: OrderType,
        price: &str,
        size: &str,
        visible_size: &str,
    ) -> VenueResult<String> {
        if !matches!(order_type, OrderType::Limit | OrderType::Iceberg) {
            return Err(VenueError::unsupported(
                VenueId::Binance,
                format!("iceberg orders of type '{}'", order_type),
            ));
        }
        self.place_spot_order(
            symbol,
            side,
            OrderType::Iceberg,
            Some(price),
            size,
            Some(visible_size),
        )
        .await
    }

    async fn limit_orders(&self, symbol: &str, orders: &[OrderList]) -> VenueResult<Vec<String>> {
        self.place_spot_orders(symbol, orders, OrderType::Limit).await
    }

    async fn maker_orders(&self, symbol: &str, orders: &[OrderList]) -> VenueResult<Vec<String>> {
        self.place_spot_orders(symbol, orders, OrderType::Maker).await
    }

    async fn taker_orders(&self, symbol: &str, orders: &[OrderList]) -> VenueResult<Vec<String>> {
        self.place_spot_orders(symbol, orders, OrderType::Taker).await
    }

    async fn limit_hidden_orders(&self, _symbol: &str, _orders: &[OrderList]) -> VenueResult<Vec<String>> {
        Err(VenueError::unsupported(VenueId::Binance, "limit_hidden orders"))
    }

    async fn cancel_order(&self, symbol: &str, order_id: &str) -> VenueResult<bool> {
        let response = self.spot()?.cancel_order(symbol, order_id).await?;
        info!("Binance order {} on {} cancel: {}", order_id, symbol, response.status);
        Ok(response.status == "CANCELED")
    }

    async fn cancel_orders(&self, symbol: &str) -> VenueResult<Vec<String>> {
        let spot = self.spot()?;
        if spot.open_orders(symbol).await?.is_empty() {
            debug!("No open Binance orders on {}", symbol);
            return Ok(Vec::new());
        }
        let canceled: Vec<String> = spot
            .cancel_all_orders(symbol)
            .await?
            .into_iter()
            .filter_map(|r| r.order_id.map(|id| id.to_string()))
            .collect();
        info!("Canceled {} Binance orders on {}", canceled.len(), symbol);
        Ok(canceled)
    }

    async fn get_order(&self, symbol: &str, order_id: &str) -> VenueResult<Order> {
        let order = self.spot()?.query_order(symbol, order_id).await?;
        normalize_spot_order(&order)
    }

    async fn get_open_orders(&self, symbol: &str) -> VenueResult<Vec<Order>> {
        self.spot()?
            .open_orders(symbol)
            .await?
            .iter()
            .map(normalize_spot_order)
            .collect()
    }
}

#[async_trait]
impl FuturesTradingVenue for BinanceVenue {
    async fn new_future_order(&self, request: &FutureOrderRequest) -> VenueResult<String> {
        request.validate().map_err(VenueError::InvalidRequest)?;
        let futures = self.futures()?;

        self.change_margin_type(&request.symbol, request.margin_mode).await?;
        let hedge_mode = self.check_dual().await?;
        let position_side = resolve_position_side(hedge_mode, request.position_side)?;

        let ack = futures.submit_order(request, position_side).await?;
        info!(
            "Binance futures {} {} order placed on {} ({}): {}",
            request.side, request.order_type, request.symbol, position_side, ack.order_id
        );
        Ok(ack.order_id.to_string())
    }

    async fn cancel_future_order(&self, symbol: &str, order_id: &str) -> VenueResult<bool> {
        let response = self.futures()?.cancel_order(symbol, order_id).await?;
        info!("Binance futures order {} on {} cancel: {}", order_id, symbol, response.status);
        Ok(response.status == "CANCELED")
    }

    async fn cancel_future_orders(&self, symbol: &str) -> VenueResult<Vec<String>> {
        let futures = self.futures()?;
        let open = futures.open_orders(symbol).await?;
        if open.is_empty() {
            debug!("No open Binance futures orders on {}", symbol);
            return Ok(Vec::new());
        }
        let response = futures.cancel_all_orders(symbol).await?;
        if response.code != CANCEL_ALL_DONE {
            return Err(VenueError::api(response.code.to_string(), response.msg));
        }

        // The cancel-all acknowledgement carries no ids.
        let still_open: HashSet<i64> = futures
            .open_orders(symbol)
            .await?
            .iter()
            .map(|o| o.order_id)
            .collect();
        let (canceled, remaining): (Vec<i64>, Vec<i64>) = open
            .iter()
            .map(|o| o.order_id)
            .partition(|id| !still_open.contains(id));
        let canceled: Vec<String> = canceled.iter().map(i64::to_string).collect();

        if !remaining.is_empty() {
            warn!(
                "Binance futures cancel-all on {} left {} of {} orders open",
                symbol,
                remaining.len(),
                open.len()
            );
            return Err(VenueError::partial_batch(
                canceled,
                VenueError::api(
                    response.code.to_string(),
                    format!("{} orders still open after cancel-all: {:?}", remaining.len(), remaining),
                ),
            ));
        }
        info!("Canceled {} Binance futures orders on {}", canceled.len(), symbol);
        Ok(canceled)
    }

    async fn get_future_order(&self, symbol: &str, order_id: &str) -> VenueResult<FutureOrder> {
        let order = self.futures()?.query_order(symbol, order_id).await?;
        normalize_future_order(&order)
    }

    async fn get_future_open_orders(&self, symbol: &str) -> VenueResult<Vec<FutureOrder>> {
        self.futures()?
            .open_orders(symbol)
            .await?
            .iter()
            .map(normalize_future_order)
            .collect()
    }

    async fn change_leverage(&self, symbol: &str, leverage: u32) -> VenueResult<String> {
        let response = self.futures()?.change_leverage(symbol, leverage).await?;
        info!("Binance leverage on {} set to {}", response.symbol, response.leverage);
        Ok(response.leverage.to_string())
    }

    async fn change_margin_type(&self, symbol: &str, margin_mode: MarginMode) -> VenueResult<()> {
        match self.futures()?.change_margin_type(symbol, margin_mode).await {
            Ok(_) => {
                info!("Binance margin type on {} set to {}", symbol, margin_mode);
                Ok(())
            }
            Err(e) if e.venue_code() == Some(MARGIN_TYPE_UNCHANGED) => {
                debug!("Binance margin type on {} already {}", symbol, margin_mode);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn change_position_margin(
        &self,
        symbol: &str,
        position_side: PositionSide,
        amount: &str,
        adjustment: MarginAdjustment,
    ) -> VenueResult<bool> {
        let futures = self.futures()?;
        let hedge_mode = self.check_dual().await?;
        let position_side = resolve_position_side(hedge_mode, position_side)?;
        let response = futures
            .change_position_margin(symbol, position_side, amount, adjustment)
            .await?;
        info!(
            "Binance {:?} {} isolated margin on {} ({}): {}",
            adjustment, amount, symbol, position_side, response.msg
        );
        Ok(response.code == 200)
    }

    async fn get_position_risk(&self, symbol: &str) -> VenueResult<Vec<PositionInfo>> {
        self.futures()?
            .position_risk(symbol)
            .await?
            .iter()
            .map(normalize_position)
            .collect()
    }

    async fn dual(&self, enabled: bool) -> VenueResult<bool> {
        match self.futures()?.set_position_mode(enabled).await {
            Ok(_) => {
                info!("Binance hedge mode set to {}", enabled);
                Ok(true)
            }
            Err(e) if e.venue_code() == Some(POSITION_MODE_UNCHANGED) => {
                debug!("Binance hedge mode already {}", enabled);
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    async fn check_dual(&self) -> VenueResult<bool> {
        Ok(self.futures()?.position_mode().await?.dual_side_position)
    }
}

#[async_trait]
impl MarketDataVenue for BinanceVenue {
    async fn get_market_price(&self, symbol: &str) -> VenueResult<String> {
        Ok(self.spot()?.ticker_price(symbol).await?.price)
    }

    async fn get_future_market_price(&self, symbol: &str) -> VenueResult<String> {
        Ok(self.futures()?.ticker_price(symbol).await?.price)
    }

    async fn depth(&self, symbol: &str, limit: u32) -> VenueResult<Depth> {
        let depth = self.spot()?.depth(symbol, limit).await?;
        normalize_depth(&depth, Utc::now().timestamp_millis())
    }

    async fn future_depth(&self, symbol: &str, limit: u32) -> VenueResult<Depth> {
        let depth = self.futures()?.depth(symbol, limit).await?;
        normalize_depth(&depth, Utc::now().timestamp_millis())
    }

    async fn get_mark_price_and_funding_rate(&self, symbol: &str) -> VenueResult<FundingRate> {
        let index = self.futures()?.premium_index(symbol).await?;
        Ok(normalize_funding(&index))
    }

    async fn get_pair_info(&self, symbol: &str) -> VenueResult<PairInfo> {
        let exchange_info = self.spot()?.exchange_info(symbol).await?;
        exchange_info
            .symbols
            .iter()
            .find(|s| s.symbol == symbol)
            .ok_or_else(|| VenueError::NotFound(format!("Binance symbol {}", symbol)))
            .and_then(normalize_pair_info)
    }

    async fn get_trading_fee(&self, symbol: &str) -> VenueResult<TradingFee> {
        let fees = self.spot()?.trade_fee(symbol).await?;
        fees.first()
            .map(normalize_trade_fee)
            .ok_or_else(|| VenueError::NotFound(format!("Binance trade fee for {}", symbol)))
    }

    async fn get_future_trading_fee(&self, symbol: &str) -> VenueResult<TradingFee> {
        let rate = self.futures()?.commission_rate(symbol).await?;
        Ok(normalize_commission_rate(&rate))
    }

    async fn get_all_tickers(&self) -> VenueResult<Vec<SymbolTicker>> {
        self.spot()?
            .tickers_24h()
            .await?
            .iter()
            .map(normalize_ticker)
            .collect()
    }
}

#[async_trait]
impl TreasuryVenue for BinanceVenue {
    async fn get_deposit_address(&self, token: &str, chain: &str) -> VenueResult<String> {
        Ok(self.spot()?.deposit_address(token, chain).await?.address)
    }

    async fn withdraw(&self, token: &str, chain: &str, address: &str, amount: &str) -> VenueResult<String> {
        let response = self.spot()?.withdraw(token, chain, address, amount).await?;
        info!("Binance withdrawal of {} {} submitted: {}", amount, token, response.id);
        Ok(response.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VenueConfig {
        VenueConfig::new("key", "secret").with_url("http://127.0.0.1:9")
    }

    #[test]
    fn test_venue_info() {
        let venue = BinanceVenue::new();
        assert_eq!(venue.venue_id(), VenueId::Binance);
        assert!(venue.info().supports_order_type(OrderType::Iceberg));
        assert!(!venue.info().supports_order_type(OrderType::LimitHidden));
        assert!(!venue.info().supports_batch);
        assert!(!venue.is_initialized());
    }

    #[test]
    fn test_init_twice_fails() {
        let mut venue = BinanceVenue::new();
        venue.init(config()).unwrap();
        assert!(venue.is_initialized());
        assert_eq!(
            venue.endpoints().map(|e| e.futures_url.as_str()),
            Some("http://127.0.0.1:9")
        );
        assert!(matches!(
            venue.init(config()),
            Err(VenueError::AlreadyInitialized(VenueId::Binance))
        ));
    }

    #[test]
    fn test_init_requires_credentials() {
        let mut venue = BinanceVenue::new();
        let result = venue.init(VenueConfig::new("", "secret"));
        assert!(matches!(result, Err(VenueError::Configuration(_))));
        assert!(!venue.is_initialized());
    }

    #[tokio::test]
    async fn test_calls_before_init_fail() {
        let venue = BinanceVenue::new();
        assert!(matches!(
            venue.get_balance("BTC").await,
            Err(VenueError::NotInitialized(VenueId::Binance))
        ));
        assert!(matches!(
            venue.limit_orders("BTCUSDT", &[OrderList::new(Side::Bid, "1", "1")]).await,
            Err(VenueError::NotInitialized(_))
        ));
    }

    #[tokio::test]
    async fn test_hidden_orders_are_unsupported() {
        let mut venue = BinanceVenue::new();
        venue.init(config()).unwrap();

        let single = venue
            .limit_hidden_order("BTCUSDT", Side::Bid, "25000", "0.1")
            .await
            .unwrap_err();
        assert!(single.is_unsupported());

        let batch = venue
            .limit_hidden_orders("BTCUSDT", &[OrderList::new(Side::Ask, "26000", "0.1")])
            .await
            .unwrap_err();
        assert!(batch.is_unsupported());
    }

    #[tokio::test]
    async fn test_iceberg_rejects_market_type() {
        let mut venue = BinanceVenue::new();
        venue.init(config()).unwrap();
        let err = venue
            .iceberg_order("BTCUSDT", Side::Bid, OrderType::Market, "25000", "1", "0.1")
            .await
            .unwrap_err();
        assert!(err.is_unsupported());
    }
}
