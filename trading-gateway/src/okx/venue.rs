//! OKX venue adapter.
//!
//! [`OkxVenue`] implements every capability trait against the OKX v5 API.
//! Spot symbols are OKX-native (`BTC-USDT`); derivatives calls take the same
//! symbol and trade its USDT-margined perpetual swap (`BTC-USDT-SWAP`).
//!
//! OKX accepts up to 20 orders per `batch-orders` call and 20 cancels per
//! `cancel-batch-orders` call; the [`BatchOrchestrator`] is sized to match.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::batch::BatchOrchestrator;
use crate::config::VenueConfig;
use crate::error::{VenueError, VenueResult};
use crate::http::{HttpClient, PassphraseSigner};
use crate::symbology::okx_swap_instrument;
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

use super::endpoints::{account_type, inst_type, HEADER_PREFIX, MAX_BATCH_SIZE, REST_URL, WITHDRAW_DEST_ON_CHAIN};
use super::normalizer::{
    normalize_balance, normalize_depth, normalize_funding, normalize_future_balance,
    normalize_future_order, normalize_pair_info, normalize_position, normalize_spot_order,
    normalize_swap_trade_fee, normalize_ticker, normalize_trade_fee,
};
use super::rest::OkxRestClient;
use super::types::{
    ItemStatus, OkxCancelOrder, OkxMarginBalanceRequest, OkxOrderAck, OkxPlaceOrder, OkxSetLeverage,
    OkxTransferRequest, OkxWithdrawalRequest,
};
use super::vocabulary::{position_mode, MARKET_TRIGGER_PRICE, OKX};

/// Trade mode of spot orders.
const SPOT_TRADE_MODE: &str = "cash";

/// Market order sizes are in base currency.
const MARKET_SIZE_UNIT: &str = "base_ccy";

/// Margin currency of USDT-margined swaps.
const SWAP_MARGIN_CURRENCY: &str = "USDT";

/// Index and instrument family of a symbol (`BTC-USDT-SWAP` -> `BTC-USDT`).
fn underlying(symbol: &str) -> &str {
    symbol.strip_suffix("-SWAP").unwrap_or(symbol)
}

/// Build a spot order body.
pub(crate) fn spot_order_request(
    symbol: &str,
    side: Side,
    order_type: OrderType,
    price: Option<&str>,
    size: &str,
) -> VenueResult<OkxPlaceOrder> {
    let mut order = OkxPlaceOrder::new(
        symbol,
        SPOT_TRADE_MODE,
        OKX.side.denormalize(side)?,
        OKX.order_type.denormalize(order_type)?,
        size,
    );
    if order_type.requires_price() {
        let price = price.ok_or_else(|| {
            VenueError::InvalidRequest(format!("{} order requires a price", order_type))
        })?;
        order.px = Some(price.to_string());
    }
    if order_type == OrderType::Market {
        order.tgt_ccy = Some(MARKET_SIZE_UNIT.to_string());
    }
    Ok(order)
}

/// Build a swap order body for `contracts` contracts.
///
/// Stop and take-profit orders become limit orders (market when no price is
/// given) carrying an attached stop-loss or take-profit trigger; the
/// `-MARKET` variants execute the trigger at market.
pub(crate) fn swap_order_request(
    request: &FutureOrderRequest,
    inst_id: &str,
    position_side: PositionSide,
    contracts: &str,
) -> VenueResult<OkxPlaceOrder> {
    let trigger_order_type = |price: &Option<String>| -> VenueResult<&'static str> {
        let base = if price.is_some() { OrderType::Limit } else { OrderType::Market };
        OKX.future_order_type.denormalize(base)
    };
    let ord_type = match request.order_type {
        OrderType::Stop | OrderType::StopMarket | OrderType::TakeProfit | OrderType::TakeProfitMarket => {
            trigger_order_type(&request.price)?
        }
        other => OKX.future_order_type.denormalize(other)?,
    };

    let mut order = OkxPlaceOrder::new(
        inst_id,
        OKX.margin_mode.denormalize(request.margin_mode)?,
        OKX.side.denormalize(request.side)?,
        ord_type,
        contracts,
    );
    order.pos_side = Some(OKX.position_side.denormalize(position_side)?.to_string());
    if ord_type != "market" {
        order.px = request.price.clone();
    }

    let trigger_price = request.stop_price.clone();
    let limit_or_market = |limit: bool| {
        if limit {
            request.price.clone()
        } else {
            Some(MARKET_TRIGGER_PRICE.to_string())
        }
    };
    match request.order_type {
        OrderType::Stop | OrderType::StopMarket => {
            order.sl_trigger_px = trigger_price;
            order.sl_ord_px = limit_or_market(request.order_type == OrderType::Stop);
        }
        OrderType::TakeProfit | OrderType::TakeProfitMarket => {
            order.tp_trigger_px = trigger_price;
            order.tp_ord_px = limit_or_market(request.order_type == OrderType::TakeProfit);
        }
        _ => {}
    }

    if request.reduce_only || request.close_position {
        order.reduce_only = Some(true);
    }
    Ok(order)
}

/// OKX venue adapter.
///
/// # Example
///
/// ```ignore
/// let mut venue = OkxVenue::new();
/// venue.init(VenueConfig::new(api_key, secret_key).with_password(passphrase))?;
///
/// let ids = venue.limit_orders("BTC-USDT", &orders).await?;
/// ```
pub struct OkxVenue {
    info: VenueInfo,
    client: Option<OkxRestClient>,
    orchestrator: BatchOrchestrator,
}

impl Default for OkxVenue {
    fn default() -> Self {
        Self::new()
    }
}

impl OkxVenue {
    /// Create an uninitialized adapter.
    pub fn new() -> Self {
        let info = VenueInfo::new(VenueId::Okx, "OKX")
            .with_order_types(vec![
                OrderType::Market,
                OrderType::Limit,
                OrderType::Maker,
                OrderType::Taker,
            ])
            .with_future_order_types(vec![
                OrderType::Market,
                OrderType::Limit,
                OrderType::Maker,
                OrderType::Taker,
                OrderType::Stop,
                OrderType::StopMarket,
                OrderType::TakeProfit,
                OrderType::TakeProfitMarket,
            ])
            .with_batch_support(MAX_BATCH_SIZE)
            .with_cancel_batch_size(MAX_BATCH_SIZE);

        Self {
            info,
            client: None,
            orchestrator: BatchOrchestrator::new()
                .with_max_batch_size(MAX_BATCH_SIZE)
                .with_cancel_group_size(MAX_BATCH_SIZE),
        }
    }

    /// Replace the batch orchestrator.
    pub fn with_orchestrator(mut self, orchestrator: BatchOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    fn client(&self) -> VenueResult<&OkxRestClient> {
        self.client.as_ref().ok_or(VenueError::NotInitialized(VenueId::Okx))
    }

    async fn place_spot_order(
        &self,
        symbol: &str,
        side: Side,
        order_type: OrderType,
        price: Option<&str>,
        size: &str,
    ) -> VenueResult<String> {
        let client = self.client()?;
        let order = spot_order_request(symbol, side, order_type, price, size)?;
        let ack = client.place_order(&order).await?;
        info!("OKX {} {} order placed on {}: {}", side, order_type, symbol, ack.ord_id);
        Ok(ack.ord_id)
    }

    /// Place orders through `batch-orders` when they fit, one by one otherwise.
    async fn place_spot_orders(
        &self,
        symbol: &str,
        orders: &[OrderList],
        default_type: OrderType,
    ) -> VenueResult<Vec<String>> {
        let client = self.client()?;
        let requests = orders
            .iter()
            .map(|item| {
                spot_order_request(
                    symbol,
                    item.side,
                    item.order_type.unwrap_or(default_type),
                    Some(item.price.as_str()),
                    &item.size,
                )
            })
            .collect::<VenueResult<Vec<_>>>()?;

        self.orchestrator
            .submit_batched(
                &requests,
                |batch| {
                    let batch = batch.to_vec();
                    async move { Self::place_native_batch(client, &batch).await }
                },
                |order| {
                    let order = order.clone();
                    async move { client.place_order(&order).await.map(|ack| ack.ord_id) }
                },
            )
            .await
    }

    /// One `batch-orders` call. Accepted orders stay resting when others in
    /// the batch are rejected; their ids come back through `PartialBatch`.
    async fn place_native_batch(client: &OkxRestClient, orders: &[OkxPlaceOrder]) -> VenueResult<Vec<String>> {
        let acks = client.place_batch(orders).await?;
        let mut placed = Vec::with_capacity(acks.len());
        let mut first_rejection = None;
        for ack in acks {
            if ack.is_accepted() {
                placed.push(ack.ord_id);
            } else if first_rejection.is_none() {
                first_rejection = Some(VenueError::api(ack.s_code, ack.s_msg));
            }
        }
        match first_rejection {
            None => {
                info!("OKX batch of {} orders placed", placed.len());
                Ok(placed)
            }
            Some(e) => {
                warn!("OKX batch partly rejected, {} of {} placed: {}", placed.len(), orders.len(), e);
                Err(VenueError::partial_batch(placed, e))
            }
        }
    }

    /// Cancel `ids` on `inst_id` in groups of 20.
    ///
    /// Only acknowledgements with `sCode == "0"` count as canceled. A group
    /// with a rejected item, or fewer acknowledgements than requests, stops
    /// the run after recording what it did confirm.
    async fn cancel_ids(&self, client: &OkxRestClient, inst_id: &str, ids: &[String]) -> VenueResult<Vec<String>> {
        if ids.is_empty() {
            debug!("No open OKX orders on {}", inst_id);
            return Ok(Vec::new());
        }
        let canceled = self
            .orchestrator
            .cancel_in_groups(ids, |group| {
                let requests: Vec<OkxCancelOrder> = group
                    .iter()
                    .map(|id| OkxCancelOrder {
                        inst_id: inst_id.to_string(),
                        ord_id: id.clone(),
                    })
                    .collect();
                async move {
                    let acks = client.cancel_batch(&requests).await?;
                    confirmed_cancels(requests.len(), acks)
                }
            })
            .await?;
        info!("Canceled {} OKX orders on {}", canceled.len(), inst_id);
        Ok(canceled)
    }
}

/// Ids confirmed by one `cancel-batch-orders` call of `requested` orders.
fn confirmed_cancels(requested: usize, acks: Vec<OkxOrderAck>) -> VenueResult<Vec<String>> {
    let received = acks.len();
    let mut confirmed = Vec::with_capacity(received);
    let mut first_rejection = None;
    for ack in acks {
        if ack.is_accepted() {
            confirmed.push(ack.ord_id);
        } else if first_rejection.is_none() {
            first_rejection = Some(VenueError::api(ack.s_code, ack.s_msg));
        }
    }
    if let Some(e) = first_rejection {
        return Err(VenueError::partial_batch(confirmed, e));
    }
    if received != requested {
        return Err(VenueError::partial_batch(
            confirmed,
            VenueError::Decode(format!(
                "OKX cancel batch returned {} results for {} orders",
                received, requested
            )),
        ));
    }
    Ok(confirmed)
}

impl VenueConnection for OkxVenue {
    fn info(&self) -> &VenueInfo {
        &self.info
    }

    fn init(&mut self, config: VenueConfig) -> VenueResult<()> {
        if self.client.is_some() {
            return Err(VenueError::AlreadyInitialized(VenueId::Okx));
        }
        let config = config.resolve_credentials();
        config.validate(true)?;

        let base_url = config.url_or(REST_URL);
        let signer = PassphraseSigner::new(
            config.api_key.as_str(),
            config.secret_key.as_str(),
            config.password.as_str(),
        )
        .with_header_prefix(HEADER_PREFIX);
        let http = HttpClient::new(base_url.as_str(), Some(Box::new(signer)), config.rest.clone())?;

        info!("OKX adapter initialized ({})", base_url);
        self.client = Some(OkxRestClient::new(Arc::new(http)));
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl AccountVenue for OkxVenue {
    async fn get_balance(&self, currency: &str) -> VenueResult<Balance> {
        let balance = self.client()?.balance(currency).await?;
        balance
            .details
            .iter()
            .find(|d| d.ccy == currency)
            .map(normalize_balance)
            .ok_or_else(|| VenueError::NotFound(format!("OKX balance for {}", currency)))
    }

    async fn get_future_balance(&self) -> VenueResult<FutureBalance> {
        let balance = self.client()?.balance(SWAP_MARGIN_CURRENCY).await?;
        balance
            .details
            .iter()
            .find(|d| d.ccy == SWAP_MARGIN_CURRENCY)
            .map(normalize_future_balance)
            .ok_or_else(|| VenueError::NotFound(format!("OKX balance for {}", SWAP_MARGIN_CURRENCY)))
    }
}

#[async_trait]
impl SpotTradingVenue for OkxVenue {
    async fn market_order(&self, symbol: &str, side: Side, size: &str) -> VenueResult<String> {
        self.place_spot_order(symbol, side, OrderType::Market, None, size).await
    }

    async fn limit_order(&self, symbol: &str, side: Side, price: &str, size: &str) -> VenueResult<String> {
        self.place_spot_order(symbol, side, OrderType::Limit, Some(price), size)
            .await
    }

    async fn maker_order(&self, symbol: &str, side: Side, price: &str, size: &str) -> VenueResult<String> {
        self.place_spot_order(symbol, side, OrderType::Maker, Some(price), size)
            .await
    }

    async fn taker_order(&self, symbol: &str, side: Side, price: &str, size: &str) -> VenueResult<String> {
        self.place_spot_order(symbol, side, OrderType::Taker, Some(price), size)
            .await
    }

    async fn limit_hidden_order(&self, _symbol: &str, _side: Side, _price: &str, _size: &str) -> VenueResult<String> {
        Err(VenueError::unsupported(VenueId::Okx, "limit_hidden orders"))
    }

    async fn iceberg_order(
        &self,
        _symbol: &str,
        _side: Side,
        _order_type: OrderType,
        _price: &str,
        _size: &str,
        _visible_size: &str,
    ) -> VenueResult<String> {
        Err(VenueError::unsupported(VenueId::Okx, "iceberg orders"))
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
        Err(VenueError::unsupported(VenueId::Okx, "limit_hidden orders"))
    }

    async fn cancel_order(&self, symbol: &str, order_id: &str) -> VenueResult<bool> {
        let ack = self.client()?.cancel_order(symbol, order_id).await?;
        info!("OKX order {} on {} canceled", ack.ord_id, symbol);
        Ok(true)
    }

    async fn cancel_orders(&self, symbol: &str) -> VenueResult<Vec<String>> {
        let client = self.client()?;
        let ids: Vec<String> = client
            .pending_orders(inst_type::SPOT, symbol)
            .await?
            .into_iter()
            .map(|o| o.ord_id)
            .collect();
        self.cancel_ids(client, symbol, &ids).await
    }

    async fn get_order(&self, symbol: &str, order_id: &str) -> VenueResult<Order> {
        let order = self.client()?.order(symbol, order_id).await?;
        normalize_spot_order(&order)
    }

    async fn get_open_orders(&self, symbol: &str) -> VenueResult<Vec<Order>> {
        self.client()?
            .pending_orders(inst_type::SPOT, symbol)
            .await?
            .iter()
            .map(normalize_spot_order)
            .collect()
    }
}

#[async_trait]
impl FuturesTradingVenue for OkxVenue {
    /// `size` is in coin units and is converted to a contract count first.
    /// `close_position` is sent as `reduceOnly`; OKX has no price protection
    /// flag on orders.
    async fn new_future_order(&self, request: &FutureOrderRequest) -> VenueResult<String> {
        request.validate().map_err(VenueError::InvalidRequest)?;
        if request.size.is_empty() {
            return Err(VenueError::InvalidRequest(
                "OKX needs a size to close a position".to_string(),
            ));
        }
        let client = self.client()?;
        let inst_id = okx_swap_instrument(&request.symbol);

        let hedge_mode = self.check_dual().await?;
        let position_side = resolve_position_side(hedge_mode, request.position_side)?;
        let contracts = client.contract_size(&inst_id, &request.size).await?;
        debug!("{} {} is {} contracts", request.size, inst_id, contracts.sz);
        if request.price_protect {
            debug!("OKX ignores price protection on {}", inst_id);
        }

        let order = swap_order_request(request, &inst_id, position_side, &contracts.sz)?;
        let ack = client.place_order(&order).await?;
        info!(
            "OKX swap {} {} order placed on {} ({}): {}",
            request.side, request.order_type, inst_id, position_side, ack.ord_id
        );
        Ok(ack.ord_id)
    }

    async fn cancel_future_order(&self, symbol: &str, order_id: &str) -> VenueResult<bool> {
        let inst_id = okx_swap_instrument(symbol);
        let ack = self.client()?.cancel_order(&inst_id, order_id).await?;
        info!("OKX swap order {} on {} canceled", ack.ord_id, inst_id);
        Ok(true)
    }

    async fn cancel_future_orders(&self, symbol: &str) -> VenueResult<Vec<String>> {
        let client = self.client()?;
        let inst_id = okx_swap_instrument(symbol);
        let ids: Vec<String> = client
            .pending_orders(inst_type::SWAP, &inst_id)
            .await?
            .into_iter()
            .map(|o| o.ord_id)
            .collect();
        self.cancel_ids(client, &inst_id, &ids).await
    }

    async fn get_future_order(&self, symbol: &str, order_id: &str) -> VenueResult<FutureOrder> {
        let order = self
            .client()?
            .order(&okx_swap_instrument(symbol), order_id)
            .await?;
        normalize_future_order(&order)
    }

    async fn get_future_open_orders(&self, symbol: &str) -> VenueResult<Vec<FutureOrder>> {
        self.client()?
            .pending_orders(inst_type::SWAP, &okx_swap_instrument(symbol))
            .await?
            .iter()
            .map(normalize_future_order)
            .collect()
    }

    /// Leverage is set per margin mode (and per side in hedge mode); every
    /// leg must succeed.
    async fn change_leverage(&self, symbol: &str, leverage: u32) -> VenueResult<String> {
        let client = self.client()?;
        let inst_id = okx_swap_instrument(symbol);
        let hedge_mode = self.check_dual().await?;

        let mut legs = vec![(MarginMode::Crossed, None)];
        if hedge_mode {
            legs.push((MarginMode::Isolated, Some(PositionSide::Long)));
            legs.push((MarginMode::Isolated, Some(PositionSide::Short)));
        } else {
            legs.push((MarginMode::Isolated, None));
        }

        let lever = leverage.to_string();
        let mut reported = lever.clone();
        for (margin_mode, position_side) in legs {
            let request = OkxSetLeverage {
                inst_id: inst_id.clone(),
                lever: lever.clone(),
                mgn_mode: OKX.margin_mode.denormalize(margin_mode)?.to_string(),
                pos_side: position_side
                    .map(|side| OKX.position_side.denormalize(side).map(str::to_string))
                    .transpose()?,
            };
            reported = client.set_leverage(&request).await?.lever;
            debug!("OKX {} leverage on {} set to {}", margin_mode, inst_id, reported);
        }
        info!("OKX leverage on {} set to {}", inst_id, reported);
        Ok(reported)
    }

    async fn change_margin_type(&self, _symbol: &str, _margin_mode: MarginMode) -> VenueResult<()> {
        Err(VenueError::unsupported(
            VenueId::Okx,
            "changing margin type (set per order through the trade mode)",
        ))
    }

    async fn change_position_margin(
        &self,
        symbol: &str,
        position_side: PositionSide,
        amount: &str,
        adjustment: MarginAdjustment,
    ) -> VenueResult<bool> {
        let client = self.client()?;
        let hedge_mode = self.check_dual().await?;
        let position_side = resolve_position_side(hedge_mode, position_side)?;
        let request = OkxMarginBalanceRequest {
            inst_id: okx_swap_instrument(symbol),
            pos_side: OKX.position_side.denormalize(position_side)?.to_string(),
            kind: match adjustment {
                MarginAdjustment::Add => "add",
                MarginAdjustment::Reduce => "reduce",
            }
            .to_string(),
            amt: amount.to_string(),
        };
        let response = client.margin_balance(&request).await?;
        info!(
            "OKX {} {} isolated margin on {} ({})",
            response.kind, response.amt, request.inst_id, position_side
        );
        Ok(true)
    }

    async fn get_position_risk(&self, symbol: &str) -> VenueResult<Vec<PositionInfo>> {
        self.client()?
            .positions(&okx_swap_instrument(symbol))
            .await?
            .iter()
            .map(normalize_position)
            .collect()
    }

    async fn dual(&self, enabled: bool) -> VenueResult<bool> {
        let requested = position_mode(enabled);
        let config = self.client()?.set_position_mode(requested).await?;
        info!("OKX position mode set to {}", config.pos_mode);
        Ok(config.pos_mode == requested)
    }

    async fn check_dual(&self) -> VenueResult<bool> {
        let config = self.client()?.account_config().await?;
        Ok(config.pos_mode == position_mode(true))
    }
}

#[async_trait]
impl MarketDataVenue for OkxVenue {
    async fn get_market_price(&self, symbol: &str) -> VenueResult<String> {
        Ok(self.client()?.ticker(symbol).await?.last)
    }

    async fn get_future_market_price(&self, symbol: &str) -> VenueResult<String> {
        Ok(self.client()?.ticker(&okx_swap_instrument(symbol)).await?.last)
    }

    async fn depth(&self, symbol: &str, limit: u32) -> VenueResult<Depth> {
        let book = self.client()?.books(symbol, limit).await?;
        normalize_depth(&book)
    }

    async fn future_depth(&self, symbol: &str, limit: u32) -> VenueResult<Depth> {
        let book = self.client()?.books(&okx_swap_instrument(symbol), limit).await?;
        normalize_depth(&book)
    }

    async fn get_mark_price_and_funding_rate(&self, symbol: &str) -> VenueResult<FundingRate> {
        let client = self.client()?;
        let inst_id = okx_swap_instrument(symbol);
        let (mark, funding, index) = tokio::try_join!(
            client.mark_price(inst_type::SWAP, &inst_id),
            client.funding_rate(&inst_id),
            client.index_ticker(underlying(symbol)),
        )?;
        normalize_funding(&funding, &mark.mark_px, &index.idx_px, &mark.ts)
    }

    async fn get_pair_info(&self, symbol: &str) -> VenueResult<PairInfo> {
        self.client()?
            .instrument(inst_type::SPOT, symbol)
            .await?
            .map(|instrument| normalize_pair_info(&instrument))
            .ok_or_else(|| VenueError::NotFound(format!("OKX instrument {}", symbol)))
    }

    async fn get_trading_fee(&self, symbol: &str) -> VenueResult<TradingFee> {
        let fee = self
            .client()?
            .trade_fee(inst_type::SPOT, ("instId", symbol))
            .await?;
        Ok(normalize_trade_fee(symbol, &fee))
    }

    async fn get_future_trading_fee(&self, symbol: &str) -> VenueResult<TradingFee> {
        let fee = self
            .client()?
            .trade_fee(inst_type::SWAP, ("instFamily", underlying(symbol)))
            .await?;
        Ok(normalize_swap_trade_fee(&okx_swap_instrument(symbol), &fee))
    }

    async fn get_all_tickers(&self) -> VenueResult<Vec<SymbolTicker>> {
        self.client()?
            .tickers(inst_type::SPOT)
            .await?
            .iter()
            .map(normalize_ticker)
            .collect()
    }
}

#[async_trait]
impl TreasuryVenue for OkxVenue {
    /// Address of `{token}-{chain}` that credits the trading account.
    async fn get_deposit_address(&self, token: &str, chain: &str) -> VenueResult<String> {
        let chain_id = format!("{}-{}", token, chain);
        self.client()?
            .deposit_addresses(token)
            .await?
            .into_iter()
            .find(|a| a.chain == chain_id && a.to == account_type::TRADING)
            .map(|a| a.addr)
            .ok_or_else(|| VenueError::NotFound(format!("OKX deposit address for {}", chain_id)))
    }

    /// Withdrawals leave from the funding account, so the amount is first
    /// moved there from the trading account. The chain's minimum fee is
    /// looked up before any funds move.
    async fn withdraw(&self, token: &str, chain: &str, address: &str, amount: &str) -> VenueResult<String> {
        let client = self.client()?;
        let chain_id = format!("{}-{}", token, chain);

        let fee = client
            .currencies(token)
            .await?
            .into_iter()
            .find(|c| c.chain == chain_id)
            .map(|c| c.min_fee)
            .ok_or_else(|| VenueError::NotFound(format!("OKX withdrawal chain {}", chain_id)))?;

        let transfer = client
            .transfer(&OkxTransferRequest {
                ccy: token.to_string(),
                amt: amount.to_string(),
                from: account_type::TRADING.to_string(),
                to: account_type::FUNDING.to_string(),
            })
            .await?;
        debug!("OKX transfer {} of {} {} to funding", transfer.trans_id, amount, token);

        let withdrawal = client
            .withdrawal(&OkxWithdrawalRequest {
                ccy: token.to_string(),
                amt: amount.to_string(),
                dest: WITHDRAW_DEST_ON_CHAIN.to_string(),
                to_addr: address.to_string(),
                fee,
                chain: chain_id,
            })
            .await?;
        info!("OKX withdrawal of {} {} submitted: {}", amount, token, withdrawal.wd_id);
        Ok(withdrawal.wd_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VenueConfig {
        VenueConfig::new("key", "secret")
            .with_password("passphrase")
            .with_url("http://127.0.0.1:9")
    }

    #[test]
    fn test_venue_info() {
        let venue = OkxVenue::new();
        assert_eq!(venue.venue_id(), VenueId::Okx);
        assert!(venue.info().supports_batch);
        assert_eq!(venue.info().max_orders_per_batch, 20);
        assert_eq!(venue.info().cancel_batch_size, 20);
        assert!(!venue.info().supports_order_type(OrderType::Iceberg));
    }

    #[test]
    fn test_init_requires_passphrase() {
        let mut venue = OkxVenue::new();
        let result = venue.init(VenueConfig::new("key", "secret"));
        assert!(matches!(result, Err(VenueError::Configuration(_))));
        assert!(!venue.is_initialized());

        venue.init(config()).unwrap();
        assert!(matches!(
            venue.init(config()),
            Err(VenueError::AlreadyInitialized(VenueId::Okx))
        ));
    }

    #[tokio::test]
    async fn test_unsupported_operations() {
        let mut venue = OkxVenue::new();
        venue.init(config()).unwrap();

        let iceberg = venue
            .iceberg_order("BTC-USDT", Side::Bid, OrderType::Limit, "25000", "1", "0.1")
            .await
            .unwrap_err();
        assert!(iceberg.is_unsupported());
        assert!(venue
            .change_margin_type("BTC-USDT", MarginMode::Isolated)
            .await
            .unwrap_err()
            .is_unsupported());
    }

    #[tokio::test]
    async fn test_calls_before_init_fail() {
        let venue = OkxVenue::new();
        assert!(matches!(
            venue.cancel_orders("BTC-USDT").await,
            Err(VenueError::NotInitialized(VenueId::Okx))
        ));
    }

    #[test]
    fn test_spot_order_request() {
        let market = spot_order_request("BTC-USDT", Side::Ask, OrderType::Market, None, "0.5").unwrap();
        assert_eq!(market.ord_type, "market");
        assert_eq!(market.tgt_ccy.as_deref(), Some("base_ccy"));
        assert_eq!(market.px, None);

        let taker = spot_order_request("BTC-USDT", Side::Bid, OrderType::Taker, Some("25000"), "1").unwrap();
        assert_eq!(taker.ord_type, "ioc");
        assert_eq!(taker.side, "buy");
        assert_eq!(taker.px.as_deref(), Some("25000"));

        assert!(spot_order_request("BTC-USDT", Side::Bid, OrderType::Limit, None, "1").is_err());
        assert!(spot_order_request("BTC-USDT", Side::Bid, OrderType::Iceberg, Some("1"), "1")
            .unwrap_err()
            .is_unsupported());
    }

    #[test]
    fn test_swap_stop_market_request() {
        let request = FutureOrderRequest::new(
            "BTC-USDT",
            Side::Ask,
            PositionSide::Long,
            OrderType::StopMarket,
            "0.01",
        )
        .with_stop_price("24000")
        .with_margin_mode(MarginMode::Isolated)
        .with_close_position(true);

        let order = swap_order_request(&request, "BTC-USDT-SWAP", PositionSide::Net, "1").unwrap();
        assert_eq!(order.ord_type, "market");
        assert_eq!(order.td_mode, "isolated");
        assert_eq!(order.pos_side.as_deref(), Some("net"));
        assert_eq!(order.sl_trigger_px.as_deref(), Some("24000"));
        assert_eq!(order.sl_ord_px.as_deref(), Some("-1"));
        assert_eq!(order.reduce_only, Some(true));
        assert_eq!(order.px, None);
    }

    #[test]
    fn test_swap_take_profit_limit_request() {
        let request = FutureOrderRequest::new(
            "BTC-USDT",
            Side::Ask,
            PositionSide::Long,
            OrderType::TakeProfit,
            "0.01",
        )
        .with_price("30100")
        .with_stop_price("30000");

        let order = swap_order_request(&request, "BTC-USDT-SWAP", PositionSide::Long, "1").unwrap();
        assert_eq!(order.ord_type, "limit");
        assert_eq!(order.td_mode, "cross");
        assert_eq!(order.px.as_deref(), Some("30100"));
        assert_eq!(order.tp_trigger_px.as_deref(), Some("30000"));
        assert_eq!(order.tp_ord_px.as_deref(), Some("30100"));
        assert_eq!(order.sl_trigger_px, None);
        assert_eq!(order.reduce_only, None);
    }

    #[test]
    fn test_underlying() {
        assert_eq!(underlying("BTC-USDT-SWAP"), "BTC-USDT");
        assert_eq!(underlying("ETH-USDT"), "ETH-USDT");
    }

    fn ack(ord_id: &str, s_code: &str) -> OkxOrderAck {
        OkxOrderAck {
            ord_id: ord_id.to_string(),
            cl_ord_id: String::new(),
            s_code: s_code.to_string(),
            s_msg: String::new(),
        }
    }

    #[test]
    fn test_confirmed_cancels_use_accepted_acks() {
        let confirmed = confirmed_cancels(2, vec![ack("1", "0"), ack("2", "0")]).unwrap();
        assert_eq!(confirmed, ["1", "2"]);

        let err = confirmed_cancels(3, vec![ack("1", "0"), ack("2", "51400"), ack("3", "0")]).unwrap_err();
        assert_eq!(err.completed_ids(), ["1".to_string(), "3".to_string()]);
        assert_eq!(err.venue_code(), Some("51400"));
    }

    #[test]
    fn test_missing_cancel_acks_are_not_confirmed() {
        let err = confirmed_cancels(5, Vec::new()).unwrap_err();
        assert!(matches!(err, VenueError::Decode(_)));
        assert!(err.completed_ids().is_empty());

        let short = confirmed_cancels(3, vec![ack("1", "0")]).unwrap_err();
        assert_eq!(short.completed_ids(), ["1".to_string()]);
    }
}
