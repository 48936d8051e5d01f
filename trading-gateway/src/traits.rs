//! Venue adapter trait definitions.
//!
//! This module defines the capability contract every venue implements:
//!
//! - [`VenueConnection`]: identity and one-shot initialization
//! - [`AccountVenue`]: spot and derivatives balances
//! - [`SpotTradingVenue`]: spot order placement, cancellation and queries
//! - [`FuturesTradingVenue`]: derivatives orders, leverage, margin and positions
//! - [`MarketDataVenue`]: prices, depth, funding, fees and pair rules
//! - [`TreasuryVenue`]: deposit addresses and withdrawals
//! - [`ExchangeAdapter`]: all of the above, implemented automatically
//!
//! # Example
//!
//! ```ignore
//! use trading_gateway::{create_adapter, Side, VenueConfig};
//!
//! let mut venue = create_adapter("okx")?;
//! venue.init(VenueConfig::new(key, secret).with_password(passphrase))?;
//! let order_id = venue.limit_order("BTC-USDT", Side::Bid, "25000", "0.001").await?;
//! ```

use async_trait::async_trait;

use crate::config::VenueConfig;
use crate::error::VenueResult;
use crate::types::{
    Balance, Depth, FundingRate, FutureBalance, FutureOrder, FutureOrderRequest, Order, OrderList,
    PairInfo, PositionInfo, SplitOrders, SymbolTicker, TradingFee, VenueInfo,
};
use crate::vocabulary::{MarginAdjustment, MarginMode, OrderType, PositionSide, Side, VenueId};

/// Identity and lifecycle of an adapter.
pub trait VenueConnection: Send + Sync {
    /// Returns information about this venue's capabilities.
    fn info(&self) -> &VenueInfo;

    /// Venue identifier.
    fn venue_id(&self) -> VenueId {
        self.info().venue_id
    }

    /// Supply credentials and endpoints.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInitialized` on a second call and `Configuration` if
    /// required credentials are missing.
    fn init(&mut self, config: VenueConfig) -> VenueResult<()>;

    /// Returns true once `init` has succeeded.
    fn is_initialized(&self) -> bool;
}

/// Balance queries.
#[async_trait]
pub trait AccountVenue: VenueConnection {
    /// Spot balance of one asset.
    async fn get_balance(&self, currency: &str) -> VenueResult<Balance>;

    /// USDT-margined derivatives balance.
    async fn get_future_balance(&self) -> VenueResult<FutureBalance>;
}

/// Spot trading.
#[async_trait]
pub trait SpotTradingVenue: VenueConnection {
    /// Place a market order. Returns the venue order id.
    async fn market_order(&self, symbol: &str, side: Side, size: &str) -> VenueResult<String>;

    /// Place a good-till-cancel limit order.
    async fn limit_order(&self, symbol: &str, side: Side, price: &str, size: &str) -> VenueResult<String>;

    /// Place a post-only limit order.
    async fn maker_order(&self, symbol: &str, side: Side, price: &str, size: &str) -> VenueResult<String>;

    /// Place an immediate-or-cancel limit order.
    async fn taker_order(&self, symbol: &str, side: Side, price: &str, size: &str) -> VenueResult<String>;

    /// Place a hidden limit order.
    async fn limit_hidden_order(&self, symbol: &str, side: Side, price: &str, size: &str) -> VenueResult<String>;

    /// Place an iceberg order showing `visible_size` at a time.
    async fn iceberg_order(
        &self,
        symbol: &str,
        side: Side,
        order_type: OrderType,
        price: &str,
        size: &str,
        visible_size: &str,
    ) -> VenueResult<String>;

    /// Place several orders.
    ///
    /// # Returns
    ///
    /// Order ids in submission order.
    ///
    /// # Errors
    ///
    /// Stops at the first failure. If some orders were already placed the
    /// error is `PartialBatch` carrying their ids; those orders stay resting.
    async fn limit_orders(&self, symbol: &str, orders: &[OrderList]) -> VenueResult<Vec<String>>;

    /// Place several post-only orders. Same failure policy as `limit_orders`.
    async fn maker_orders(&self, symbol: &str, orders: &[OrderList]) -> VenueResult<Vec<String>>;

    /// Place several immediate-or-cancel orders. Same failure policy as `limit_orders`.
    async fn taker_orders(&self, symbol: &str, orders: &[OrderList]) -> VenueResult<Vec<String>>;

    /// Place several hidden orders. Same failure policy as `limit_orders`.
    async fn limit_hidden_orders(&self, symbol: &str, orders: &[OrderList]) -> VenueResult<Vec<String>>;

    /// Cancel one order. Returns true if the venue confirmed the cancel.
    async fn cancel_order(&self, symbol: &str, order_id: &str) -> VenueResult<bool>;

    /// Cancel every open order on `symbol`. Returns the canceled ids.
    async fn cancel_orders(&self, symbol: &str) -> VenueResult<Vec<String>>;

    /// Query one order.
    async fn get_order(&self, symbol: &str, order_id: &str) -> VenueResult<Order>;

    /// Query all open orders on `symbol`.
    async fn get_open_orders(&self, symbol: &str) -> VenueResult<Vec<Order>>;

    /// Query open orders on one side of the book.
    async fn get_open_orders_with_side(&self, symbol: &str, side: Side) -> VenueResult<Vec<Order>> {
        let orders = self.get_open_orders(symbol).await?;
        Ok(orders.into_iter().filter(|o| o.side == side).collect())
    }

    /// Query open orders partitioned into bids and asks.
    async fn get_open_split_orders(&self, symbol: &str) -> VenueResult<SplitOrders> {
        let orders = self.get_open_orders(symbol).await?;
        Ok(SplitOrders::from_orders(orders))
    }
}

/// Derivatives (USDT-margined perpetual) trading.
#[async_trait]
pub trait FuturesTradingVenue: VenueConnection {
    /// Place a derivatives order. Returns the venue order id.
    ///
    /// The wire position side follows the account mode: in one-way mode it
    /// is always the venue's net value, whatever the request says.
    async fn new_future_order(&self, request: &FutureOrderRequest) -> VenueResult<String>;

    /// Cancel one derivatives order.
    async fn cancel_future_order(&self, symbol: &str, order_id: &str) -> VenueResult<bool>;

    /// Cancel every open derivatives order on `symbol`. Returns the canceled ids.
    async fn cancel_future_orders(&self, symbol: &str) -> VenueResult<Vec<String>>;

    /// Query one derivatives order.
    async fn get_future_order(&self, symbol: &str, order_id: &str) -> VenueResult<FutureOrder>;

    /// Query open derivatives orders on `symbol`.
    async fn get_future_open_orders(&self, symbol: &str) -> VenueResult<Vec<FutureOrder>>;

    /// Set the leverage of `symbol`. Returns the leverage the venue reports.
    async fn change_leverage(&self, symbol: &str, leverage: u32) -> VenueResult<String>;

    /// Set the margin mode of `symbol`.
    async fn change_margin_type(&self, symbol: &str, margin_mode: MarginMode) -> VenueResult<()>;

    /// Add or remove isolated margin.
    async fn change_position_margin(
        &self,
        symbol: &str,
        position_side: PositionSide,
        amount: &str,
        adjustment: MarginAdjustment,
    ) -> VenueResult<bool>;

    /// Open positions on `symbol`.
    async fn get_position_risk(&self, symbol: &str) -> VenueResult<Vec<PositionInfo>>;

    /// Turn hedge ("dual") mode on or off.
    async fn dual(&self, enabled: bool) -> VenueResult<bool>;

    /// Returns true if the account is in hedge mode.
    async fn check_dual(&self) -> VenueResult<bool>;
}

/// Public market data.
#[async_trait]
pub trait MarketDataVenue: VenueConnection {
    /// Last spot trade price.
    async fn get_market_price(&self, symbol: &str) -> VenueResult<String>;

    /// Last derivatives trade price.
    async fn get_future_market_price(&self, symbol: &str) -> VenueResult<String>;

    /// Spot order book, best price first.
    async fn depth(&self, symbol: &str, limit: u32) -> VenueResult<Depth>;

    /// Derivatives order book, best price first.
    async fn future_depth(&self, symbol: &str, limit: u32) -> VenueResult<Depth>;

    /// Mark price and funding of a perpetual.
    async fn get_mark_price_and_funding_rate(&self, symbol: &str) -> VenueResult<FundingRate>;

    /// Tick and lot precision of a spot pair.
    async fn get_pair_info(&self, symbol: &str) -> VenueResult<PairInfo>;

    /// Spot maker/taker fees of the account.
    async fn get_trading_fee(&self, symbol: &str) -> VenueResult<TradingFee>;

    /// Derivatives maker/taker fees of the account.
    async fn get_future_trading_fee(&self, symbol: &str) -> VenueResult<TradingFee>;

    /// 24h summary of every spot pair.
    async fn get_all_tickers(&self) -> VenueResult<Vec<SymbolTicker>>;
}

/// Deposits and withdrawals.
#[async_trait]
pub trait TreasuryVenue: VenueConnection {
    /// Deposit address of `token` on `chain`.
    async fn get_deposit_address(&self, token: &str, chain: &str) -> VenueResult<String>;

    /// Withdraw `amount` of `token` to `address` on `chain`. Returns the withdrawal id.
    async fn withdraw(&self, token: &str, chain: &str, address: &str, amount: &str) -> VenueResult<String>;
}

/// Combined trait for a full venue adapter.
///
/// Automatically implemented for any type implementing every capability trait.
pub trait ExchangeAdapter:
    AccountVenue + SpotTradingVenue + FuturesTradingVenue + MarketDataVenue + TreasuryVenue
{
}

impl<T> ExchangeAdapter for T where
    T: AccountVenue + SpotTradingVenue + FuturesTradingVenue + MarketDataVenue + TreasuryVenue
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traits_are_object_safe() {
        fn _assert_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_send_sync::<Box<dyn ExchangeAdapter>>();
        _assert_send_sync::<Box<dyn SpotTradingVenue>>();
        _assert_send_sync::<Box<dyn FuturesTradingVenue>>();
    }
}
