//! Venue-agnostic request and response types.
//!
//! Prices, quantities and rates stay as the venue's decimal strings. They are
//! never parsed into floats on the way through; the only arithmetic done on
//! them (sums and products in a few adapters) goes through `rust_decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{VenueError, VenueResult};
use crate::vocabulary::{MarginMode, OrderStatus, OrderType, PositionSide, Side, VenueId};

/// Parse a wire decimal string, naming the field in the error.
pub(crate) fn parse_decimal(field: &str, value: &str) -> VenueResult<Decimal> {
    value
        .parse::<Decimal>()
        .map_err(|e| VenueError::Decode(format!("{} '{}' is not a decimal: {}", field, value, e)))
}

/// Information about a venue's capabilities.
#[derive(Debug, Clone)]
pub struct VenueInfo {
    /// Venue identifier
    pub venue_id: VenueId,
    /// Human-readable name (e.g., "Binance")
    pub display_name: String,
    /// Supported spot order types
    pub supported_order_types: Vec<OrderType>,
    /// Supported derivatives order types
    pub supported_future_order_types: Vec<OrderType>,
    /// Whether the venue accepts several orders in one request
    pub supports_batch: bool,
    /// Maximum orders per batch submission
    pub max_orders_per_batch: usize,
    /// Maximum orders per batch cancellation
    pub cancel_batch_size: usize,
}

impl VenueInfo {
    /// Create a new VenueInfo with default values.
    pub fn new(venue_id: VenueId, display_name: impl Into<String>) -> Self {
        Self {
            venue_id,
            display_name: display_name.into(),
            supported_order_types: vec![OrderType::Market, OrderType::Limit],
            supported_future_order_types: vec![OrderType::Market, OrderType::Limit],
            supports_batch: false,
            max_orders_per_batch: 1,
            cancel_batch_size: 1,
        }
    }

    /// Set supported spot order types.
    pub fn with_order_types(mut self, types: Vec<OrderType>) -> Self {
        self.supported_order_types = types;
        self
    }

    /// Set supported derivatives order types.
    pub fn with_future_order_types(mut self, types: Vec<OrderType>) -> Self {
        self.supported_future_order_types = types;
        self
    }

    /// Enable batch submission support.
    pub fn with_batch_support(mut self, max_per_batch: usize) -> Self {
        self.supports_batch = true;
        self.max_orders_per_batch = max_per_batch.max(1);
        self
    }

    /// Set the bulk cancellation group size.
    pub fn with_cancel_batch_size(mut self, size: usize) -> Self {
        self.cancel_batch_size = size.max(1);
        self
    }

    /// Check if a spot order type is supported.
    pub fn supports_order_type(&self, order_type: OrderType) -> bool {
        self.supported_order_types.contains(&order_type)
    }

    /// Check if a derivatives order type is supported.
    pub fn supports_future_order_type(&self, order_type: OrderType) -> bool {
        self.supported_future_order_types.contains(&order_type)
    }
}

/// Unified view of a spot order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    pub price: String,
    pub quantity: String,
    pub filled_quantity: String,
    /// Cumulative quote amount traded
    pub quote_amount: String,
    pub status: OrderStatus,
    pub order_type: OrderType,
    /// Creation time (ms since epoch)
    pub created_at: i64,
    /// Last update time (ms since epoch)
    pub updated_at: i64,
}

/// Unified view of a derivatives order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureOrder {
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    pub position_side: PositionSide,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub price: String,
    pub stop_price: String,
    pub avg_price: String,
    pub quantity: String,
    pub filled_quantity: String,
    pub quote_amount: String,
    pub reduce_only: bool,
    pub close_position: bool,
    pub price_protect: bool,
    pub time_in_force: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Parameters of a new derivatives order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureOrderRequest {
    pub symbol: String,
    pub side: Side,
    pub position_side: PositionSide,
    pub order_type: OrderType,
    pub margin_mode: MarginMode,
    /// Size in base-asset units
    pub size: String,
    pub price: Option<String>,
    pub stop_price: Option<String>,
    pub close_position: bool,
    pub price_protect: bool,
    pub reduce_only: bool,
}

impl FutureOrderRequest {
    /// Create a request with no price, no trigger and all flags off.
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        position_side: PositionSide,
        order_type: OrderType,
        size: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            position_side,
            order_type,
            margin_mode: MarginMode::Crossed,
            size: size.into(),
            price: None,
            stop_price: None,
            close_position: false,
            price_protect: false,
            reduce_only: false,
        }
    }

    /// Limit order helper.
    pub fn limit(
        symbol: impl Into<String>,
        side: Side,
        position_side: PositionSide,
        price: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self::new(symbol, side, position_side, OrderType::Limit, size).with_price(price)
    }

    /// Market order helper.
    pub fn market(
        symbol: impl Into<String>,
        side: Side,
        position_side: PositionSide,
        size: impl Into<String>,
    ) -> Self {
        Self::new(symbol, side, position_side, OrderType::Market, size)
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_stop_price(mut self, stop_price: impl Into<String>) -> Self {
        self.stop_price = Some(stop_price.into());
        self
    }

    pub fn with_margin_mode(mut self, margin_mode: MarginMode) -> Self {
        self.margin_mode = margin_mode;
        self
    }

    pub fn with_close_position(mut self, close_position: bool) -> Self {
        self.close_position = close_position;
        self
    }

    pub fn with_price_protect(mut self, price_protect: bool) -> Self {
        self.price_protect = price_protect;
        self
    }

    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    /// Check that price and trigger fields match the order type.
    pub fn validate(&self) -> Result<(), String> {
        if self.size.is_empty() && !self.close_position {
            return Err("size is required".to_string());
        }
        if self.order_type.requires_price() && self.price.is_none() {
            return Err(format!("{} order requires a price", self.order_type));
        }
        if self.order_type.requires_stop_price() && self.stop_price.is_none() {
            return Err(format!("{} order requires a stop price", self.order_type));
        }
        Ok(())
    }
}

/// Open orders partitioned by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitOrders {
    pub bids: Vec<Order>,
    pub asks: Vec<Order>,
}

impl SplitOrders {
    /// Partition orders by side, keeping listing order within each side.
    pub fn from_orders(orders: Vec<Order>) -> Self {
        let (bids, asks) = orders.into_iter().partition(|o| o.side == Side::Bid);
        Self { bids, asks }
    }
}

/// One item of a multi-order submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderList {
    pub side: Side,
    pub price: String,
    pub size: String,
    /// Overrides the type implied by the batch call when set
    pub order_type: Option<OrderType>,
}

impl OrderList {
    pub fn new(side: Side, price: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            side,
            price: price.into(),
            size: size.into(),
            order_type: None,
        }
    }

    pub fn with_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }
}

/// An open futures position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionInfo {
    pub symbol: String,
    /// Signed position size
    pub position_amount: String,
    pub entry_price: String,
    pub mark_price: String,
    pub liquidation_price: String,
    pub unrealized_profit: String,
    pub leverage: String,
    pub margin_mode: MarginMode,
    pub isolated_margin: String,
    pub position_side: PositionSide,
    pub notional: String,
    pub update_time: i64,
}

/// Spot balance of one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub available: String,
    pub frozen: String,
    pub total: String,
}

/// Derivatives account balance (USDT margined).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureBalance {
    pub asset: String,
    pub total: String,
    pub cross: String,
    pub available: String,
}

/// Mark price and funding of a perpetual contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRate {
    pub symbol: String,
    pub mark_price: String,
    pub index_price: String,
    pub last_funding_rate: String,
    /// Forecast rate of the next period, `None` where the venue publishes none
    pub next_funding_rate: Option<String>,
    /// Next funding settlement (ms since epoch)
    pub next_funding_time: i64,
    pub time: i64,
}

/// One price level of an order book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: String,
    pub quantity: String,
}

impl PriceLevel {
    pub fn new(price: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            quantity: quantity.into(),
        }
    }

    /// Build a level from a wire array whose first two entries are price and
    /// quantity. Trailing entries (order counts and the like) are ignored.
    pub fn from_wire(level: &[String]) -> VenueResult<Self> {
        match level {
            [price, quantity, ..] => Ok(Self::new(price.as_str(), quantity.as_str())),
            _ => Err(VenueError::Decode(format!(
                "depth level has {} entries, expected at least 2",
                level.len()
            ))),
        }
    }

    /// Convert a list of wire levels, keeping the venue's ordering.
    pub fn from_wire_levels(levels: &[Vec<String>]) -> VenueResult<Vec<Self>> {
        levels.iter().map(|level| Self::from_wire(level)).collect()
    }
}

/// Order book snapshot, best price first on each side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depth {
    pub time: i64,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl Depth {
    /// Returns the best bid, if any.
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    /// Returns the best ask, if any.
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }
}

/// Maker and taker fee rates for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingFee {
    pub symbol: String,
    pub maker: String,
    pub taker: String,
}

/// Trading rules of a spot pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairInfo {
    pub symbol: String,
    /// Decimal places of the price tick
    pub price_precision: u32,
    /// Decimal places of the quantity step
    pub amount_precision: u32,
    pub tick_size: String,
    pub lot_size: String,
    /// Minimum order size in base units
    pub min_base_amount: String,
    /// Minimum order notional in quote units (empty if the venue has none)
    pub min_quote_amount: String,
}

/// 24h summary of one spot pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolTicker {
    pub symbol: String,
    /// Fractional 24h change (0.01 = +1%)
    pub change_rate: String,
    pub volume: String,
    pub last_price: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(id: &str, side: Side) -> Order {
        Order {
            order_id: id.to_string(),
            symbol: "BTCUSDT".to_string(),
            side,
            price: "100".to_string(),
            quantity: "1".to_string(),
            filled_quantity: "0".to_string(),
            quote_amount: "0".to_string(),
            status: OrderStatus::Open,
            order_type: OrderType::Limit,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_venue_info_builder() {
        let info = VenueInfo::new(VenueId::Okx, "OKX")
            .with_batch_support(20)
            .with_cancel_batch_size(20);
        assert!(info.supports_batch);
        assert_eq!(info.max_orders_per_batch, 20);
        assert_eq!(info.cancel_batch_size, 20);
        assert!(info.supports_order_type(OrderType::Limit));
        assert!(!info.supports_order_type(OrderType::Iceberg));
    }

    #[test]
    fn test_split_orders_keeps_listing_order() {
        let split = SplitOrders::from_orders(vec![
            order("1", Side::Bid),
            order("2", Side::Ask),
            order("3", Side::Bid),
        ]);
        let bid_ids: Vec<_> = split.bids.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(bid_ids, ["1", "3"]);
        assert_eq!(split.asks.len(), 1);
    }

    #[test]
    fn test_future_order_request_validation() {
        let stop = FutureOrderRequest::new("BTCUSDT", Side::Ask, PositionSide::Long, OrderType::StopMarket, "0.1");
        assert!(stop.validate().is_err());
        assert!(stop.with_stop_price("25000").validate().is_ok());

        let limit = FutureOrderRequest::new("BTCUSDT", Side::Bid, PositionSide::Long, OrderType::Limit, "0.1");
        assert!(limit.validate().is_err());

        let market = FutureOrderRequest::market("BTCUSDT", Side::Bid, PositionSide::Net, "0.1");
        assert!(market.validate().is_ok());
        assert_eq!(market.margin_mode, MarginMode::Crossed);
    }

    #[test]
    fn test_order_list_type_override() {
        let item = OrderList::new(Side::Bid, "100", "2").with_type(OrderType::Maker);
        assert_eq!(item.order_type, Some(OrderType::Maker));
    }

    #[test]
    fn test_price_level_from_wire() {
        let levels = vec![
            vec!["41006.8".to_string(), "0.60038921".to_string(), "0".to_string(), "1".to_string()],
            vec!["41006.3".to_string(), "0.30178218".to_string()],
        ];
        let parsed = PriceLevel::from_wire_levels(&levels).unwrap();
        assert_eq!(parsed[0], PriceLevel::new("41006.8", "0.60038921"));
        assert_eq!(parsed[1].quantity, "0.30178218");

        let short = vec![vec!["41006.8".to_string()]];
        assert!(matches!(
            PriceLevel::from_wire_levels(&short),
            Err(VenueError::Decode(_))
        ));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("price", "41006.80").unwrap(), dec!(41006.8));
        let err = parse_decimal("qty", "n/a").unwrap_err();
        assert!(matches!(err, VenueError::Decode(ref m) if m.starts_with("qty 'n/a'")));
    }
}
