//! Binance wire vocabulary.

use crate::error::VenueResult;
use crate::vocabulary::{
    MappingTable, MarginMode, OrderStatus, OrderType, PositionSide, Side, VenueId, Vocabulary,
};

/// Binance translation tables (spot and USDT-M futures).
pub static BINANCE: Vocabulary = Vocabulary {
    venue: VenueId::Binance,
    side: MappingTable {
        venue: VenueId::Binance,
        kind: "side",
        pairs: &[(Side::Bid, "BUY"), (Side::Ask, "SELL")],
        aliases: &[],
    },
    status: MappingTable {
        venue: VenueId::Binance,
        kind: "order status",
        pairs: &[
            (OrderStatus::Open, "NEW"),
            (OrderStatus::Partially, "PARTIALLY_FILLED"),
            (OrderStatus::Filled, "FILLED"),
            (OrderStatus::Canceled, "CANCELED"),
        ],
        aliases: &[
            ("EXPIRED", OrderStatus::Canceled),
            ("EXPIRED_IN_MATCH", OrderStatus::Canceled),
            ("REJECTED", OrderStatus::Canceled),
            ("PENDING_CANCEL", OrderStatus::Open),
            ("NEW_INSURANCE", OrderStatus::Open),
            ("NEW_ADL", OrderStatus::Open),
        ],
    },
    // Taker is LIMIT + IOC and Iceberg is LIMIT + icebergQty; both are
    // resolved by `spot_order_type` rather than by the bare type string.
    order_type: MappingTable {
        venue: VenueId::Binance,
        kind: "order type",
        pairs: &[
            (OrderType::Limit, "LIMIT"),
            (OrderType::Maker, "LIMIT_MAKER"),
            (OrderType::Market, "MARKET"),
        ],
        aliases: &[],
    },
    future_order_type: MappingTable {
        venue: VenueId::Binance,
        kind: "futures order type",
        pairs: &[
            (OrderType::Limit, "LIMIT"),
            (OrderType::Market, "MARKET"),
            (OrderType::Stop, "STOP"),
            (OrderType::StopMarket, "STOP_MARKET"),
            (OrderType::TakeProfit, "TAKE_PROFIT"),
            (OrderType::TakeProfitMarket, "TAKE_PROFIT_MARKET"),
        ],
        aliases: &[("TRAILING_STOP_MARKET", OrderType::StopMarket)],
    },
    margin_mode: MappingTable {
        venue: VenueId::Binance,
        kind: "margin type",
        pairs: &[(MarginMode::Isolated, "ISOLATED"), (MarginMode::Crossed, "CROSSED")],
        aliases: &[("isolated", MarginMode::Isolated), ("cross", MarginMode::Crossed)],
    },
    position_side: MappingTable {
        venue: VenueId::Binance,
        kind: "position side",
        pairs: &[
            (PositionSide::Long, "LONG"),
            (PositionSide::Short, "SHORT"),
            (PositionSide::Net, "BOTH"),
        ],
        aliases: &[],
    },
};

/// Classify a spot order from its type, time in force and iceberg quantity.
pub fn spot_order_type(raw_type: &str, time_in_force: &str, iceberg_qty: &str) -> VenueResult<OrderType> {
    let order_type = BINANCE.order_type.normalize(raw_type)?;
    if order_type != OrderType::Limit {
        return Ok(order_type);
    }
    if matches!(time_in_force, "IOC" | "FOK") {
        return Ok(OrderType::Taker);
    }
    if is_positive(iceberg_qty) {
        return Ok(OrderType::Iceberg);
    }
    Ok(OrderType::Limit)
}

fn is_positive(qty: &str) -> bool {
    qty.parse::<rust_decimal::Decimal>()
        .map(|d| d.is_sign_positive() && !d.is_zero())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VenueError;

    #[test]
    fn test_status_aliases() {
        assert_eq!(BINANCE.status.normalize("EXPIRED").unwrap(), OrderStatus::Canceled);
        assert_eq!(BINANCE.status.normalize("PENDING_CANCEL").unwrap(), OrderStatus::Open);
        assert_eq!(BINANCE.status.denormalize(OrderStatus::Canceled).unwrap(), "CANCELED");
    }

    #[test]
    fn test_spot_order_type_classification() {
        assert_eq!(spot_order_type("LIMIT", "GTC", "0.00000000").unwrap(), OrderType::Limit);
        assert_eq!(spot_order_type("LIMIT", "IOC", "").unwrap(), OrderType::Taker);
        assert_eq!(spot_order_type("LIMIT", "GTC", "0.5").unwrap(), OrderType::Iceberg);
        assert_eq!(spot_order_type("LIMIT_MAKER", "GTC", "").unwrap(), OrderType::Maker);
        assert_eq!(spot_order_type("MARKET", "GTC", "").unwrap(), OrderType::Market);
        assert!(matches!(
            spot_order_type("STOP_LOSS_LIMIT", "GTC", ""),
            Err(VenueError::UnmappedEnum { .. })
        ));
    }

    #[test]
    fn test_futures_types() {
        assert_eq!(
            BINANCE.future_order_type.normalize("TRAILING_STOP_MARKET").unwrap(),
            OrderType::StopMarket
        );
        assert_eq!(
            BINANCE.future_order_type.denormalize(OrderType::TakeProfit).unwrap(),
            "TAKE_PROFIT"
        );
        assert!(BINANCE.future_order_type.denormalize(OrderType::Maker).is_err());
    }

    #[test]
    fn test_margin_and_position_side() {
        assert_eq!(BINANCE.margin_mode.normalize("cross").unwrap(), MarginMode::Crossed);
        assert_eq!(BINANCE.margin_mode.denormalize(MarginMode::Isolated).unwrap(), "ISOLATED");
        assert_eq!(BINANCE.position_side.denormalize(PositionSide::Net).unwrap(), "BOTH");
    }
}
