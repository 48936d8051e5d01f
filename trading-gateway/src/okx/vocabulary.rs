//! OKX wire vocabulary.

use crate::error::VenueResult;
use crate::vocabulary::{
    MappingTable, MarginMode, OrderStatus, OrderType, PositionSide, Side, VenueId, Vocabulary,
};

/// Order price that makes an attached stop-loss or take-profit execute at market.
pub const MARKET_TRIGGER_PRICE: &str = "-1";

/// OKX translation tables (spot and perpetual swaps).
pub static OKX: Vocabulary = Vocabulary {
    venue: VenueId::Okx,
    side: MappingTable {
        venue: VenueId::Okx,
        kind: "side",
        pairs: &[(Side::Bid, "buy"), (Side::Ask, "sell")],
        aliases: &[],
    },
    status: MappingTable {
        venue: VenueId::Okx,
        kind: "order state",
        pairs: &[
            (OrderStatus::Open, "live"),
            (OrderStatus::Partially, "partially_filled"),
            (OrderStatus::Filled, "filled"),
            (OrderStatus::Canceled, "canceled"),
        ],
        aliases: &[("mmp_canceled", OrderStatus::Canceled)],
    },
    order_type: MappingTable {
        venue: VenueId::Okx,
        kind: "order type",
        pairs: &[
            (OrderType::Limit, "limit"),
            (OrderType::Market, "market"),
            (OrderType::Maker, "post_only"),
            (OrderType::Taker, "ioc"),
        ],
        aliases: &[("fok", OrderType::Taker), ("optimal_limit_ioc", OrderType::Taker)],
    },
    // Stop and take-profit orders are limit or market orders carrying an
    // attached trigger; see `future_order_type`.
    future_order_type: MappingTable {
        venue: VenueId::Okx,
        kind: "swap order type",
        pairs: &[
            (OrderType::Limit, "limit"),
            (OrderType::Market, "market"),
            (OrderType::Maker, "post_only"),
            (OrderType::Taker, "ioc"),
        ],
        aliases: &[("fok", OrderType::Taker), ("optimal_limit_ioc", OrderType::Taker)],
    },
    margin_mode: MappingTable {
        venue: VenueId::Okx,
        kind: "margin mode",
        pairs: &[(MarginMode::Isolated, "isolated"), (MarginMode::Crossed, "cross")],
        aliases: &[],
    },
    position_side: MappingTable {
        venue: VenueId::Okx,
        kind: "position side",
        pairs: &[
            (PositionSide::Long, "long"),
            (PositionSide::Short, "short"),
            (PositionSide::Net, "net"),
        ],
        aliases: &[],
    },
};

/// Attached trigger fields of a swap order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachedTriggers<'a> {
    pub sl_trigger_px: &'a str,
    pub sl_ord_px: &'a str,
    pub tp_trigger_px: &'a str,
    pub tp_ord_px: &'a str,
}

/// Classify a swap order from its `ordType` and attached triggers.
///
/// A stop-loss trigger makes the order `Stop` (or `StopMarket` when the
/// order price is `-1`); a take-profit trigger likewise.
pub fn future_order_type(ord_type: &str, triggers: AttachedTriggers<'_>) -> VenueResult<OrderType> {
    let base = OKX.future_order_type.normalize(ord_type)?;
    if !triggers.sl_trigger_px.is_empty() {
        return Ok(if triggers.sl_ord_px == MARKET_TRIGGER_PRICE {
            OrderType::StopMarket
        } else {
            OrderType::Stop
        });
    }
    if !triggers.tp_trigger_px.is_empty() {
        return Ok(if triggers.tp_ord_px == MARKET_TRIGGER_PRICE {
            OrderType::TakeProfitMarket
        } else {
            OrderType::TakeProfit
        });
    }
    Ok(base)
}

/// `posMode` value for hedge mode on or off.
pub fn position_mode(hedge: bool) -> &'static str {
    if hedge {
        "long_short_mode"
    } else {
        "net_mode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VenueError;

    #[test]
    fn test_order_type_aliases() {
        assert_eq!(OKX.order_type.normalize("fok").unwrap(), OrderType::Taker);
        assert_eq!(OKX.order_type.denormalize(OrderType::Taker).unwrap(), "ioc");
        assert_eq!(OKX.order_type.denormalize(OrderType::Maker).unwrap(), "post_only");
    }

    #[test]
    fn test_future_order_type_from_triggers() {
        let plain = future_order_type("limit", AttachedTriggers::default()).unwrap();
        assert_eq!(plain, OrderType::Limit);

        let stop = AttachedTriggers {
            sl_trigger_px: "24000",
            sl_ord_px: "23950",
            ..Default::default()
        };
        assert_eq!(future_order_type("limit", stop).unwrap(), OrderType::Stop);

        let stop_market = AttachedTriggers {
            sl_trigger_px: "24000",
            sl_ord_px: "-1",
            ..Default::default()
        };
        assert_eq!(future_order_type("limit", stop_market).unwrap(), OrderType::StopMarket);

        let take_profit_market = AttachedTriggers {
            tp_trigger_px: "30000",
            tp_ord_px: "-1",
            ..Default::default()
        };
        assert_eq!(
            future_order_type("market", take_profit_market).unwrap(),
            OrderType::TakeProfitMarket
        );
    }

    #[test]
    fn test_unknown_swap_type_is_unmapped() {
        let err = future_order_type("twap", AttachedTriggers::default()).unwrap_err();
        assert!(matches!(err, VenueError::UnmappedEnum { venue: VenueId::Okx, .. }));
    }

    #[test]
    fn test_state_alias() {
        assert_eq!(OKX.status.normalize("mmp_canceled").unwrap(), OrderStatus::Canceled);
        assert_eq!(OKX.margin_mode.denormalize(MarginMode::Crossed).unwrap(), "cross");
        assert_eq!(position_mode(true), "long_short_mode");
    }
}
