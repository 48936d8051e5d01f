//! Response normalizer for OKX.
//!
//! Converts OKX v5 wire types to venue-agnostic types through the [`OKX`]
//! tables. Millisecond timestamps arrive as strings and are parsed here.

use rust_decimal::Decimal;

use crate::error::{VenueError, VenueResult};
use crate::symbology::decimal_places;
use crate::types::{
    parse_decimal, Balance, Depth, FundingRate, FutureBalance, FutureOrder, Order, PairInfo,
    PositionInfo, PriceLevel, SymbolTicker, TradingFee,
};
use crate::vocabulary::PositionSide;

use super::types::{
    OkxBalanceDetail, OkxBook, OkxFundingRate, OkxInstrument, OkxOrder, OkxPosition, OkxTicker,
    OkxTradeFee,
};
use super::vocabulary::{future_order_type, AttachedTriggers, OKX};

/// Parse a millisecond timestamp string; empty means 0.
pub(crate) fn parse_millis(field: &str, value: &str) -> VenueResult<i64> {
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<i64>()
        .map_err(|e| VenueError::Decode(format!("{} '{}' is not a timestamp: {}", field, value, e)))
}

/// `accFillSz * avgPx`; zero before the first fill.
fn quote_amount(order: &OkxOrder) -> VenueResult<String> {
    if order.avg_px.is_empty() || order.acc_fill_sz.is_empty() {
        return Ok("0".to_string());
    }
    let filled = parse_decimal("accFillSz", &order.acc_fill_sz)?;
    let avg_price = parse_decimal("avgPx", &order.avg_px)?;
    Ok((filled * avg_price).normalize().to_string())
}

pub fn normalize_balance(detail: &OkxBalanceDetail) -> Balance {
    Balance {
        asset: detail.ccy.clone(),
        available: detail.avail_bal.clone(),
        frozen: detail.frozen_bal.clone(),
        total: detail.cash_bal.clone(),
    }
}

/// USDT balance of the trading account as a derivatives balance. `cross` is
/// the equity available to cross-margin positions.
pub fn normalize_future_balance(detail: &OkxBalanceDetail) -> FutureBalance {
    let cross = if detail.avail_eq.is_empty() {
        &detail.eq
    } else {
        &detail.avail_eq
    };
    FutureBalance {
        asset: detail.ccy.clone(),
        total: detail.cash_bal.clone(),
        cross: cross.clone(),
        available: detail.avail_bal.clone(),
    }
}

pub fn normalize_spot_order(order: &OkxOrder) -> VenueResult<Order> {
    Ok(Order {
        order_id: order.ord_id.clone(),
        symbol: order.inst_id.clone(),
        side: OKX.side.normalize(&order.side)?,
        price: order.px.clone(),
        quantity: order.sz.clone(),
        filled_quantity: order.acc_fill_sz.clone(),
        quote_amount: quote_amount(order)?,
        status: OKX.status.normalize(&order.state)?,
        order_type: OKX.order_type.normalize(&order.ord_type)?,
        created_at: parse_millis("cTime", &order.c_time)?,
        updated_at: parse_millis("uTime", &order.u_time)?,
    })
}

/// Swap order. Stop and take-profit types are read off the attached
/// triggers; `sz` is a contract count.
pub fn normalize_future_order(order: &OkxOrder) -> VenueResult<FutureOrder> {
    let triggers = AttachedTriggers {
        sl_trigger_px: &order.sl_trigger_px,
        sl_ord_px: &order.sl_ord_px,
        tp_trigger_px: &order.tp_trigger_px,
        tp_ord_px: &order.tp_ord_px,
    };
    let stop_price = if order.sl_trigger_px.is_empty() {
        order.tp_trigger_px.clone()
    } else {
        order.sl_trigger_px.clone()
    };
    let position_side = if order.pos_side.is_empty() {
        PositionSide::Net
    } else {
        OKX.position_side.normalize(&order.pos_side)?
    };

    Ok(FutureOrder {
        order_id: order.ord_id.clone(),
        symbol: order.inst_id.clone(),
        side: OKX.side.normalize(&order.side)?,
        position_side,
        order_type: future_order_type(&order.ord_type, triggers)?,
        status: OKX.status.normalize(&order.state)?,
        price: order.px.clone(),
        stop_price,
        avg_price: order.avg_px.clone(),
        quantity: order.sz.clone(),
        filled_quantity: order.acc_fill_sz.clone(),
        quote_amount: quote_amount(order)?,
        reduce_only: order.reduce_only == "true",
        close_position: false,
        price_protect: false,
        time_in_force: String::new(),
        created_at: parse_millis("cTime", &order.c_time)?,
        updated_at: parse_millis("uTime", &order.u_time)?,
    })
}

pub fn normalize_position(position: &OkxPosition) -> VenueResult<PositionInfo> {
    Ok(PositionInfo {
        symbol: position.inst_id.clone(),
        position_amount: position.pos.clone(),
        entry_price: position.avg_px.clone(),
        mark_price: position.mark_px.clone(),
        liquidation_price: position.liq_px.clone(),
        unrealized_profit: position.upl.clone(),
        leverage: position.lever.clone(),
        margin_mode: OKX.margin_mode.normalize(&position.mgn_mode)?,
        isolated_margin: position.margin.clone(),
        position_side: OKX.position_side.normalize(&position.pos_side)?,
        notional: position.notional_usd.clone(),
        update_time: parse_millis("uTime", &position.u_time)?,
    })
}

pub fn normalize_depth(book: &OkxBook) -> VenueResult<Depth> {
    Ok(Depth {
        time: parse_millis("ts", &book.ts)?,
        bids: PriceLevel::from_wire_levels(&book.bids)?,
        asks: PriceLevel::from_wire_levels(&book.asks)?,
    })
}

/// Combine mark price, index price and funding of a perpetual.
pub fn normalize_funding(
    funding: &OkxFundingRate,
    mark_price: &str,
    index_price: &str,
    time: &str,
) -> VenueResult<FundingRate> {
    let next_funding_rate = Some(funding.next_funding_rate.clone()).filter(|r| !r.is_empty());
    Ok(FundingRate {
        symbol: funding.inst_id.clone(),
        mark_price: mark_price.to_string(),
        index_price: index_price.to_string(),
        last_funding_rate: funding.funding_rate.clone(),
        next_funding_rate,
        next_funding_time: parse_millis("fundingTime", &funding.funding_time)?,
        time: parse_millis("ts", time)?,
    })
}

/// OKX states no minimum notional, so `min_quote_amount` stays empty.
pub fn normalize_pair_info(instrument: &OkxInstrument) -> PairInfo {
    PairInfo {
        symbol: instrument.inst_id.clone(),
        price_precision: decimal_places(&instrument.tick_sz),
        amount_precision: decimal_places(&instrument.lot_sz),
        tick_size: instrument.tick_sz.clone(),
        lot_size: instrument.lot_sz.clone(),
        min_base_amount: instrument.min_sz.clone(),
        min_quote_amount: String::new(),
    }
}

pub fn normalize_trade_fee(symbol: &str, fee: &OkxTradeFee) -> TradingFee {
    TradingFee {
        symbol: symbol.to_string(),
        maker: fee.maker.clone(),
        taker: fee.taker.clone(),
    }
}

pub fn normalize_swap_trade_fee(symbol: &str, fee: &OkxTradeFee) -> TradingFee {
    TradingFee {
        symbol: symbol.to_string(),
        maker: fee.maker_u.clone(),
        taker: fee.taker_u.clone(),
    }
}

/// `change_rate` is `(last - open24h) / open24h`, zero when there is no open.
pub fn normalize_ticker(ticker: &OkxTicker) -> VenueResult<SymbolTicker> {
    let change_rate = if ticker.open24h.is_empty() {
        Decimal::ZERO
    } else {
        let last = parse_decimal("last", &ticker.last)?;
        let open = parse_decimal("open24h", &ticker.open24h)?;
        if open.is_zero() {
            Decimal::ZERO
        } else {
            (last - open) / open
        }
    };
    Ok(SymbolTicker {
        symbol: ticker.inst_id.clone(),
        change_rate: change_rate.round_dp(8).normalize().to_string(),
        volume: ticker.vol24h.clone(),
        last_price: ticker.last.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::{MarginMode, OrderStatus, OrderType, Side};
    use serde_json::json;

    fn order(fields: serde_json::Value) -> OkxOrder {
        let mut base = json!({
            "instId": "BTC-USDT",
            "ordId": "312269865356374016",
            "px": "25000",
            "sz": "0.01",
            "ordType": "limit",
            "side": "buy",
            "posSide": "",
            "state": "partially_filled",
            "accFillSz": "0.004",
            "avgPx": "24990.5",
            "cTime": "1597026383085",
            "uTime": "1597026383999"
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), fields.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn test_spot_order_quote_amount() {
        let normalized = normalize_spot_order(&order(json!({}))).unwrap();
        assert_eq!(normalized.side, Side::Bid);
        assert_eq!(normalized.status, OrderStatus::Partially);
        assert_eq!(normalized.order_type, OrderType::Limit);
        assert_eq!(normalized.quote_amount, "99.962");
        assert_eq!(normalized.created_at, 1597026383085);
    }

    #[test]
    fn test_unfilled_order_has_zero_quote_amount() {
        let normalized = normalize_spot_order(&order(json!({"accFillSz": "0", "avgPx": "", "state": "live"}))).unwrap();
        assert_eq!(normalized.quote_amount, "0");
        assert_eq!(normalized.status, OrderStatus::Open);
    }

    #[test]
    fn test_unknown_state_fails() {
        let err = normalize_spot_order(&order(json!({"state": "effective"}))).unwrap_err();
        assert!(matches!(err, VenueError::UnmappedEnum { .. }));
    }

    #[test]
    fn test_swap_stop_market_order() {
        let normalized = normalize_future_order(&order(json!({
            "instId": "BTC-USDT-SWAP",
            "posSide": "long",
            "side": "sell",
            "slTriggerPx": "24000",
            "slOrdPx": "-1",
            "reduceOnly": "true"
        })))
        .unwrap();
        assert_eq!(normalized.order_type, OrderType::StopMarket);
        assert_eq!(normalized.stop_price, "24000");
        assert_eq!(normalized.position_side, PositionSide::Long);
        assert!(normalized.reduce_only);
    }

    #[test]
    fn test_position() {
        let position: OkxPosition = serde_json::from_value(json!({
            "instId": "BTC-USDT-SWAP",
            "pos": "10",
            "avgPx": "25000",
            "markPx": "25100",
            "liqPx": "20000",
            "upl": "10",
            "lever": "5",
            "mgnMode": "isolated",
            "margin": "50",
            "posSide": "net",
            "notionalUsd": "251",
            "uTime": "1614859751636"
        }))
        .unwrap();
        let normalized = normalize_position(&position).unwrap();
        assert_eq!(normalized.margin_mode, MarginMode::Isolated);
        assert_eq!(normalized.position_side, PositionSide::Net);
        assert_eq!(normalized.isolated_margin, "50");
        assert_eq!(normalized.update_time, 1614859751636);
    }

    #[test]
    fn test_depth_uses_size_column() {
        let book: OkxBook = serde_json::from_value(json!({
            "asks": [["41006.8", "0.60038921", "0", "1"]],
            "bids": [["41006.3", "0.30178218", "0", "2"]],
            "ts": "1629966436396"
        }))
        .unwrap();
        let depth = normalize_depth(&book).unwrap();
        assert_eq!(depth.time, 1629966436396);
        assert_eq!(depth.best_bid().unwrap().quantity, "0.30178218");
        assert_eq!(depth.best_ask().unwrap().price, "41006.8");
    }

    #[test]
    fn test_ticker_change_rate() {
        let ticker: OkxTicker = serde_json::from_value(json!({
            "instId": "BTC-USDT",
            "last": "26250",
            "open24h": "25000",
            "vol24h": "1234.5"
        }))
        .unwrap();
        let normalized = normalize_ticker(&ticker).unwrap();
        assert_eq!(normalized.change_rate, "0.05");
        assert_eq!(normalized.volume, "1234.5");
    }

    #[test]
    fn test_funding_without_forecast() {
        let funding: OkxFundingRate = serde_json::from_value(json!({
            "instId": "BTC-USDT-SWAP",
            "fundingRate": "0.0001",
            "nextFundingRate": "",
            "fundingTime": "1703088000000",
            "nextFundingTime": "1703116800000"
        }))
        .unwrap();
        let normalized = normalize_funding(&funding, "43000.1", "42990", "1703080000000").unwrap();
        assert_eq!(normalized.next_funding_rate, None);
        assert_eq!(normalized.next_funding_time, 1703088000000);
        assert_eq!(normalized.index_price, "42990");
    }

    #[test]
    fn test_pair_info_precision() {
        let instrument: OkxInstrument = serde_json::from_value(json!({
            "instId": "BTC-USDT",
            "tickSz": "0.1",
            "lotSz": "0.00000001",
            "minSz": "0.00001"
        }))
        .unwrap();
        let info = normalize_pair_info(&instrument);
        assert_eq!(info.price_precision, 1);
        assert_eq!(info.amount_precision, 8);
        assert_eq!(info.min_base_amount, "0.00001");
        assert!(info.min_quote_amount.is_empty());
    }
}
