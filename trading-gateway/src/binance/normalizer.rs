//! Response normalizer for Binance.
//!
//! Converts Binance wire types to venue-agnostic types. Every enum-like field
//! goes through the [`BINANCE`] tables, so an unknown value fails the call.

use rust_decimal::Decimal;

use crate::error::{VenueError, VenueResult};
use crate::symbology::decimal_places;
use crate::types::{
    parse_decimal, Balance, Depth, FundingRate, FutureBalance, FutureOrder, Order, PairInfo,
    PositionInfo, PriceLevel, SymbolTicker, TradingFee,
};

use super::types::{
    BinanceAssetBalance, BinanceCommissionRate, BinanceDepth, BinanceFuturesBalance,
    BinanceFuturesOrder, BinancePositionRisk, BinancePremiumIndex, BinanceSymbolInfo,
    BinanceTicker24h, BinanceTradeFee, BinanceSpotOrder,
};
use super::vocabulary::{spot_order_type, BINANCE};

/// Spot balance. `total` is `free + locked`.
pub fn normalize_balance(balance: &BinanceAssetBalance) -> VenueResult<Balance> {
    let total = parse_decimal("free", &balance.free)? + parse_decimal("locked", &balance.locked)?;
    Ok(Balance {
        asset: balance.asset.clone(),
        available: balance.free.clone(),
        frozen: balance.locked.clone(),
        total: total.normalize().to_string(),
    })
}

pub fn normalize_future_balance(balance: &BinanceFuturesBalance) -> FutureBalance {
    FutureBalance {
        asset: balance.asset.clone(),
        total: balance.balance.clone(),
        cross: balance.cross_wallet_balance.clone(),
        available: balance.available_balance.clone(),
    }
}

/// Convert a spot order query response.
pub fn normalize_spot_order(order: &BinanceSpotOrder) -> VenueResult<Order> {
    Ok(Order {
        order_id: order.order_id.to_string(),
        symbol: order.symbol.clone(),
        side: BINANCE.side.normalize(&order.side)?,
        price: order.price.clone(),
        quantity: order.orig_qty.clone(),
        filled_quantity: order.executed_qty.clone(),
        quote_amount: order.cummulative_quote_qty.clone(),
        status: BINANCE.status.normalize(&order.status)?,
        order_type: spot_order_type(&order.order_type, &order.time_in_force, &order.iceberg_qty)?,
        created_at: order.time,
        updated_at: order.update_time,
    })
}

/// Convert a futures order query response.
pub fn normalize_future_order(order: &BinanceFuturesOrder) -> VenueResult<FutureOrder> {
    Ok(FutureOrder {
        order_id: order.order_id.to_string(),
        symbol: order.symbol.clone(),
        side: BINANCE.side.normalize(&order.side)?,
        position_side: BINANCE.position_side.normalize(&order.position_side)?,
        order_type: BINANCE.future_order_type.normalize(&order.order_type)?,
        status: BINANCE.status.normalize(&order.status)?,
        price: order.price.clone(),
        stop_price: order.stop_price.clone(),
        avg_price: order.avg_price.clone(),
        quantity: order.orig_qty.clone(),
        filled_quantity: order.executed_qty.clone(),
        quote_amount: order.cum_quote.clone(),
        reduce_only: order.reduce_only,
        close_position: order.close_position,
        price_protect: order.price_protect,
        time_in_force: order.time_in_force.clone(),
        created_at: order.time,
        updated_at: order.update_time,
    })
}

pub fn normalize_position(position: &BinancePositionRisk) -> VenueResult<PositionInfo> {
    Ok(PositionInfo {
        symbol: position.symbol.clone(),
        position_amount: position.position_amt.clone(),
        entry_price: position.entry_price.clone(),
        mark_price: position.mark_price.clone(),
        liquidation_price: position.liquidation_price.clone(),
        unrealized_profit: position.unrealized_profit.clone(),
        leverage: position.leverage.clone(),
        margin_mode: BINANCE.margin_mode.normalize(&position.margin_type)?,
        isolated_margin: position.isolated_margin.clone(),
        position_side: BINANCE.position_side.normalize(&position.position_side)?,
        notional: position.notional.clone(),
        update_time: position.update_time,
    })
}

/// Convert an order book snapshot. Spot books carry no timestamp, so the
/// caller passes the fallback time.
pub fn normalize_depth(depth: &BinanceDepth, fallback_time: i64) -> VenueResult<Depth> {
    Ok(Depth {
        time: depth.transaction_time.unwrap_or(fallback_time),
        bids: PriceLevel::from_wire_levels(&depth.bids)?,
        asks: PriceLevel::from_wire_levels(&depth.asks)?,
    })
}

/// Binance publishes no forecast rate, so `next_funding_rate` is `None`.
pub fn normalize_funding(index: &BinancePremiumIndex) -> FundingRate {
    FundingRate {
        symbol: index.symbol.clone(),
        mark_price: index.mark_price.clone(),
        index_price: index.index_price.clone(),
        last_funding_rate: index.last_funding_rate.clone(),
        next_funding_rate: None,
        next_funding_time: index.next_funding_time,
        time: index.time,
    }
}

/// Pair rules from `PRICE_FILTER`, `LOT_SIZE` and `NOTIONAL`/`MIN_NOTIONAL`.
pub fn normalize_pair_info(symbol: &BinanceSymbolInfo) -> VenueResult<PairInfo> {
    let missing = |filter: &str| {
        VenueError::Decode(format!("{} has no {} filter", symbol.symbol, filter))
    };
    let tick_size = symbol
        .filter("PRICE_FILTER")
        .and_then(|f| f.tick_size.clone())
        .ok_or_else(|| missing("PRICE_FILTER"))?;
    let lot = symbol.filter("LOT_SIZE").ok_or_else(|| missing("LOT_SIZE"))?;
    let lot_size = lot.step_size.clone().ok_or_else(|| missing("LOT_SIZE"))?;
    let min_quote_amount = symbol
        .filter("NOTIONAL")
        .or_else(|| symbol.filter("MIN_NOTIONAL"))
        .and_then(|f| f.min_notional.clone())
        .unwrap_or_default();

    Ok(PairInfo {
        symbol: symbol.symbol.clone(),
        price_precision: decimal_places(&tick_size),
        amount_precision: decimal_places(&lot_size),
        min_base_amount: lot.min_qty.clone().unwrap_or_else(|| lot_size.clone()),
        tick_size,
        lot_size,
        min_quote_amount,
    })
}

pub fn normalize_trade_fee(fee: &BinanceTradeFee) -> TradingFee {
    TradingFee {
        symbol: fee.symbol.clone(),
        maker: fee.maker_commission.clone(),
        taker: fee.taker_commission.clone(),
    }
}

pub fn normalize_commission_rate(rate: &BinanceCommissionRate) -> TradingFee {
    TradingFee {
        symbol: rate.symbol.clone(),
        maker: rate.maker_commission_rate.clone(),
        taker: rate.taker_commission_rate.clone(),
    }
}

/// `priceChangePercent` is a percentage; `change_rate` is a fraction.
pub fn normalize_ticker(ticker: &BinanceTicker24h) -> VenueResult<SymbolTicker> {
    let percent = parse_decimal("priceChangePercent", &ticker.price_change_percent)?;
    Ok(SymbolTicker {
        symbol: ticker.symbol.clone(),
        change_rate: (percent / Decimal::ONE_HUNDRED).normalize().to_string(),
        volume: ticker.volume.clone(),
        last_price: ticker.last_price.clone(),
    })
}
