//! Unified trading vocabulary.
//!
//! Canonical enumerations shared by every venue, plus the [`MappingTable`]
//! machinery each venue uses to translate its wire strings to and from them.
//!
//! Translation is strict in both directions:
//! - inbound (`normalize`) must classify every value; anything unknown is a
//!   [`VenueError::UnmappedEnum`] naming the venue and the raw string
//! - outbound (`denormalize`) fails with [`VenueError::Unsupported`] when the
//!   venue has no way to express the canonical value

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{VenueError, VenueResult};

/// Identifier of a supported venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueId {
    Binance,
    Okx,
}

impl VenueId {
    /// All venues with a registered adapter.
    pub const ALL: [VenueId; 2] = [VenueId::Binance, VenueId::Okx];

    /// Upper-case venue name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueId::Binance => "BINANCE",
            VenueId::Okx => "OKX",
        }
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VenueId {
    type Err = VenueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binance" => Ok(VenueId::Binance),
            "okx" | "okex" => Ok(VenueId::Okx),
            _ => Err(VenueError::VenueNotFound(s.to_string())),
        }
    }
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

/// Order lifecycle status.
///
/// `Open -> Partially -> Filled`, `Open -> Canceled` and
/// `Partially -> Canceled` are the only transitions observed by polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Filled,
    Canceled,
    Partially,
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Limit,
    LimitHidden,
    Maker,
    Taker,
    Market,
    Stop,
    StopMarket,
    TakeProfit,
    TakeProfitMarket,
    Iceberg,
}

/// Margin mode of a futures position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    Isolated,
    Crossed,
}

/// Position side of a futures order or position.
///
/// `Net` is the one-way ("both") state venues use when hedge mode is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
    Net,
}

/// Direction of an isolated-margin adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginAdjustment {
    Add,
    Reduce,
}

impl Side {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bid => "bid",
            Side::Ask => "ask",
        }
    }

    /// The opposite side.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

impl OrderStatus {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Filled => "filled",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Partially => "partially",
        }
    }

    /// Returns true if the order can still trade.
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::Partially)
    }

    /// Returns true if `next` is a legal successor of this status.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Open, Partially) | (Open, Filled) | (Open, Canceled) | (Partially, Filled) | (Partially, Canceled)
        ) || *self == next
    }
}

impl OrderType {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "limit",
            OrderType::LimitHidden => "limit_hidden",
            OrderType::Maker => "maker",
            OrderType::Taker => "taker",
            OrderType::Market => "market",
            OrderType::Stop => "stop",
            OrderType::StopMarket => "stop_market",
            OrderType::TakeProfit => "take_profit",
            OrderType::TakeProfitMarket => "take_profit_market",
            OrderType::Iceberg => "iceberg",
        }
    }

    /// Returns true if the order carries a limit price.
    pub fn requires_price(&self) -> bool {
        !matches!(
            self,
            OrderType::Market | OrderType::StopMarket | OrderType::TakeProfitMarket
        )
    }

    /// Returns true if the order carries a trigger price.
    pub fn requires_stop_price(&self) -> bool {
        matches!(
            self,
            OrderType::Stop | OrderType::StopMarket | OrderType::TakeProfit | OrderType::TakeProfitMarket
        )
    }
}

impl MarginMode {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarginMode::Isolated => "isolated",
            MarginMode::Crossed => "crossed",
        }
    }
}

impl PositionSide {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionSide::Long => "long",
            PositionSide::Short => "short",
            PositionSide::Net => "net",
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(Side, OrderStatus, OrderType, MarginMode, PositionSide);

/// Resolve the wire position side for an order given the account mode.
///
/// In one-way mode the position side is always `Net`, whatever the caller
/// asked for. In hedge mode the caller must pick `Long` or `Short`.
pub fn resolve_position_side(hedge_mode: bool, requested: PositionSide) -> VenueResult<PositionSide> {
    if !hedge_mode {
        return Ok(PositionSide::Net);
    }
    match requested {
        PositionSide::Net => Err(VenueError::InvalidRequest(
            "hedge mode requires a long or short position side".to_string(),
        )),
        side => Ok(side),
    }
}

/// Bidirectional translation between one canonical enum and a venue's strings.
#[derive(Debug)]
pub struct MappingTable<T: 'static> {
    pub(crate) venue: VenueId,
    pub(crate) kind: &'static str,
    /// Canonical value <-> wire value, used in both directions
    pub(crate) pairs: &'static [(T, &'static str)],
    /// Extra wire values accepted inbound only
    pub(crate) aliases: &'static [(&'static str, T)],
}

impl<T: Copy + PartialEq + fmt::Display> MappingTable<T> {
    /// Translate a venue wire value to its canonical value.
    pub fn normalize(&self, raw: &str) -> VenueResult<T> {
        self.pairs
            .iter()
            .find(|(_, wire)| *wire == raw)
            .map(|(value, _)| *value)
            .or_else(|| {
                self.aliases
                    .iter()
                    .find(|(wire, _)| *wire == raw)
                    .map(|(_, value)| *value)
            })
            .ok_or_else(|| VenueError::UnmappedEnum {
                venue: self.venue,
                kind: self.kind,
                raw: raw.to_string(),
            })
    }

    /// Translate a canonical value to the venue wire value.
    pub fn denormalize(&self, value: T) -> VenueResult<&'static str> {
        self.pairs
            .iter()
            .find(|(canonical, _)| *canonical == value)
            .map(|(_, wire)| *wire)
            .ok_or_else(|| VenueError::unsupported(self.venue, format!("{} '{}'", self.kind, value)))
    }

    /// Venue this table belongs to.
    pub fn venue(&self) -> VenueId {
        self.venue
    }
}

/// All mapping tables of one venue.
#[derive(Debug)]
pub struct Vocabulary {
    pub venue: VenueId,
    pub side: MappingTable<Side>,
    pub status: MappingTable<OrderStatus>,
    /// Spot order types
    pub order_type: MappingTable<OrderType>,
    /// Derivatives order types
    pub future_order_type: MappingTable<OrderType>,
    pub margin_mode: MappingTable<MarginMode>,
    pub position_side: MappingTable<PositionSide>,
}

/// Returns the vocabulary of a venue.
pub fn vocabulary(venue: VenueId) -> &'static Vocabulary {
    match venue {
        VenueId::Binance => &crate::binance::vocabulary::BINANCE,
        VenueId::Okx => &crate::okx::vocabulary::OKX,
    }
}

/// A canonical enum with one mapping table per venue.
pub trait Canonical: Copy + PartialEq + fmt::Display + Sized + 'static {
    /// The table for this enum inside a venue vocabulary.
    fn table(vocabulary: &'static Vocabulary) -> &'static MappingTable<Self>;
}

impl Canonical for Side {
    fn table(vocabulary: &'static Vocabulary) -> &'static MappingTable<Self> {
        &vocabulary.side
    }
}

impl Canonical for OrderStatus {
    fn table(vocabulary: &'static Vocabulary) -> &'static MappingTable<Self> {
        &vocabulary.status
    }
}

impl Canonical for OrderType {
    fn table(vocabulary: &'static Vocabulary) -> &'static MappingTable<Self> {
        &vocabulary.order_type
    }
}

impl Canonical for MarginMode {
    fn table(vocabulary: &'static Vocabulary) -> &'static MappingTable<Self> {
        &vocabulary.margin_mode
    }
}

impl Canonical for PositionSide {
    fn table(vocabulary: &'static Vocabulary) -> &'static MappingTable<Self> {
        &vocabulary.position_side
    }
}

/// Translate a venue wire value to a canonical value.
///
/// # Errors
///
/// Returns [`VenueError::UnmappedEnum`] if the venue table has no entry for `raw`.
pub fn normalize<T: Canonical>(venue: VenueId, raw: &str) -> VenueResult<T> {
    T::table(vocabulary(venue)).normalize(raw)
}

/// Translate a canonical value to the venue wire value.
///
/// # Errors
///
/// Returns [`VenueError::Unsupported`] if the venue cannot express `value`.
pub fn denormalize<T: Canonical>(venue: VenueId, value: T) -> VenueResult<&'static str> {
    T::table(vocabulary(venue)).denormalize(value)
}
