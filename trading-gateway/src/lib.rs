// trading-gateway: Unified connectivity to Binance and OKX
// One vocabulary, signed REST adapters and batch orchestration behind one trait set

pub mod batch;
pub mod binance;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod okx;
pub mod registry;
pub mod symbology;
pub mod traits;
pub mod types;
pub mod vocabulary;

pub use batch::BatchOrchestrator;
pub use config::{GatewayConfig, RestConfig, VenueConfig};
pub use error::{ErrorCategory, ErrorClassification, VenueError, VenueResult};
pub use registry::{adapters_from_config, create_adapter, create_initialized_adapter, supported_venues};
pub use traits::{
    AccountVenue, ExchangeAdapter, FuturesTradingVenue, MarketDataVenue, SpotTradingVenue,
    TreasuryVenue, VenueConnection,
};
pub use types::{
    Balance, Depth, FundingRate, FutureBalance, FutureOrder, FutureOrderRequest, Order, OrderList,
    PairInfo, PositionInfo, PriceLevel, SplitOrders, SymbolTicker, TradingFee, VenueInfo,
};
pub use vocabulary::{
    MarginAdjustment, MarginMode, OrderStatus, OrderType, PositionSide, Side, VenueId,
};
