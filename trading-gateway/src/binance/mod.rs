//! Binance venue adapter.
//!
//! # Modules
//!
//! - [`endpoints`]: REST hosts and endpoint paths
//! - [`signer`]: HMAC-SHA256 query signing
//! - [`vocabulary`]: wire value translation tables
//! - [`types`]: REST response types
//! - [`normalizer`]: wire to unified conversions
//! - [`spot`] / [`futures`]: typed REST clients
//! - [`venue`]: the [`BinanceVenue`] adapter
//!
//! Symbols are Binance-native (`BTCUSDT`) for spot and USDT-M futures alike.

pub mod endpoints;
pub mod futures;
pub mod normalizer;
pub mod signer;
pub mod spot;
pub mod types;
pub mod venue;
pub mod vocabulary;

pub use endpoints::BinanceEndpoints;
pub use signer::BinanceHmacSigner;
pub use venue::BinanceVenue;
pub use vocabulary::BINANCE;
