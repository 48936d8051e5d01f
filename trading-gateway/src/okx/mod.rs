//! OKX venue adapter.
//!
//! # Modules
//!
//! - [`endpoints`]: REST host, v5 paths and fixed ids
//! - [`vocabulary`]: wire value translation tables
//! - [`types`]: the response envelope and request/response types
//! - [`normalizer`]: wire to unified conversions
//! - [`rest`]: typed REST client
//! - [`venue`]: the [`OkxVenue`] adapter
//!
//! Requests are signed with the `OK-ACCESS-*` passphrase scheme from
//! [`crate::http::PassphraseSigner`].

pub mod endpoints;
pub mod normalizer;
pub mod rest;
pub mod types;
pub mod venue;
pub mod vocabulary;

pub use types::OkxResponse;
pub use venue::OkxVenue;
pub use vocabulary::OKX;
