//! Factory functions for creating venue adapters.
//!
//! Adapters are looked up by venue identifier (`"binance"`, `"okx"`; case
//! insensitive, `"okex"` accepted). A name with no adapter fails with
//! `VenueNotFound`.

use std::collections::BTreeMap;

use tracing::info;

use crate::binance::BinanceVenue;
use crate::config::{GatewayConfig, VenueConfig};
use crate::error::{VenueError, VenueResult};
use crate::okx::OkxVenue;
use crate::traits::ExchangeAdapter;
use crate::vocabulary::VenueId;

/// Create an uninitialized adapter for `venue`.
pub fn adapter_for(venue: VenueId) -> Box<dyn ExchangeAdapter> {
    match venue {
        VenueId::Binance => Box::new(BinanceVenue::new()),
        VenueId::Okx => Box::new(OkxVenue::new()),
    }
}

/// Create an uninitialized adapter by name.
///
/// # Errors
///
/// `VenueNotFound` if no adapter is registered under `name`.
pub fn create_adapter(name: &str) -> VenueResult<Box<dyn ExchangeAdapter>> {
    let venue: VenueId = name.parse()?;
    Ok(adapter_for(venue))
}

/// Create an adapter by name and initialize it with `config`.
pub fn create_initialized_adapter(name: &str, config: VenueConfig) -> VenueResult<Box<dyn ExchangeAdapter>> {
    let mut adapter = create_adapter(name)?;
    adapter.init(config)?;
    Ok(adapter)
}

/// Identifiers of every venue with an adapter.
pub fn supported_venues() -> &'static [VenueId] {
    &VenueId::ALL
}

/// Create and initialize one adapter per venue in `config`.
///
/// Stops at the first unknown venue or failed initialization. Two keys naming
/// the same venue (`okx` and `okex`) are a `Configuration` error.
pub fn adapters_from_config(config: &GatewayConfig) -> VenueResult<BTreeMap<VenueId, Box<dyn ExchangeAdapter>>> {
    let mut adapters = BTreeMap::new();
    for (name, venue_config) in &config.venues {
        let venue: VenueId = name.parse()?;
        if adapters.contains_key(&venue) {
            return Err(VenueError::Configuration(format!(
                "venue '{}' configured more than once ({} is a duplicate key)",
                venue, name
            )));
        }
        let mut adapter = adapter_for(venue);
        adapter.init(venue_config.clone())?;
        info!("Created {} adapter from config", venue);
        adapters.insert(venue, adapter);
    }
    Ok(adapters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_adapter_by_name() {
        assert_eq!(create_adapter("binance").unwrap().venue_id(), VenueId::Binance);
        assert_eq!(create_adapter("OKX").unwrap().venue_id(), VenueId::Okx);
        assert_eq!(create_adapter("okex").unwrap().venue_id(), VenueId::Okx);
    }

    #[test]
    fn test_unknown_venue() {
        assert!(matches!(
            create_adapter("kraken"),
            Err(VenueError::VenueNotFound(name)) if name == "kraken"
        ));
    }

    #[test]
    fn test_every_supported_venue_has_an_adapter() {
        for venue in supported_venues() {
            let adapter = adapter_for(*venue);
            assert_eq!(adapter.venue_id(), *venue);
            assert!(!adapter.is_initialized());
        }
    }

    #[test]
    fn test_create_initialized_adapter_validates_config() {
        let adapter = create_initialized_adapter(
            "binance",
            VenueConfig::new("k", "s").with_url("http://127.0.0.1:9"),
        )
        .unwrap();
        assert!(adapter.is_initialized());

        let missing_passphrase = create_initialized_adapter("okx", VenueConfig::new("k", "s"));
        assert!(matches!(missing_passphrase, Err(VenueError::Configuration(_))));
    }

    #[test]
    fn test_adapters_from_config() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [venues.binance]
            url = "http://127.0.0.1:9"
            apiKey = "bk"
            secretKey = "bs"

            [venues.okx]
            url = "http://127.0.0.1:9"
            apiKey = "ok"
            secretKey = "os"
            password = "op"
            "#,
        )
        .unwrap();

        let adapters = adapters_from_config(&config).unwrap();
        assert_eq!(adapters.len(), 2);
        assert!(adapters[&VenueId::Okx].is_initialized());
        assert!(adapters[&VenueId::Binance].info().supports_order_type(crate::vocabulary::OrderType::Iceberg));
    }

    #[test]
    fn test_duplicate_venue_keys_are_rejected() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [venues.okex]
            apiKey = "k1"
            secretKey = "s1"
            password = "p1"

            [venues.okx]
            apiKey = "k2"
            secretKey = "s2"
            password = "p2"
            "#,
        )
        .unwrap();

        assert!(matches!(
            adapters_from_config(&config),
            Err(VenueError::Configuration(_))
        ));
    }
}
