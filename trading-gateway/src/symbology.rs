//! Symbol conventions and precision helpers.
//!
//! The unified symbol form is `BASE_QUOTE` (e.g. `BTC_USDT`). Adapters take
//! venue-native symbols; [`SymbolNormalizer`] converts between the two.
//!
//! - **Binance**: `BTCUSDT` (no separator)
//! - **OKX spot**: `BTC-USDT`
//! - **OKX perpetual swap**: `BTC-USDT-SWAP`

use crate::error::{VenueError, VenueResult};
use crate::vocabulary::VenueId;

/// Quote assets recognized when splitting separator-less symbols, longest first.
const KNOWN_QUOTES: &[&str] = &[
    "FDUSD", "USDT", "USDC", "BUSD", "TUSD", "DAI", "BTC", "ETH", "BNB", "EUR", "TRY", "USD",
];

/// Converts between unified `BASE_QUOTE` symbols and a venue's format.
pub trait SymbolNormalizer: Send + Sync {
    /// Convert a venue-specific symbol to the unified format.
    fn to_canonical(&self, venue_symbol: &str) -> VenueResult<String>;

    /// Convert a unified symbol to the venue-specific format.
    fn to_venue(&self, canonical_symbol: &str) -> VenueResult<String>;

    /// Venue this normalizer serves.
    fn venue_id(&self) -> VenueId;
}

/// Binance symbols: `BTCUSDT`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinanceSymbols;

impl SymbolNormalizer for BinanceSymbols {
    fn to_canonical(&self, venue_symbol: &str) -> VenueResult<String> {
        let upper = venue_symbol.to_ascii_uppercase();
        KNOWN_QUOTES
            .iter()
            .find(|quote| upper.len() > quote.len() && upper.ends_with(*quote))
            .map(|quote| format!("{}_{}", &upper[..upper.len() - quote.len()], quote))
            .ok_or_else(|| {
                VenueError::InvalidRequest(format!("cannot split Binance symbol '{}'", venue_symbol))
            })
    }

    fn to_venue(&self, canonical_symbol: &str) -> VenueResult<String> {
        let (base, quote) = split_canonical(canonical_symbol)?;
        Ok(format!("{}{}", base, quote))
    }

    fn venue_id(&self) -> VenueId {
        VenueId::Binance
    }
}

/// OKX spot symbols: `BTC-USDT`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OkxSymbols;

impl SymbolNormalizer for OkxSymbols {
    fn to_canonical(&self, venue_symbol: &str) -> VenueResult<String> {
        let trimmed = venue_symbol.strip_suffix("-SWAP").unwrap_or(venue_symbol);
        match trimmed.split_once('-') {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {
                Ok(format!("{}_{}", base.to_ascii_uppercase(), quote.to_ascii_uppercase()))
            }
            _ => Err(VenueError::InvalidRequest(format!(
                "cannot split OKX instrument '{}'",
                venue_symbol
            ))),
        }
    }

    fn to_venue(&self, canonical_symbol: &str) -> VenueResult<String> {
        let (base, quote) = split_canonical(canonical_symbol)?;
        Ok(format!("{}-{}", base, quote))
    }

    fn venue_id(&self) -> VenueId {
        VenueId::Okx
    }
}

/// Returns the normalizer of a venue.
pub fn normalizer(venue: VenueId) -> &'static dyn SymbolNormalizer {
    match venue {
        VenueId::Binance => &BinanceSymbols,
        VenueId::Okx => &OkxSymbols,
    }
}

/// Convert a unified `BASE_QUOTE` symbol to the venue's native form.
pub fn venue_symbol(venue: VenueId, canonical_symbol: &str) -> VenueResult<String> {
    normalizer(venue).to_venue(canonical_symbol)
}

/// Convert a venue-native symbol to the unified `BASE_QUOTE` form.
pub fn unified_symbol(venue: VenueId, venue_symbol: &str) -> VenueResult<String> {
    normalizer(venue).to_canonical(venue_symbol)
}

/// OKX perpetual swap instrument for a spot-style symbol (`BTC-USDT` -> `BTC-USDT-SWAP`).
pub fn okx_swap_instrument(symbol: &str) -> String {
    if symbol.ends_with("-SWAP") {
        symbol.to_string()
    } else {
        format!("{}-SWAP", symbol)
    }
}

/// Count the significant decimal places of a tick or lot size string.
///
/// Trailing zeros after the point do not count: `"0.01000000"` has two.
pub fn decimal_places(size: &str) -> u32 {
    match size.trim().split_once('.') {
        Some((_, fraction)) => fraction.trim_end_matches('0').len() as u32,
        None => 0,
    }
}

fn split_canonical(symbol: &str) -> VenueResult<(String, String)> {
    match symbol.split_once('_') {
        Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {
            Ok((base.to_ascii_uppercase(), quote.to_ascii_uppercase()))
        }
        _ => Err(VenueError::InvalidRequest(format!(
            "expected BASE_QUOTE symbol, got '{}'",
            symbol
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_venue() {
        assert_eq!(venue_symbol(VenueId::Binance, "BTC_USDT").unwrap(), "BTCUSDT");
        assert_eq!(venue_symbol(VenueId::Okx, "eth_usdt").unwrap(), "ETH-USDT");
        assert!(venue_symbol(VenueId::Okx, "BTCUSDT").is_err());
    }

    #[test]
    fn test_to_canonical() {
        assert_eq!(unified_symbol(VenueId::Binance, "BTCFDUSD").unwrap(), "BTC_FDUSD");
        assert_eq!(unified_symbol(VenueId::Binance, "ETHBTC").unwrap(), "ETH_BTC");
        assert_eq!(unified_symbol(VenueId::Okx, "BTC-USDT-SWAP").unwrap(), "BTC_USDT");
        assert!(unified_symbol(VenueId::Binance, "USDT").is_err());
    }

    #[test]
    fn test_okx_swap_instrument() {
        assert_eq!(okx_swap_instrument("BTC-USDT"), "BTC-USDT-SWAP");
        assert_eq!(okx_swap_instrument("BTC-USDT-SWAP"), "BTC-USDT-SWAP");
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places("0.01000000"), 2);
        assert_eq!(decimal_places("0.1"), 1);
        assert_eq!(decimal_places("0.00001"), 5);
        assert_eq!(decimal_places("1.00000000"), 0);
        assert_eq!(decimal_places("10"), 0);
    }
}
