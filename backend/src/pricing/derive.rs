use crate::quote::{BTC_BRL, BTC_USD, FetchError, QuoteSet, USD_BRL};

use super::model::{DerivedPrices, Divisor, SourcePrices, is_positive_finite};

/// Parses an upstream `bid` string. Only finite values strictly above zero pass.
pub fn parse_price(pair: &'static str, raw: &str) -> Result<f64, FetchError> {
    let invalid = || FetchError::InvalidValue {
        pair,
        raw: raw.to_string(),
    };

    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;

    if !is_positive_finite(value) {
        return Err(invalid());
    }

    Ok(value)
}

/// Validates every quote the service tracks and collects them as source prices.
pub fn validate_quotes(quotes: &QuoteSet) -> Result<SourcePrices, FetchError> {
    Ok(SourcePrices {
        btc_brl: parse_price(BTC_BRL, &quotes.btc_brl.bid)?,
        btc_usd: parse_price(BTC_USD, &quotes.btc_usd.bid)?,
        usd_brl: parse_price(USD_BRL, &quotes.usd_brl.bid)?,
    })
}

/// Rejects derived prices that left the positive finite range through
/// underflow to zero or overflow to infinity.
pub fn check_derived(source: &SourcePrices, derived: &DerivedPrices) -> Result<(), FetchError> {
    let pairs = [
        (BTC_BRL, source.btc_brl, derived.aze_brl),
        (BTC_USD, source.btc_usd, derived.aze_usd),
    ];

    match pairs.into_iter().find(|(_, _, aze)| !is_positive_finite(*aze)) {
        Some((pair, btc, _)) => Err(FetchError::InvalidValue {
            pair,
            raw: format!("{btc:e}"),
        }),
        None => Ok(()),
    }
}

pub fn derive(source: &SourcePrices, divisor: Divisor) -> DerivedPrices {
    DerivedPrices {
        aze_brl: source.btc_brl / divisor.get(),
        aze_usd: source.btc_usd / divisor.get(),
    }
}
