use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::derive::derive;

/// Where an observation's source prices came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Fetched from the upstream quote API.
    #[serde(rename = "awesome_api")]
    External,
    /// Synthesized from configured constants because the store was empty.
    #[serde(rename = "fallback")]
    Fallback,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::External => "awesome_api",
            Origin::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Origin {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awesome_api" => Ok(Origin::External),
            "fallback" => Ok(Origin::Fallback),
            other => Err(anyhow!("unknown observation origin: {other}")),
        }
    }
}

/// Strictly positive, finite divisor turning BTC prices into AZE prices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Divisor(f64);

impl Divisor {
    pub const DEFAULT: Divisor = Divisor(1_000.0);

    pub fn new(value: f64) -> Option<Self> {
        is_positive_finite(value).then_some(Self(value))
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

/// Raw market quotes an observation is derived from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePrices {
    pub btc_brl: f64,
    pub btc_usd: f64,
    pub usd_brl: f64,
}

impl SourcePrices {
    pub fn is_valid(&self) -> bool {
        [self.btc_brl, self.btc_usd, self.usd_brl]
            .into_iter()
            .all(is_positive_finite)
    }
}

/// Synthetic asset prices: `btc_* / divisor`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedPrices {
    pub aze_brl: f64,
    pub aze_usd: f64,
}

impl DerivedPrices {
    pub fn is_valid(&self) -> bool {
        is_positive_finite(self.aze_brl) && is_positive_finite(self.aze_usd)
    }
}

/// One immutable row of the price time series.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceObservation {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub source: SourcePrices,
    pub derived: DerivedPrices,
    pub origin: Origin,
}

impl PriceObservation {
    /// Builds a new observation, deriving AZE prices from `source`.
    ///
    /// `source` must already be validated; see [`super::derive::validate_quotes`].
    pub fn new(
        timestamp: DateTime<Utc>,
        source: SourcePrices,
        divisor: Divisor,
        origin: Origin,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            source,
            derived: derive(&source, divisor),
            origin,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.source.is_valid() && self.derived.is_valid()
    }
}

pub(crate) fn is_positive_finite(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisor_rejects_zero_negative_and_non_finite() {
        assert!(Divisor::new(0.0).is_none());
        assert!(Divisor::new(-5.0).is_none());
        assert!(Divisor::new(f64::NAN).is_none());
        assert!(Divisor::new(f64::INFINITY).is_none());
        assert_eq!(Divisor::new(1000.0).map(|d| d.get()), Some(1000.0));
    }

    #[test]
    fn origin_round_trips_through_its_storage_tag() {
        for origin in [Origin::External, Origin::Fallback] {
            assert_eq!(origin.as_str().parse::<Origin>().unwrap(), origin);
        }
        assert!("coingecko".parse::<Origin>().is_err());
    }

    #[test]
    fn origin_serializes_with_wire_names() {
        assert_eq!(
            serde_json::to_string(&Origin::External).unwrap(),
            "\"awesome_api\""
        );
        assert_eq!(
            serde_json::to_string(&Origin::Fallback).unwrap(),
            "\"fallback\""
        );
    }

    #[test]
    fn new_observation_carries_exact_derived_prices() {
        let source = SourcePrices {
            btc_brl: 550_000.0,
            btc_usd: 95_000.0,
            usd_brl: 5.5,
        };
        let divisor = Divisor::new(1000.0).unwrap();

        let obs = PriceObservation::new(Utc::now(), source, divisor, Origin::External);

        assert_eq!(obs.derived.aze_brl, 550.0);
        assert_eq!(obs.derived.aze_usd, 95.0);
        assert_eq!(obs.derived.aze_brl, obs.source.btc_brl / divisor.get());
        assert!(obs.is_valid());
    }

    #[test]
    fn observation_with_non_positive_price_is_invalid() {
        let mut obs = PriceObservation::new(
            Utc::now(),
            SourcePrices {
                btc_brl: 1.0,
                btc_usd: 1.0,
                usd_brl: 1.0,
            },
            Divisor::new(1.0).unwrap(),
            Origin::Fallback,
        );
        obs.source.usd_brl = 0.0;

        assert!(!obs.is_valid());
    }
}
