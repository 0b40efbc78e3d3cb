use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{HealthReport, HealthStatus};
use crate::pricing::{Origin, PriceObservation};

/// `{success, data}` on a hit, `{success: false, message}` when there is nothing to show.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub window: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BrlQuote {
    pub btc: f64,
    pub aze: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdQuote {
    pub btc: f64,
    pub aze: f64,
    pub to_brl: f64,
}

#[derive(Debug, Serialize)]
pub struct LatestPrice {
    pub brl: BrlQuote,
    pub usd: UsdQuote,
    pub source: Origin,
    pub timestamp: DateTime<Utc>,
}

impl From<PriceObservation> for LatestPrice {
    fn from(o: PriceObservation) -> Self {
        Self {
            brl: BrlQuote {
                btc: o.source.btc_brl,
                aze: o.derived.aze_brl,
            },
            usd: UsdQuote {
                btc: o.source.btc_usd,
                aze: o.derived.aze_usd,
                to_brl: o.source.usd_brl,
            },
            source: o.origin,
            timestamp: o.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthBody {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Origin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<HealthReport> for HealthBody {
    fn from(r: HealthReport) -> Self {
        let message = r
            .last_update
            .is_none()
            .then(|| NO_QUOTE_AVAILABLE.to_string());

        Self {
            status: r.status,
            last_update: r.last_update,
            age_seconds: r.age_seconds,
            source: r.last_origin,
            message,
        }
    }
}

pub const NO_QUOTE_AVAILABLE: &str = "no quote available";
pub const NO_DATA_IN_WINDOW: &str = "no data available for this window";
