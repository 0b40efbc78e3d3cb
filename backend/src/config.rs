use std::time::Duration;

use tracing::warn;

use crate::pricing::{Divisor, SourcePrices};
use crate::quote::client::DEFAULT_BASE_URL;

const DEFAULT_POLLING_INTERVAL_MS: u64 = 30_000;
const DEFAULT_FALLBACK_BTC_BRL: f64 = 550_000.0;
const DEFAULT_FALLBACK_BTC_USD: f64 = 95_000.0;
const DEFAULT_FALLBACK_USD_BRL: f64 = 5.50;
const DEFAULT_DATABASE_URL: &str = "sqlite://aze_price.db?mode=rwc";
const DEFAULT_PORT: u16 = 3100;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Database connection string.
    pub database_url: String,

    /// HTTP listen port, bound on all interfaces.
    pub port: u16,

    // =========================
    // Ingestion
    // =========================
    /// Cadence of the ingestion cycle.
    ///
    /// Should exceed the upstream fetch timeout plus store latency so cycles
    /// never pile up.
    pub polling_interval: Duration,

    /// AZE = BTC / divisor.
    pub divisor: Divisor,

    /// Source prices used to seed an empty store when the upstream is down.
    pub fallback: SourcePrices,

    // =========================
    // Upstream
    // =========================
    pub awesome_api_url: String,

    /// Sent as the `token` query parameter when set.
    pub awesome_api_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary lookup.
    ///
    /// Unparsable or out-of-range values fall back to their default with a
    /// warning; configuration never fails startup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let polling_ms = parse_or("POLLING_INTERVAL_MS", &var, DEFAULT_POLLING_INTERVAL_MS, |v| {
            v.parse::<u64>().ok().filter(|ms| *ms > 0)
        });

        let divisor = parse_or("BTC_DIVISOR", &var, Divisor::DEFAULT.get(), positive_f64);
        let divisor = Divisor::new(divisor).unwrap_or(Divisor::DEFAULT);

        let fallback = SourcePrices {
            btc_brl: parse_or("FALLBACK_BTC_BRL", &var, DEFAULT_FALLBACK_BTC_BRL, positive_f64),
            btc_usd: parse_or("FALLBACK_BTC_USD", &var, DEFAULT_FALLBACK_BTC_USD, positive_f64),
            usd_brl: parse_or("FALLBACK_USD_BRL", &var, DEFAULT_FALLBACK_USD_BRL, positive_f64),
        };

        Self {
            database_url: var("DATABASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            port: parse_or("PORT", &var, DEFAULT_PORT, |v| v.parse().ok()),
            polling_interval: Duration::from_millis(polling_ms),
            divisor,
            fallback,
            awesome_api_url: var("AWESOME_API_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            awesome_api_token: var("AWESOME_API_TOKEN").filter(|v| !v.trim().is_empty()),
        }
    }
}

fn positive_f64(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_or<T: Copy + std::fmt::Display>(
    key: &str,
    var: &impl Fn(&str) -> Option<String>,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> T {
    let Some(raw) = var(key) else {
        return default;
    };

    match parse(raw.trim()) {
        Some(v) => v,
        None => {
            warn!(key, value = %raw, default = %default, "invalid config value; using default");
            default
        }
    }
}
