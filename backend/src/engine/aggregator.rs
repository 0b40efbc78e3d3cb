//! Windowed statistics over the stored series.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::pricing::{Origin, PriceObservation};
use crate::store::PriceRepository;

/// Trailing windows exposed over REST.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryWindow {
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    OneDay,
    SevenDays,
}

impl HistoryWindow {
    pub const ALL: [HistoryWindow; 6] = [
        HistoryWindow::FiveMinutes,
        HistoryWindow::FifteenMinutes,
        HistoryWindow::ThirtyMinutes,
        HistoryWindow::OneHour,
        HistoryWindow::OneDay,
        HistoryWindow::SevenDays,
    ];

    pub fn minutes(&self) -> i64 {
        match self {
            HistoryWindow::FiveMinutes => 5,
            HistoryWindow::FifteenMinutes => 15,
            HistoryWindow::ThirtyMinutes => 30,
            HistoryWindow::OneHour => 60,
            HistoryWindow::OneDay => 1_440,
            HistoryWindow::SevenDays => 10_080,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes())
    }

    pub fn token(&self) -> &'static str {
        match self {
            HistoryWindow::FiveMinutes => "5m",
            HistoryWindow::FifteenMinutes => "15m",
            HistoryWindow::ThirtyMinutes => "30m",
            HistoryWindow::OneHour => "1h",
            HistoryWindow::OneDay => "24h",
            HistoryWindow::SevenDays => "7d",
        }
    }
}

impl FromStr for HistoryWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HistoryWindow::ALL
            .into_iter()
            .find(|w| w.token() == s)
            .ok_or_else(|| format!("invalid window {s:?}; use 5m, 15m, 30m, 1h, 24h or 7d"))
    }
}

/// current / first / min / max / avg of one price field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FieldStats {
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub first: f64,
}

impl FieldStats {
    /// `None` for an empty series.
    pub fn from_series(values: &[f64]) -> Option<Self> {
        let (&first, &current) = (values.first()?, values.last()?);

        let (min, max, sum) = values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
        );

        // Summation rounding can land a hair outside the extrema.
        let avg = (sum / values.len() as f64).clamp(min, max);

        Some(Self {
            current,
            min,
            max,
            avg,
            first,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BrlStats {
    pub aze: FieldStats,
    pub btc: FieldStats,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdStats {
    pub aze: FieldStats,
    pub btc: FieldStats,
    pub to_brl: FieldStats,
}

/// One raw row of the window, as callers see it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub btc_brl: f64,
    pub aze_brl: f64,
    pub btc_usd: f64,
    pub aze_usd: f64,
    pub usd_brl: f64,
    pub source: Origin,
}

impl From<&PriceObservation> for PricePoint {
    fn from(o: &PriceObservation) -> Self {
        Self {
            timestamp: o.timestamp,
            btc_brl: o.source.btc_brl,
            aze_brl: o.derived.aze_brl,
            btc_usd: o.source.btc_usd,
            aze_usd: o.derived.aze_usd,
            usd_brl: o.source.usd_brl,
            source: o.origin,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowStats {
    pub window: String,
    pub count: usize,
    /// Timestamp of the first observation found, not the requested boundary.
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub brl: BrlStats,
    pub usd: UsdStats,
    pub prices: Vec<PricePoint>,
}

/// Builds window statistics from observations already sorted ascending.
pub fn summarize(window: Duration, observations: &[PriceObservation]) -> Option<WindowStats> {
    let (first, last) = (observations.first()?, observations.last()?);

    let field = |pick: fn(&PriceObservation) -> f64| {
        let values: Vec<f64> = observations.iter().map(pick).collect();
        FieldStats::from_series(&values)
    };

    Some(WindowStats {
        window: format!("{}m", window.num_minutes()),
        count: observations.len(),
        start_time: first.timestamp,
        end_time: last.timestamp,
        brl: BrlStats {
            aze: field(|o| o.derived.aze_brl)?,
            btc: field(|o| o.source.btc_brl)?,
        },
        usd: UsdStats {
            aze: field(|o| o.derived.aze_usd)?,
            btc: field(|o| o.source.btc_usd)?,
            to_brl: field(|o| o.source.usd_brl)?,
        },
        prices: observations.iter().map(PricePoint::from).collect(),
    })
}

pub struct Aggregator {
    repo: Arc<dyn PriceRepository>,
}

impl Aggregator {
    pub fn new(repo: Arc<dyn PriceRepository>) -> Self {
        Self { repo }
    }

    /// Statistics over `[now - window, ∞)`; `None` when the window holds no data.
    pub async fn query(
        &self,
        window: Duration,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<WindowStats>> {
        if window <= Duration::zero() {
            return Ok(None);
        }

        let start = now - window;
        let observations = self
            .repo
            .range_from(start)
            .await
            .context("load window observations")?;

        Ok(summarize(window, &observations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{Divisor, SourcePrices};
    use crate::store::InMemoryPriceRepository;

    fn obs(ts: DateTime<Utc>, btc_brl: f64) -> PriceObservation {
        PriceObservation::new(
            ts,
            SourcePrices {
                btc_brl,
                btc_usd: btc_brl / 5.0,
                usd_brl: 5.0,
            },
            Divisor::new(1.0).unwrap(),
            Origin::External,
        )
    }

    #[test]
    fn window_tokens_parse_to_expected_minutes() {
        let cases = [
            ("5m", 5),
            ("15m", 15),
            ("30m", 30),
            ("1h", 60),
            ("24h", 1_440),
            ("7d", 10_080),
        ];
        for (token, minutes) in cases {
            let w: HistoryWindow = token.parse().unwrap();
            assert_eq!(w.minutes(), minutes);
            assert_eq!(w.token(), token);
        }

        for bad in ["", "1m", "60m", "1d", "24H", "7 d"] {
            assert!(bad.parse::<HistoryWindow>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn field_stats_of_empty_series_is_none() {
        assert!(FieldStats::from_series(&[]).is_none());
    }

    #[test]
    fn single_value_series_is_flat() {
        let s = FieldStats::from_series(&[42.0]).unwrap();
        assert_eq!((s.current, s.first, s.min, s.max, s.avg), (42.0, 42.0, 42.0, 42.0, 42.0));
    }

    #[tokio::test]
    async fn day_window_matches_worked_example() {
        let repo = Arc::new(InMemoryPriceRepository::new());
        let now = Utc::now();

        // Outside the 24h window; must not affect the stats.
        repo.append(&obs(now - Duration::hours(30), 1_000.0)).await.unwrap();

        let values = [10.0, 12.0, 9.0, 15.0, 11.0];
        for (i, v) in values.iter().enumerate() {
            let ts = now - Duration::hours(20) + Duration::hours(4 * i as i64);
            repo.append(&obs(ts, *v)).await.unwrap();
        }

        let agg = Aggregator::new(repo);
        let stats = agg
            .query(HistoryWindow::OneDay.duration(), now)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stats.window, "1440m");
        assert_eq!(stats.count, 5);
        assert_eq!(stats.start_time, now - Duration::hours(20));
        assert_eq!(stats.end_time, now - Duration::hours(4));

        let btc = stats.brl.btc;
        assert_eq!(btc.current, 11.0);
        assert_eq!(btc.first, 10.0);
        assert_eq!(btc.min, 9.0);
        assert_eq!(btc.max, 15.0);
        assert_eq!(btc.avg, 11.4);

        assert_eq!(stats.usd.to_brl.avg, 5.0);
        assert_eq!(stats.prices.len(), 5);
        assert_eq!(stats.prices[0].btc_brl, 10.0);
        assert_eq!(stats.prices[4].source, Origin::External);
    }

    #[tokio::test]
    async fn count_equals_rows_at_or_after_window_start() {
        let repo = Arc::new(InMemoryPriceRepository::new());
        let now = Utc::now();
        for m in [0, 3, 5, 6, 14, 15, 16, 29, 31] {
            repo.append(&obs(now - Duration::minutes(m), 1.0 + m as f64))
                .await
                .unwrap();
        }
        let agg = Aggregator::new(repo);

        for (window, expected) in [
            (HistoryWindow::FiveMinutes, 3),
            (HistoryWindow::FifteenMinutes, 6),
            (HistoryWindow::ThirtyMinutes, 8),
            (HistoryWindow::OneHour, 9),
        ] {
            let stats = agg.query(window.duration(), now).await.unwrap().unwrap();
            assert_eq!(stats.count, expected, "window {}", window.token());
        }
    }

    #[tokio::test]
    async fn empty_window_is_none() {
        let repo = Arc::new(InMemoryPriceRepository::new());
        let now = Utc::now();
        repo.append(&obs(now - Duration::hours(2), 5.0)).await.unwrap();

        let agg = Aggregator::new(repo);

        assert!(agg.query(HistoryWindow::OneHour.duration(), now).await.unwrap().is_none());
        assert!(agg.query(Duration::zero(), now).await.unwrap().is_none());
    }

    #[test]
    fn stats_serialize_with_camel_case_groups() {
        let now = Utc::now();
        let stats = summarize(Duration::minutes(5), &[obs(now, 10.0)]).unwrap();
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["window"], "5m");
        assert!(json["usd"]["toBrl"]["avg"].is_number());
        assert!(json["startTime"].is_string());
        assert_eq!(json["prices"][0]["source"], "awesome_api");
        assert!(json["prices"][0]["azeBrl"].is_number());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn stats_stay_within_extrema(values in prop::collection::vec(1e-6f64..1e9, 1..200)) {
            let s = FieldStats::from_series(&values).unwrap();

            prop_assert!(s.min <= s.avg && s.avg <= s.max);
            prop_assert!(s.min <= s.current && s.current <= s.max);
            prop_assert!(s.min <= s.first && s.first <= s.max);
            prop_assert_eq!(s.first, values[0]);
            prop_assert_eq!(s.current, values[values.len() - 1]);
        }
    }
}
