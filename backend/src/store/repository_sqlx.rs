use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{AnyPool, Row};
use uuid::Uuid;

use crate::pricing::{DerivedPrices, PriceObservation, SourcePrices};
use crate::store::repository::PriceRepository;

/// SQLx-backed implementation of PriceRepository.
/// Responsible only for persistence and row mapping.
pub struct SqlxPriceRepository {
    pool: AnyPool,
}

impl SqlxPriceRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceRepository for SqlxPriceRepository {
    async fn append(&self, obs: &PriceObservation) -> anyhow::Result<()> {
        sqlx::query(
            r#"
INSERT INTO price_history (id, ts_ms, btc_brl, aze_brl, btc_usd, aze_usd, usd_brl, source)
VALUES (?, ?, ?, ?, ?, ?, ?, ?);
"#,
        )
        .bind(obs.id.to_string())
        .bind(obs.timestamp.timestamp_millis())
        .bind(obs.source.btc_brl)
        .bind(obs.derived.aze_brl)
        .bind(obs.source.btc_usd)
        .bind(obs.derived.aze_usd)
        .bind(obs.source.usd_brl)
        .bind(obs.origin.as_str())
        .execute(&self.pool)
        .await
        .context("insert price observation")?;

        Ok(())
    }

    async fn latest(&self) -> anyhow::Result<Option<PriceObservation>> {
        let row = sqlx::query(
            r#"
SELECT id, ts_ms, btc_brl, aze_brl, btc_usd, aze_usd, usd_brl, source
FROM price_history
ORDER BY ts_ms DESC
LIMIT 1;
"#,
        )
        .fetch_optional(&self.pool)
        .await
        .context("select latest observation")?;

        match row {
            Some(r) => Ok(Some(row_to_observation(&r)?)),
            None => Ok(None),
        }
    }

    async fn range_from(&self, start: DateTime<Utc>) -> anyhow::Result<Vec<PriceObservation>> {
        let rows = sqlx::query(
            r#"
SELECT id, ts_ms, btc_brl, aze_brl, btc_usd, aze_usd, usd_brl, source
FROM price_history
WHERE ts_ms >= ?
ORDER BY ts_ms ASC;
"#,
        )
        .bind(ceil_millis(start))
        .fetch_all(&self.pool)
        .await
        .context("select observation range")?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            match row_to_observation(&r) {
                Ok(o) => out.push(o),
                Err(e) => {
                    // poison-row resilience: skip but don't fail the window
                    tracing::warn!(error = %e, "skipping malformed price row");
                }
            }
        }

        Ok(out)
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM price_history WHERE ts_ms < ?;")
            .bind(ceil_millis(cutoff))
            .execute(&self.pool)
            .await
            .context("delete observations before cutoff")?;

        Ok(res.rows_affected())
    }

    async fn count(&self) -> anyhow::Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM price_history;")
            .fetch_one(&self.pool)
            .await
            .context("count observations")?;

        let n: i64 = row.try_get("n")?;
        u64::try_from(n).map_err(|_| anyhow!("negative row count: {n}"))
    }
}

/* =========================
Time bounds
========================= */

/// Rows are stored at millisecond precision; a bound with a sub-millisecond
/// remainder rounds up so `>=` and `<` keep their meaning against the stored key.
fn ceil_millis(t: DateTime<Utc>) -> i64 {
    let ms = t.timestamp_millis();
    if t.timestamp_subsec_nanos() % 1_000_000 == 0 {
        ms
    } else {
        ms + 1
    }
}

/* =========================
Row mapping
========================= */

fn row_to_observation(r: &sqlx::any::AnyRow) -> anyhow::Result<PriceObservation> {
    let id_str: String = r.try_get("id")?;
    let id = Uuid::parse_str(&id_str).context("invalid observation id")?;

    let ts_ms: i64 = r.try_get("ts_ms")?;
    let timestamp = DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .ok_or_else(|| anyhow!("timestamp out of range: {ts_ms}"))?;

    let source_tag: String = r.try_get("source")?;

    let obs = PriceObservation {
        id,
        timestamp,
        source: SourcePrices {
            btc_brl: r.try_get("btc_brl")?,
            btc_usd: r.try_get("btc_usd")?,
            usd_brl: r.try_get("usd_brl")?,
        },
        derived: DerivedPrices {
            aze_brl: r.try_get("aze_brl")?,
            aze_usd: r.try_get("aze_usd")?,
        },
        origin: source_tag.parse()?,
    };

    if !obs.is_valid() {
        return Err(anyhow!("non-positive price in row {id}"));
    }

    Ok(obs)
}
