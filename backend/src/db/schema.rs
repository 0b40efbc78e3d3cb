use sqlx::AnyPool;

pub async fn migrate(pool: &AnyPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS price_history (
  id TEXT PRIMARY KEY,
  ts_ms BIGINT NOT NULL,
  btc_brl DOUBLE PRECISION NOT NULL,
  aze_brl DOUBLE PRECISION NOT NULL,
  btc_usd DOUBLE PRECISION NOT NULL,
  aze_usd DOUBLE PRECISION NOT NULL,
  usd_brl DOUBLE PRECISION NOT NULL,
  source TEXT NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_price_history_ts ON price_history(ts_ms);"#)
        .execute(pool)
        .await?;

    Ok(())
}
