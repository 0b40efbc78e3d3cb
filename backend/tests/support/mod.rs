#![allow(dead_code)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use aze_price::db::Db;
use aze_price::pricing::{Divisor, Origin, PriceObservation, SourcePrices};

/// Isolated in-memory DB per test.
/// Unique name prevents test interference during parallel execution.
/// `cache=shared` lets every connection in the pool see the same database.
pub async fn setup_db() -> Db {
    let conn = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());

    let db = Db::connect(&conn).await.expect("connect sqlite memory db");
    db.migrate().await.expect("migrate");
    db
}

/// Current time truncated to the store's millisecond precision.
pub fn now_ms() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap()
}

pub fn observation(ts: DateTime<Utc>, btc_brl: f64, origin: Origin) -> PriceObservation {
    PriceObservation::new(
        ts,
        SourcePrices {
            btc_brl,
            btc_usd: 95_000.0,
            usd_brl: 5.5,
        },
        Divisor::new(1_000.0).unwrap(),
        origin,
    )
}
