use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

/// When a job fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// Fixed period; the first run happens immediately.
    Every(Duration),
    /// Once per day at `hour:minute` UTC.
    DailyAt { hour: u32, minute: u32 },
}

impl Cadence {
    pub fn daily_at(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0)?;
        Some(Cadence::DailyAt { hour, minute })
    }
}

/// Next `hour:minute` UTC strictly after `from`.
///
/// Returns `None` for an impossible time of day.
pub fn next_daily(from: DateTime<Utc>, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let today = from.date_naive().and_time(time).and_utc();

    if today > from {
        Some(today)
    } else {
        Some(today + TimeDelta::days(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn next_daily_later_today() {
        let from = Utc.with_ymd_and_hms(2025, 3, 10, 1, 15, 0).unwrap();
        let next = next_daily(from, 3, 0).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 10, 3, 0, 0).unwrap());
    }

    #[test]
    fn next_daily_rolls_to_tomorrow() {
        let from = Utc.with_ymd_and_hms(2025, 3, 10, 3, 0, 0).unwrap();
        let next = next_daily(from, 3, 0).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 11, 3, 0, 0).unwrap());

        let from = Utc.with_ymd_and_hms(2025, 12, 31, 22, 0, 0).unwrap();
        let next = next_daily(from, 3, 0).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 1, 3, 0, 0).unwrap());
    }

    #[test]
    fn impossible_times_are_rejected() {
        assert!(next_daily(Utc::now(), 24, 0).is_none());
        assert!(Cadence::daily_at(3, 60).is_none());
        assert_eq!(
            Cadence::daily_at(3, 0),
            Some(Cadence::DailyAt { hour: 3, minute: 0 })
        );
    }
}
