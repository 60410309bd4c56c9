// Date utility functions
// Conversions between UTC instants and wall-clock values of the display timezone

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Whether `instant` falls on `day` in the display timezone.
pub fn is_same_day(instant: DateTime<Utc>, day: NaiveDate, tz: &Tz) -> bool {
    instant.with_timezone(tz).date_naive() == day
}

/// The UTC instant of local midnight starting `day`.
///
/// Falls back to the earliest valid local time after midnight when a DST
/// transition skips midnight itself.
pub fn local_midnight(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    local_instant(day, NaiveTime::MIN, tz)
}

/// Resolve a local wall-clock time on `day` to a UTC instant.
pub fn local_instant(day: NaiveDate, time: NaiveTime, tz: &Tz) -> DateTime<Utc> {
    let naive = day.and_time(time);
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        // Inside a DST gap: shift forward by an hour, which always lands on a
        // valid local time for the zones we support.
        None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
    }
}

/// `[start, end)` of `day` in the display timezone.
pub fn day_bounds(day: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = day.succ_opt().unwrap_or(day);
    (local_midnight(day, tz), local_midnight(next, tz))
}

/// Wall-clock minutes between the start of `day` and `instant`.
///
/// Negative for instants on earlier days, above 1440 for later days.
pub fn minutes_since_midnight(instant: DateTime<Utc>, day: NaiveDate, tz: &Tz) -> f64 {
    let local = instant.with_timezone(tz).naive_local();
    let midnight = day.and_time(NaiveTime::MIN);
    (local - midnight).num_seconds() as f64 / 60.0
}

/// Format an instant as a 24h `HH:MM` label in the display timezone.
pub fn format_time(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant.with_timezone(tz).format("%H:%M").to_string()
}

/// Round a time of day to the nearest quarter hour, staying on the same day.
pub fn round_to_nearest_quarter(time: NaiveTime) -> NaiveTime {
    let minutes = time.hour() * 60 + time.minute();
    let rounded = ((minutes + 7) / 15 * 15).min(23 * 60 + 45);
    NaiveTime::from_hms_opt(rounded / 60, rounded % 60, 0).unwrap_or(time)
}
