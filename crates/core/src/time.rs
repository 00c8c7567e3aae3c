use chrono::{DateTime, TimeDelta, TimeZone, Utc};

pub fn nanos_to_dt(nanos: u64) -> DateTime<Utc> {
    let secs = (nanos / 1_000_000_000) as i64;
    let subnanos = (nanos % 1_000_000_000) as u32;
    Utc.timestamp_opt(secs, subnanos)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

pub fn dt_to_micros(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

/// Whole microseconds in `d`. A positive span shorter than one microsecond
/// still counts as 1 so it is not mistaken for "no duration".
pub fn duration_to_micros(d: TimeDelta) -> i64 {
    let micros = d.num_microseconds().unwrap_or(i64::MAX);
    if micros == 0 && d > TimeDelta::zero() {
        1
    } else {
        micros
    }
}
