use bson::DateTime;
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

pub(crate) fn now_utc() -> DateTime {
    DateTime::from_time_0_3(OffsetDateTime::now_utc())
}

/// Saturates at the Unix epoch when the window reaches past it.
pub(crate) fn days_ago(days: i64) -> DateTime {
    let earlier = days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|seconds| OffsetDateTime::now_utc().checked_sub(Duration::seconds(seconds)))
        .filter(|earlier| *earlier >= OffsetDateTime::UNIX_EPOCH)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    DateTime::from_time_0_3(earlier)
}

pub(crate) fn format_datetime(value: DateTime) -> String {
    let offset = value.to_time_0_3();
    offset.format(&Rfc3339).unwrap_or_else(|_| offset.to_string())
}
