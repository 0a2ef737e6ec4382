use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Utc};
use time::OffsetDateTime;

pub fn to_offset_datetime(value: DateTime<Utc>) -> OffsetDateTime {
    let nanos = i128::from(value.timestamp_millis()).saturating_mul(1_000_000);
    OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

pub fn from_offset_datetime(value: OffsetDateTime) -> Result<DateTime<Utc>> {
    let millis = i64::try_from(value.unix_timestamp_nanos() / 1_000_000)
        .map_err(|err| anyhow!("timestamp out of range: {}", err))?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| anyhow!("timestamp out of range: {}", millis))
}
