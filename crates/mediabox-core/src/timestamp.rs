//! Upload timestamp parsing and date directories.

use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};

use crate::{Error, Result};

/// Parses an upload timestamp.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`), civil date-times
/// (`2024-05-01 10:00:00`, `2024-05-01T10:00`) and plain dates
/// (`2024-05-01`). Values without an offset are read as UTC.
pub fn parse_timestamp(value: &str) -> Result<Timestamp> {
    let value = value.trim();

    if let Ok(timestamp) = value.parse::<Timestamp>() {
        return Ok(timestamp);
    }

    if let Ok(zoned) = value.parse::<Zoned>() {
        return Ok(zoned.timestamp());
    }

    let civil = value
        .parse::<DateTime>()
        .or_else(|_| value.parse::<Date>().map(|date| date.to_datetime(jiff::civil::time(0, 0, 0, 0))))
        .map_err(|e| Error::invalid_content(format!("invalid timestamp '{value}'")).with_source(e))?;

    civil
        .to_zoned(TimeZone::UTC)
        .map(|zoned| zoned.timestamp())
        .map_err(|e| Error::invalid_content(format!("invalid timestamp '{value}'")).with_source(e))
}

/// Returns the `YYYYMMDD` directory name for a timestamp, in UTC.
pub fn date_directory(timestamp: Timestamp) -> String {
    timestamp.to_zoned(TimeZone::UTC).strftime("%Y%m%d").to_string()
}
