//! XMLTV timestamp helpers

use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// XMLTV timestamp layout, e.g. `20250213120000 -0500`
pub const XMLTV_DATETIME_FORMAT: &str = "%Y%m%d%H%M%S %z";

/// Parse an XMLTV timestamp. A missing offset is read as UTC.
pub fn parse_xmltv_datetime(value: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    let value = value.trim();
    DateTime::parse_from_str(value, XMLTV_DATETIME_FORMAT).or_else(|err| {
        NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M%S")
            .map(|dt| dt.and_utc().fixed_offset())
            .map_err(|_| err)
    })
}

/// Format a timestamp the way XMLTV expects it
pub fn format_xmltv_datetime(value: &DateTime<FixedOffset>) -> String {
    value.format(XMLTV_DATETIME_FORMAT).to_string()
}
