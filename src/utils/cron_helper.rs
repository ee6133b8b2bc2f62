//! Cron utility functions for the grab scheduler
//!
//! The `cron` crate expects a seconds field first. Classic five-field
//! expressions (`0 0 * * *`) are accepted and get a `0` seconds field.

use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;

/// Normalize a cron expression to the seconds-first form
pub fn normalize_cron_expression(expression: &str) -> String {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() == 5 {
        format!("0 {}", fields.join(" "))
    } else {
        fields.join(" ")
    }
}

/// Parse a cron expression, accepting five, six or seven fields
pub fn parse_schedule(expression: &str) -> Result<Schedule, String> {
    let normalized = normalize_cron_expression(expression);
    Schedule::from_str(&normalized)
        .map_err(|e| format!("Invalid cron expression '{expression}': {e}"))
}

/// Next time the schedule fires after `now`
pub fn next_scheduled_time(schedule: &Schedule, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&now).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_five_field_expression_gets_seconds() {
        assert_eq!(normalize_cron_expression("0 0 * * *"), "0 0 0 * * *");
        assert_eq!(normalize_cron_expression("0 0 */6 * * *"), "0 0 */6 * * *");
    }

    #[test]
    fn test_every_six_hours() {
        let schedule = parse_schedule("0 */6 * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2025, 2, 13, 7, 30, 0).unwrap();
        let next = next_scheduled_time(&schedule, now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 2, 13, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_cron_expression() {
        let result = parse_schedule("invalid");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid cron expression"));
    }
}
