//! Date helper functions

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ContentError;

/// Date pattern required in a post's `date` field, e.g. `2021-Jan-01`
pub const PUBLISH_DATE_FORMAT: &str = "%Y-%b-%d";

/// Parse a front-matter publish date into a UTC timestamp at midnight
pub fn parse_publish_date(value: &str) -> Result<DateTime<Utc>, ContentError> {
    let value = value.trim();
    let date = NaiveDate::parse_from_str(value, PUBLISH_DATE_FORMAT).map_err(|source| {
        ContentError::InvalidDate {
            value: value.to_string(),
            source,
        }
    })?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Format a timestamp the way posts are written in front-matter
pub fn format_publish_date(date: &DateTime<Utc>) -> String {
    date.format(PUBLISH_DATE_FORMAT).to_string()
}

/// Get relative time (like "3 days ago") measured against the current time
pub fn relative_date(date: &DateTime<Utc>) -> String {
    relative_date_from(date, &Utc::now())
}

/// Get relative time (like "3 days ago") measured against `now`
pub fn relative_date_from(date: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(*date);

    if duration.num_seconds() < 0 {
        return "in the future".to_string();
    }

    let seconds = duration.num_seconds();
    let minutes = duration.num_minutes();
    let hours = duration.num_hours();
    let days = duration.num_days();

    if seconds < 60 {
        "a few seconds ago".to_string()
    } else if minutes == 1 {
        "a minute ago".to_string()
    } else if minutes < 60 {
        format!("{} minutes ago", minutes)
    } else if hours == 1 {
        "an hour ago".to_string()
    } else if hours < 24 {
        format!("{} hours ago", hours)
    } else if days == 1 {
        "yesterday".to_string()
    } else if days < 30 {
        format!("{} days ago", days)
    } else if days < 365 {
        let months = days / 30;
        if months == 1 {
            "a month ago".to_string()
        } else {
            format!("{} months ago", months)
        }
    } else {
        let years = days / 365;
        if years == 1 {
            "a year ago".to_string()
        } else {
            format!("{} years ago", years)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, TimeZone};

    #[test]
    fn test_parse_publish_date() {
        let date = parse_publish_date("2021-Jan-01").unwrap();
        assert_eq!(date.year(), 2021);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 1);
        assert_eq!(format_publish_date(&date), "2021-Jan-01");
    }

    #[test]
    fn test_parse_publish_date_rejects_other_patterns() {
        assert!(parse_publish_date("2021-01-01").is_err());
        assert!(parse_publish_date("yesterday").is_err());
        assert!(parse_publish_date("").is_err());
    }

    #[test]
    fn test_relative_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let at = |d: Duration| now - d;

        assert_eq!(relative_date_from(&at(Duration::seconds(5)), &now), "a few seconds ago");
        assert_eq!(relative_date_from(&at(Duration::minutes(5)), &now), "5 minutes ago");
        assert_eq!(relative_date_from(&at(Duration::hours(1)), &now), "an hour ago");
        assert_eq!(relative_date_from(&at(Duration::days(1)), &now), "yesterday");
        assert_eq!(relative_date_from(&at(Duration::days(3)), &now), "3 days ago");
        assert_eq!(relative_date_from(&at(Duration::days(65)), &now), "2 months ago");
        assert_eq!(relative_date_from(&at(Duration::days(800)), &now), "2 years ago");
        assert_eq!(relative_date_from(&(now + Duration::days(2)), &now), "in the future");
    }
}
