//! Date helper functions

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};

/// Offset used when showing git timestamps (UTC+8)
const DISPLAY_OFFSET_SECS: i32 = 8 * 3600;

/// Human form of a front-matter date
///
/// # Examples
/// ```ignore
/// format_post_date("2024-01-05") // -> "2024年1月5日"
/// format_post_date("2024-01")    // -> "2024年1月"
/// ```
pub fn format_post_date(date: &str) -> String {
    let date = date.trim();
    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return d.format("%Y年%-m月%-d日").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{}-01", date), "%Y-%m-%d") {
        return d.format("%Y年%-m月").to_string();
    }
    date.to_string()
}

/// Feed timestamp for a front-matter date, midnight UTC
pub fn post_date_rfc3339(date: &str) -> Option<String> {
    let date = date.trim();
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", date), "%Y-%m-%d"))
        .ok()?;
    Some(format!("{}T00:00:00Z", day.format("%Y-%m-%d")))
}

/// Show an ISO-8601 timestamp in UTC+8 with a Chinese AM/PM marker
/// (e.g. "2026-01-31, 上午 11:02")
pub fn format_timestamp(iso: &str) -> String {
    let Ok(dt) = DateTime::parse_from_rfc3339(iso.trim()) else {
        return iso.to_string();
    };
    let Some(offset) = FixedOffset::east_opt(DISPLAY_OFFSET_SECS) else {
        return iso.to_string();
    };
    let dt = dt.with_timezone(&offset);

    let hour = dt.hour();
    let (period, hour_12) = if hour < 12 {
        ("上午", if hour == 0 { 12 } else { hour })
    } else {
        ("下午", if hour == 12 { 12 } else { hour - 12 })
    };
    format!(
        "{}, {} {:02}:{:02}",
        dt.format("%Y-%m-%d"),
        period,
        hour_12,
        dt.minute()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_post_date() {
        assert_eq!(format_post_date("2024-01-05"), "2024年1月5日");
        assert_eq!(format_post_date("2024-11"), "2024年11月");
        assert_eq!(format_post_date("someday"), "someday");
    }

    #[test]
    fn test_post_date_rfc3339() {
        assert_eq!(
            post_date_rfc3339("2024-01-05").as_deref(),
            Some("2024-01-05T00:00:00Z")
        );
        assert_eq!(
            post_date_rfc3339("2024-02").as_deref(),
            Some("2024-02-01T00:00:00Z")
        );
        assert_eq!(post_date_rfc3339("?"), None);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp("2026-01-31T03:02:00.000Z"),
            "2026-01-31, 上午 11:02"
        );
        assert_eq!(
            format_timestamp("2026-01-31T16:30:00.000Z"),
            "2026-02-01, 上午 12:30"
        );
        assert_eq!(
            format_timestamp("2026-01-31T05:00:00.000Z"),
            "2026-01-31, 下午 01:00"
        );
        assert_eq!(format_timestamp("bad"), "bad");
    }
}
