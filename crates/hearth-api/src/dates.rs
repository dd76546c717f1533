use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Display timezone for the site (UTC+9).
fn display_tz() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("static offset")
}

/// Strict `YYYY-MM-DD`: right shape, zero-padded, and a real calendar date.
pub fn is_valid_date(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() != 10 || b[4] != b'-' || b[7] != b'-' {
        return false;
    }
    for (i, &c) in b.iter().enumerate() {
        if i == 4 || i == 7 {
            continue;
        }
        if !c.is_ascii_digit() {
            return false;
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Today's date in the display timezone.
pub fn today_date() -> String {
    Utc::now()
        .with_timezone(&display_tz())
        .format("%Y-%m-%d")
        .to_string()
}

/// Days in a month, for the archive calendar. Out-of-range input yields 0.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    if !(1..=12).contains(&month) {
        return 0;
    }
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|d| d.day())
        .unwrap_or(0)
}

/// `2025-01-05` → `January 5, 2025`. Unparsable input comes back as-is.
pub fn format_date_display(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => format!("{} {}, {}", MONTHS[d.month0() as usize], d.day(), d.year()),
        Err(_) => date.to_string(),
    }
}

/// RFC 3339 timestamp → `YYYY-MM-DD HH:MM:SS JST`. Unparsable input comes
/// back as-is rather than failing the whole response.
pub fn format_timestamp_display(iso: &str) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(dt) => dt
            .with_timezone(&display_tz())
            .format("%Y-%m-%d %H:%M:%S JST")
            .to_string(),
        Err(_) => iso.to_string(),
    }
}
