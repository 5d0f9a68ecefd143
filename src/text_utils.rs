use std::fmt::Write;
use std::ops::Index;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Plain `YYYY-MM-DD HH:MM:SS[.fff]` timestamps, as written by WordPress
fn parse_plain_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    lazy_static! {
        static ref DATE_TIME_REGEX: Regex = Regex::new(
            r"^(\d{4})-(\d{1,2})-(\d{1,2})[ T](\d{1,2}):(\d{1,2}):(\d{1,2})(\.\d{0,9})?$"
        ).unwrap();
    }

    let Some(caps) = DATE_TIME_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = to_u32(caps.index(4))?;
    let mn: u32 = to_u32(caps.index(5))?;
    let s: u32 = to_u32(caps.index(6))?;

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date in {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time in {}", buf))?;

    Ok(NaiveDateTime::new(date, time))
}

/// Accepts RFC 3339 (Blogger), RFC 2822 (RSS `pubDate`) and plain WordPress timestamps.
/// Zoned values keep their local wall time.
pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    let buf = buf.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(buf) {
        return Ok(dt.naive_local());
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(buf) {
        return Ok(dt.naive_local());
    }

    parse_plain_date_time(buf)
}

/// Normalizes an export date for the `date:` frontmatter field.
pub fn frontmatter_date(raw: &str) -> String {
    let raw = raw.trim();

    if DateTime::parse_from_rfc3339(raw).is_ok() {
        return raw.to_string();
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.to_rfc3339();
    }

    match parse_plain_date_time(raw) {
        Ok(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn is_valid_date(raw: &str) -> bool {
    parse_date_time(raw).is_ok()
}

fn format_date(date_time: &NaiveDateTime, format: &str) -> Option<String> {
    let mut buf = String::new();
    // chrono reports bad format strings as fmt errors instead of panicking here
    match write!(&mut buf, "{}", date_time.format(format)) {
        Ok(_) => Some(buf),
        Err(_) => None,
    }
}

/// Renders a comment date as a `<time>` element, keeping the raw value as the machine readable part.
pub fn readable_date(raw: &str, format: &str) -> String {
    let raw = raw.trim();
    let shown = match parse_date_time(raw) {
        Ok(dt) => format_date(&dt, format).unwrap_or_else(|| raw.to_string()),
        Err(_) => raw.to_string(),
    };

    format!(r#"<time datetime="{}">{}</time>"#, raw, shown)
}
