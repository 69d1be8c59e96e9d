//! Best-effort conversion of listing timestamps to UTC instants.
//!
//! Sources publish dates in whatever shape their CMS produces: RFC 3339 in
//! JSON APIs, "2 hours ago" on some English sites, and Arabic month names
//! with Arabic-Indic digits on Egyptian sites. [`normalize`] tries each
//! known shape in turn and returns `None` when nothing fits. It never fails.
//!
//! Naive results (no offset in the text) are read as civil time in the
//! source's timezone when one is configured, otherwise as UTC. Relative
//! phrases and texts carrying an offset are already absolute and are not
//! reinterpreted.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// What the parser could infer from the text alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parsed {
    /// The text pinned down an instant (offset present, or relative to now).
    Absolute(DateTime<Utc>),
    /// Wall-clock time without a zone.
    Naive(NaiveDateTime),
}

/// Normalize an optional raw timestamp. Absent or blank input short-circuits.
pub fn normalize(raw: Option<&str>, timezone: Option<Tz>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = parse_fuzzy(raw, now);
    if parsed.is_none() {
        debug!(raw, "unparseable timestamp");
    }
    match parsed? {
        Parsed::Absolute(at) => Some(at),
        Parsed::Naive(naive) => match timezone {
            Some(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc)),
            None => Some(Utc.from_utc_datetime(&naive)),
        },
    }
}

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S %z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+|an?|one)\s+(seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?|months?|years?)\s+ago\b")
        .unwrap()
});

static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s+([^\s\d,،.]+)\.?\s*[,،]?\s*(\d{4})").unwrap());

static MONTH_DAY_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\s*,?\s*(\d{4})").unwrap());

static CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s*(a\.?m\.?|p\.?m\.?|ص|م)(?:[^\w]|$))?").unwrap());

/// Best-effort parse of free-form date text.
pub fn parse_fuzzy(raw: &str, now: DateTime<Utc>) -> Option<Parsed> {
    let text = western_digits(raw.trim());
    let text = text.as_str();

    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(Parsed::Absolute(at.with_timezone(&Utc)));
    }
    if let Ok(at) = DateTime::parse_from_rfc2822(text) {
        return Some(Parsed::Absolute(at.with_timezone(&Utc)));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(at) = DateTime::parse_from_str(text, fmt) {
            return Some(Parsed::Absolute(at.with_timezone(&Utc)));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(Parsed::Naive(naive));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(Parsed::Naive(date.and_time(NaiveTime::MIN)));
        }
    }

    let lower = text.to_lowercase();
    if let Some(at) = relative(&lower, now) {
        return Some(Parsed::Absolute(at));
    }

    let time = clock(&lower);
    if let Some(date) = named_month_date(&lower) {
        return Some(Parsed::Naive(date.and_time(time.unwrap_or(NaiveTime::MIN))));
    }
    // A clock on its own means today. Any other number is a date we cannot read.
    if !bare_clock(&lower) {
        return None;
    }
    time.map(|t| Parsed::Naive(now.date_naive().and_time(t)))
}

fn relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match text.trim() {
        "now" | "just now" | "today" => return Some(now),
        "yesterday" => return now.checked_sub_signed(TimeDelta::try_days(1)?),
        _ => {}
    }
    let caps = RELATIVE.captures(text)?;
    let amount: i64 = match &caps[1] {
        "a" | "an" | "one" => 1,
        n => n.parse().ok()?,
    };
    let unit = &caps[2];
    let delta = if unit.starts_with("sec") {
        TimeDelta::try_seconds(amount)
    } else if unit.starts_with("min") {
        TimeDelta::try_minutes(amount)
    } else if unit.starts_with('h') {
        TimeDelta::try_hours(amount)
    } else if unit.starts_with('d') {
        TimeDelta::try_days(amount)
    } else if unit.starts_with('w') {
        TimeDelta::try_weeks(amount)
    } else if unit.starts_with("mon") {
        amount.checked_mul(30).and_then(TimeDelta::try_days)
    } else {
        amount.checked_mul(365).and_then(TimeDelta::try_days)
    }?;
    now.checked_sub_signed(delta)
}

fn bare_clock(text: &str) -> bool {
    CLOCK.find(text).is_some_and(|m| {
        !text[..m.start()]
            .chars()
            .chain(text[m.end()..].chars())
            .any(|c| c.is_ascii_digit())
    })
}

fn clock(text: &str) -> Option<NaiveTime> {
    let caps = CLOCK.captures(text)?;
    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let second: u32 = caps.get(3).map_or(Some(0), |s| s.as_str().parse().ok())?;
    if let Some(marker) = caps.get(4) {
        let pm = matches!(marker.as_str().chars().next(), Some('p') | Some('م'));
        hour %= 12;
        if pm {
            hour += 12;
        }
    }
    NaiveTime::from_hms_opt(hour, minute, second)
}

fn named_month_date(text: &str) -> Option<NaiveDate> {
    for caps in DAY_MONTH_YEAR.captures_iter(text) {
        if let Some(month) = month_number(&caps[2]) {
            let day = caps[1].parse().ok()?;
            let year = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }
    for caps in MONTH_DAY_YEAR.captures_iter(text) {
        if let Some(month) = month_number(&caps[1]) {
            let day = caps[2].parse().ok()?;
            let year = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }
    None
}

fn month_number(word: &str) -> Option<u32> {
    let word = word.trim_end_matches('.');
    let n = match word {
        "january" | "jan" | "يناير" => 1,
        "february" | "feb" | "فبراير" => 2,
        "march" | "mar" | "مارس" => 3,
        "april" | "apr" | "أبريل" | "ابريل" | "إبريل" => 4,
        "may" | "مايو" => 5,
        "june" | "jun" | "يونيو" | "يونية" => 6,
        "july" | "jul" | "يوليو" | "يولية" => 7,
        "august" | "aug" | "أغسطس" | "اغسطس" => 8,
        "september" | "sep" | "sept" | "سبتمبر" => 9,
        "october" | "oct" | "أكتوبر" | "اكتوبر" => 10,
        "november" | "nov" | "نوفمبر" => 11,
        "december" | "dec" | "ديسمبر" => 12,
        _ => return None,
    };
    Some(n)
}

/// Map Arabic-Indic and Extended Arabic-Indic digits to ASCII.
fn western_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 30, 0).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_relative_hours_ago_in_utc() {
        let got = normalize(Some("2 hours ago"), Some(chrono_tz::UTC), now());
        assert_eq!(got, Some(now() - TimeDelta::hours(2)));
    }

    #[test]
    fn test_relative_ignores_source_timezone() {
        let got = normalize(Some("Updated 30 mins ago"), Some(chrono_tz::Africa::Cairo), now());
        assert_eq!(got, Some(now() - TimeDelta::minutes(30)));
        let got = normalize(Some("an hour ago"), None, now());
        assert_eq!(got, Some(now() - TimeDelta::hours(1)));
    }

    #[test]
    fn test_absent_or_blank_is_none() {
        assert_eq!(normalize(None, Some(chrono_tz::UTC), now()), None);
        assert_eq!(normalize(Some("   "), Some(chrono_tz::UTC), now()), None);
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(normalize(Some("sometime soon"), None, now()), None);
    }

    #[test]
    fn test_rfc3339_keeps_its_offset() {
        let got = normalize(Some("2026-10-19T08:00:00-04:00"), Some(chrono_tz::Africa::Cairo), now());
        assert_eq!(got, Some(utc(2026, 10, 19, 12, 0)));
    }

    #[test]
    fn test_naive_reads_as_source_civil_time() {
        // Tokyo is UTC+9 all year.
        let got = normalize(Some("2026-10-19 21:00"), Some(chrono_tz::Asia::Tokyo), now());
        assert_eq!(got, Some(utc(2026, 10, 19, 12, 0)));
    }

    #[test]
    fn test_naive_without_timezone_is_utc() {
        let got = normalize(Some("2026-10-19 15:00"), None, now());
        assert_eq!(got, Some(utc(2026, 10, 19, 15, 0)));
    }

    #[test]
    fn test_english_month_name() {
        let got = normalize(Some("October 18, 2026 3:05pm EDT"), Some(chrono_tz::UTC), now());
        assert_eq!(got, Some(utc(2026, 10, 18, 15, 5)));
        let got = normalize(Some("18 Oct 2026"), None, now());
        assert_eq!(got, Some(utc(2026, 10, 18, 0, 0)));
    }

    #[test]
    fn test_arabic_date_with_arabic_digits() {
        // "Sunday, 18 October 2026 09:15 PM"
        let got = normalize(Some("الأحد، ١٨ أكتوبر ٢٠٢٦ ٠٩:١٥ م"), Some(chrono_tz::UTC), now());
        assert_eq!(got, Some(utc(2026, 10, 18, 21, 15)));
    }

    #[test]
    fn test_arabic_morning_marker() {
        let got = normalize(Some("19 أكتوبر 2026 12:10 ص"), None, now());
        assert_eq!(got, Some(utc(2026, 10, 19, 0, 10)));
    }

    #[test]
    fn test_time_only_uses_today() {
        let got = normalize(Some("10:45"), None, now());
        assert_eq!(got, Some(utc(2026, 10, 19, 10, 45)));
    }

    #[test]
    fn test_time_with_unknown_date_layout_is_none() {
        assert_eq!(normalize(Some("12.03.2024 10:00"), None, now()), None);
        assert_eq!(normalize(Some("2024/3/12 - 10:00"), None, now()), None);
        assert_eq!(normalize(Some("Published 03-12-2024 at 10:00"), None, now()), None);
    }

    #[test]
    fn test_time_with_words_still_uses_today() {
        let got = normalize(Some("Updated 9:05 pm"), None, now());
        assert_eq!(got, Some(utc(2026, 10, 19, 21, 5)));
    }

    #[test]
    fn test_huge_relative_amount_is_none() {
        assert_eq!(normalize(Some("99999999999 years ago"), None, now()), None);
        assert_eq!(normalize(Some("1000000000 days ago"), None, now()), None);
        assert_eq!(normalize(Some("9223372036854775807 seconds ago"), None, now()), None);
        assert_eq!(normalize(Some("99999999999999999999 weeks ago"), None, now()), None);
    }

    #[test]
    fn test_western_digits() {
        assert_eq!(western_digits("٢٠٢٦-۱۰"), "2026-10");
    }
}
