//! Date and time recognition for admission details.
//!
//! Everything here is pure: relative expressions are resolved against a
//! caller-supplied `today`.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

const MONTH: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("iso date pattern"));

static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[/-](\d{1,2})(?:[/-](\d{4}|\d{2}))?\b").expect("numeric date pattern")
});

static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({})\b(?:,?\s+(\d{{4}}))?",
        MONTH
    ))
    .expect("day month pattern")
});

static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({})\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}}))?",
        MONTH
    ))
    .expect("month day pattern")
});

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(day after tomorrow|tomorrow|today|tonight)\b").expect("relative pattern")
});

static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("weekday pattern")
});

static CLOCK_12H: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\b\.?").expect("12h clock pattern")
});

static CLOCK_24H: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("24h clock pattern"));

static NAMED_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(noon|midday|midnight)\b").expect("named time pattern"));

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    Some(if raw.len() == 2 { 2000 + year } else { year })
}

/// Builds a date; when no year was given, a date already past rolls into next year.
fn resolve(day: u32, month: u32, year: Option<i32>, today: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        None => {
            let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
            if this_year < today {
                NaiveDate::from_ymd_opt(today.year() + 1, month, day)
            } else {
                Some(this_year)
            }
        }
    }
}

fn weekday_from(name: &str) -> Option<Weekday> {
    name.to_lowercase().parse().ok()
}

/// Next strictly-future occurrence of a weekday.
fn next_weekday(target: Weekday, today: NaiveDate) -> NaiveDate {
    let current = today.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let mut ahead = (wanted - current).rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    }
    today + Duration::days(ahead)
}

/// Finds the earliest date mention in the text.
pub fn parse_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let mut found: Vec<(usize, NaiveDate)> = Vec::new();

    for caps in ISO_DATE.captures_iter(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        let date = (|| {
            NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
        })();
        if let Some(date) = date {
            found.push((start, date));
        }
    }

    let iso_spans: Vec<(usize, usize)> = ISO_DATE
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    for caps in NUMERIC_DATE.captures_iter(text) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        if iso_spans.iter().any(|(s, e)| whole.start() >= *s && whole.end() <= *e) {
            continue;
        }
        let date = (|| {
            let day = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let year = match caps.get(3) {
                Some(y) => Some(expand_year(y.as_str())?),
                None => None,
            };
            resolve(day, month, year, today)
        })();
        if let Some(date) = date {
            found.push((whole.start(), date));
        }
    }

    for caps in DAY_MONTH.captures_iter(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        let date = (|| {
            let day = caps[1].parse().ok()?;
            let month = month_number(&caps[2])?;
            let year = caps.get(3).and_then(|y| y.as_str().parse().ok());
            resolve(day, month, year, today)
        })();
        if let Some(date) = date {
            found.push((start, date));
        }
    }

    for caps in MONTH_DAY.captures_iter(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        let date = (|| {
            let month = month_number(&caps[1])?;
            let day = caps[2].parse().ok()?;
            let year = caps.get(3).and_then(|y| y.as_str().parse().ok());
            resolve(day, month, year, today)
        })();
        if let Some(date) = date {
            found.push((start, date));
        }
    }

    for caps in RELATIVE.captures_iter(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        let date = match caps[1].to_lowercase().as_str() {
            "day after tomorrow" => today + Duration::days(2),
            "tomorrow" => today + Duration::days(1),
            _ => today,
        };
        found.push((start, date));
    }

    for caps in WEEKDAY.captures_iter(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        if let Some(weekday) = weekday_from(&caps[1]) {
            found.push((start, next_weekday(weekday, today)));
        }
    }

    found.into_iter().min_by_key(|(start, _)| *start).map(|(_, date)| date)
}

/// Finds the earliest time-of-day mention in the text.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let mut found: Vec<(usize, NaiveTime)> = Vec::new();

    for caps in CLOCK_12H.captures_iter(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        let time = (|| {
            let hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = match caps.get(2) {
                Some(m) => m.as_str().parse().ok()?,
                None => 0,
            };
            if !(1..=12).contains(&hour) {
                return None;
            }
            let pm = caps[3].eq_ignore_ascii_case("p");
            let hour = match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            };
            NaiveTime::from_hms_opt(hour, minute, 0)
        })();
        if let Some(time) = time {
            found.push((start, time));
        }
    }

    for caps in CLOCK_24H.captures_iter(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        // A 12h match at the same spot is more specific.
        if found.iter().any(|(s, _)| *s == start) {
            continue;
        }
        let time = (|| NaiveTime::from_hms_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, 0))();
        if let Some(time) = time {
            found.push((start, time));
        }
    }

    for caps in NAMED_TIME.captures_iter(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        let time = match caps[1].to_lowercase().as_str() {
            "midnight" => NaiveTime::from_hms_opt(0, 0, 0),
            _ => NaiveTime::from_hms_opt(12, 0, 0),
        };
        if let Some(time) = time {
            found.push((start, time));
        }
    }

    found.into_iter().min_by_key(|(start, _)| *start).map(|(_, time)| time)
}

/// Removes date mentions so their digits are not mistaken for amounts.
pub fn strip_dates(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in [&*ISO_DATE, &*NUMERIC_DATE, &*DAY_MONTH, &*MONTH_DAY] {
        out = pattern.replace_all(&out, " ").into_owned();
    }
    out
}
