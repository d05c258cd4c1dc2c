//! The `os` library: clock and calendar queries only.
//!
//! Process, environment, and filesystem members exist in name but are
//! blocked, so scripts probing for them get a permission error rather
//! than a missing-member error.

use super::{number_arg, opt_int_arg, string_arg};
use crate::library::Library;
use crate::value::Value;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub fn library() -> Library {
    let start = Instant::now();

    Library::new("os")
        .method("clock", move |_args| {
            Ok(Value::Float(start.elapsed().as_secs_f64()))
        })
        .method("time", |_args| Ok(Value::Integer(unix_now())))
        .method("date", |args| {
            let format = match args.first() {
                None | Some(Value::Nil) => "%Y-%m-%d %H:%M:%S",
                Some(_) => string_arg("date", args, 0)?,
            };
            let timestamp = opt_int_arg("date", args, 1)?.unwrap_or_else(unix_now);
            Ok(Value::Str(format_date(format, timestamp)))
        })
        .method("difftime", |args| {
            let later = number_arg("difftime", args, 0)?;
            let earlier = number_arg("difftime", args, 1)?;
            Ok(Value::Float(later - earlier))
        })
        .block(&[
            "execute",
            "exit",
            "getenv",
            "remove",
            "rename",
            "setlocale",
            "tmpname",
        ])
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Minimal strftime over UTC: %Y %m %d %H %M %S and %%.
fn format_date(format: &str, timestamp: i64) -> String {
    let (year, month, day) = civil_from_days(timestamp.div_euclid(86_400));
    let seconds_of_day = timestamp.rem_euclid(86_400);
    let (hour, minute, second) = (
        seconds_of_day / 3600,
        (seconds_of_day / 60) % 60,
        seconds_of_day % 60,
    );

    let mut out = String::new();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('Y') => out.push_str(&year.to_string()),
            Some('m') => out.push_str(&format!("{:02}", month)),
            Some('d') => out.push_str(&format!("{:02}", day)),
            Some('H') => out.push_str(&format!("{:02}", hour)),
            Some('M') => out.push_str(&format!("{:02}", minute)),
            Some('S') => out.push_str(&format!("{:02}", second)),
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

/// Gregorian date from days since the Unix epoch (civil-from-days).
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    (if month <= 2 { year + 1 } else { year }, month, day)
}
