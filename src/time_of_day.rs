use std::sync::LazyLock;

use chrono::{NaiveTime, Timelike};
use regex::Regex;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*(AM|PM)?$").expect("time-of-day pattern is valid")
});

/// Placeholder shown for an unset bound.
pub const UNSET: &str = "--:--";

/// Parses `H[H]:MM` with an optional, case-insensitive `AM`/`PM` suffix.
///
/// Accepts both 12-hour (`11:55 PM`) and 24-hour (`23:55`) input.
/// Returns `None` for anything else, including out-of-range values
/// such as `13:00 PM` or `7:60`.
pub fn parse(text: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(text.trim())?;
    let mut hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;

    let suffix = caps.get(3).map(|m| m.as_str().to_ascii_uppercase());
    match suffix.as_deref() {
        Some("PM") if hours != 12 => hours += 12,
        Some("AM") if hours == 12 => hours = 0,
        _ => {}
    }

    if hours > 23 || minutes > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Parses an optional bound: blank text or the `--:--` placeholder mean unset.
///
/// `Err(())` means the text was present but unparsable.
pub(crate) fn parse_optional(text: &str) -> Result<Option<NaiveTime>, ()> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == UNSET {
        return Ok(None);
    }
    parse(trimmed).map(Some).ok_or(())
}

/// Formats as `H:MM AM/PM`, no leading zero on the hour.
pub fn format<T: Timelike>(t: &T) -> String {
    let (pm, hour) = t.hour12();
    format!("{}:{:02} {}", hour, t.minute(), if pm { "PM" } else { "AM" })
}

/// Like [`format`] but renders `None` as the placeholder.
pub fn format_optional<T: Timelike>(t: Option<&T>) -> String {
    t.map(format).unwrap_or_else(|| UNSET.to_string())
}
