use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format a publication date according to the configured date format.
///
/// If `date_format` is `"relative"`, displays relative times like `"2h"`,
/// `"3d"`, `"1w"`. An empty format falls back to `YYYY-MM-DD`. Otherwise,
/// uses `strftime`-style formatting; a pattern chrono rejects falls back to
/// `YYYY-MM-DD` as well. Undated items render as `-`.
pub(crate) fn format_date(dt: Option<DateTime<Utc>>, date_format: &str) -> String {
    let Some(dt) = dt else {
        return "-".to_owned();
    };
    match date_format {
        "relative" => format_relative_time(&dt, Utc::now()),
        "" => dt.format("%Y-%m-%d").to_string(),
        fmt => {
            let mut out = String::new();
            if write!(out, "{}", dt.format(fmt)).is_err() {
                return dt.format("%Y-%m-%d").to_string();
            }
            out
        }
    }
}

/// Whether `date_format` is `"relative"`, empty, or a pattern chrono accepts.
pub(crate) fn is_valid_date_format(date_format: &str) -> bool {
    match date_format {
        "relative" | "" => true,
        fmt => !StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)),
    }
}

/// Format a datetime relative to `now` (e.g., `"2h"`, `"3d"`, `"1w"`).
fn format_relative_time(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(dt);

    let minutes = duration.num_minutes();
    if minutes < 0 {
        return "soon".to_owned();
    }
    if minutes < 1 {
        return "now".to_owned();
    }
    if minutes < 60 {
        return format!("{minutes}m");
    }

    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{hours}h");
    }

    let days = duration.num_days();
    if days < 7 {
        return format!("{days}d");
    }
    if days < 30 {
        return format!("{}w", days / 7);
    }
    if days < 365 {
        return format!("{}mo", days / 30);
    }

    format!("{}y", days / 365)
}

/// Pad or truncate `text` to exactly `width` terminal columns.
///
/// Truncated text ends in `…`.
pub(crate) fn fit_width(text: &str, width: usize) -> String {
    let current = text.width();
    if current <= width {
        return format!("{text}{}", " ".repeat(width - current));
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn undated_renders_dash() {
        assert_eq!(format_date(None, "%Y"), "-");
    }

    #[test]
    fn strftime_and_empty_format() {
        let dt = Utc.with_ymd_and_hms(2024, 11, 20, 8, 0, 0).unwrap();
        assert_eq!(format_date(Some(dt), "%d/%m/%Y"), "20/11/2024");
        assert_eq!(format_date(Some(dt), ""), "2024-11-20");
    }

    #[test]
    fn unknown_specifier_falls_back_to_iso_day() {
        let dt = Utc.with_ymd_and_hms(2024, 11, 20, 8, 0, 0).unwrap();
        assert_eq!(format_date(Some(dt), "%Y-%Q"), "2024-11-20");
    }

    #[test]
    fn date_format_validation() {
        assert!(is_valid_date_format("relative"));
        assert!(is_valid_date_format(""));
        assert!(is_valid_date_format("%d.%m.%Y %H:%M"));
        assert!(!is_valid_date_format("%Y-%Q"));
    }

    #[test]
    fn relative_buckets() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_relative_time(&now, now), "now");
        assert_eq!(format_relative_time(&(now - Duration::hours(3)), now), "3h");
        assert_eq!(format_relative_time(&(now - Duration::days(10)), now), "1w");
        assert_eq!(format_relative_time(&(now - Duration::days(400)), now), "1y");
        assert_eq!(format_relative_time(&(now + Duration::days(1)), now), "soon");
    }

    #[test]
    fn fit_width_pads_short_text() {
        assert_eq!(fit_width("PP", 4), "PP  ");
    }

    #[test]
    fn fit_width_truncates_with_ellipsis() {
        assert_eq!(fit_width("Polypropylene", 6), "Polyp…");
        assert_eq!(fit_width("Polypropylene", 0), "");
    }

    #[test]
    fn fit_width_counts_wide_chars() {
        let fitted = fit_width("射出成形の事例", 5);
        assert_eq!(fitted.width(), 5);
        assert!(fitted.contains('…'));
    }
}
