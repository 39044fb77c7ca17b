use chrono::{DateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format a Unix timestamp as a UTC string
///
/// # Examples
/// ```
/// use lumberjack_core::utils::text::format_timestamp;
/// assert_eq!(format_timestamp(1700000000), "2023-11-14 22:13:20 UTC");
/// ```
pub fn format_timestamp(ts: i64) -> String {
    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => ts.to_string(),
    }
}

/// Format a duration in seconds as `42s`, `3m 5s` or `2h 10m`
///
/// # Examples
/// ```
/// use lumberjack_core::utils::text::format_duration;
/// assert_eq!(format_duration(185), "3m 5s");
/// ```
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < 60 {
        return format!("{}s", seconds);
    }
    if seconds < 3600 {
        return format!("{}m {}s", seconds / 60, seconds % 60);
    }
    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
}

/// First 12 characters of a revision hash
pub fn short_revision(revision: &str) -> &str {
    match revision.char_indices().nth(12) {
        Some((idx, _)) => &revision[..idx],
        None => revision,
    }
}

/// Truncate text to a display width, appending an ellipsis when cut
pub fn truncate_text(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    const ELLIPSIS: &str = "...";
    let ellipsis_width = ELLIPSIS.width();

    if max_width <= ellipsis_width {
        return ELLIPSIS[..max_width].to_string();
    }

    let target_width = max_width - ellipsis_width;
    let mut result = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > target_width {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }

    result.push_str(ELLIPSIS);
    result
}
