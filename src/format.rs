use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

/// Formats a kilobyte count as whole KB, MB or GB.
pub fn format_size(kb: u64) -> String {
    const MB: u64 = 1024;
    const GB: u64 = 1024 * 1024;

    if kb >= GB {
        format!("{:.0}GB", kb as f64 / GB as f64)
    } else if kb >= MB {
        format!("{:.0}MB", kb as f64 / MB as f64)
    } else {
        format!("{kb}KB")
    }
}

/// `D days, HH:MM:SS`, or just `HH:MM:SS` under a day.
pub fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;

    if days > 0 {
        format!("{days} days, {hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    }
}

/// Cumulative CPU ticks as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_cpu_time(ticks: u64, ticks_per_second: f64) -> String {
    let total = (ticks as f64 / ticks_per_second) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3_600,
        (total % 3_600) / 60,
        total % 60
    )
}

/// `12.3%`, or a placeholder when the value is unavailable.
pub fn format_percent(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}%"),
        None => "--%".to_string(),
    }
}
