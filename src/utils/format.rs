use unicode_width::UnicodeWidthStr;

/// Format a percentage with no decimals, e.g. "83%".
pub fn format_percent(rate: f64) -> String {
    format!("{}%", rate.round() as i64)
}

/// Pad `s` with spaces to `width` terminal columns. Emoji icons take two.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

pub fn plural(n: u32, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds() {
        assert_eq!(format_percent(66.6), "67%");
        assert_eq!(format_percent(0.0), "0%");
    }

    #[test]
    fn pads_by_display_width() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("📚", 4), "📚  ");
        assert_eq!(pad_to_width("toolong", 3), "toolong");
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(5, 10, 4), "██░░");
        assert_eq!(progress_bar(20, 10, 3), "███");
        assert_eq!(progress_bar(1, 0, 2), "░░");
    }

    #[test]
    fn plural_words() {
        assert_eq!(plural(1, "day"), "1 day");
        assert_eq!(plural(3, "day"), "3 days");
    }
}
