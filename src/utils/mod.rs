/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else if total_seconds > 0 {
        format!("{}s", secs)
    } else {
        format!("{:.1}s", seconds.max(0.0))
    }
}

/// First `max_chars` characters of `text` on one line, for log messages
pub fn preview(text: &str, max_chars: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if single_line.chars().count() <= max_chars {
        single_line
    } else {
        let cut: String = single_line.chars().take(max_chars).collect();
        format!("{}…", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.4), "0.4s");
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m 1s");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short text", 20), "short text");
        assert_eq!(preview("line one\nline   two", 40), "line one line two");
        assert_eq!(preview("héllo wörld again", 11), "héllo wörld…");
        assert_eq!(preview("hello world", 6), "hello…");
    }
}
