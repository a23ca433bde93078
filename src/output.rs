//! Text helpers shared by the renderers: banners, elapsed time, values.

use std::time::Duration;

use serde_json::Value as JsonValue;

/// Default line width for banners.
pub const OUTPUT_WIDTH: usize = 80;

/// Banners always get at least this many stars.
const MIN_STARS: usize = 3;

/// Build an Ansible-style banner: `TITLE ******...` padded to `width`.
pub fn format_banner(title: &str, width: usize) -> String {
    let title = title.trim();
    let used = console::measure_text_width(title) + 1;
    let stars = width.saturating_sub(used).max(MIN_STARS);
    format!("{} {}", title, "*".repeat(stars))
}

/// Format an elapsed time for task banners.
///
/// Always two units at most, right-aligned so consecutive banners line up:
/// `" 2d  3h"`, `" 1h  5m"`, `" 4m  7s"`, `"   2.50s"`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    if days > 0 {
        format!("{days:2}d {hours:2}h")
    } else if hours > 0 {
        format!("{hours:2}h {mins:2}m")
    } else if mins > 0 {
        format!("{mins:2}m {secs:2}s")
    } else {
        format!("{:>7.2}s", elapsed.as_secs_f64())
    }
}

/// Render a custom-stat value on one line: strings bare, everything else as
/// compact JSON.
pub fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_banner_pads_to_width() {
        let banner = format_banner("PLAY RECAP", 20);
        assert_eq!(banner, "PLAY RECAP *********");
        assert_eq!(banner.len(), 20);
    }

    #[test]
    fn test_format_banner_minimum_stars() {
        assert_eq!(format_banner("A VERY LONG TITLE", 5), "A VERY LONG TITLE ***");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(2500)), "   2.50s");
        assert_eq!(format_elapsed(Duration::from_secs(59)), "  59.00s");
        assert_eq!(format_elapsed(Duration::from_secs(65)), " 1m  5s");
        assert_eq!(format_elapsed(Duration::from_secs(3665)), " 1h  1m");
        assert_eq!(format_elapsed(Duration::from_secs(2 * 86_400 + 3 * 3600)), " 2d  3h");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!("us")), "us");
        assert_eq!(format_value(&json!(12)), "12");
        assert_eq!(format_value(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
    }
}
