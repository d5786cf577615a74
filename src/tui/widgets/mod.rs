//! TUI Widgets
//!
//! Sidebar, chart surface and comparison panel.

mod chart;
mod compare;
mod sidebar;

pub use chart::{bar_values, render_chart};
pub use compare::render_compare;
pub use sidebar::render_sidebar;

/// Truncate a string to fit within a given width (in chars)
pub(crate) fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let head: String = s.chars().take(max_width - 3).collect();
        format!("{}...", head)
    } else {
        s.chars().take(max_width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short.pdf", 20), "short.pdf");
        assert_eq!(truncate_string("a-very-long-name.pdf", 10), "a-very-...");
        assert_eq!(truncate_string("abcdef", 2), "ab");
    }
}
