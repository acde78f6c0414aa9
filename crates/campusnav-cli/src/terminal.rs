//! Terminal styling and color utilities.
//!
//! ANSI escape codes plus capability detection, so renderers can ask for a
//! palette and never check the environment themselves.

/// ANSI escape codes for text styling and colors.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";

    // Tag colors (bold reverse video for high visibility badges)
    /// Bold reverse green for STRT tags.
    pub const TAG_START: &str = "\x1b[1;7;32m";
    /// Bold reverse cyan for HOP tags.
    pub const TAG_HOP: &str = "\x1b[1;7;36m";
    /// Bold reverse yellow for marker (POI) tags.
    pub const TAG_MARKER: &str = "\x1b[1;7;33m";
    /// Bold reverse magenta for GOAL tags.
    pub const TAG_GOAL: &str = "\x1b[1;7;35m";

    /// Bright bold white for node names.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for ids, tree lines and footers.
    pub const GRAY: &str = "\x1b[90m";
    /// Green for distances.
    pub const GREEN: &str = "\x1b[32m";
    /// Cyan for times.
    pub const CYAN: &str = "\x1b[36m";
}

/// Resolved color codes, either ANSI sequences or empty strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub tag_start: &'static str,
    pub tag_hop: &'static str,
    pub tag_marker: &'static str,
    pub tag_goal: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub green: &'static str,
    pub cyan: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            tag_start: colors::TAG_START,
            tag_hop: colors::TAG_HOP,
            tag_marker: colors::TAG_MARKER,
            tag_goal: colors::TAG_GOAL,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            green: colors::GREEN,
            cyan: colors::CYAN,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            tag_start: "",
            tag_hop: "",
            tag_marker: "",
            tag_goal: "",
            white_bold: "",
            gray: "",
            green: "",
            cyan: "",
        }
    }

    /// Pick a palette from the terminal capabilities.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Whether ANSI colors should be emitted.
///
/// Honors `NO_COLOR` (https://no-color.org/) and `TERM=dumb`.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

/// Format a whole number of meters with thousand separators.
///
/// ```
/// # use campusnav_cli::terminal::format_meters;
/// assert_eq!(format_meters(999.4), "999 m");
/// assert_eq!(format_meters(1234.5), "1,235 m");
/// ```
#[must_use]
pub fn format_meters(meters: f64) -> String {
    let rounded = meters.max(0.0).round() as u64;
    format!("{} m", format_with_separators(rounded))
}

/// Format a number with thousand separators (commas).
#[must_use]
pub fn format_with_separators(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_are_inserted_every_three_digits() {
        assert_eq!(format_with_separators(0), "0");
        assert_eq!(format_with_separators(999), "999");
        assert_eq!(format_with_separators(1000), "1,000");
        assert_eq!(format_with_separators(1_234_567), "1,234,567");
        assert_eq!(
            format_with_separators(u64::MAX),
            "18,446,744,073,709,551,615"
        );
    }

    #[test]
    fn meters_are_rounded() {
        assert_eq!(format_meters(0.4), "0 m");
        assert_eq!(format_meters(222_389.85), "222,390 m");
        assert_eq!(format_meters(-3.0), "0 m");
    }

    #[test]
    fn plain_palette_is_empty() {
        let p = ColorPalette::plain();
        assert!(p.reset.is_empty());
        assert!(p.tag_start.is_empty());
        assert!(!ColorPalette::colored().tag_goal.is_empty());
    }

    use std::sync::Mutex;

    /// Serializes tests that touch process-global environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<_> = vars
            .iter()
            .map(|(k, _)| (*k, std::env::var_os(k)))
            .collect();

        for (key, value) in vars {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }

        let result = f();

        for (key, value) in saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }

        result
    }

    #[test]
    fn no_color_disables_colors() {
        with_env_vars(&[("NO_COLOR", Some("1")), ("TERM", None)], || {
            assert!(!supports_color());
            assert_eq!(ColorPalette::detect(), ColorPalette::plain());
        });
    }

    #[test]
    fn dumb_terminal_disables_colors() {
        with_env_vars(&[("NO_COLOR", None), ("TERM", Some("dumb"))], || {
            assert!(!supports_color());
        });
    }

    #[test]
    fn regular_terminal_supports_colors() {
        with_env_vars(
            &[("NO_COLOR", None), ("TERM", Some("xterm-256color"))],
            || assert!(supports_color()),
        );
    }
}
