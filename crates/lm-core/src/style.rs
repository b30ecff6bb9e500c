//! Terminal styling helpers with NO_COLOR support.

/// Check if color output is enabled (respects `NO_COLOR` env var).
pub fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Terminal style helper that respects NO_COLOR.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    enabled: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self::new()
    }
}

impl Style {
    pub fn new() -> Self {
        Self {
            enabled: color_enabled(),
        }
    }

    /// Create a style with colors explicitly enabled (for tests).
    pub fn force_enabled() -> Self {
        Self { enabled: true }
    }

    /// Create a style with colors explicitly disabled.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    fn code(&self, code: &'static str) -> &'static str {
        if self.enabled {
            code
        } else {
            ""
        }
    }

    pub fn dim_start(&self) -> &'static str {
        self.code("\x1b[2m")
    }

    pub fn bold_start(&self) -> &'static str {
        self.code("\x1b[1m")
    }

    pub fn red_start(&self) -> &'static str {
        self.code("\x1b[31m")
    }

    pub fn magenta_start(&self) -> &'static str {
        self.code("\x1b[35m")
    }

    pub fn purple_start(&self) -> &'static str {
        self.code("\x1b[38;5;97m")
    }

    pub fn yellow_start(&self) -> &'static str {
        self.code("\x1b[33m")
    }

    pub fn reset(&self) -> &'static str {
        self.code("\x1b[0m")
    }
}

/// Compute visible width of a string, ignoring ANSI escape sequences.
pub fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            width += unicode_display_width(c);
        }
    }
    width
}

/// Approximate display width of a character.
/// CJK characters, fullwidth punctuation and emoji are double-width.
fn unicode_display_width(c: char) -> usize {
    if c < ' ' {
        return 0;
    }
    if c.is_ascii() {
        return 1;
    }
    let cp = c as u32;
    if (0x1100..=0x115F).contains(&cp)       // Hangul Jamo
        || (0x2E80..=0x303E).contains(&cp)   // CJK Radicals
        || (0x3040..=0x33BF).contains(&cp)   // Hiragana, Katakana, CJK
        || (0x3400..=0x4DBF).contains(&cp)   // CJK Extension A
        || (0x4E00..=0x9FFF).contains(&cp)   // CJK Unified
        || (0xF900..=0xFAFF).contains(&cp)   // CJK Compatibility
        || (0xFE30..=0xFE6F).contains(&cp)   // CJK Compatibility Forms
        || (0xFF01..=0xFF60).contains(&cp)   // Fullwidth Forms
        || (0x1F300..=0x1F64F).contains(&cp) // Emoji
        || (0x1F900..=0x1F9FF).contains(&cp)
        || (0x20000..=0x2FFFF).contains(&cp)
    {
        2
    } else {
        1
    }
}

/// Center `s` within `width` columns.
pub fn center(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(visible_width(s)) / 2;
    format!("{}{s}", " ".repeat(pad))
}
