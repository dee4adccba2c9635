use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal styles for CLI output. `Default` is the uncolored theme.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub label: Style,
}

impl Theme {
    /// Colors only when stdout is a terminal and `NO_COLOR` is unset
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::for_output(console::Term::stdout().is_term(), no_color)
    }

    fn for_output(is_term: bool, no_color: bool) -> Self {
        if no_color || !is_term {
            return Self::default();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            label: Style::new().white().dimmed(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            label: Style::new(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_color_only_on_terminal_without_no_color() {
        let plain = |theme: &Theme| "Alpenblick".style(theme.header.clone()).to_string();

        assert_eq!(plain(&Theme::for_output(false, false)), "Alpenblick");
        assert_eq!(plain(&Theme::for_output(true, true)), "Alpenblick");
        assert_ne!(plain(&Theme::for_output(true, false)), "Alpenblick");
    }
}
