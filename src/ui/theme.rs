//! Visual theme and styling.

use console::Style;

#[derive(Debug, Clone)]
pub struct DevopsTheme {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub dim: Style,
    pub highlight: Style,
    pub header: Style,
    pub hint: Style,
}

impl Default for DevopsTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl DevopsTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            hint: Style::new().cyan().dim(),
        }
    }

    /// No colors (non-TTY or `--no-color`).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            hint: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_hint(&self, msg: &str) -> String {
        format!("{}", self.hint.apply_to(format!("→ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }
}

/// Colors are off when `NO_COLOR` is set or stdout is not a terminal.
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_keeps_icons() {
        let theme = DevopsTheme::plain();
        assert_eq!(theme.format_success("done"), "✓ done");
        assert_eq!(theme.format_warning("careful"), "⚠ careful");
        assert_eq!(theme.format_error("failed"), "✗ failed");
        assert_eq!(theme.format_hint("retry"), "→ retry");
    }

    #[test]
    fn header_contains_title() {
        assert!(DevopsTheme::new().format_header("Tools").contains("Tools"));
    }
}
