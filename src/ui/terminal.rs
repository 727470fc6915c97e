//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{should_use_colors, DevopsTheme, OutputMode, UserInterface};

pub struct TerminalUI {
    term: Term,
    theme: DevopsTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            DevopsTheme::new()
        } else {
            DevopsTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        // stderr so piped output stays clean.
        writeln!(Term::stderr(), "{}", self.theme.format_error(msg)).ok();
    }

    fn hint(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "  {}", self.theme.format_hint(msg)).ok();
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }
}
