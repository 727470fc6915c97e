//! Shared rendering of installation outcomes.

use crate::install::Outcome;
use crate::ui::UserInterface;

/// Print an outcome: its message styled by result, then notices, then the
/// remediation hint after a failure.
pub fn show_outcome(ui: &mut dyn UserInterface, outcome: &Outcome) {
    if outcome.success {
        ui.success(&outcome.message);
    } else {
        ui.error(&format!(
            "{} {} failed: {}",
            outcome.action, outcome.tool, outcome.message
        ));
    }

    for notice in &outcome.notices {
        ui.warning(notice);
    }

    if ui.output_mode().shows_detail() {
        ui.message(&format!("  last state reached: {}", outcome.reached));
    }

    if let Some(hint) = &outcome.hint {
        ui.hint(hint);
    }
}
