//! List command implementation.
//!
//! The `devops-cli list` command lists the supported tools.

use crate::error::Result;
use crate::tools::ToolIdentity;
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
#[derive(Debug, Default)]
pub struct ListCommand;

impl ListCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for ListCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.show_header("Supported tools");

        let mut table = Table::new(&["TOOL", "DESCRIPTION"]);
        for tool in ToolIdentity::ALL {
            table.add_row([tool.as_str(), tool.description()]);
        }
        for line in table.render() {
            ui.message(&line);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    #[test]
    fn lists_every_tool_in_catalog_order() {
        let mut ui = MockUI::new();
        let result = ListCommand::new().execute(&mut ui).unwrap();

        assert!(result.success);
        // Header row plus one row per tool.
        assert_eq!(ui.messages().len(), 1 + ToolIdentity::ALL.len());
        assert!(ui.messages()[1].starts_with("docker"));
        assert!(ui.messages()[9].starts_with("terraform"));
    }
}
