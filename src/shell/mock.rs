//! Scripted command runner for testing.
//!
//! `MockRunner` implements [`CommandRunner`] without touching the host.
//! Responses are matched by program name plus argument fragments; every
//! invocation is recorded for later assertion. Clones share state, so a
//! test can hand one clone to the engine and inspect the other.
//!
//! # Example
//!
//! ```
//! use devops_cli::shell::{CommandRunner, CommandSpec, MockResponse, MockRunner};
//!
//! let runner = MockRunner::new();
//! runner.respond("dpkg", &["-l", "curl"], MockResponse::Exit(1));
//!
//! assert!(!runner.succeeds(&CommandSpec::new("dpkg").args(["-l", "curl"])));
//! assert!(runner.succeeds(&CommandSpec::new("apt-get").arg("update")));
//! assert_eq!(runner.calls().len(), 2);
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::error::{DevopsError, Result};

use super::{CommandResult, CommandRunner, CommandSpec};

/// Scripted outcome of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    /// Exit 0 with the given stdout.
    Success(String),
    /// Exit with this code and no output.
    Exit(i32),
    /// Behave as if the time limit expired.
    TimedOut,
    /// Behave as if the executable is missing.
    NotFound,
}

#[derive(Debug, Clone)]
struct Rule {
    program: String,
    fragments: Vec<String>,
    response: MockResponse,
}

impl Rule {
    fn matches(&self, spec: &CommandSpec) -> bool {
        self.program == spec.program
            && self
                .fragments
                .iter()
                .all(|fragment| spec.args.iter().any(|arg| arg == fragment))
    }
}

#[derive(Debug)]
struct State {
    rules: Vec<Rule>,
    default: MockResponse,
    calls: Vec<CommandSpec>,
}

/// Mock command runner for testing.
#[derive(Debug, Clone)]
pub struct MockRunner {
    state: Rc<RefCell<State>>,
}

impl MockRunner {
    /// Every unmatched command succeeds with empty output.
    pub fn new() -> Self {
        Self::with_default(MockResponse::Success(String::new()))
    }

    /// Every unmatched command fails with exit code 1.
    pub fn failing() -> Self {
        Self::with_default(MockResponse::Exit(1))
    }

    pub fn with_default(default: MockResponse) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                rules: Vec::new(),
                default,
                calls: Vec::new(),
            })),
        }
    }

    /// Script a response for `program` when its arguments include every
    /// fragment. Later rules take precedence over earlier ones.
    pub fn respond(&self, program: &str, fragments: &[&str], response: MockResponse) {
        self.state.borrow_mut().rules.push(Rule {
            program: program.to_string(),
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            response,
        });
    }

    /// All recorded invocations, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.state.borrow().calls.clone()
    }

    /// Rendered command lines of all invocations.
    pub fn command_lines(&self) -> Vec<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .map(CommandSpec::display)
            .collect()
    }

    /// Check if any invocation ran `program`.
    pub fn ran(&self, program: &str) -> bool {
        self.state
            .borrow()
            .calls
            .iter()
            .any(|c| c.program == program)
    }

    /// Check if any rendered command line contains `text`.
    pub fn ran_line(&self, text: &str) -> bool {
        self.command_lines().iter().any(|line| line.contains(text))
    }

    /// Clear recorded invocations, keeping scripted rules.
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        let response = {
            let mut state = self.state.borrow_mut();
            state.calls.push(spec.clone());
            state
                .rules
                .iter()
                .rev()
                .find(|rule| rule.matches(spec))
                .map(|rule| rule.response.clone())
                .unwrap_or_else(|| state.default.clone())
        };

        match response {
            MockResponse::Success(stdout) => {
                Ok(CommandResult::success(stdout, String::new(), Duration::ZERO))
            }
            MockResponse::Exit(code) if spec.accepts(Some(code)) => Ok(CommandResult {
                exit_code: Some(code),
                stdout: String::new(),
                stderr: String::new(),
                duration: Duration::ZERO,
                success: true,
            }),
            MockResponse::Exit(code) => Ok(CommandResult::failure(
                Some(code),
                String::new(),
                format!("exit status {}", code),
                Duration::ZERO,
            )),
            MockResponse::TimedOut => Err(DevopsError::CommandTimedOut {
                command: spec.display(),
                timeout_secs: spec.timeout.as_secs(),
            }),
            MockResponse::NotFound => Err(DevopsError::CommandNotFound {
                program: spec.program.clone(),
            }),
        }
    }
}
