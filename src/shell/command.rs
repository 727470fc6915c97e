//! External command execution.
//!
//! Commands are described as a program plus an argument vector and never
//! pass through a shell. Elevation and time limits are part of the
//! description, so every caller gets the same enforcement.

use crate::error::{DevopsError, Result};
use crate::platform::is_elevated;
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A command to run: program, arguments and execution constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
    /// Data written to the child's standard input.
    pub stdin: Option<String>,
    /// Needs root/administrator rights.
    pub elevated: bool,
    /// Hard limit; the child is killed when it expires.
    pub timeout: Duration,
    /// Non-zero exit codes that still count as success.
    pub accepted_codes: Vec<i32>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            stdin: None,
            elevated: false,
            timeout: DEFAULT_TIMEOUT,
            accepted_codes: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn elevated(mut self) -> Self {
        self.elevated = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn accept_codes(mut self, codes: &[i32]) -> Self {
        self.accepted_codes.extend_from_slice(codes);
        self
    }

    /// Render for logs and messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("'{}'", part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// True when `code` counts as success for this command.
    pub fn accepts(&self, code: Option<i32>) -> bool {
        match code {
            Some(0) => true,
            Some(code) => self.accepted_codes.contains(&code),
            None => false,
        }
    }
}

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the exit code counts as success.
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Last non-empty line of stderr (or stdout), for error messages.
    pub fn summary(&self) -> String {
        [&self.stderr, &self.stdout]
            .into_iter()
            .find_map(|s| s.lines().rev().find(|l| !l.trim().is_empty()))
            .map(|l| l.trim().to_string())
            .unwrap_or_default()
    }
}

/// Executes commands. Implemented by [`SystemRunner`] and, for tests,
/// by [`MockRunner`](super::MockRunner).
pub trait CommandRunner {
    /// Run to completion.
    ///
    /// Non-zero exits are reported through [`CommandResult::success`];
    /// errors are reserved for commands that could not run to completion
    /// (missing executable, timeout, IO failure).
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult>;

    /// Run and report only whether the command succeeded.
    fn succeeds(&self, spec: &CommandSpec) -> bool {
        self.run(spec).map(|r| r.success).unwrap_or(false)
    }
}

/// Runs commands on the host.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    use_sudo: bool,
}

impl SystemRunner {
    /// Elevated commands are prefixed with `sudo` on Unix when the process
    /// is not already root.
    pub fn new() -> Self {
        Self {
            use_sudo: cfg!(unix) && !is_elevated(),
        }
    }

    fn build(&self, spec: &CommandSpec) -> Command {
        if spec.elevated && self.use_sudo {
            // sudo resets the environment, so variables go on its command line.
            let mut cmd = Command::new("sudo");
            for (key, value) in &spec.env {
                cmd.arg(format!("{}={}", key, value));
            }
            cmd.arg(&spec.program);
            cmd.args(&spec.args);
            return cmd;
        }

        if spec.elevated && cfg!(windows) && !is_elevated() {
            warn!(
                "'{}' needs an administrator shell; continuing without elevation",
                spec.display()
            );
        }

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }
        cmd
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        let start = Instant::now();
        let mut cmd = self.build(spec);
        debug!(
            "Running{} (timeout {}s): {}",
            if spec.elevated { " elevated" } else { "" },
            spec.timeout.as_secs(),
            spec.display()
        );

        cmd.stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DevopsError::CommandNotFound {
                    program: spec.program.clone(),
                }
            } else {
                DevopsError::Io(e)
            }
        })?;

        if let Some(input) = &spec.stdin {
            feed_stdin(&mut child, input)?;
        }

        let stdout_handle = child.stdout.take().map(spawn_reader);
        let stderr_handle = child.stderr.take().map(spawn_reader);

        let status = match wait_with_deadline(&mut child, start + spec.timeout)? {
            Some(status) => status,
            None => {
                warn!(
                    "Killed after {}s: {}",
                    spec.timeout.as_secs(),
                    spec.display()
                );
                return Err(DevopsError::CommandTimedOut {
                    command: spec.display(),
                    timeout_secs: spec.timeout.as_secs(),
                });
            }
        };

        let stdout = join_reader(stdout_handle);
        let stderr = join_reader(stderr_handle);
        let duration = start.elapsed();

        if spec.accepts(status.code()) {
            Ok(CommandResult {
                exit_code: status.code(),
                stdout,
                stderr,
                duration,
                success: true,
            })
        } else {
            debug!("Exit code {:?}: {}", status.code(), spec.display());
            Ok(CommandResult::failure(
                status.code(),
                stdout,
                stderr,
                duration,
            ))
        }
    }
}

/// Write `input` to the child and close its stdin. If the write fails the
/// child is killed and reaped before the error is returned.
fn feed_stdin(child: &mut Child, input: &str) -> std::io::Result<()> {
    let Some(mut pipe) = child.stdin.take() else {
        return Ok(());
    };
    if let Err(e) = pipe.write_all(input.as_bytes()) {
        let _ = child.kill();
        let _ = child.wait();
        return Err(e);
    }
    Ok(())
}

/// Poll until the child exits or the deadline passes. On expiry the child
/// is killed and `None` is returned.
fn wait_with_deadline(
    child: &mut Child,
    deadline: Instant,
) -> Result<Option<std::process::ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            // An elevated child may refuse the signal; only reap what was killed.
            if child.kill().is_ok() {
                let _ = child.wait();
            }
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).to_string()
    })
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
