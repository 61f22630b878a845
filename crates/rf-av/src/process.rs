//! Running composed commands.
//!
//! A [`ProcessRunner`] turns a [`PassCommand`] into a [`Process`]. The
//! default [`SystemRunner`] spawns the program directly; tests substitute a
//! runner that records commands instead.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use rf_core::{Error, Result};

// ---------------------------------------------------------------------------
// PassCommand
// ---------------------------------------------------------------------------

/// One invocation of the transcoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassCommand {
    /// 1-based pass number.
    pub pass: u32,
    pub total_passes: u32,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl PassCommand {
    /// Shell-style rendering for logs, quoting arguments where needed.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .map(|arg| quote(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

// ---------------------------------------------------------------------------
// Process
// ---------------------------------------------------------------------------

/// One ffmpeg invocation.
pub trait Process: Send {
    /// Launch the process. Calling it twice is a no-op.
    fn start(&mut self) -> Result<()>;

    /// Block until the process exits, starting it first if needed. Returns
    /// the exit code, `None` when the process was killed by a signal.
    fn wait(&mut self) -> Result<Option<i32>>;

    fn is_terminated(&self) -> bool;

    fn command_line(&self) -> String;

    /// Captured standard error, available once the process has exited.
    fn stderr(&self) -> &str {
        ""
    }
}

/// Creates a [`Process`] for each composed pass.
pub trait ProcessRunner: Send + Sync {
    fn create(&self, command: &PassCommand) -> Box<dyn Process>;
}

// ---------------------------------------------------------------------------
// SystemRunner
// ---------------------------------------------------------------------------

/// Spawns commands with [`std::process::Command`], stderr captured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn create(&self, command: &PassCommand) -> Box<dyn Process> {
        Box::new(SystemProcess::new(command.clone()))
    }
}

/// A child process spawned by [`SystemRunner`].
#[derive(Debug)]
pub struct SystemProcess {
    command: PassCommand,
    child: Option<Child>,
    exit: Option<Option<i32>>,
    stderr: String,
}

impl SystemProcess {
    pub fn new(command: PassCommand) -> Self {
        Self {
            command,
            child: None,
            exit: None,
            stderr: String::new(),
        }
    }

    fn tool_name(&self) -> String {
        self.command
            .program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.command.program.to_string_lossy().to_string())
    }
}

impl Process for SystemProcess {
    fn start(&mut self) -> Result<()> {
        if self.child.is_some() || self.exit.is_some() {
            return Ok(());
        }
        let child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::tool(self.tool_name(), format!("failed to spawn: {e}")))?;
        self.child = Some(child);
        Ok(())
    }

    fn wait(&mut self) -> Result<Option<i32>> {
        if let Some(exit) = self.exit {
            return Ok(exit);
        }
        self.start()?;
        let Some(child) = self.child.take() else {
            return Err(Error::tool(self.tool_name(), "process was not started"));
        };
        let output = child.wait_with_output()?;
        self.stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code();
        self.exit = Some(code);
        Ok(code)
    }

    fn is_terminated(&self) -> bool {
        self.exit.is_some()
    }

    fn command_line(&self) -> String {
        self.command.command_line()
    }

    fn stderr(&self) -> &str {
        &self.stderr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn command(program: &str, args: &[&str]) -> PassCommand {
        PassCommand {
            pass: 1,
            total_passes: 1,
            program: PathBuf::from(program),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn command_line_quotes() {
        let cmd = command(
            "/usr/bin/ffmpeg",
            &["-i", "/media/my movie.mp4", "-filter:v", "drawtext=text='a'", "/out.mp4"],
        );
        assert_eq!(
            cmd.command_line(),
            r"/usr/bin/ffmpeg -i '/media/my movie.mp4' -filter:v 'drawtext=text='\''a'\''' /out.mp4"
        );
    }

    #[test]
    fn spawn_failure_is_a_tool_error() {
        let mut process = SystemRunner.create(&command("/nonexistent/reelforge-ffmpeg", &[]));
        assert_matches!(process.start(), Err(Error::Tool { .. }));
        assert!(!process.is_terminated());
    }

    #[cfg(unix)]
    #[test]
    fn exit_code_and_stderr() {
        let mut process = SystemRunner.create(&command("sh", &["-c", "echo oops >&2; exit 3"]));
        assert_eq!(process.wait().unwrap(), Some(3));
        assert!(process.is_terminated());
        assert_eq!(process.stderr().trim(), "oops");
        // Waiting again returns the recorded code.
        assert_eq!(process.wait().unwrap(), Some(3));
    }
}
