//! Unified error type for reelforge.
//!
//! Every crate in the workspace funnels its failures into [`Error`]. Nothing
//! is retried internally: each variant surfaces to the caller as-is.

/// Unified error type covering all failure modes in reelforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller supplied an unusable request (missing output, bad priority).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A value violated a format, stream or filter invariant.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Probe output could not be turned into a format and streams.
    #[error("Probe error: {0}")]
    Probe(String),

    /// A transcoding pass exited with a non-zero status.
    #[error("Pass {pass} failed with exit code {}: {}", display_code(.exit_code), .args.join(" "))]
    ExecutionFailure {
        /// 1-based pass number that failed.
        pass: u32,
        /// Exit code, `None` when the process was killed by a signal.
        exit_code: Option<i32>,
        /// Full argument vector of the failing pass.
        args: Vec<String>,
        /// Captured standard error (may be empty).
        stderr: String,
    },

    /// An external tool could not be located or spawned.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

impl Error {
    /// Short class name used in log lines.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::Validation(_) => "validation",
            Error::Probe(_) => "probe",
            Error::ExecutionFailure { .. } => "execution",
            Error::Tool { .. } => "tool",
            Error::Io { .. } => "io",
        }
    }

    /// Convenience constructor for [`Error::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Convenience constructor for [`Error::Probe`].
    pub fn probe(message: impl Into<String>) -> Self {
        Error::Probe(message.into())
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
