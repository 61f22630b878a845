//! FFprobe-based [`Prober`] implementation.
//!
//! Runs `ffprobe -loglevel quiet -print_format json -show_format
//! -show_streams -show_error -i <path>` and hands stdout to [`demux`].

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use rf_core::Error;

use crate::normalize::{demux, Demuxed};
use crate::prober::Prober;

/// A prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    /// Create a new prober using the given ffprobe path.
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self { ffprobe_path }
    }

    /// Create a prober that finds ffprobe on `PATH`.
    pub fn from_path() -> Option<Self> {
        which::which("ffprobe").ok().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.ffprobe_path
    }

    /// Argument vector passed to ffprobe for `path`.
    pub fn args(path: &Path) -> Vec<String> {
        let mut args: Vec<String> = [
            "-loglevel",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            "-show_error",
            "-i",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(path.to_string_lossy().into_owned());
        args
    }
}

impl Prober for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    fn probe(&self, path: &Path) -> rf_core::Result<Demuxed> {
        tracing::info!("Probing {} with {}", path.display(), self.ffprobe_path.display());

        let output = Command::new(&self.ffprobe_path)
            .args(Self::args(path))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::tool("ffprobe", format!("failed to run: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        // With -show_error a failed probe still prints a JSON error object.
        if stdout.trim().is_empty() && !output.status.success() {
            return Err(Error::tool(
                "ffprobe",
                format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        demux(path, &stdout)
    }
}
