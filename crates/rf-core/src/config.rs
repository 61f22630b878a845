//! Configuration types.
//!
//! The top-level [`Config`] is deserialized from JSON. Every section defaults
//! sensibly so an empty `{}` document is valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Tool locations and composition defaults, loaded from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub compose: ComposeConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::configuration(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None`, missing, or unreadable.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (name, path) in [
            ("tools.ffmpeg_path", &self.tools.ffmpeg_path),
            ("tools.ffprobe_path", &self.tools.ffprobe_path),
        ] {
            if let Some(p) = path {
                if !p.exists() {
                    warnings.push(format!(
                        "{name} '{}' does not exist; PATH lookup will be used",
                        p.display()
                    ));
                }
            }
        }

        if let Some(dir) = &self.compose.pass_log_dir {
            if !dir.is_dir() {
                warnings.push(format!(
                    "compose.pass_log_dir '{}' is not a directory",
                    dir.display()
                ));
            }
        }

        for (ext, format) in &self.compose.force_formats {
            if ext.starts_with('.') {
                warnings.push(format!(
                    "compose.force_formats key '{ext}' should not start with a dot"
                ));
            }
            if format.trim().is_empty() {
                warnings.push(format!("compose.force_formats['{ext}'] is empty"));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Paths to the external tools. Unset paths are looked up on `PATH`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
}

/// Command composition defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Encoder threads; 0 leaves the choice to the transcoder.
    pub threads: u32,
    /// Emit `-ignore_unknown` so unsupported streams are skipped.
    pub ignore_unknown: bool,
    /// Directory for two-pass log files; the system temp dir when unset.
    pub pass_log_dir: Option<PathBuf>,
    /// Extra or overriding `extension -> muxer` entries for `-f`.
    pub force_formats: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_json_is_valid() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.compose.threads, 0);
        assert!(config.tools.ffmpeg_path.is_none());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn partial_sections() {
        let config = Config::from_json(
            r#"{"compose": {"threads": 4, "force_formats": {"m4v": "mp4"}}}"#,
        )
        .unwrap();
        assert_eq!(config.compose.threads, 4);
        assert!(!config.compose.ignore_unknown);
        assert_eq!(config.compose.force_formats.get("m4v").map(String::as_str), Some("mp4"));
    }

    #[test]
    fn parse_error_is_configuration() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn load_or_default_missing_file() {
        let config = Config::load_or_default(Some(Path::new("/nonexistent/reelforge.json")));
        assert_eq!(config.compose.threads, 0);
        assert!(Config::load_or_default(None).compose.force_formats.is_empty());
    }

    #[test]
    fn load_or_default_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"compose": {{"ignore_unknown": true}}}}"#).unwrap();
        let config = Config::load_or_default(Some(file.path()));
        assert!(config.compose.ignore_unknown);
    }

    #[test]
    fn validate_warnings() {
        let mut config = Config::default();
        config.tools.ffmpeg_path = Some(PathBuf::from("/definitely/not/ffmpeg"));
        config.compose.force_formats.insert(".mp3".into(), "mp3".into());
        config.compose.force_formats.insert("xyz".into(), " ".into());
        let warnings = config.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("tools.ffmpeg_path"));
    }
}
