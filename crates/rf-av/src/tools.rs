//! External tool discovery.
//!
//! The [`ToolRegistry`] locates ffmpeg and ffprobe once, preferring the
//! paths from [`ToolsConfig`] and falling back to `PATH`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rf_core::config::ToolsConfig;
use rf_core::{Error, Result};
use serde::{Deserialize, Serialize};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

const KNOWN_TOOLS: &[&str] = &[FFMPEG, FFPROBE];

/// A discovered tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub name: String,
    pub path: PathBuf,
}

/// Availability information returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of the `-version` output.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Known external tools by name.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolConfig>,
}

impl ToolRegistry {
    /// Resolve every known tool. A configured path is used when it exists;
    /// otherwise the tool is looked up on `PATH`. Missing tools are left out.
    pub fn discover(config: &ToolsConfig) -> Self {
        let mut tools = HashMap::new();

        for &name in KNOWN_TOOLS {
            let custom = match name {
                FFMPEG => config.ffmpeg_path.as_deref(),
                FFPROBE => config.ffprobe_path.as_deref(),
                _ => None,
            };

            let resolved = match custom {
                Some(p) if p.exists() => Some(p.to_path_buf()),
                Some(p) => {
                    tracing::warn!("{name} not found at {}; searching PATH", p.display());
                    which::which(name).ok()
                }
                None => which::which(name).ok(),
            };

            match resolved {
                Some(path) => {
                    tracing::debug!("{name} resolved to {}", path.display());
                    tools.insert(
                        name.to_string(),
                        ToolConfig {
                            name: name.to_string(),
                            path,
                        },
                    );
                }
                None => tracing::debug!("{name} not found"),
            }
        }

        Self { tools }
    }

    /// Register a tool at an explicit path.
    pub fn with_tool(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.tools.insert(
            name.to_string(),
            ToolConfig {
                name: name.to_string(),
                path: path.into(),
            },
        );
        self
    }

    /// The [`ToolConfig`] of `name`, or [`Error::Tool`] when it was not found.
    pub fn require(&self, name: &str) -> Result<&ToolConfig> {
        self.tools
            .get(name)
            .ok_or_else(|| Error::tool(name, format!("{name} not found; is it installed and in PATH?")))
    }

    pub fn ffmpeg(&self) -> Result<&Path> {
        self.require(FFMPEG).map(|t| t.path.as_path())
    }

    pub fn ffprobe(&self) -> Result<&Path> {
        self.require(FFPROBE).map(|t| t.path.as_path())
    }

    /// Check all known tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        KNOWN_TOOLS
            .iter()
            .map(|&name| match self.tools.get(name) {
                Some(cfg) => ToolInfo {
                    name: name.to_string(),
                    available: true,
                    version: detect_version(&cfg.path),
                    path: Some(cfg.path.clone()),
                },
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ToolConfig)> {
        self.tools.iter()
    }
}

/// Run `<tool> -version` and return the first line of stdout.
fn detect_version(path: &Path) -> Option<String> {
    let output = std::process::Command::new(path).arg("-version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn discover_with_default_config() {
        let registry = ToolRegistry::discover(&ToolsConfig::default());
        // Nothing is guaranteed to be installed; the call must not panic.
        let infos = registry.check_all();
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, [FFMPEG, FFPROBE]);
    }

    #[test]
    fn require_missing_tool() {
        let registry = ToolRegistry::default();
        assert_matches!(registry.require("nonexistent_tool_xyz"), Err(Error::Tool { .. }));
        assert!(registry.ffmpeg().is_err());
    }

    #[test]
    fn explicit_tool() {
        let registry = ToolRegistry::default().with_tool(FFMPEG, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(registry.ffmpeg().unwrap(), Path::new("/opt/ffmpeg/bin/ffmpeg"));
    }

    #[test]
    fn missing_configured_path_falls_back() {
        let config = ToolsConfig {
            ffmpeg_path: Some(PathBuf::from("/definitely/not/ffmpeg")),
            ffprobe_path: None,
        };
        let registry = ToolRegistry::discover(&config);
        if let Ok(path) = registry.ffmpeg() {
            assert_ne!(path, Path::new("/definitely/not/ffmpeg"));
        }
    }

    #[test]
    fn tool_config_serialization() {
        let cfg = ToolConfig {
            name: FFMPEG.to_string(),
            path: PathBuf::from("/usr/bin/ffmpeg"),
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ToolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
