//! Output extension to muxer name table, used for `-f`.

use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN: &[(&str, &str)] = &[
    ("mp3", "mp3"),
    ("aac", "adts"),
    ("oga", "ogg"),
    ("ogg", "ogg"),
    ("mkv", "matroska"),
    ("webm", "webm"),
    ("mp4", "mp4"),
    ("m4a", "ipod"),
    ("flv", "flv"),
    ("wav", "wav"),
    ("flac", "flac"),
    ("gif", "gif"),
    ("jpg", "image2"),
    ("jpeg", "image2"),
    ("png", "image2"),
    ("bmp", "image2"),
    ("ppm", "image2"),
    ("srt", "srt"),
    ("ass", "ass"),
    ("vtt", "webvtt"),
];

/// Maps format names to the muxer passed with `-f`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForceFormatTable {
    entries: BTreeMap<String, String>,
}

impl Default for ForceFormatTable {
    fn default() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(ext, muxer)| (ext.to_string(), muxer.to_string()))
                .collect(),
        }
    }
}

impl ForceFormatTable {
    /// Built-in entries with `overrides` applied on top.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut table = Self::default();
        for (ext, muxer) in overrides {
            let ext = ext.trim_start_matches('.').to_ascii_lowercase();
            if muxer.trim().is_empty() {
                table.entries.remove(&ext);
            } else {
                table.entries.insert(ext, muxer.trim().to_string());
            }
        }
        table
    }

    pub fn get(&self, extension: &str) -> Option<&str> {
        self.entries
            .get(&extension.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Muxer for the extension of `output`, if known.
    pub fn lookup(&self, output: &Path) -> Option<&str> {
        let ext = output.extension()?.to_str()?;
        self.get(ext)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup() {
        let table = ForceFormatTable::default();
        assert_eq!(table.lookup(Path::new("/tmp/out.MP3")), Some("mp3"));
        assert_eq!(table.lookup(Path::new("a.aac")), Some("adts"));
        assert_eq!(table.lookup(Path::new("frame.png")), Some("image2"));
        assert_eq!(table.lookup(Path::new("subs.vtt")), Some("webvtt"));
        assert_eq!(table.lookup(Path::new("noext")), None);
        assert_eq!(table.lookup(Path::new("x.xyz")), None);
    }

    #[test]
    fn overrides_apply_on_top() {
        let mut overrides = BTreeMap::new();
        overrides.insert(".m4v".to_string(), "mp4".to_string());
        overrides.insert("gif".to_string(), String::new());
        overrides.insert("mkv".to_string(), "webm".to_string());
        let table = ForceFormatTable::with_overrides(&overrides);
        assert_eq!(table.get("m4v"), Some("mp4"));
        assert_eq!(table.get("gif"), None);
        assert_eq!(table.get("mkv"), Some("webm"));
    }
}
