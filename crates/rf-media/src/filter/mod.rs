//! Edits applied to a [`Media`](crate::Media) and the structures that order
//! and connect them.
//!
//! A [`Filter`] turns itself into option fragments. A [`FilterChain`] orders
//! filters by priority and collapses their filter tokens into one ffmpeg
//! filter expression. A [`FilterGraph`] holds several chains, connects them
//! through labelled pads and flattens everything into one [`OptionMap`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use rf_core::{Error, Format, OptionMap, Result, StreamMask};

use crate::media::Media;

pub mod builtin;
pub mod chain;
pub mod graph;

pub use chain::{collapse, ChainPads, FilterChain};
pub use graph::{BoundFragments, ChainId, FilterGraph};

/// Highest priority accepted by chains and graphs.
pub const MAX_PRIORITY: u32 = 99;

pub(crate) fn check_priority(priority: u32) -> Result<()> {
    if priority > MAX_PRIORITY {
        return Err(Error::configuration(format!(
            "filter priority must be between 0 and {MAX_PRIORITY}, got {priority}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// An atomic edit.
///
/// Filters are immutable once built and are shared between cloned media
/// handles.
pub trait Filter: fmt::Debug + Send + Sync {
    /// Short name used in log lines and errors.
    fn name(&self) -> &str;

    /// Stream kinds this edit applies to. A media accepts the filter when
    /// its kind shares at least one of them.
    fn kinds(&self) -> StreamMask;

    /// Produce the option fragments for this edit.
    fn apply(&self, ctx: &FilterContext<'_>) -> Result<OptionMap>;

    /// Additional sources this edit reads from (overlay images, ...).
    fn inputs(&self) -> Vec<&Media> {
        Vec::new()
    }
}

/// Everything a filter may look at while producing its fragments.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// The media the filter is attached to.
    pub media: &'a Media,
    /// The requested output format.
    pub format: &'a Format,
    /// Input numbering and pad labels of the command being composed.
    pub pads: &'a InputPads,
}

impl<'a> FilterContext<'a> {
    pub fn new(media: &'a Media, format: &'a Format, pads: &'a InputPads) -> Self {
        Self { media, format, pads }
    }
}

// ---------------------------------------------------------------------------
// Pads
// ---------------------------------------------------------------------------

/// Stream-type letter (`a`, `v`, `s`) of a filter option key.
pub fn pad_type(key: &str) -> char {
    let key = key.trim_start_matches('-');
    match key {
        "af" => 'a',
        "vf" => 'v',
        _ => match key.split_once(':').map(|(_, spec)| spec) {
            Some(spec) if spec.starts_with('a') => 'a',
            Some(spec) if spec.starts_with('s') => 's',
            _ => 'v',
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
struct InputEntry {
    source: PathBuf,
    outputs: BTreeMap<char, String>,
}

/// Numbering of the inputs of one command and the pads their filtered
/// output is available on.
///
/// Input 0 is the primary source. Sources are identified by path.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPads {
    inputs: Vec<InputEntry>,
}

impl InputPads {
    pub fn new(primary: &Path) -> Self {
        Self {
            inputs: vec![InputEntry {
                source: primary.to_path_buf(),
                outputs: BTreeMap::new(),
            }],
        }
    }

    /// Index of `source`, appending it as a new input when unknown.
    pub fn resolve(&mut self, source: &Path) -> usize {
        if let Some(i) = self.index_of(source) {
            return i;
        }
        self.inputs.push(InputEntry {
            source: source.to_path_buf(),
            outputs: BTreeMap::new(),
        });
        self.inputs.len() - 1
    }

    pub fn index_of(&self, source: &Path) -> Option<usize> {
        self.inputs.iter().position(|e| e.source == source)
    }

    /// Record the label carrying the filtered `stream_type` output of `input`.
    pub fn set_output(&mut self, input: usize, stream_type: char, label: String) {
        if let Some(entry) = self.inputs.get_mut(input) {
            entry.outputs.insert(stream_type, label);
        }
    }

    /// Pad to read `stream_type` of `source` from: its filtered output when
    /// one was recorded, the raw input stream otherwise.
    pub fn pad(&self, source: &Path, stream_type: char) -> Option<String> {
        let index = self.index_of(source)?;
        let entry = &self.inputs[index];
        Some(
            entry
                .outputs
                .get(&stream_type)
                .cloned()
                .unwrap_or_else(|| format!("[{index}:{stream_type}]")),
        )
    }

    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.inputs.iter().map(|e| e.source.as_path())
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Join `key=value` pairs with `:`, skipping absent values.
pub(crate) fn join_args<'a>(pairs: impl IntoIterator<Item = (&'a str, Option<String>)>) -> String {
    pairs
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| format!("{k}={v}")))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_types() {
        assert_eq!(pad_type("filter:a"), 'a');
        assert_eq!(pad_type("-filter:v"), 'v');
        assert_eq!(pad_type("filter"), 'v');
        assert_eq!(pad_type("af"), 'a');
        assert_eq!(pad_type("filter:s"), 's');
    }

    #[test]
    fn input_pads_resolve() {
        let mut pads = InputPads::new(Path::new("main.mp4"));
        assert_eq!(pads.resolve(Path::new("main.mp4")), 0);
        assert_eq!(pads.resolve(Path::new("logo.png")), 1);
        assert_eq!(pads.resolve(Path::new("logo.png")), 1);
        assert_eq!(pads.len(), 2);

        assert_eq!(pads.pad(Path::new("logo.png"), 'v').as_deref(), Some("[1:v]"));
        pads.set_output(1, 'v', "[s1v0]".into());
        assert_eq!(pads.pad(Path::new("logo.png"), 'v').as_deref(), Some("[s1v0]"));
        assert!(pads.pad(Path::new("other.png"), 'v').is_none());
    }

    #[test]
    fn priority_bounds() {
        assert!(check_priority(0).is_ok());
        assert!(check_priority(99).is_ok());
        assert!(matches!(check_priority(100), Err(Error::Configuration(_))));
    }

    #[test]
    fn args_skip_missing() {
        let args = join_args([
            ("volume", Some("0.5".to_string())),
            ("precision", None),
            ("eval", Some("once".to_string())),
        ]);
        assert_eq!(args, "volume=0.5:eval=once");
    }
}
