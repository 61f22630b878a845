//! Elementary streams and the index-keyed collection that holds them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::path::{Path, PathBuf};

use crate::codec::Codec;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// StreamKind
// ---------------------------------------------------------------------------

/// The kind of an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Audio,
    Frame,
    Video,
    Subtitle,
}

impl StreamKind {
    /// Bit of this kind inside a [`StreamMask`].
    pub const fn bit(self) -> u8 {
        match self {
            Self::Audio => 1,
            Self::Frame => 2,
            Self::Video => 4,
            Self::Subtitle => 8,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Frame => write!(f, "frame"),
            Self::Video => write!(f, "video"),
            Self::Subtitle => write!(f, "subtitle"),
        }
    }
}

// ---------------------------------------------------------------------------
// StreamMask
// ---------------------------------------------------------------------------

/// Bitmask selecting stream kinds: `AUDIO=1 | FRAME=2 | VIDEO=4 | SUBTITLE=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StreamMask(u8);

impl StreamMask {
    pub const NONE: StreamMask = StreamMask(0);
    pub const AUDIO: StreamMask = StreamMask(1);
    pub const FRAME: StreamMask = StreamMask(2);
    pub const VIDEO: StreamMask = StreamMask(4);
    pub const SUBTITLE: StreamMask = StreamMask(8);
    pub const ALL: StreamMask = StreamMask(15);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, kind: StreamKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// True when the two masks share at least one kind.
    pub const fn intersects(self, other: StreamMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl From<StreamKind> for StreamMask {
    fn from(kind: StreamKind) -> Self {
        StreamMask(kind.bit())
    }
}

impl BitOr for StreamMask {
    type Output = StreamMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        StreamMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for StreamMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ---------------------------------------------------------------------------
// Stream
// ---------------------------------------------------------------------------

/// One elementary stream of a source file.
///
/// Streams are built once from probe data through [`StreamBuilder`] and are
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    index: usize,
    kind: StreamKind,
    source: PathBuf,
    codec: Option<Codec>,
    profile: Option<String>,
    bitrate: u64,
    start_time: f64,
    duration: f64,
    channels: Option<u32>,
    frequency: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
    frame_rate: Option<f64>,
    tags: BTreeMap<String, String>,
}

impl Stream {
    /// Start building a stream of `kind` at `index` within `source`.
    pub fn builder(index: usize, kind: StreamKind, source: impl Into<PathBuf>) -> StreamBuilder {
        StreamBuilder {
            stream: Stream {
                index,
                kind,
                source: source.into(),
                codec: None,
                profile: None,
                bitrate: 0,
                start_time: 0.0,
                duration: 0.0,
                channels: None,
                frequency: None,
                width: None,
                height: None,
                frame_rate: None,
                tags: BTreeMap::new(),
            },
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Path of the file this stream belongs to.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn codec(&self) -> Option<&Codec> {
        self.codec.as_ref()
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn bitrate(&self) -> u64 {
        self.bitrate
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn channels(&self) -> Option<u32> {
        self.channels
    }

    pub fn frequency(&self) -> Option<u32> {
        self.frequency
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }
}

/// Builder for [`Stream`]; all range checks happen in [`StreamBuilder::build`].
#[derive(Debug, Clone)]
pub struct StreamBuilder {
    stream: Stream,
}

impl StreamBuilder {
    pub fn codec(mut self, codec: Codec) -> Self {
        self.stream.codec = Some(codec);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.stream.profile = Some(profile.into());
        self
    }

    pub fn bitrate(mut self, bitrate: u64) -> Self {
        self.stream.bitrate = bitrate;
        self
    }

    pub fn start_time(mut self, seconds: f64) -> Self {
        self.stream.start_time = seconds;
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.stream.duration = seconds;
        self
    }

    pub fn channels(mut self, channels: u32) -> Self {
        self.stream.channels = Some(channels);
        self
    }

    pub fn frequency(mut self, frequency: u32) -> Self {
        self.stream.frequency = Some(frequency);
        self
    }

    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.stream.width = Some(width);
        self.stream.height = Some(height);
        self
    }

    pub fn frame_rate(mut self, fps: f64) -> Self {
        self.stream.frame_rate = Some(fps);
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.stream.tags.insert(key.into(), value.into());
        self
    }

    /// Validate and produce the stream.
    pub fn build(self) -> Result<Stream> {
        let s = self.stream;
        let at = |field: &str| format!("stream #{} {field}", s.index);

        if !s.duration.is_finite() || s.duration < 0.0 {
            return Err(Error::validation(format!(
                "{} must be a non-negative number, got {}",
                at("duration"),
                s.duration
            )));
        }
        if !s.start_time.is_finite() {
            return Err(Error::validation(format!("{} must be finite", at("start_time"))));
        }
        if s.channels == Some(0) {
            return Err(Error::validation(format!("{} must be at least 1", at("channels"))));
        }
        if s.frequency == Some(0) {
            return Err(Error::validation(format!("{} must be at least 1", at("frequency"))));
        }
        if s.width == Some(0) || s.height == Some(0) {
            return Err(Error::validation(format!("{} must be at least 1x1", at("dimensions"))));
        }
        if let Some(fps) = s.frame_rate {
            if !fps.is_finite() || fps < 0.0 {
                return Err(Error::validation(format!(
                    "{} must be a non-negative number, got {fps}",
                    at("frame_rate")
                )));
            }
        }
        Ok(s)
    }
}

// ---------------------------------------------------------------------------
// StreamCollection
// ---------------------------------------------------------------------------

/// Streams keyed by their index, iterated in index order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamCollection {
    streams: BTreeMap<usize, Stream>,
}

impl StreamCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection, failing on the first duplicate index.
    pub fn from_streams(streams: impl IntoIterator<Item = Stream>) -> Result<Self> {
        let mut collection = Self::new();
        for stream in streams {
            collection.insert(stream)?;
        }
        Ok(collection)
    }

    /// Add a stream. Indices must stay unique within the collection.
    pub fn insert(&mut self, stream: Stream) -> Result<()> {
        if self.streams.contains_key(&stream.index) {
            return Err(Error::validation(format!(
                "stream index {} is already present",
                stream.index
            )));
        }
        self.streams.insert(stream.index, stream);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Stream> {
        self.streams.get(&index)
    }

    /// A new collection with only the streams whose kind is in `mask`.
    pub fn filter(&self, mask: StreamMask) -> StreamCollection {
        let streams = self
            .streams
            .iter()
            .filter(|(_, s)| mask.contains(s.kind))
            .map(|(i, s)| (*i, s.clone()))
            .collect();
        StreamCollection { streams }
    }

    /// First stream (lowest index) of the given kind.
    pub fn first_of(&self, kind: StreamKind) -> Option<&Stream> {
        self.iter().find(|s| s.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stream> {
        self.streams.values()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl<'a> IntoIterator for &'a StreamCollection {
    type Item = &'a Stream;
    type IntoIter = std::collections::btree_map::Values<'a, usize, Stream>;

    fn into_iter(self) -> Self::IntoIter {
        self.streams.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn stream(index: usize, kind: StreamKind) -> Stream {
        Stream::builder(index, kind, "/media/in.mkv").build().unwrap()
    }

    #[test]
    fn mask_bits() {
        let av = StreamMask::AUDIO | StreamMask::VIDEO;
        assert_eq!(av.bits(), 5);
        assert!(av.contains(StreamKind::Audio));
        assert!(av.contains(StreamKind::Video));
        assert!(!av.contains(StreamKind::Frame));
        assert_eq!(StreamMask::ALL.bits(), 15);
    }

    #[test]
    fn negative_duration_rejected() {
        let err = Stream::builder(0, StreamKind::Audio, "a.mp3")
            .duration(-1.0)
            .build()
            .unwrap_err();
        assert_matches!(err, Error::Validation(_));
    }

    #[test]
    fn zero_channels_rejected() {
        let result = Stream::builder(0, StreamKind::Audio, "a.mp3").channels(0).build();
        assert_matches!(result, Err(Error::Validation(_)));
    }

    #[test]
    fn duplicate_index_rejected() {
        let err = StreamCollection::from_streams([
            stream(0, StreamKind::Video),
            stream(0, StreamKind::Audio),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("stream index 0"));
    }

    #[test]
    fn filter_by_mask_keeps_order() {
        let collection = StreamCollection::from_streams([
            stream(2, StreamKind::Subtitle),
            stream(0, StreamKind::Video),
            stream(1, StreamKind::Audio),
            stream(3, StreamKind::Audio),
        ])
        .unwrap();

        let audio = collection.filter(StreamMask::AUDIO);
        let indices: Vec<usize> = audio.iter().map(Stream::index).collect();
        assert_eq!(indices, vec![1, 3]);

        let all: Vec<usize> = collection.iter().map(Stream::index).collect();
        assert_eq!(all, vec![0, 1, 2, 3]);

        assert!(collection.filter(StreamMask::FRAME).is_empty());
        assert_eq!(collection.first_of(StreamKind::Audio).unwrap().index(), 1);
    }
}
