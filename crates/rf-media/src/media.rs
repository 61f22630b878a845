//! The handle edits are attached to.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rf_core::{Error, Format, FormatKind, Result, Stream, StreamCollection, StreamMask};
use rf_probe::{Demuxed, Prober};

use crate::filter::{ChainId, Filter, FilterChain, FilterGraph};

/// A source file with its probed format and streams, plus the edits to
/// apply when it is transcoded.
///
/// Cloning is cheap: filters are shared, the graph itself is copied so each
/// clone can be edited independently.
#[derive(Debug, Clone)]
pub struct Media {
    source: PathBuf,
    format: Format,
    streams: StreamCollection,
    graph: FilterGraph,
}

impl Media {
    pub fn new(source: impl Into<PathBuf>, format: Format, streams: StreamCollection) -> Result<Self> {
        let source = source.into();
        if streams.is_empty() {
            return Err(Error::validation(format!(
                "media {} has no streams",
                source.display()
            )));
        }
        Ok(Self {
            source,
            format,
            streams,
            graph: FilterGraph::new(),
        })
    }

    pub fn from_demuxed(source: impl Into<PathBuf>, demuxed: Demuxed) -> Result<Self> {
        Self::new(source, demuxed.format, demuxed.streams)
    }

    /// Probe `source` and wrap the result.
    pub fn open(source: impl AsRef<Path>, prober: &dyn Prober) -> Result<Self> {
        let source = source.as_ref();
        tracing::info!("Probing {} with {}", source.display(), prober.name());
        let demuxed = prober.probe(source)?;
        tracing::debug!(
            "{}: {} ({}), {} stream(s)",
            source.display(),
            demuxed.format,
            demuxed.format_name,
            demuxed.streams.len()
        );
        Self::from_demuxed(source, demuxed)
    }

    // -- Accessors -----------------------------------------------------------

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn kind(&self) -> FormatKind {
        self.format.kind()
    }

    /// Duration in seconds: the container's when known, the longest stream's
    /// otherwise. 0 when nothing reports one.
    pub fn duration(&self) -> f64 {
        if self.format.duration() > 0.0 {
            return self.format.duration();
        }
        self.streams
            .iter()
            .map(Stream::duration)
            .fold(0.0, f64::max)
    }

    pub fn streams(&self) -> &StreamCollection {
        &self.streams
    }

    pub fn streams_of(&self, mask: StreamMask) -> StreamCollection {
        self.streams.filter(mask)
    }

    pub fn filters(&self) -> &FilterGraph {
        &self.graph
    }

    // -- Edits ---------------------------------------------------------------

    fn check_kinds(&self, name: &str, kinds: StreamMask) -> Result<()> {
        if kinds.intersects(self.kind().accepts()) {
            return Ok(());
        }
        Err(Error::validation(format!(
            "the {name} filter cannot be applied to {} media {}",
            self.kind(),
            self.source.display()
        )))
    }

    /// Add an edit to the default chain.
    pub fn add_filter(&mut self, filter: impl Filter + 'static, priority: u32) -> Result<&mut Self> {
        self.add_shared_filter(Arc::new(filter), priority)
    }

    pub fn add_shared_filter(&mut self, filter: Arc<dyn Filter>, priority: u32) -> Result<&mut Self> {
        self.check_kinds(filter.name(), filter.kinds())?;
        self.graph.insert_shared(filter, priority)?;
        Ok(self)
    }

    /// Add a chain as its own graph node, to be linked with [`Media::link`].
    pub fn add_chain(&mut self, chain: FilterChain, priority: u32) -> Result<ChainId> {
        for filter in chain.filters() {
            self.check_kinds(filter.name(), filter.kinds())?;
        }
        self.graph.insert_chain(chain, priority)
    }

    pub fn link(&mut self, from: ChainId, to: ChainId, pad: &str) -> Result<&mut Self> {
        self.graph.link(from, to, pad)?;
        Ok(self)
    }

    pub fn add_stream(&mut self, stream: Stream) -> Result<&mut Self> {
        self.streams.insert(stream)?;
        Ok(self)
    }

    /// An independent handle restricted to the streams in `mask`. Edits are
    /// carried over.
    pub fn select_streams(&self, mask: StreamMask) -> Result<Media> {
        let streams = self.streams.filter(mask);
        if streams.is_empty() {
            return Err(Error::validation(format!(
                "no streams of {} match the selection",
                self.source.display()
            )));
        }
        Ok(Self {
            streams,
            ..self.clone()
        })
    }

    /// The same source with no edits.
    pub fn without_filters(&self) -> Media {
        Self {
            graph: FilterGraph::new(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::filter::builtin::{Crop, Cut, Volume};
    use assert_matches::assert_matches;
    use rf_core::{Codec, Dimension, Point, StreamKind, Timecode};

    /// One minute of stereo mp3.
    pub(crate) fn audio_media() -> Media {
        let mut format = Format::mp3();
        format.set_duration(60.0).unwrap();
        let stream = Stream::builder(0, StreamKind::Audio, "/media/song.mp3")
            .codec(Codec::from_code("mp3").unwrap())
            .channels(2)
            .frequency(44_100)
            .duration(60.0)
            .build()
            .unwrap();
        Media::new(
            "/media/song.mp3",
            format,
            StreamCollection::from_streams([stream]).unwrap(),
        )
        .unwrap()
    }

    /// Two minutes of 1080p video with a stereo track.
    pub(crate) fn video_media() -> Media {
        let mut format = Format::video();
        format.set_dimensions(1920, 1080).unwrap();
        format.set_duration(120.0).unwrap();
        let video = Stream::builder(0, StreamKind::Video, "/media/movie.mp4")
            .codec(Codec::from_code("h264").unwrap())
            .dimensions(1920, 1080)
            .frame_rate(25.0)
            .duration(120.0)
            .build()
            .unwrap();
        let audio = Stream::builder(1, StreamKind::Audio, "/media/movie.mp4")
            .codec(Codec::from_code("aac").unwrap())
            .channels(2)
            .frequency(48_000)
            .duration(120.0)
            .build()
            .unwrap();
        Media::new(
            "/media/movie.mp4",
            format,
            StreamCollection::from_streams([video, audio]).unwrap(),
        )
        .unwrap()
    }

    /// A 200x100 png still.
    pub(crate) fn image_media() -> Media {
        let mut format = Format::png();
        format.set_dimensions(200, 100).unwrap();
        let frame = Stream::builder(0, StreamKind::Frame, "/media/logo.png")
            .codec(Codec::from_code("png").unwrap())
            .dimensions(200, 100)
            .build()
            .unwrap();
        Media::new(
            "/media/logo.png",
            format,
            StreamCollection::from_streams([frame]).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn needs_a_stream() {
        assert_matches!(
            Media::new("/x.mp3", Format::mp3(), StreamCollection::new()),
            Err(Error::Validation(_))
        );
    }

    #[test]
    fn duration_falls_back_to_streams() {
        let media = audio_media();
        assert_eq!(media.duration(), 60.0);

        let stream = Stream::builder(0, StreamKind::Audio, "/a.mp3")
            .duration(42.0)
            .build()
            .unwrap();
        let bare = Media::new(
            "/a.mp3",
            Format::mp3(),
            StreamCollection::from_streams([stream]).unwrap(),
        )
        .unwrap();
        assert_eq!(bare.duration(), 42.0);
    }

    #[test]
    fn filter_kinds_must_match_media() {
        let mut audio = audio_media();
        let crop = Crop::new(Point::new(0, 0), Dimension::new(10, 10).unwrap());
        assert_matches!(audio.add_filter(crop, 0), Err(Error::Validation(_)));
        audio.add_filter(Volume::new(0.5).unwrap(), 0).unwrap();
        audio.add_filter(Cut::new(Timecode::ZERO, None), 0).unwrap();
        assert_eq!(audio.filters().len(), 1);

        let mut video = video_media();
        video.add_filter(crop, 10).unwrap();
        video.add_filter(Volume::new(2).unwrap(), 0).unwrap();

        let mut image = image_media();
        assert_matches!(image.add_filter(Volume::new(1).unwrap(), 0), Err(Error::Validation(_)));
    }

    #[test]
    fn select_streams_is_independent() {
        let mut media = video_media();
        media.add_filter(Volume::new(0.5).unwrap(), 0).unwrap();

        let audio_only = media.select_streams(StreamMask::AUDIO).unwrap();
        assert_eq!(audio_only.streams().len(), 1);
        assert_eq!(audio_only.filters().len(), 1);
        assert_eq!(media.streams().len(), 2);

        assert_matches!(media.select_streams(StreamMask::SUBTITLE), Err(Error::Validation(_)));
        assert!(media.without_filters().filters().is_empty());
    }

    #[test]
    fn duplicate_stream_rejected() {
        let mut media = audio_media();
        let dup = Stream::builder(0, StreamKind::Audio, "/media/other.mp3")
            .build()
            .unwrap();
        assert_matches!(media.add_stream(dup), Err(Error::Validation(_)));
    }

    #[test]
    fn chains_and_links() {
        let mut media = video_media();
        let a = media.add_chain(FilterChain::new(), 10).unwrap();
        let b = media.add_chain(FilterChain::new(), 0).unwrap();
        media.link(a, b, "main").unwrap();
        assert!(media.filters().is_linked());

        let mut audio = audio_media();
        let mut chain = FilterChain::new();
        chain
            .add_filter(Crop::new(Point::default(), Dimension::new(4, 4).unwrap()), 0)
            .unwrap();
        assert_matches!(audio.add_chain(chain, 0), Err(Error::Validation(_)));
    }
}
