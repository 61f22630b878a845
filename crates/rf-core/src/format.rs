//! Output and source formats.
//!
//! A [`Format`] is a tagged union over [`FormatKind`] built by composition:
//! audio formats carry [`AudioTraits`], still-image formats carry
//! [`FrameTraits`], and video formats carry both plus [`VideoTraits`].
//! Every setter validates its input and leaves the format untouched when it
//! fails.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::stream::StreamMask;

/// Default audio bitrate in bits per second.
pub const DEFAULT_AUDIO_BITRATE: u64 = 128_000;

/// Default video bitrate in bits per second.
pub const DEFAULT_VIDEO_BITRATE: u64 = 1_000_000;

// ---------------------------------------------------------------------------
// FormatKind
// ---------------------------------------------------------------------------

/// Which trait groups a [`Format`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Audio,
    Frame,
    Video,
    Subtitle,
}

impl FormatKind {
    /// Stream kinds whose edits a media of this kind accepts.
    pub fn accepts(self) -> StreamMask {
        match self {
            Self::Audio => StreamMask::AUDIO,
            Self::Frame => StreamMask::FRAME,
            Self::Video => StreamMask::AUDIO | StreamMask::FRAME | StreamMask::VIDEO,
            Self::Subtitle => StreamMask::SUBTITLE,
        }
    }
}

impl fmt::Display for FormatKind {
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
// Traits
// ---------------------------------------------------------------------------

/// Audio capabilities of a format.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTraits {
    codec: Option<Codec>,
    whitelist: Vec<String>,
    allowed_frequencies: Vec<u32>,
    channels: Option<u32>,
    frequency: Option<u32>,
    bitrate: u64,
}

impl AudioTraits {
    fn new(codec: Option<Codec>, whitelist: &[&str]) -> Self {
        Self {
            codec,
            whitelist: whitelist.iter().map(|s| s.to_string()).collect(),
            allowed_frequencies: Vec::new(),
            channels: None,
            frequency: None,
            bitrate: DEFAULT_AUDIO_BITRATE,
        }
    }

    /// Target audio codec, if one is pinned.
    pub fn codec(&self) -> Option<&Codec> {
        self.codec.as_ref()
    }

    /// Accepted codec codes; empty means any codec.
    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    /// Output channel count; `None` keeps the source layout.
    pub fn channels(&self) -> Option<u32> {
        self.channels
    }

    /// Sample rate in Hz; `None` keeps the source rate.
    pub fn frequency(&self) -> Option<u32> {
        self.frequency
    }

    /// Audio bitrate in bits per second.
    pub fn bitrate(&self) -> u64 {
        self.bitrate
    }
}

/// Picture capabilities shared by still images and video.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTraits {
    codec: Option<Codec>,
    whitelist: Vec<String>,
    width: Option<u32>,
    height: Option<u32>,
}

impl FrameTraits {
    fn new(codec: Option<Codec>, whitelist: &[&str]) -> Self {
        Self {
            codec,
            whitelist: whitelist.iter().map(|s| s.to_string()).collect(),
            width: None,
            height: None,
        }
    }

    /// Target picture codec, if one is pinned.
    pub fn codec(&self) -> Option<&Codec> {
        self.codec.as_ref()
    }

    /// Accepted codec codes; empty means any codec.
    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    /// Output width in pixels, when set.
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// Output height in pixels, when set.
    pub fn height(&self) -> Option<u32> {
        self.height
    }
}

/// Motion-picture capabilities on top of [`FrameTraits`].
#[derive(Debug, Clone, PartialEq)]
pub struct VideoTraits {
    frame_rate: f64,
    bitrate: u64,
    passes: u32,
    pixel_format: Option<String>,
    preset: Option<String>,
    tune: Option<String>,
}

impl Default for VideoTraits {
    fn default() -> Self {
        Self {
            frame_rate: 0.0,
            bitrate: DEFAULT_VIDEO_BITRATE,
            passes: 1,
            pixel_format: None,
            preset: None,
            tune: None,
        }
    }
}

impl VideoTraits {
    /// Frames per second; 0 keeps the source rate.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Video bitrate in bits per second.
    pub fn bitrate(&self) -> u64 {
        self.bitrate
    }

    /// Number of encoding passes, at least 1.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Value for `-pix_fmt`.
    pub fn pixel_format(&self) -> Option<&str> {
        self.pixel_format.as_deref()
    }

    /// Encoder speed preset, such as `medium`.
    pub fn preset(&self) -> Option<&str> {
        self.preset.as_deref()
    }

    /// Encoder tuning, such as `film`.
    pub fn tune(&self) -> Option<&str> {
        self.tune.as_deref()
    }
}

fn check_whitelist(what: &str, codec: &Codec, whitelist: &[String]) -> Result<()> {
    if whitelist.is_empty() || whitelist.iter().any(|c| c == codec.code()) {
        return Ok(());
    }
    Err(Error::validation(format!(
        "{what} codec '{}' is not supported; expected one of: {}",
        codec.code(),
        whitelist.join(", ")
    )))
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// A media format: container identity plus the traits of its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    kind: FormatKind,
    name: Option<String>,
    audio: Option<AudioTraits>,
    frame: Option<FrameTraits>,
    video: Option<VideoTraits>,
    subtitle_codec: Option<Codec>,
    extensions: Vec<String>,
    metadata: BTreeMap<String, String>,
    duration: f64,
}

impl Format {
    fn empty(kind: FormatKind) -> Self {
        Self {
            kind,
            name: None,
            audio: None,
            frame: None,
            video: None,
            subtitle_codec: None,
            extensions: Vec::new(),
            metadata: BTreeMap::new(),
            duration: 0.0,
        }
    }

    /// Audio format accepting any codec.
    pub fn audio() -> Self {
        let mut f = Self::empty(FormatKind::Audio);
        f.audio = Some(AudioTraits::new(None, &[]));
        f
    }

    /// Still-image format accepting any codec.
    pub fn frame() -> Self {
        let mut f = Self::empty(FormatKind::Frame);
        f.frame = Some(FrameTraits::new(None, &[]));
        f
    }

    /// Video format accepting any codec.
    pub fn video() -> Self {
        let mut f = Self::empty(FormatKind::Video);
        f.audio = Some(AudioTraits::new(None, &[]));
        f.frame = Some(FrameTraits::new(None, &[]));
        f.video = Some(VideoTraits::default());
        f
    }

    /// Subtitle format with no codec pinned.
    pub fn subtitle() -> Self {
        Self::empty(FormatKind::Subtitle)
    }

    fn named(mut self, name: &str, extensions: &[&str]) -> Self {
        self.name = Some(name.to_string());
        self.extensions = extensions.iter().map(|s| s.to_string()).collect();
        self
    }

    fn audio_preset(name: &str, extensions: &[&str], codec: &'static str, whitelist: &[&str]) -> Self {
        let mut f = Self::empty(FormatKind::Audio).named(name, extensions);
        f.audio = Some(AudioTraits::new(Some(Codec::known(codec)), whitelist));
        f
    }

    fn frame_preset(name: &str, extensions: &[&str], codec: &'static str, whitelist: &[&str]) -> Self {
        let mut f = Self::empty(FormatKind::Frame).named(name, extensions);
        f.frame = Some(FrameTraits::new(Some(Codec::known(codec)), whitelist));
        f
    }

    // -- Presets -------------------------------------------------------------

    /// MP3 through `libmp3lame`.
    pub fn mp3() -> Self {
        Self::audio_preset("mp3", &["mp2", "mp3", "m2a"], "libmp3lame", MP3_CODECS)
    }

    pub fn aac() -> Self {
        Self::audio_preset(
            "aac",
            &["aac"],
            "aac",
            &["libfdk_aac", "libfaac", "aac", "libvo_aacenc", "faac"],
        )
    }

    pub fn oga() -> Self {
        Self::audio_preset("oga", &["oga"], "vorbis", &["vorbis", "libvorbis"])
    }

    /// Matroska with MP3 audio and Theora video.
    pub fn mkv() -> Self {
        let mut f = Self::empty(FormatKind::Video).named("mkv", &["mkv"]);
        f.audio = Some(AudioTraits::new(Some(Codec::known("mp3")), MKV_AUDIO_CODECS));
        f.frame = Some(FrameTraits::new(
            Some(Codec::known("libtheora")),
            &["mpeg4", "mpeg1", "mpeg2", "theora", "libtheora", "mpeg1video", "mpeg2video"],
        ));
        f.video = Some(VideoTraits::default());
        f
    }

    pub fn flv() -> Self {
        let mut f = Self::empty(FormatKind::Video).named("flv", &["flv"]);
        let mut audio = AudioTraits::new(Some(Codec::known("libmp3lame")), MP3_CODECS);
        audio.allowed_frequencies = vec![44_100, 22_050, 11_025];
        f.audio = Some(audio);
        f.frame = Some(FrameTraits::new(Some(Codec::known("flv1")), &["flv", "flv1"]));
        f.video = Some(VideoTraits::default());
        f
    }

    pub fn jpeg() -> Self {
        Self::frame_preset(
            "jpeg",
            &["jpg", "jpeg"],
            "mjpeg",
            &["jpeg2000", "libopenjpeg", "jpegls", "ljpeg", "mjpeg"],
        )
    }

    pub fn png() -> Self {
        Self::frame_preset("png", &["png"], "png", &["apng", "png"])
    }

    pub fn gif() -> Self {
        Self::frame_preset("gif", &["gif"], "gif", &["gif"])
    }

    pub fn bmp() -> Self {
        Self::frame_preset("bmp", &["bmp"], "bmp", &["bmp"])
    }

    pub fn ppm() -> Self {
        Self::frame_preset("ppm", &["ppm"], "ppm", &["ppm"])
    }

    /// Look up a preset by name (`mp3`, `mkv`, `jpeg`, ...).
    pub fn preset(name: &str) -> Option<Self> {
        let f = match name.to_ascii_lowercase().as_str() {
            "mp3" => Self::mp3(),
            "aac" => Self::aac(),
            "oga" | "ogg" => Self::oga(),
            "mkv" | "matroska" => Self::mkv(),
            "flv" => Self::flv(),
            "jpeg" | "jpg" => Self::jpeg(),
            "png" => Self::png(),
            "gif" => Self::gif(),
            "bmp" => Self::bmp(),
            "ppm" => Self::ppm(),
            "audio" => Self::audio(),
            "frame" => Self::frame(),
            "video" => Self::video(),
            "subtitle" => Self::subtitle(),
            _ => return None,
        };
        Some(f)
    }

    // -- Accessors -----------------------------------------------------------

    pub fn kind(&self) -> FormatKind {
        self.kind
    }

    /// Container name, which doubles as the `-f` muxer.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Present on audio and video formats.
    pub fn audio_traits(&self) -> Option<&AudioTraits> {
        self.audio.as_ref()
    }

    /// Present on still-image and video formats.
    pub fn frame_traits(&self) -> Option<&FrameTraits> {
        self.frame.as_ref()
    }

    /// Present on video formats only.
    pub fn video_traits(&self) -> Option<&VideoTraits> {
        self.video.as_ref()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn has_frame(&self) -> bool {
        self.frame.is_some()
    }

    pub fn is_video(&self) -> bool {
        self.video.is_some()
    }

    /// Codec for `-codec:s`, if one is pinned.
    pub fn subtitle_codec(&self) -> Option<&Codec> {
        self.subtitle_codec.as_ref()
    }

    /// Number of encoding passes; only video formats go above 1.
    pub fn passes(&self) -> u32 {
        self.video.as_ref().map_or(1, |v| v.passes)
    }

    /// File extensions, lowercase and without the dot.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Container tags written with `-metadata`.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Container duration in seconds; 0 when unknown.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    // -- Setters -------------------------------------------------------------

    fn audio_mut(&mut self) -> Result<&mut AudioTraits> {
        let kind = self.kind;
        self.audio
            .as_mut()
            .ok_or_else(|| Error::validation(format!("{kind} format has no audio traits")))
    }

    fn frame_mut(&mut self) -> Result<&mut FrameTraits> {
        let kind = self.kind;
        self.frame
            .as_mut()
            .ok_or_else(|| Error::validation(format!("{kind} format has no picture traits")))
    }

    fn video_mut(&mut self) -> Result<&mut VideoTraits> {
        let kind = self.kind;
        self.video
            .as_mut()
            .ok_or_else(|| Error::validation(format!("{kind} format has no video traits")))
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_extensions<S: Into<String>>(&mut self, extensions: impl IntoIterator<Item = S>) -> &mut Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_audio_codec(&mut self, codec: Codec) -> Result<&mut Self> {
        let audio = self.audio_mut()?;
        check_whitelist("audio", &codec, &audio.whitelist)?;
        audio.codec = Some(codec);
        Ok(self)
    }

    /// Replace the audio whitelist. The current codec must remain accepted.
    pub fn set_audio_whitelist<S: Into<String>>(
        &mut self,
        codes: impl IntoIterator<Item = S>,
    ) -> Result<&mut Self> {
        let codes: Vec<String> = codes.into_iter().map(Into::into).collect();
        let audio = self.audio_mut()?;
        if let Some(codec) = &audio.codec {
            check_whitelist("audio", codec, &codes)?;
        }
        audio.whitelist = codes;
        Ok(self)
    }

    pub fn set_audio_bitrate(&mut self, bitrate: u64) -> Result<&mut Self> {
        self.audio_mut()?.bitrate = bitrate;
        Ok(self)
    }

    pub fn set_audio_channels(&mut self, channels: u32) -> Result<&mut Self> {
        if channels < 1 {
            return Err(Error::validation("audio channels must be at least 1"));
        }
        self.audio_mut()?.channels = Some(channels);
        Ok(self)
    }

    pub fn set_audio_frequency(&mut self, frequency: u32) -> Result<&mut Self> {
        if frequency < 1 {
            return Err(Error::validation("audio frequency must be at least 1"));
        }
        let audio = self.audio_mut()?;
        if !audio.allowed_frequencies.is_empty() && !audio.allowed_frequencies.contains(&frequency) {
            let allowed: Vec<String> = audio.allowed_frequencies.iter().map(u32::to_string).collect();
            return Err(Error::validation(format!(
                "audio frequency {frequency} is not supported; expected one of: {}",
                allowed.join(", ")
            )));
        }
        audio.frequency = Some(frequency);
        Ok(self)
    }

    /// Set the picture codec of a frame or video format.
    pub fn set_video_codec(&mut self, codec: Codec) -> Result<&mut Self> {
        let kind = self.kind;
        let frame = self.frame_mut()?;
        let what = if kind == FormatKind::Video { "video" } else { "frame" };
        check_whitelist(what, &codec, &frame.whitelist)?;
        frame.codec = Some(codec);
        Ok(self)
    }

    pub fn set_video_whitelist<S: Into<String>>(
        &mut self,
        codes: impl IntoIterator<Item = S>,
    ) -> Result<&mut Self> {
        let codes: Vec<String> = codes.into_iter().map(Into::into).collect();
        let frame = self.frame_mut()?;
        if let Some(codec) = &frame.codec {
            check_whitelist("video", codec, &codes)?;
        }
        frame.whitelist = codes;
        Ok(self)
    }

    pub fn set_dimensions(&mut self, width: u32, height: u32) -> Result<&mut Self> {
        if width < 1 || height < 1 {
            return Err(Error::validation(format!(
                "dimensions must be at least 1x1, got {width}x{height}"
            )));
        }
        let frame = self.frame_mut()?;
        frame.width = Some(width);
        frame.height = Some(height);
        Ok(self)
    }

    pub fn set_frame_rate(&mut self, fps: f64) -> Result<&mut Self> {
        if !fps.is_finite() || fps < 0.0 {
            return Err(Error::validation(format!(
                "frame rate must be a non-negative number, got {fps}"
            )));
        }
        self.video_mut()?.frame_rate = fps;
        Ok(self)
    }

    pub fn set_video_bitrate(&mut self, bitrate: u64) -> Result<&mut Self> {
        self.video_mut()?.bitrate = bitrate;
        Ok(self)
    }

    pub fn set_passes(&mut self, passes: u32) -> Result<&mut Self> {
        if passes < 1 {
            return Err(Error::validation("passes must be at least 1"));
        }
        self.video_mut()?.passes = passes;
        Ok(self)
    }

    pub fn set_pixel_format(&mut self, pixel_format: impl Into<String>) -> Result<&mut Self> {
        self.video_mut()?.pixel_format = Some(pixel_format.into());
        Ok(self)
    }

    pub fn set_preset(&mut self, preset: impl Into<String>) -> Result<&mut Self> {
        self.video_mut()?.preset = Some(preset.into());
        Ok(self)
    }

    pub fn set_tune(&mut self, tune: impl Into<String>) -> Result<&mut Self> {
        self.video_mut()?.tune = Some(tune.into());
        Ok(self)
    }

    pub fn set_subtitle_codec(&mut self, codec: Codec) -> Result<&mut Self> {
        if self.kind != FormatKind::Subtitle {
            return Err(Error::validation(format!(
                "{} format has no subtitle codec",
                self.kind
            )));
        }
        self.subtitle_codec = Some(codec);
        Ok(self)
    }

    pub fn set_duration(&mut self, seconds: f64) -> Result<&mut Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(Error::validation(format!(
                "duration must be a non-negative number, got {seconds}"
            )));
        }
        self.duration = seconds;
        Ok(self)
    }

    /// Set one metadata tag; scalar values are stored in display form.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl fmt::Display) -> &mut Self {
        self.metadata.insert(key.into(), value.to_string());
        self
    }

    pub fn clear_metadata(&mut self) -> &mut Self {
        self.metadata.clear();
        self
    }

    /// Apply every present field of `options` through its setter.
    ///
    /// Either all fields apply or the format is left as it was.
    pub fn apply_options(&mut self, options: &FormatOptions) -> Result<()> {
        let mut next = self.clone();

        if let Some(code) = &options.audio_codec {
            next.set_audio_codec(Codec::from_code(code.as_str())?)?;
        }
        if let Some(bitrate) = options.audio_bitrate {
            next.set_audio_bitrate(bitrate)?;
        }
        if let Some(channels) = options.audio_channels {
            next.set_audio_channels(channels)?;
        }
        if let Some(frequency) = options.audio_frequency {
            next.set_audio_frequency(frequency)?;
        }
        if let Some(code) = &options.video_codec {
            next.set_video_codec(Codec::from_code(code.as_str())?)?;
        }
        if let Some(bitrate) = options.video_bitrate {
            next.set_video_bitrate(bitrate)?;
        }
        if let Some(fps) = options.frame_rate {
            next.set_frame_rate(fps)?;
        }
        match (options.width, options.height) {
            (None, None) => {}
            (w, h) => {
                let current = next.frame.as_ref().map(|f| (f.width, f.height));
                let width = w.or_else(|| current.and_then(|c| c.0));
                let height = h.or_else(|| current.and_then(|c| c.1));
                match (width, height) {
                    (Some(w), Some(h)) => {
                        next.set_dimensions(w, h)?;
                    }
                    _ => return Err(Error::validation("width and height must be set together")),
                }
            }
        }
        if let Some(passes) = options.passes {
            next.set_passes(passes)?;
        }
        if let Some(pix) = &options.pixel_format {
            next.set_pixel_format(pix.as_str())?;
        }
        if let Some(preset) = &options.preset {
            next.set_preset(preset.as_str())?;
        }
        if let Some(tune) = &options.tune {
            next.set_tune(tune.as_str())?;
        }
        if let Some(code) = &options.subtitle_codec {
            next.set_subtitle_codec(Codec::from_code(code.as_str())?)?;
        }
        if let Some(duration) = options.duration {
            next.set_duration(duration)?;
        }
        for (key, value) in &options.metadata {
            next.set_metadata(key.as_str(), value);
        }

        *self = next;
        Ok(())
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} ({})", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

const MP3_CODECS: &[&str] = &["libmp3lame", "libshine", "mp3", "mp3pro", "lame"];

const MKV_AUDIO_CODECS: &[&str] = &[
    "ac3", "mp1", "mp2", "mp3", "dts", "tta", "libvorbis", "vorbis", "flac", "ra_144",
    "libfdk_aac", "libfaac", "aac", "libvo_aacenc", "pcm_alaw", "pcm_f32le", "pcm_f64le",
    "pcm_lxf", "pcm_mulaw", "pcm_s16le", "pcm_s16le_planar", "pcm_s24daud", "pcm_s24le",
    "pcm_s24le_planar", "pcm_s32le", "pcm_s32le_planar", "pcm_s8", "pcm_s8_planar",
    "pcm_u16le", "pcm_u24le", "pcm_u32le", "pcm_u8",
];

// ---------------------------------------------------------------------------
// FormatOptions
// ---------------------------------------------------------------------------

/// Named format settings, typically deserialized from JSON, applied with
/// [`Format::apply_options`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatOptions {
    pub audio_codec: Option<String>,
    pub audio_bitrate: Option<u64>,
    pub audio_channels: Option<u32>,
    pub audio_frequency: Option<u32>,
    pub video_codec: Option<String>,
    pub video_bitrate: Option<u64>,
    pub frame_rate: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub passes: Option<u32>,
    pub pixel_format: Option<String>,
    pub preset: Option<String>,
    pub tune: Option<String>,
    pub subtitle_codec: Option<String>,
    pub duration: Option<f64>,
    pub metadata: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn codec(code: &str) -> Codec {
        Codec::from_code(code).unwrap()
    }

    #[test]
    fn mp3_defaults() {
        let f = Format::mp3();
        let audio = f.audio_traits().unwrap();
        assert_eq!(audio.codec().unwrap().code(), "libmp3lame");
        assert_eq!(audio.bitrate(), 128_000);
        assert_eq!(f.passes(), 1);
        assert!(!f.has_frame());
    }

    #[test]
    fn whitelist_enforced() {
        let mut f = Format::mp3();
        let err = f.set_audio_codec(codec("aac")).unwrap_err();
        assert_matches!(err, Error::Validation(_));
        assert_eq!(f.audio_traits().unwrap().codec().unwrap().code(), "libmp3lame");
        f.set_audio_codec(codec("libshine")).unwrap();
    }

    #[test]
    fn empty_whitelist_accepts_anything() {
        let mut f = Format::audio();
        f.set_audio_codec(codec("opus")).unwrap();
        let mut v = Format::video();
        v.set_video_codec(codec("libx264")).unwrap();
    }

    #[test]
    fn kind_checks() {
        let mut f = Format::mp3();
        assert_matches!(f.set_video_bitrate(1), Err(Error::Validation(_)));
        assert_matches!(f.set_passes(2), Err(Error::Validation(_)));
        let mut img = Format::png();
        assert_matches!(img.set_audio_channels(2), Err(Error::Validation(_)));
        img.set_dimensions(640, 480).unwrap();
        assert_eq!(Format::video().kind().accepts().bits(), 7);
    }

    #[test]
    fn numeric_ranges() {
        let mut v = Format::video();
        assert!(v.set_audio_channels(0).is_err());
        assert!(v.set_audio_frequency(0).is_err());
        assert!(v.set_frame_rate(-1.0).is_err());
        assert!(v.set_dimensions(0, 10).is_err());
        assert!(v.set_passes(0).is_err());
        assert!(v.set_duration(-2.0).is_err());
        v.set_passes(2).unwrap();
        assert_eq!(v.passes(), 2);
    }

    #[test]
    fn flv_frequencies_restricted() {
        let mut f = Format::flv();
        assert!(f.set_audio_frequency(48_000).is_err());
        f.set_audio_frequency(22_050).unwrap();
        assert!(f.set_video_codec(codec("libx264")).is_err());
    }

    #[test]
    fn whitelist_change_keeps_current_codec_valid() {
        let mut f = Format::aac();
        assert!(f.set_audio_whitelist(["libfdk_aac"]).is_err());
        f.set_audio_whitelist(["aac", "libfdk_aac"]).unwrap();
    }

    #[test]
    fn apply_options_is_all_or_nothing() {
        let mut f = Format::mkv();
        let opts: FormatOptions = serde_json::from_str(
            r#"{"video_bitrate": 2000000, "audio_codec": "not-a-codec"}"#,
        )
        .unwrap();
        assert!(f.apply_options(&opts).is_err());
        assert_eq!(f.video_traits().unwrap().bitrate(), DEFAULT_VIDEO_BITRATE);

        let opts: FormatOptions = serde_json::from_str(
            r#"{"video_bitrate": 2000000, "audio_codec": "aac", "passes": 2,
                "width": 1280, "height": 720, "metadata": {"title": "Demo"}}"#,
        )
        .unwrap();
        f.apply_options(&opts).unwrap();
        assert_eq!(f.video_traits().unwrap().bitrate(), 2_000_000);
        assert_eq!(f.passes(), 2);
        assert_eq!(f.frame_traits().unwrap().width(), Some(1280));
        assert_eq!(f.metadata().get("title").map(String::as_str), Some("Demo"));
    }

    #[test]
    fn unknown_option_rejected() {
        let parsed: std::result::Result<FormatOptions, _> =
            serde_json::from_str(r#"{"colour": "red"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn preset_lookup() {
        assert_eq!(Format::preset("MKV").unwrap().kind(), FormatKind::Video);
        assert_eq!(Format::preset("jpg").unwrap().name(), Some("jpeg"));
        assert!(Format::preset("wmv").is_none());
    }
}
