//! Normalization of ffprobe JSON into a [`Format`] and a [`StreamCollection`].
//!
//! ffprobe reports most numbers as strings and omits fields freely, so every
//! field is optional here and gets a default before it reaches the model.

use std::collections::BTreeMap;
use std::path::Path;

use rf_core::{Codec, Error, Format, FormatKind, Result, Stream, StreamCollection, StreamKind};
use serde::Deserialize;
use serde_json::Value;

/// Message used when the probe output is not usable JSON or carries an
/// error without a description.
pub const UNPARSEABLE_OUTPUT: &str = "Unable to parse ffprobe output.";

const NO_STREAMS: &str = "File type unsupported or the file is corrupted.";

/// A probed source: its format, its streams and container-level facts.
#[derive(Debug, Clone, PartialEq)]
pub struct Demuxed {
    pub format: Format,
    pub streams: StreamCollection,
    /// Raw container name as reported by the prober (`matroska,webm`, ...).
    pub format_name: String,
    /// Overall bitrate in bits per second, 0 when unknown.
    pub bitrate: u64,
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    error: Option<FfprobeError>,
}

#[derive(Debug, Deserialize)]
struct FfprobeError {
    string: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<Value>,
    bit_rate: Option<Value>,
    #[serde(default)]
    tags: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: Option<usize>,
    codec_type: Option<String>,
    codec_name: Option<String>,
    codec_long_name: Option<String>,
    profile: Option<Value>,
    bit_rate: Option<Value>,
    start_time: Option<Value>,
    duration: Option<Value>,
    channels: Option<u32>,
    sample_rate: Option<Value>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<Value>,
    #[serde(default)]
    tags: BTreeMap<String, Value>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn unsigned(value: Option<&Value>) -> u64 {
    number(value).filter(|v| *v > 0.0).map_or(0, |v| v as u64)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_frame_rate(rate: &str) -> Option<f64> {
    if let Some((num, den)) = rate.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        return (den != 0.0).then(|| num / den);
    }
    rate.trim().parse().ok()
}

fn is_image_container(format_name: &str) -> bool {
    format_name
        .split(',')
        .any(|n| n == "image2" || n.ends_with("_pipe"))
}

fn of_type<'a>(
    streams: &'a [FfprobeStream],
    codec_type: &'a str,
) -> impl Iterator<Item = &'a FfprobeStream> + 'a {
    streams
        .iter()
        .filter(move |s| s.codec_type.as_deref() == Some(codec_type))
}

fn infer_kind(format_name: &str, streams: &[FfprobeStream]) -> FormatKind {
    let has_audio = of_type(streams, "audio").next().is_some();

    if of_type(streams, "video").next().is_some() {
        let stills = of_type(streams, "video").all(|s| number(s.nb_frames.as_ref()) == Some(1.0));
        if is_image_container(format_name) || (!has_audio && stills) {
            return FormatKind::Frame;
        }
        return FormatKind::Video;
    }
    if has_audio {
        return FormatKind::Audio;
    }
    FormatKind::Subtitle
}

fn stream_kind(codec_type: &str, format_kind: FormatKind) -> Option<StreamKind> {
    match codec_type {
        "audio" => Some(StreamKind::Audio),
        "video" if format_kind == FormatKind::Frame => Some(StreamKind::Frame),
        "video" => Some(StreamKind::Video),
        "subtitle" => Some(StreamKind::Subtitle),
        _ => None,
    }
}

fn codec_of(stream: &FfprobeStream) -> Option<Codec> {
    let code = stream.codec_name.as_deref().filter(|c| !c.is_empty())?;
    let name = stream.codec_long_name.as_deref().unwrap_or(code);
    Codec::new(code, name).ok()
}

// ---------------------------------------------------------------------------
// Demuxing
// ---------------------------------------------------------------------------

/// Turn raw ffprobe JSON for `source` into a [`Demuxed`] description.
pub fn demux(source: &Path, raw: &str) -> Result<Demuxed> {
    let output: FfprobeOutput = match serde_json::from_str(raw) {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!("ffprobe output for {} is not JSON: {e}", source.display());
            return Err(Error::probe(UNPARSEABLE_OUTPUT));
        }
    };

    if let Some(error) = output.error {
        return Err(Error::probe(
            error.string.unwrap_or_else(|| UNPARSEABLE_OUTPUT.to_string()),
        ));
    }

    let format_name = output.format.format_name.clone().unwrap_or_default();
    let kind = infer_kind(&format_name, &output.streams);

    let mut streams = StreamCollection::new();
    for (position, raw_stream) in output.streams.iter().enumerate() {
        let codec_type = raw_stream.codec_type.as_deref().unwrap_or("");
        let Some(mapped) = stream_kind(codec_type, kind) else {
            tracing::warn!(
                "Skipping unsupported {codec_type:?} stream #{} in {}",
                raw_stream.index.unwrap_or(position),
                source.display()
            );
            continue;
        };
        streams.insert(build_stream(source, position, mapped, raw_stream)?)?;
    }

    if streams.is_empty() {
        return Err(Error::probe(NO_STREAMS));
    }

    let format = build_format(source, kind, &format_name, &output.format, &streams)?;
    let bitrate = unsigned(output.format.bit_rate.as_ref());

    tracing::debug!(
        "Demuxed {}: {} ({} streams)",
        source.display(),
        format,
        streams.len()
    );

    Ok(Demuxed {
        format,
        streams,
        format_name,
        bitrate,
    })
}

fn build_stream(
    source: &Path,
    position: usize,
    kind: StreamKind,
    raw: &FfprobeStream,
) -> Result<Stream> {
    let mut builder = Stream::builder(raw.index.unwrap_or(position), kind, source)
        .bitrate(unsigned(raw.bit_rate.as_ref()))
        .start_time(number(raw.start_time.as_ref()).unwrap_or(0.0))
        .duration(number(raw.duration.as_ref()).map(|d| d.max(0.0)).unwrap_or(0.0));

    if let Some(codec) = codec_of(raw) {
        builder = builder.codec(codec);
    }
    if let Some(profile) = raw.profile.as_ref().map(scalar_text).filter(|p| !p.is_empty()) {
        builder = builder.profile(profile);
    }

    match kind {
        StreamKind::Audio => {
            builder = builder.channels(raw.channels.unwrap_or(1).max(1));
            let frequency = unsigned(raw.sample_rate.as_ref());
            if frequency > 0 {
                builder = builder.frequency(u32::try_from(frequency).unwrap_or(u32::MAX));
            }
        }
        StreamKind::Frame | StreamKind::Video => {
            if let (Some(w), Some(h)) = (raw.width, raw.height) {
                if w > 0 && h > 0 {
                    builder = builder.dimensions(w, h);
                }
            }
            let fps = raw
                .r_frame_rate
                .as_deref()
                .and_then(parse_frame_rate)
                .or_else(|| raw.avg_frame_rate.as_deref().and_then(parse_frame_rate))
                .filter(|fps| fps.is_finite() && *fps > 0.0);
            if let Some(fps) = fps {
                builder = builder.frame_rate(fps);
            }
        }
        StreamKind::Subtitle => {}
    }

    for (key, value) in &raw.tags {
        builder = builder.tag(key.as_str(), scalar_text(value));
    }

    builder.build()
}

fn build_format(
    source: &Path,
    kind: FormatKind,
    format_name: &str,
    raw: &FfprobeFormat,
    streams: &StreamCollection,
) -> Result<Format> {
    let mut format = match kind {
        FormatKind::Audio => Format::audio(),
        FormatKind::Frame => Format::frame(),
        FormatKind::Video => Format::video(),
        FormatKind::Subtitle => Format::subtitle(),
    };

    if !format_name.is_empty() {
        format.set_name(format_name);
    }
    if let Some(ext) = source.extension().and_then(|e| e.to_str()) {
        format.set_extensions([ext.to_ascii_lowercase()]);
    }
    format.set_duration(number(raw.duration.as_ref()).filter(|d| *d >= 0.0).unwrap_or(0.0))?;
    for (key, value) in &raw.tags {
        format.set_metadata(key.as_str(), scalar_text(value));
    }

    if format.has_audio() {
        if let Some(audio) = streams.first_of(StreamKind::Audio) {
            if let Some(codec) = audio.codec() {
                format.set_audio_codec(codec.clone())?;
            }
            if let Some(channels) = audio.channels() {
                format.set_audio_channels(channels)?;
            }
            if let Some(frequency) = audio.frequency() {
                format.set_audio_frequency(frequency)?;
            }
            format.set_audio_bitrate(audio.bitrate())?;
        }
    }

    if format.has_frame() {
        let picture = streams
            .first_of(StreamKind::Video)
            .or_else(|| streams.first_of(StreamKind::Frame));
        if let Some(picture) = picture {
            if let Some(codec) = picture.codec() {
                format.set_video_codec(codec.clone())?;
            }
            if let (Some(w), Some(h)) = (picture.width(), picture.height()) {
                format.set_dimensions(w, h)?;
            }
            if format.is_video() {
                if let Some(fps) = picture.frame_rate() {
                    format.set_frame_rate(fps)?;
                }
                format.set_video_bitrate(picture.bitrate())?;
            }
        }
    }

    if kind == FormatKind::Subtitle {
        if let Some(codec) = streams.first_of(StreamKind::Subtitle).and_then(Stream::codec) {
            format.set_subtitle_codec(codec.clone())?;
        }
    }

    Ok(format)
}
