//! Turning a media, a target format and caller options into the ordered
//! argument vectors of every pass.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

use rf_core::config::ComposeConfig;
use rf_core::{is_filter_key, Error, Format, FormatKind, OptionMap, OptionValue, Result, StreamKind};
use rf_media::{pad_type, FilterContext, InputPads, Media};
use uuid::Uuid;

use crate::force_format::ForceFormatTable;
use crate::heap::{resolve_flag, OptionHeap};
use crate::process::PassCommand;

/// Builds [`PassCommand`]s for the transcoder at `ffmpeg`.
#[derive(Debug, Clone)]
pub struct CommandComposer {
    ffmpeg: PathBuf,
    config: ComposeConfig,
    force_formats: ForceFormatTable,
}

/// An input other than the primary source.
struct ExtraInput<'a> {
    index: usize,
    media: Option<&'a Media>,
    options: OptionMap,
}

impl CommandComposer {
    pub fn new(ffmpeg: impl Into<PathBuf>, config: ComposeConfig) -> Self {
        let force_formats = ForceFormatTable::with_overrides(&config.force_formats);
        Self {
            ffmpeg: ffmpeg.into(),
            config,
            force_formats,
        }
    }

    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    pub fn force_formats(&self) -> &ForceFormatTable {
        &self.force_formats
    }

    /// Compose every pass needed to transcode `media` into `format`.
    ///
    /// `options` must hold an `output` path; any other entry overrides what
    /// the defaults and the format would produce.
    pub fn transcoding(&self, media: &Media, format: &Format, options: &OptionMap) -> Result<Vec<PassCommand>> {
        let output = options
            .last("output")
            .map(ToString::to_string)
            .filter(|o| !o.is_empty())
            .ok_or_else(|| Error::configuration("an output path is required"))?;

        // Defaults, forced muxer, format, caller overrides.
        let mut merged = self.defaults(media);
        if let Some(muxer) = self.force_formats.lookup(Path::new(&output)) {
            merged.set("force_format", muxer);
        }
        merged.merge_replace(format_options(format));
        merged.merge_replace(options.clone());

        // Input table and extra inputs discovered through filters.
        let mut pads = InputPads::new(media.source());
        let mut extras = self.discover_inputs(media, &mut pads);
        let complex = pads.len() > 1 || linked(media, &extras);
        tracing::debug!(
            "{} input(s), {} filter mode",
            pads.len(),
            if complex { "complex" } else { "simple" }
        );

        // Later inputs first: an input's edits may read the output of the
        // inputs it discovered.
        let mut bound_filters = Vec::new();
        for extra in extras.iter_mut().rev() {
            let Some(extra_media) = extra.media else {
                continue;
            };
            let ctx = FilterContext::new(extra_media, format, &pads);
            let bound = extra_media.filters().apply_bound(&ctx, extra.index)?;
            let mut filters = OptionMap::new();
            for (key, values) in bound.options {
                if is_filter_key(&key) {
                    filters.set_all(&key, values);
                } else {
                    extra.options.set_all(&key, values);
                }
            }
            bound_filters.push(filters);
            for (stream_type, label) in bound.outputs {
                pads.set_output(extra.index, stream_type, label);
            }
        }
        let mut extra_filters = OptionMap::new();
        for filters in bound_filters.into_iter().rev() {
            extra_filters.merge_append(filters);
        }

        let ctx = FilterContext::new(media, format, &pads);
        let graph = media.filters().apply(&ctx)?;

        // Streams. In complex mode the unlabelled graph outputs are picked
        // up by the transcoder, so filtered stream types are not mapped.
        if !supplies(options, "map") {
            let filtered: Vec<char> = if complex {
                graph.keys().filter(|k| is_filter_key(k)).map(pad_type).collect()
            } else {
                Vec::new()
            };
            for stream in media.streams() {
                let input = pads.index_of(stream.source()).unwrap_or(0);
                if input == 0 && filtered.contains(&stream_pad_type(stream.kind())) {
                    tracing::trace!("stream {} is carried by the filter graph", stream.index());
                    continue;
                }
                merged.push("map", format!("{input}:{}", stream.index()));
            }
        }

        if !supplies(options, "metadata") && !format.metadata().is_empty() {
            for (key, value) in format.metadata() {
                merged.push("metadata", OptionValue::Pair(key.clone(), value.clone()));
            }
            merged.set("map_metadata", -1);
        }

        merged.merge_missing(extra_filters);
        merged.merge_missing(graph);

        let mut heap = OptionHeap::new();
        heap.set_complex(complex).extend(merged);
        let mut args = heap.flatten();
        splice_inputs(&mut args, &pads, extras);

        let passes = format.passes();
        let commands = if passes > 1 {
            let prefix = self.pass_log_prefix();
            args.push("-passlogfile".to_string());
            args.push(prefix.to_string_lossy().into_owned());
            (1..=passes)
                .map(|pass| {
                    let mut pass_args = args.clone();
                    pass_args.extend(["-pass".to_string(), pass.to_string(), output.clone()]);
                    self.command(pass, passes, pass_args)
                })
                .collect()
        } else {
            args.push(output);
            vec![self.command(1, 1, args)]
        };

        for command in &commands {
            tracing::debug!("pass {}/{}: {}", command.pass, command.total_passes, command.command_line());
        }
        Ok(commands)
    }

    fn command(&self, pass: u32, total_passes: u32, args: Vec<String>) -> PassCommand {
        PassCommand {
            pass,
            total_passes,
            program: self.ffmpeg.clone(),
            args,
        }
    }

    fn defaults(&self, media: &Media) -> OptionMap {
        let mut defaults = OptionMap::new();
        defaults
            .set("overwrite", true)
            .set("input", media.source())
            .set("strict", -2);
        if self.config.ignore_unknown {
            defaults.set("ignore_unknown", true);
        }
        if self.config.threads > 0 {
            defaults.set("threads", self.config.threads);
        }
        defaults
    }

    /// Breadth-first walk over the sources filters read from. Each new source
    /// gets the next input index; sources are identified by path.
    fn discover_inputs<'a>(&self, media: &'a Media, pads: &mut InputPads) -> Vec<ExtraInput<'a>> {
        let mut extras: Vec<ExtraInput<'a>> = Vec::new();

        // Streams of the primary media may come from other files.
        for stream in media.streams() {
            if pads.index_of(stream.source()).is_none() {
                let index = pads.resolve(stream.source());
                extras.push(ExtraInput {
                    index,
                    media: None,
                    options: OptionMap::new(),
                });
            }
        }

        let mut queue: VecDeque<&'a Media> = media.filters().inputs().into_iter().collect();
        while let Some(next) = queue.pop_front() {
            if pads.index_of(next.source()).is_some() {
                continue;
            }
            let index = pads.resolve(next.source());
            tracing::debug!("input {index}: {}", next.source().display());
            extras.push(ExtraInput {
                index,
                media: Some(next),
                options: OptionMap::new(),
            });
            queue.extend(next.filters().inputs());
        }
        extras
    }

    fn pass_log_prefix(&self) -> PathBuf {
        let dir = self
            .config
            .pass_log_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        dir.join(format!("reelforge-{}", Uuid::new_v4().simple()))
    }
}

/// Whether the caller set `flag` under any of its spellings.
fn supplies(options: &OptionMap, flag: &str) -> bool {
    options.keys().any(|k| resolve_flag(k) == flag)
}

fn linked(media: &Media, extras: &[ExtraInput<'_>]) -> bool {
    media.filters().is_linked()
        || extras
            .iter()
            .filter_map(|e| e.media)
            .any(|m| m.filters().is_linked())
}

fn stream_pad_type(kind: StreamKind) -> char {
    match kind {
        StreamKind::Audio => 'a',
        StreamKind::Subtitle => 's',
        StreamKind::Frame | StreamKind::Video => 'v',
    }
}

/// Insert `[input options] -i <path>` for every extra input right after the
/// primary `-i <source>`, in input order.
fn splice_inputs(args: &mut Vec<String>, pads: &InputPads, mut extras: Vec<ExtraInput<'_>>) {
    if pads.len() < 2 {
        return;
    }
    extras.sort_by_key(|e| e.index);
    let mut options: BTreeMap<usize, OptionMap> =
        extras.into_iter().map(|e| (e.index, e.options)).collect();

    let mut block = Vec::new();
    for (index, source) in pads.sources().enumerate().skip(1) {
        let mut heap = OptionHeap::new();
        heap.extend(options.remove(&index).unwrap_or_default());
        block.extend(heap.flatten());
        block.push("-i".to_string());
        block.push(source.to_string_lossy().into_owned());
    }

    let at = args
        .iter()
        .position(|a| a == "-i")
        .map_or(args.len(), |i| (i + 2).min(args.len()));
    let tail = args.split_off(at);
    args.extend(block);
    args.extend(tail);
}

/// Options a format contributes, by kind.
pub fn format_options(format: &Format) -> OptionMap {
    let mut options = OptionMap::new();

    let audio = |options: &mut OptionMap| {
        if let Some(audio) = format.audio_traits() {
            options.set("audio_codec", audio.codec().map_or("copy", |c| c.code()));
            if audio.bitrate() > 0 {
                options.set("audio_bitrate", audio.bitrate());
            }
            if let Some(frequency) = audio.frequency() {
                options.set("audio_sample_frequency", frequency);
            }
            if let Some(channels) = audio.channels() {
                options.set("audio_channels", channels);
            }
        }
    };

    match format.kind() {
        FormatKind::Audio => {
            options.set("disable_video", true);
            audio(&mut options);
        }
        FormatKind::Frame => {
            if let Some(codec) = format.frame_traits().and_then(|f| f.codec()) {
                options.set("video_codec", codec.code());
            }
            options.set("video_max_frames", 1);
        }
        FormatKind::Video => {
            audio(&mut options);
            let codec = format.frame_traits().and_then(|f| f.codec());
            options.set("video_codec", codec.map_or("copy", |c| c.code()));
            if let Some(video) = format.video_traits() {
                if video.frame_rate() > 0.0 {
                    options.set("video_frame_rate", video.frame_rate());
                }
                if video.bitrate() > 0 {
                    options.set("video_bitrate", video.bitrate());
                }
                if let Some(pixel_format) = video.pixel_format() {
                    options.set("video_pixel_format", pixel_format);
                }
                if let Some(preset) = video.preset() {
                    options.set("preset", preset);
                }
                if let Some(tune) = video.tune() {
                    options.set("tune", tune);
                }
            }
        }
        FormatKind::Subtitle => {
            if let Some(codec) = format.subtitle_codec() {
                options.set("subtitle_codec", codec.code());
            }
        }
    }

    options
}
