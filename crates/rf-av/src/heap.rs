//! Ordering and flattening of options into an ffmpeg argument vector.
//!
//! Option names are resolved to flags on insertion (`overwrite` becomes
//! `y`), so aliases and raw flags share one entry. Flattening emits the
//! global and input flags of [`PRIORITY`] first, then everything else in
//! first-insertion order.

use rf_core::{is_filter_key, OptionMap, OptionValue};

/// Readable option names and the flags they stand for.
pub const ALIASES: &[(&str, &str)] = &[
    ("input", "i"),
    ("overwrite", "y"),
    ("disable_audio", "an"),
    ("disable_video", "vn"),
    ("disable_subtitle", "sn"),
    ("audio_quality", "qscale:a"),
    ("audio_codec", "codec:a"),
    ("audio_bitrate", "b:a"),
    ("audio_sample_frequency", "ar"),
    ("audio_channels", "ac"),
    ("video_quality", "qscale:v"),
    ("video_codec", "codec:v"),
    ("video_aspect_ratio", "aspect"),
    ("video_frame_rate", "r"),
    ("video_max_frames", "vframes"),
    ("video_bitrate", "b:v"),
    ("video_pixel_format", "pix_fmt"),
    ("subtitle_codec", "codec:s"),
    ("metadata", "metadata"),
    ("force_format", "f"),
    ("seek_start", "ss"),
    ("seek_end", "t"),
];

/// Flags that must precede the others, in this order. Most of them only
/// have an effect before `-i`.
pub const PRIORITY: &[&str] = &[
    "y",
    "ignore_unknown",
    "stream_loop",
    "sseof",
    "itsoffset",
    "thread_queue_size",
    "seek_timestamp",
    "accurate_seek",
    "noaccurate_seek",
    "ss",
    "i",
];

/// Flags repeated once per value.
const REPEATED: &[&str] = &["i", "map", "metadata"];

/// The option that names the output file; it is positional, never a flag.
pub const OUTPUT: &str = "output";

/// Flag (without the leading dash) an option name stands for.
pub fn resolve_flag(name: &str) -> String {
    let name = name.trim_start_matches('-');
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or_else(|| name.to_string(), |(_, flag)| flag.to_string())
}

/// Options keyed by resolved flag, flattened into ffmpeg argument order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionHeap {
    entries: Vec<(String, Vec<OptionValue>)>,
    complex: bool,
}

impl OptionHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route every filter flag into one `-filter_complex`.
    pub fn set_complex(&mut self, complex: bool) -> &mut Self {
        self.complex = complex;
        self
    }

    pub fn is_complex(&self) -> bool {
        self.complex
    }

    /// Append one value to the entry of `name`.
    pub fn push(&mut self, name: &str, value: impl Into<OptionValue>) -> &mut Self {
        let flag = resolve_flag(name);
        if flag == OUTPUT {
            return self;
        }
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == flag) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((flag, vec![value])),
        }
        self
    }

    /// Append every value of `options`, in order.
    pub fn extend(&mut self, options: OptionMap) -> &mut Self {
        for (name, values) in options {
            for value in values {
                self.push(&name, value);
            }
        }
        self
    }

    pub fn get(&self, flag: &str) -> Option<&[OptionValue]> {
        let flag = resolve_flag(flag);
        self.entries
            .iter()
            .find(|(k, _)| *k == flag)
            .map(|(_, v)| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ordered(&self) -> Vec<&(String, Vec<OptionValue>)> {
        let rank = |flag: &str| {
            PRIORITY
                .iter()
                .position(|p| *p == flag)
                .unwrap_or(PRIORITY.len())
        };
        let mut entries: Vec<&(String, Vec<OptionValue>)> = self.entries.iter().collect();
        entries.sort_by_key(|(flag, _)| rank(flag));
        entries
    }

    /// Render the argument vector, output excluded.
    pub fn flatten(&self) -> Vec<String> {
        let mut args = Vec::new();
        let mut complex: Option<(usize, Vec<String>)> = None;

        for (flag, values) in self.ordered() {
            if is_filter_key(flag) {
                let parts: Vec<String> = values
                    .iter()
                    .filter(|v| !v.is_blank())
                    .map(ToString::to_string)
                    .collect();
                if parts.is_empty() {
                    continue;
                }
                if self.complex {
                    match &mut complex {
                        Some((_, all)) => all.extend(parts),
                        None => complex = Some((args.len(), parts)),
                    }
                } else {
                    args.push(format!("-{flag}"));
                    args.push(parts.join("; "));
                }
            } else if REPEATED.contains(&flag.as_str()) {
                for value in values.iter().filter(|v| !v.is_blank()) {
                    args.push(format!("-{flag}"));
                    args.push(value.to_string());
                }
            } else if let Some(value) = values.last() {
                match value {
                    OptionValue::Bool(true) => args.push(format!("-{flag}")),
                    v if v.is_blank() => {}
                    v => {
                        args.push(format!("-{flag}"));
                        args.push(v.to_string());
                    }
                }
            }
        }

        if let Some((at, parts)) = complex {
            let tail = args.split_off(at);
            args.push("-filter_complex".to_string());
            args.push(parts.join("; "));
            args.extend(tail);
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(options: OptionMap) -> Vec<String> {
        let mut heap = OptionHeap::new();
        heap.extend(options);
        heap.flatten()
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(resolve_flag("audio_codec"), "codec:a");
        assert_eq!(resolve_flag("-y"), "y");
        assert_eq!(resolve_flag("strict"), "strict");
    }

    #[test]
    fn priority_flags_first() {
        let mut options = OptionMap::new();
        options
            .set("strict", -2)
            .set("input", "/in.mp4")
            .set("audio_codec", "aac")
            .set("seek_start", "00:00:05.00")
            .set("overwrite", true);
        assert_eq!(
            flatten(options),
            ["-y", "-ss", "00:00:05.00", "-i", "/in.mp4", "-strict", "-2", "-codec:a", "aac"]
        );
    }

    #[test]
    fn aliases_share_an_entry() {
        let mut heap = OptionHeap::new();
        heap.push("overwrite", true).push("y", false);
        assert_eq!(heap.len(), 1);
        assert!(heap.flatten().is_empty());
    }

    #[test]
    fn scalar_rendering() {
        let mut options = OptionMap::new();
        options
            .set("an", true)
            .set("vn", false)
            .set("threads", 0)
            .set("itsoffset", -1)
            .set("title", "")
            .push("b:a", 64_000)
            .push("b:a", 128_000);
        assert_eq!(
            flatten(options),
            ["-itsoffset", "-1", "-an", "-b:a", "128000"]
        );
    }

    #[test]
    fn zero_scalars_are_dropped_but_negatives_kept() {
        let mut options = OptionMap::new();
        options
            .set("strict", -2)
            .set("map_metadata", -1)
            .set("audio_bitrate", 0)
            .set("video_max_frames", 0.0);
        assert_eq!(flatten(options), ["-strict", "-2", "-map_metadata", "-1"]);
    }

    #[test]
    fn repeated_flags() {
        let mut options = OptionMap::new();
        options
            .push("map", "0:0")
            .push("map", "0:1")
            .push("metadata", OptionValue::Pair("title".into(), "Demo".into()))
            .push("metadata", OptionValue::Pair("artist".into(), "Me".into()));
        assert_eq!(
            flatten(options),
            ["-map", "0:0", "-map", "0:1", "-metadata", "title=Demo", "-metadata", "artist=Me"]
        );
    }

    #[test]
    fn output_is_never_a_flag() {
        assert!(flatten(OptionMap::with_output("/out.mp3")).is_empty());
    }

    #[test]
    fn simple_filters_join_per_flag() {
        let mut options = OptionMap::new();
        options
            .push("filter:a", "volume=volume=2")
            .push("filter:a", "adelay=delays=10")
            .push("filter:v", "hflip");
        assert_eq!(
            flatten(options),
            ["-filter:a", "volume=volume=2; adelay=delays=10", "-filter:v", "hflip"]
        );
    }

    #[test]
    fn complex_mode_merges_filters() {
        let mut heap = OptionHeap::new();
        heap.set_complex(true)
            .push("codec:v", "libx264")
            .push("filter:v", "[0:v][1:v]overlay=x=0:y=0")
            .push("filter:a", "volume=volume=2")
            .push("b:v", 1_000_000);
        assert_eq!(
            heap.flatten(),
            [
                "-codec:v",
                "libx264",
                "-filter_complex",
                "[0:v][1:v]overlay=x=0:y=0; volume=volume=2",
                "-b:v",
                "1000000"
            ]
        );
    }
}
