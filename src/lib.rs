//! reelforge - composes ffmpeg commands from a declarative media model.
//!
//! The workspace crates are re-exported here; [`Session`] wires them
//! together from a [`Config`].

pub mod session;

pub use rf_av;
pub use rf_core;
pub use rf_media;
pub use rf_probe;

pub use rf_av::{
    CommandComposer, NoopObserver, OptionHeap, PassCommand, Propagation, SystemRunner,
    ToolRegistry, TracingObserver, TranscodeObserver, Transcoder,
};
pub use rf_core::{
    Codec, Config, Dimension, Error, Format, FormatKind, FormatOptions, OptionMap, OptionValue,
    Point, Result, Stream, StreamCollection, StreamKind, StreamMask, Timecode,
};
pub use rf_media::{builtin, Filter, FilterChain, FilterGraph, Media};
pub use rf_probe::{FfprobeProber, Prober};
pub use session::Session;
