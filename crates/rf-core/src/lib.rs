//! rf-core: the data model shared by every reelforge crate.
//!
//! Codecs, formats and streams describe media; [`OptionMap`] carries the
//! option fragments that formats, filters and callers contribute to a
//! command; [`Error`] and [`Config`] are the ambient error and configuration
//! types.

pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod options;
pub mod stream;
pub mod time;

pub use codec::Codec;
pub use config::Config;
pub use error::{Error, Result};
pub use format::{AudioTraits, Format, FormatKind, FormatOptions, FrameTraits, VideoTraits};
pub use options::{is_filter_key, FilterToken, OptionMap, OptionValue};
pub use stream::{Stream, StreamBuilder, StreamCollection, StreamKind, StreamMask};
pub use time::{Dimension, Point, Timecode};
