//! # rf-media
//!
//! A [`Media`] is a probed source plus the edits to apply to it. Edits are
//! [`Filter`]s ordered by priority inside a [`FilterChain`]; chains live in
//! the media's [`FilterGraph`] where they can be linked through named pads.
//!
//! ```
//! use rf_core::{Codec, Format, Stream, StreamCollection, StreamKind};
//! use rf_media::{builtin::Volume, Media};
//!
//! let stream = Stream::builder(0, StreamKind::Audio, "song.mp3")
//!     .codec(Codec::from_code("mp3").unwrap())
//!     .build()
//!     .unwrap();
//! let streams = StreamCollection::from_streams([stream]).unwrap();
//! let mut media = Media::new("song.mp3", Format::mp3(), streams).unwrap();
//! media.add_filter(Volume::new(0.5).unwrap(), 0).unwrap();
//! assert_eq!(media.filters().len(), 1);
//! ```

pub mod filter;
pub mod media;

pub use filter::builtin;
pub use filter::{
    collapse, pad_type, BoundFragments, ChainId, ChainPads, Filter, FilterChain, FilterContext,
    FilterGraph, InputPads, MAX_PRIORITY,
};
pub use media::Media;
