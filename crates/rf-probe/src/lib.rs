//! # rf-probe
//!
//! Source description for reelforge: the [`Prober`] interface, the ffprobe
//! backend, and the normalizer that turns raw probe JSON into a
//! [`rf_core::Format`] plus a [`rf_core::StreamCollection`].
//!
//! ```no_run
//! use rf_probe::{FfprobeProber, Prober};
//! use std::path::Path;
//!
//! let prober = FfprobeProber::from_path().expect("ffprobe on PATH");
//! let demuxed = prober.probe(Path::new("movie.mkv")).unwrap();
//! println!("{} with {} streams", demuxed.format, demuxed.streams.len());
//! ```

pub mod ffprobe;
pub mod normalize;
pub mod prober;

pub use ffprobe::FfprobeProber;
pub use normalize::{demux, Demuxed, UNPARSEABLE_OUTPUT};
pub use prober::Prober;
