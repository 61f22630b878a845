//! Ready-made edits.
//!
//! | Filter | Kinds | Emits |
//! |--------|-------|-------|
//! | [`Volume`] | audio | `filter:a` `volume` |
//! | [`Fade`] | audio | `filter:a` `afade` |
//! | [`AudioDelay`] | audio | `filter:a` `adelay` |
//! | [`Crop`] | frame | `filter:v` `crop` |
//! | [`Resize`] | frame | `filter:v` `scale` |
//! | [`Rotate`] | frame | `filter:v` `rotate` |
//! | [`Text`] | frame | `filter:v` `drawtext` |
//! | [`Cut`] | audio, frame, video | `seek_start` / `seek_end` |
//! | [`Overlay`] | frame, video | `filter:v` `overlay` plus an extra input |
//! | [`SimpleFilter`] | configurable | a fixed option map |

mod audio;
mod cut;
mod overlay;
mod picture;
mod simple;

pub use audio::{AudioDelay, Fade, FadeCurve, FadeType, Precision, ReplayGain, Volume, VolumeEval};
pub use cut::Cut;
pub use overlay::Overlay;
pub use picture::{Crop, Resize, Rotate, Text};
pub use simple::SimpleFilter;

