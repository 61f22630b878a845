//! # rf-av
//!
//! Command composition and execution for reelforge.
//!
//! This crate provides:
//!
//! - **Option heap** ([`OptionHeap`]) -- resolves option aliases to ffmpeg
//!   flags, orders them and flattens them into an argument vector.
//! - **Command composer** ([`CommandComposer`]) -- merges defaults, format
//!   options, caller overrides and filter graphs into one [`PassCommand`]
//!   per encoding pass.
//! - **Execution** ([`Transcoder`], [`ProcessRunner`]) -- runs the passes in
//!   order and reports through a [`TranscodeObserver`].
//! - **Tool discovery** ([`ToolRegistry`]) -- finds ffmpeg and ffprobe.

pub mod composer;
pub mod events;
pub mod force_format;
pub mod heap;
pub mod process;
pub mod tools;
pub mod transcode;

// ---- Re-exports for convenience ----

pub use composer::{format_options, CommandComposer};
pub use events::{NoopObserver, Propagation, TracingObserver, TranscodeObserver};
pub use force_format::ForceFormatTable;
pub use heap::{resolve_flag, OptionHeap};
pub use process::{PassCommand, Process, ProcessRunner, SystemProcess, SystemRunner};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use transcode::Transcoder;
