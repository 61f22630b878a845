//! The [`Prober`] trait defining the interface for media file probing.

use std::path::Path;

use crate::normalize::Demuxed;

/// Something that can describe a source file as a format plus streams.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
pub trait Prober: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// Probe the file at `path`.
    fn probe(&self, path: &Path) -> rf_core::Result<Demuxed>;
}
