//! One configured entry point: probe sources, compose commands, run them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rf_av::{
    CommandComposer, PassCommand, ProcessRunner, SystemRunner, ToolRegistry, TranscodeObserver,
    Transcoder,
};
use rf_core::{Config, Format, OptionMap, Result};
use rf_media::Media;
use rf_probe::{FfprobeProber, Prober};

/// Probing, composition and transcoding wired from one [`Config`].
pub struct Session {
    config: Config,
    prober: Arc<dyn Prober>,
    transcoder: Transcoder,
}

impl Session {
    /// Build a session backed by the real tools, resolved from the config
    /// or `PATH`.
    pub fn new(config: Config) -> Result<Self> {
        for warning in config.validate() {
            tracing::warn!("{warning}");
        }
        let tools = ToolRegistry::discover(&config.tools);
        let ffmpeg = tools.ffmpeg()?.to_path_buf();
        let prober = Arc::new(FfprobeProber::new(tools.ffprobe()?.to_path_buf()));
        Ok(Self::with_parts(config, ffmpeg, prober, Arc::new(SystemRunner)))
    }

    /// Build a session from explicit collaborators.
    pub fn with_parts(
        config: Config,
        ffmpeg: impl Into<PathBuf>,
        prober: Arc<dyn Prober>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let composer = CommandComposer::new(ffmpeg, config.compose.clone());
        Self {
            config,
            prober,
            transcoder: Transcoder::new(composer, runner),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn composer(&self) -> &CommandComposer {
        self.transcoder.composer()
    }

    /// Probe `source` into a [`Media`].
    pub fn open(&self, source: impl AsRef<Path>) -> Result<Media> {
        Media::open(source, self.prober.as_ref())
    }

    /// Compose without running anything.
    pub fn compose(
        &self,
        media: &Media,
        format: &Format,
        options: &OptionMap,
    ) -> Result<Vec<PassCommand>> {
        self.composer().transcoding(media, format, options)
    }

    pub fn save(
        &self,
        media: &Media,
        format: &Format,
        options: &OptionMap,
        observer: &mut dyn TranscodeObserver,
    ) -> Result<()> {
        self.transcoder.save(media, format, options, observer)
    }
}
