//! Callbacks around a transcode run.

use rf_core::Error;

use crate::process::PassCommand;

/// Whether a run goes ahead after [`TranscodeObserver::before`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// Receives the lifecycle of one [`Transcoder::save`](crate::Transcoder::save)
/// call. Every method has a no-op default.
///
/// Order: `before`, then `pass_started`/`pass_finished` per pass, then
/// `success` or `failure`, then `after`.
pub trait TranscodeObserver {
    /// Called with every composed pass before anything runs. Returning
    /// [`Propagation::Stop`] cancels the run.
    fn before(&mut self, _commands: &[PassCommand]) -> Propagation {
        Propagation::Continue
    }

    fn pass_started(&mut self, _command: &PassCommand) {}

    fn pass_finished(&mut self, _command: &PassCommand, _exit_code: Option<i32>) {}

    fn success(&mut self) {}

    fn failure(&mut self, _error: &Error) {}

    fn after(&mut self) {}
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TranscodeObserver for NoopObserver {}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TranscodeObserver for TracingObserver {
    fn before(&mut self, commands: &[PassCommand]) -> Propagation {
        tracing::info!("Starting transcode in {} pass(es)", commands.len());
        Propagation::Continue
    }

    fn pass_started(&mut self, command: &PassCommand) {
        tracing::info!(
            "Pass {}/{}: {}",
            command.pass,
            command.total_passes,
            command.command_line()
        );
    }

    fn pass_finished(&mut self, command: &PassCommand, exit_code: Option<i32>) {
        tracing::debug!("Pass {} exited with {exit_code:?}", command.pass);
    }

    fn success(&mut self) {
        tracing::info!("Transcode finished");
    }

    fn failure(&mut self, error: &Error) {
        tracing::error!("Transcode failed [{}]: {error}", error.category());
    }
}
