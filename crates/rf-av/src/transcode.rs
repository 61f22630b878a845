//! Composing and running a transcode, one pass after the other.

use std::sync::Arc;

use rf_core::{Error, Format, OptionMap, Result};
use rf_media::Media;

use crate::composer::CommandComposer;
use crate::events::{Propagation, TranscodeObserver};
use crate::process::{PassCommand, ProcessRunner};

/// Composes the passes for a target format and runs them through a [`ProcessRunner`].
pub struct Transcoder {
    composer: CommandComposer,
    runner: Arc<dyn ProcessRunner>,
}

impl Transcoder {
    pub fn new(composer: CommandComposer, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { composer, runner }
    }

    pub fn composer(&self) -> &CommandComposer {
        &self.composer
    }

    /// Transcode `media` into `format` at the `output` of `options`.
    ///
    /// Composition errors are returned before the observer hears anything.
    /// Once passes are composed the observer sees `before`, the passes,
    /// `success` or `failure`, and always `after`. A pass is never retried.
    pub fn save(
        &self,
        media: &Media,
        format: &Format,
        options: &OptionMap,
        observer: &mut dyn TranscodeObserver,
    ) -> Result<()> {
        let commands = self.composer.transcoding(media, format, options)?;

        if observer.before(&commands) == Propagation::Stop {
            tracing::info!("Transcode of {} stopped by observer", media.source().display());
            observer.after();
            return Ok(());
        }

        let result = self.run(&commands, observer);
        match &result {
            Ok(()) => observer.success(),
            Err(e) => observer.failure(e),
        }
        observer.after();
        result
    }

    fn run(&self, commands: &[PassCommand], observer: &mut dyn TranscodeObserver) -> Result<()> {
        for command in commands {
            let mut process = self.runner.create(command);
            if process.is_terminated() {
                tracing::debug!("Pass {} already terminated; skipping", command.pass);
                continue;
            }

            observer.pass_started(command);
            tracing::info!("Running pass {}/{}", command.pass, command.total_passes);
            process.start()?;
            let exit_code = process.wait()?;
            observer.pass_finished(command, exit_code);

            if exit_code != Some(0) {
                return Err(Error::ExecutionFailure {
                    pass: command.pass,
                    exit_code,
                    args: command.args.clone(),
                    stderr: process.stderr().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoopObserver;
    use crate::process::Process;
    use assert_matches::assert_matches;
    use rf_core::config::ComposeConfig;
    use rf_core::{Stream, StreamCollection, StreamKind};
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedRunner {
        exit_codes: Vec<Option<i32>>,
        started: Arc<Mutex<Vec<u32>>>,
    }

    struct ScriptedProcess {
        command: PassCommand,
        exit_code: Option<i32>,
        started: Arc<Mutex<Vec<u32>>>,
    }

    impl Process for ScriptedProcess {
        fn start(&mut self) -> Result<()> {
            self.started.lock().unwrap().push(self.command.pass);
            Ok(())
        }

        fn wait(&mut self) -> Result<Option<i32>> {
            Ok(self.exit_code)
        }

        fn is_terminated(&self) -> bool {
            false
        }

        fn command_line(&self) -> String {
            self.command.command_line()
        }

        fn stderr(&self) -> &str {
            "boom"
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn create(&self, command: &PassCommand) -> Box<dyn Process> {
            let index = (command.pass - 1) as usize;
            Box::new(ScriptedProcess {
                command: command.clone(),
                exit_code: self.exit_codes.get(index).copied().flatten().or(Some(0)),
                started: Arc::clone(&self.started),
            })
        }
    }

    #[derive(Default)]
    struct Events(Vec<String>);

    impl TranscodeObserver for Events {
        fn before(&mut self, commands: &[PassCommand]) -> Propagation {
            self.0.push(format!("before:{}", commands.len()));
            Propagation::Continue
        }
        fn pass_started(&mut self, command: &PassCommand) {
            self.0.push(format!("start:{}", command.pass));
        }
        fn success(&mut self) {
            self.0.push("success".into());
        }
        fn failure(&mut self, error: &Error) {
            self.0.push(format!("failure:{}", error.category()));
        }
        fn after(&mut self) {
            self.0.push("after".into());
        }
    }

    fn movie() -> Media {
        let stream = Stream::builder(0, StreamKind::Video, "/media/movie.mkv")
            .build()
            .unwrap();
        Media::new(
            "/media/movie.mkv",
            Format::mkv(),
            StreamCollection::from_streams([stream]).unwrap(),
        )
        .unwrap()
    }

    fn two_pass() -> Format {
        let mut format = Format::mkv();
        format.set_passes(2).unwrap();
        format
    }

    fn transcoder(runner: ScriptedRunner) -> Transcoder {
        Transcoder::new(
            CommandComposer::new("ffmpeg", ComposeConfig::default()),
            Arc::new(runner),
        )
    }

    #[test]
    fn runs_passes_in_order() {
        let runner = ScriptedRunner::default();
        let started = Arc::clone(&runner.started);
        let mut events = Events::default();
        transcoder(runner)
            .save(&movie(), &two_pass(), &OptionMap::with_output("/tmp/o.mkv"), &mut events)
            .unwrap();
        assert_eq!(*started.lock().unwrap(), [1, 2]);
        assert_eq!(events.0, ["before:2", "start:1", "start:2", "success", "after"]);
    }

    #[test]
    fn failing_pass_stops_the_run() {
        let runner = ScriptedRunner {
            exit_codes: vec![Some(1)],
            ..ScriptedRunner::default()
        };
        let started = Arc::clone(&runner.started);
        let mut events = Events::default();
        let err = transcoder(runner)
            .save(&movie(), &two_pass(), &OptionMap::with_output("/tmp/o.mkv"), &mut events)
            .unwrap_err();
        assert_matches!(
            err,
            Error::ExecutionFailure { pass: 1, exit_code: Some(1), ref stderr, .. } if stderr == "boom"
        );
        assert_eq!(*started.lock().unwrap(), [1]);
        assert_eq!(events.0, ["before:2", "start:1", "failure:execution", "after"]);
    }

    #[test]
    fn observer_can_stop() {
        struct Stop;
        impl TranscodeObserver for Stop {
            fn before(&mut self, _commands: &[PassCommand]) -> Propagation {
                Propagation::Stop
            }
        }
        let runner = ScriptedRunner::default();
        let started = Arc::clone(&runner.started);
        transcoder(runner)
            .save(&movie(), &Format::mkv(), &OptionMap::with_output("/tmp/o.mkv"), &mut Stop)
            .unwrap();
        assert!(started.lock().unwrap().is_empty());
    }

    #[test]
    fn composition_errors_skip_the_observer() {
        let mut events = Events::default();
        let err = transcoder(ScriptedRunner::default())
            .save(&movie(), &Format::mkv(), &OptionMap::new(), &mut events)
            .unwrap_err();
        assert_matches!(err, Error::Configuration(_));
        assert!(events.0.is_empty());

        let mut noop = NoopObserver;
        let err = transcoder(ScriptedRunner::default())
            .save(&movie(), &Format::mkv(), &OptionMap::new(), &mut noop)
            .unwrap_err();
        assert_eq!(err.category(), "configuration");
    }
}
