//! Running composed passes and reporting through an observer.

mod common;

use common::{session, session_with, RecordingRunner, MOVIE_PATH, SONG_PATH};
use reelforge::{
    Config, Error, Format, OptionMap, PassCommand, Propagation, TranscodeObserver,
};

#[derive(Default)]
struct Journal {
    events: Vec<String>,
    stop: bool,
}

impl TranscodeObserver for Journal {
    fn before(&mut self, commands: &[PassCommand]) -> Propagation {
        self.events.push(format!("before {}", commands.len()));
        if self.stop {
            Propagation::Stop
        } else {
            Propagation::Continue
        }
    }

    fn pass_started(&mut self, command: &PassCommand) {
        self.events.push(format!("start {}", command.pass));
    }

    fn pass_finished(&mut self, command: &PassCommand, exit_code: Option<i32>) {
        self.events.push(format!("finish {} {:?}", command.pass, exit_code));
    }

    fn success(&mut self) {
        self.events.push("success".to_string());
    }

    fn failure(&mut self, error: &Error) {
        self.events.push(format!("failure {}", error.category()));
    }

    fn after(&mut self) {
        self.events.push("after".to_string());
    }
}

fn two_pass() -> Format {
    let mut format = Format::mkv();
    format.set_passes(2).unwrap();
    format
}

#[test]
fn single_pass_save() {
    let (session, started) = session();
    let media = session.open(SONG_PATH).unwrap();
    let mut journal = Journal::default();
    session
        .save(&media, &Format::mp3(), &OptionMap::with_output("/out/song.mp3"), &mut journal)
        .unwrap();

    assert_eq!(
        journal.events,
        ["before 1", "start 1", "finish 1 Some(0)", "success", "after"]
    );
    let started = started.lock().unwrap();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].args.last().map(String::as_str), Some("/out/song.mp3"));
}

#[test]
fn passes_run_in_order() {
    let (session, started) = session();
    let media = session.open(MOVIE_PATH).unwrap();
    let mut journal = Journal::default();
    session
        .save(&media, &two_pass(), &OptionMap::with_output("/out/movie.mkv"), &mut journal)
        .unwrap();

    let passes: Vec<u32> = started.lock().unwrap().iter().map(|c| c.pass).collect();
    assert_eq!(passes, [1, 2]);
    assert_eq!(journal.events.last().map(String::as_str), Some("after"));
}

#[test]
fn failed_pass_aborts_the_rest() {
    let runner = RecordingRunner {
        exit_codes: vec![Some(0), Some(1)],
        ..RecordingRunner::default()
    };
    let (session, started) = session_with(Config::default(), runner);
    let media = session.open(MOVIE_PATH).unwrap();
    let mut journal = Journal::default();
    let err = session
        .save(&media, &two_pass(), &OptionMap::with_output("/out/movie.mkv"), &mut journal)
        .unwrap_err();

    match err {
        Error::ExecutionFailure {
            pass,
            exit_code,
            stderr,
            args,
        } => {
            assert_eq!(pass, 2);
            assert_eq!(exit_code, Some(1));
            assert_eq!(stderr, "Conversion failed!");
            assert_eq!(args.last().map(String::as_str), Some("/out/movie.mkv"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(started.lock().unwrap().len(), 2);
    assert_eq!(
        journal.events,
        [
            "before 2",
            "start 1",
            "finish 1 Some(0)",
            "start 2",
            "finish 2 Some(1)",
            "failure execution",
            "after"
        ]
    );
}

#[test]
fn killed_pass_reports_no_exit_code() {
    let runner = RecordingRunner {
        exit_codes: vec![None],
        ..RecordingRunner::default()
    };
    let (session, _) = session_with(Config::default(), runner);
    let media = session.open(SONG_PATH).unwrap();
    let err = session
        .save(&media, &Format::mp3(), &OptionMap::with_output("/out/song.mp3"), &mut Journal::default())
        .unwrap_err();
    assert!(matches!(err, Error::ExecutionFailure { exit_code: None, .. }));
    assert!(err.to_string().contains("exit code none"));
}

#[test]
fn observer_can_cancel() {
    let (session, started) = session();
    let media = session.open(SONG_PATH).unwrap();
    let mut journal = Journal {
        stop: true,
        ..Journal::default()
    };
    session
        .save(&media, &Format::mp3(), &OptionMap::with_output("/out/song.mp3"), &mut journal)
        .unwrap();
    assert!(started.lock().unwrap().is_empty());
    assert_eq!(journal.events, ["before 1", "after"]);
}

#[test]
fn composition_error_runs_nothing() {
    let (session, started) = session();
    let media = session.open(SONG_PATH).unwrap();
    let mut journal = Journal::default();
    let err = session
        .save(&media, &Format::mp3(), &OptionMap::new(), &mut journal)
        .unwrap_err();
    assert_eq!(err.category(), "configuration");
    assert!(journal.events.is_empty());
    assert!(started.lock().unwrap().is_empty());
}
