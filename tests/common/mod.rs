//! Shared fixtures for integration tests.
//!
//! [`FixtureProber`] answers probes from canned ffprobe JSON and
//! [`RecordingRunner`] records every pass instead of spawning ffmpeg, so a
//! [`Session`] can be exercised end to end without external tools.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use reelforge::rf_av::{PassCommand, Process, ProcessRunner};
use reelforge::rf_probe::{demux, Demuxed};
use reelforge::{Config, Error, Prober, Result, Session};

pub const MOVIE_PATH: &str = "/media/movie.mkv";
pub const SONG_PATH: &str = "/media/song.mp3";
pub const LOGO_PATH: &str = "/media/logo.png";

pub const MOVIE_JSON: &str = r#"{
    "format": {
        "filename": "/media/movie.mkv",
        "format_name": "matroska,webm",
        "duration": "120.500000",
        "bit_rate": "2500000",
        "tags": {"title": "Movie"}
    },
    "streams": [
        {"index": 0, "codec_type": "video", "codec_name": "h264", "profile": "High",
         "width": 1920, "height": 1080, "r_frame_rate": "24000/1001", "bit_rate": "2000000"},
        {"index": 1, "codec_type": "audio", "codec_name": "aac",
         "channels": 6, "sample_rate": "48000", "bit_rate": "384000",
         "tags": {"language": "eng"}},
        {"index": 2, "codec_type": "subtitle", "codec_name": "subrip"},
        {"index": 3, "codec_type": "attachment", "codec_name": "ttf"}
    ]
}"#;

pub const SONG_JSON: &str = r#"{
    "format": {"filename": "/media/song.mp3", "format_name": "mp3", "duration": "60.000000"},
    "streams": [
        {"index": 0, "codec_type": "audio", "codec_name": "mp3",
         "channels": 2, "sample_rate": "44100", "bit_rate": "128000", "duration": "60.000000"}
    ]
}"#;

pub const LOGO_JSON: &str = r#"{
    "format": {"filename": "/media/logo.png", "format_name": "png_pipe"},
    "streams": [
        {"index": 0, "codec_type": "video", "codec_name": "png", "width": 200, "height": 100}
    ]
}"#;

// ---------------------------------------------------------------------------
// FixtureProber
// ---------------------------------------------------------------------------

/// Serves canned ffprobe output by path.
pub struct FixtureProber {
    fixtures: HashMap<PathBuf, &'static str>,
}

impl FixtureProber {
    pub fn new() -> Self {
        let fixtures = [(MOVIE_PATH, MOVIE_JSON), (SONG_PATH, SONG_JSON), (LOGO_PATH, LOGO_JSON)]
            .into_iter()
            .map(|(path, json)| (PathBuf::from(path), json))
            .collect();
        Self { fixtures }
    }
}

impl Prober for FixtureProber {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn probe(&self, path: &Path) -> Result<Demuxed> {
        match self.fixtures.get(path) {
            Some(json) => demux(path, json),
            None => Err(Error::probe(format!("no fixture for {}", path.display()))),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingRunner
// ---------------------------------------------------------------------------

/// Records started passes. Pass `n` exits with `exit_codes[n - 1]`, or 0.
#[derive(Default)]
pub struct RecordingRunner {
    pub started: Arc<Mutex<Vec<PassCommand>>>,
    pub exit_codes: Vec<Option<i32>>,
}

struct RecordedProcess {
    command: PassCommand,
    exit_code: Option<i32>,
    started: Arc<Mutex<Vec<PassCommand>>>,
    terminated: bool,
}

impl Process for RecordedProcess {
    fn start(&mut self) -> Result<()> {
        self.started.lock().unwrap().push(self.command.clone());
        Ok(())
    }

    fn wait(&mut self) -> Result<Option<i32>> {
        self.terminated = true;
        Ok(self.exit_code)
    }

    fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn command_line(&self) -> String {
        self.command.command_line()
    }

    fn stderr(&self) -> &str {
        if self.exit_code == Some(0) {
            ""
        } else {
            "Conversion failed!"
        }
    }
}

impl ProcessRunner for RecordingRunner {
    fn create(&self, command: &PassCommand) -> Box<dyn Process> {
        let exit_code = self
            .exit_codes
            .get(command.pass as usize - 1)
            .copied()
            .unwrap_or(Some(0));
        Box::new(RecordedProcess {
            command: command.clone(),
            exit_code,
            started: Arc::clone(&self.started),
            terminated: false,
        })
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// A session over the fixtures; returns the log of started passes too.
pub fn session() -> (Session, Arc<Mutex<Vec<PassCommand>>>) {
    session_with(Config::default(), RecordingRunner::default())
}

pub fn session_with(config: Config, runner: RecordingRunner) -> (Session, Arc<Mutex<Vec<PassCommand>>>) {
    let started = Arc::clone(&runner.started);
    let session = Session::with_parts(config, "ffmpeg", Arc::new(FixtureProber::new()), Arc::new(runner));
    (session, started)
}

/// Values following every occurrence of `flag`.
pub fn values_of<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|w| w[0] == flag)
        .map(|w| w[1].as_str())
        .collect()
}
