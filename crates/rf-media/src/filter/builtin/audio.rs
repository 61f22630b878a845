//! Audio edits: gain, fades and per-channel delay.

use std::fmt;
use std::str::FromStr;

use rf_core::{Error, FilterToken, OptionMap, Result, StreamMask, Timecode};

use crate::filter::{join_args, Filter, FilterContext};

// ---------------------------------------------------------------------------
// Volume
// ---------------------------------------------------------------------------

/// Sample precision of the `volume` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Fixed,
    Float,
    Double,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
        }
    }
}

/// What `volume` does with ReplayGain side data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayGain {
    Drop,
    Ignore,
    Track,
    Album,
}

impl fmt::Display for ReplayGain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::Ignore => write!(f, "ignore"),
            Self::Track => write!(f, "track"),
            Self::Album => write!(f, "album"),
        }
    }
}

/// When the volume expression is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeEval {
    Once,
    Frame,
}

impl fmt::Display for VolumeEval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Once => write!(f, "once"),
            Self::Frame => write!(f, "frame"),
        }
    }
}

/// Scale the audio level. Options left unset are not emitted, so the
/// transcoder's defaults apply.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    volume: f64,
    precision: Option<Precision>,
    replay_gain: Option<ReplayGain>,
    replay_gain_preamp: Option<f64>,
    eval: Option<VolumeEval>,
}

impl Volume {
    /// `volume` is a linear factor: 1 keeps the level, 0.5 halves it.
    pub fn new(volume: impl Into<f64>) -> Result<Self> {
        let volume = volume.into();
        if !volume.is_finite() || volume < 0.0 {
            return Err(Error::validation(format!(
                "volume must be a non-negative number, got {volume}"
            )));
        }
        Ok(Self {
            volume,
            precision: None,
            replay_gain: None,
            replay_gain_preamp: None,
            eval: None,
        })
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_replay_gain(mut self, replay_gain: ReplayGain) -> Self {
        self.replay_gain = Some(replay_gain);
        self
    }

    /// Pre-amplification in dB applied with replay gain.
    pub fn with_replay_gain_preamp(mut self, db: f64) -> Result<Self> {
        if !db.is_finite() {
            return Err(Error::validation("replay gain preamp must be a finite number"));
        }
        self.replay_gain_preamp = Some(db);
        Ok(self)
    }

    pub fn with_eval(mut self, eval: VolumeEval) -> Self {
        self.eval = Some(eval);
        self
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }
}

impl Filter for Volume {
    fn name(&self) -> &str {
        "volume"
    }

    fn kinds(&self) -> StreamMask {
        StreamMask::AUDIO
    }

    fn apply(&self, _ctx: &FilterContext<'_>) -> Result<OptionMap> {
        let args = join_args([
            ("volume", Some(self.volume.to_string())),
            ("precision", self.precision.map(|p| p.to_string())),
            ("replaygain", self.replay_gain.map(|r| r.to_string())),
            ("replaygain_preamp", self.replay_gain_preamp.map(|p| p.to_string())),
            ("eval", self.eval.map(|e| e.to_string())),
        ]);
        let mut options = OptionMap::new();
        options.push("filter:a", FilterToken::new("volume", args));
        Ok(options)
    }
}

// ---------------------------------------------------------------------------
// Fade
// ---------------------------------------------------------------------------

/// Direction of an `afade`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeType {
    In,
    Out,
}

impl fmt::Display for FadeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
        }
    }
}

/// Shape of the fade transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeCurve {
    Triangular,
    QuarterSine,
    HalfSine,
    ExponentialSine,
    Logarithmic,
    InvertedParabola,
    Quadratic,
    Cubic,
    SquareRoot,
    CubicRoot,
    Parabola,
    Exponential,
    InvertedQuarterSine,
    InvertedHalfSine,
    DoubleExponentialSeat,
    DoubleExponentialSigmoid,
}

impl FadeCurve {
    const ALL: [FadeCurve; 16] = [
        Self::Triangular,
        Self::QuarterSine,
        Self::HalfSine,
        Self::ExponentialSine,
        Self::Logarithmic,
        Self::InvertedParabola,
        Self::Quadratic,
        Self::Cubic,
        Self::SquareRoot,
        Self::CubicRoot,
        Self::Parabola,
        Self::Exponential,
        Self::InvertedQuarterSine,
        Self::InvertedHalfSine,
        Self::DoubleExponentialSeat,
        Self::DoubleExponentialSigmoid,
    ];

    /// The short name the transcoder knows the curve by.
    pub fn code(self) -> &'static str {
        match self {
            Self::Triangular => "tri",
            Self::QuarterSine => "qsin",
            Self::HalfSine => "hsin",
            Self::ExponentialSine => "esin",
            Self::Logarithmic => "log",
            Self::InvertedParabola => "ipar",
            Self::Quadratic => "qua",
            Self::Cubic => "cub",
            Self::SquareRoot => "squ",
            Self::CubicRoot => "cbr",
            Self::Parabola => "par",
            Self::Exponential => "exp",
            Self::InvertedQuarterSine => "iqsin",
            Self::InvertedHalfSine => "ihsin",
            Self::DoubleExponentialSeat => "dese",
            Self::DoubleExponentialSigmoid => "desi",
        }
    }
}

impl fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FadeCurve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter().find(|c| c.code() == s).ok_or_else(|| {
            let codes: Vec<&str> = Self::ALL.iter().map(|c| c.code()).collect();
            Error::validation(format!(
                "unknown fade curve '{s}'; expected one of: {}",
                codes.join(", ")
            ))
        })
    }
}

/// Fade the audio in or out.
#[derive(Debug, Clone, PartialEq)]
pub struct Fade {
    fade_type: FadeType,
    start: Timecode,
    duration: Option<Timecode>,
    start_sample: u64,
    samples: u64,
    curve: FadeCurve,
}

impl Fade {
    pub fn new(fade_type: FadeType, start: Timecode, duration: Option<Timecode>) -> Self {
        Self {
            fade_type,
            start,
            duration,
            start_sample: 0,
            samples: 44_100,
            curve: FadeCurve::Logarithmic,
        }
    }

    pub fn fade_in(start: Timecode, duration: Timecode) -> Self {
        Self::new(FadeType::In, start, Some(duration))
    }

    pub fn fade_out(start: Timecode, duration: Timecode) -> Self {
        Self::new(FadeType::Out, start, Some(duration))
    }

    pub fn with_curve(mut self, curve: FadeCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn with_start_sample(mut self, sample: u64) -> Self {
        self.start_sample = sample;
        self
    }

    /// Length of the fade in samples, used when no duration is given.
    pub fn with_samples(mut self, samples: u64) -> Self {
        self.samples = samples;
        self
    }
}

impl Filter for Fade {
    fn name(&self) -> &str {
        "fade"
    }

    fn kinds(&self) -> StreamMask {
        StreamMask::AUDIO
    }

    // Times go out in seconds: the HH:MM:SS form would collide with the
    // argument separator.
    fn apply(&self, _ctx: &FilterContext<'_>) -> Result<OptionMap> {
        let args = join_args([
            ("t", Some(self.fade_type.to_string())),
            ("st", Some(self.start.seconds().to_string())),
            ("d", self.duration.map(|d| d.seconds().to_string())),
            ("ss", Some(self.start_sample.to_string())),
            ("ns", Some(self.samples.to_string())),
            ("curve", Some(self.curve.to_string())),
        ]);
        let mut options = OptionMap::new();
        options.push("filter:a", FilterToken::new("afade", args));
        Ok(options)
    }
}

// ---------------------------------------------------------------------------
// AudioDelay
// ---------------------------------------------------------------------------

/// Delay each audio channel by its own number of milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDelay {
    delays: Vec<u64>,
}

impl AudioDelay {
    pub fn new(delays: impl IntoIterator<Item = u64>) -> Result<Self> {
        let delays: Vec<u64> = delays.into_iter().collect();
        if delays.is_empty() {
            return Err(Error::validation("audio delay needs at least one channel delay"));
        }
        Ok(Self { delays })
    }

    pub fn delays(&self) -> &[u64] {
        &self.delays
    }
}

impl Filter for AudioDelay {
    fn name(&self) -> &str {
        "adelay"
    }

    fn kinds(&self) -> StreamMask {
        StreamMask::AUDIO
    }

    fn apply(&self, _ctx: &FilterContext<'_>) -> Result<OptionMap> {
        let delays: Vec<String> = self.delays.iter().map(u64::to_string).collect();
        let mut options = OptionMap::new();
        options.push(
            "filter:a",
            FilterToken::new("adelay", format!("delays={}", delays.join("|"))),
        );
        Ok(options)
    }
}
