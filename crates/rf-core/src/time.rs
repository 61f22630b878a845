//! Time and geometry values used by filters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Timecode
// ---------------------------------------------------------------------------

/// A non-negative point or span in time, rendered as `HH:MM:SS.cc`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timecode(f64);

impl Timecode {
    pub const ZERO: Timecode = Timecode(0.0);

    pub fn from_seconds(seconds: f64) -> Result<Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(Error::validation(format!(
                "time must be a non-negative number of seconds, got {seconds}"
            )));
        }
        Ok(Self(seconds))
    }

    /// Time of frame `frame` at `fps` frames per second.
    pub fn from_frames(frame: u64, fps: f64) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(Error::validation(format!("frame rate must be positive, got {fps}")));
        }
        Self::from_seconds(frame as f64 / fps)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let centis_total = (self.0 * 100.0).round() as u64;
        let centis = centis_total % 100;
        let total_secs = centis_total / 100;
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let secs = total_secs % 60;
        write!(f, "{hours:02}:{minutes:02}:{secs:02}.{centis:02}")
    }
}

impl FromStr for Timecode {
    type Err = Error;

    /// Parses `HH:MM:SS`, `HH:MM:SS.cc`, `HH:MM:SS,cc` or `HH:MM:SS:cc`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::validation(format!("invalid timecode '{s}'"));
        let parts: Vec<&str> = s.trim().split(':').collect();
        let (h, m, rest, frac) = match parts.as_slice() {
            [h, m, rest] => (*h, *m, *rest, None),
            [h, m, rest, frac] => (*h, *m, *rest, Some(*frac)),
            _ => return Err(invalid()),
        };
        let (sec, frac) = match rest.split_once(|c: char| c == '.' || c == ',') {
            Some((sec, f)) if frac.is_none() => (sec, Some(f)),
            Some(_) => return Err(invalid()),
            None => (rest, frac),
        };

        let hours: u64 = h.parse().map_err(|_| invalid())?;
        let minutes: u64 = m.parse().map_err(|_| invalid())?;
        let secs: u64 = sec.parse().map_err(|_| invalid())?;
        if minutes >= 60 || secs >= 60 {
            return Err(invalid());
        }
        let fraction = match frac {
            Some(f) if !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()) => {
                format!("0.{f}").parse::<f64>().map_err(|_| invalid())?
            }
            Some(_) => return Err(invalid()),
            None => 0.0,
        };

        Self::from_seconds((hours * 3600 + minutes * 60 + secs) as f64 + fraction)
    }
}

// ---------------------------------------------------------------------------
// Dimension
// ---------------------------------------------------------------------------

/// A width/height pair, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    width: u32,
    height: u32,
}

impl Dimension {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::validation(format!(
                "dimensions must be at least 1x1, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }

    /// Width divided by height.
    pub fn ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A position in pixels from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}
