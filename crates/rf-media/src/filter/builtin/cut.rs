use rf_core::{Error, OptionMap, Result, StreamMask, Timecode};

use crate::filter::{Filter, FilterContext};

/// Keep `duration` of the source starting at `start`; without a duration
/// everything after `start` is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cut {
    start: Timecode,
    duration: Option<Timecode>,
}

impl Cut {
    pub fn new(start: Timecode, duration: Option<Timecode>) -> Self {
        Self { start, duration }
    }

    pub fn start(&self) -> Timecode {
        self.start
    }

    pub fn duration(&self) -> Option<Timecode> {
        self.duration
    }
}

impl Filter for Cut {
    fn name(&self) -> &str {
        "cut"
    }

    fn kinds(&self) -> StreamMask {
        StreamMask::AUDIO | StreamMask::FRAME | StreamMask::VIDEO
    }

    fn apply(&self, ctx: &FilterContext<'_>) -> Result<OptionMap> {
        let mut options = OptionMap::new();
        options.set("seek_start", self.start.to_string());

        if let Some(duration) = self.duration {
            let available = ctx.media.duration();
            if available > 0.0 && duration.seconds() > available {
                return Err(Error::validation(format!(
                    "cut duration {duration} exceeds the media duration of {available}s"
                )));
            }
            options.set("seek_end", duration.to_string());
        }

        Ok(options)
    }
}
