use rf_core::{OptionMap, Result, StreamMask};

use crate::filter::{Filter, FilterContext};

/// Emits a fixed set of options, whatever the media or format.
#[derive(Debug, Clone)]
pub struct SimpleFilter {
    options: OptionMap,
    kinds: StreamMask,
}

impl SimpleFilter {
    pub fn new(options: OptionMap) -> Self {
        Self {
            options,
            kinds: StreamMask::ALL,
        }
    }

    /// Restrict the media kinds this filter may be attached to.
    pub fn with_kinds(mut self, kinds: StreamMask) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn options(&self) -> &OptionMap {
        &self.options
    }
}

impl Filter for SimpleFilter {
    fn name(&self) -> &str {
        "simple"
    }

    fn kinds(&self) -> StreamMask {
        self.kinds
    }

    fn apply(&self, _ctx: &FilterContext<'_>) -> Result<OptionMap> {
        Ok(self.options.clone())
    }
}
