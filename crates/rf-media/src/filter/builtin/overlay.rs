use rf_core::{Error, FilterToken, OptionMap, Point, Result, StreamMask};

use crate::filter::{join_args, Filter, FilterContext};
use crate::media::Media;

/// Draw the picture of another media on top of this one.
///
/// The overlaid media becomes an extra input of the command. Its own edits
/// are applied first and the overlay reads their output.
#[derive(Debug, Clone)]
pub struct Overlay {
    source: Media,
    position: Point,
}

impl Overlay {
    pub fn new(source: Media, position: Point) -> Self {
        Self { source, position }
    }

    pub fn source(&self) -> &Media {
        &self.source
    }
}

impl Filter for Overlay {
    fn name(&self) -> &str {
        "overlay"
    }

    fn kinds(&self) -> StreamMask {
        StreamMask::FRAME | StreamMask::VIDEO
    }

    fn inputs(&self) -> Vec<&Media> {
        vec![&self.source]
    }

    fn apply(&self, ctx: &FilterContext<'_>) -> Result<OptionMap> {
        let pad = ctx.pads.pad(self.source.source(), 'v').ok_or_else(|| {
            Error::validation(format!(
                "overlay source {} is not an input of this command",
                self.source.source().display()
            ))
        })?;
        let args = join_args([
            ("x", Some(self.position.x.to_string())),
            ("y", Some(self.position.y.to_string())),
        ]);
        let mut options = OptionMap::new();
        options.push("filter:v", FilterToken::new("overlay", args).with_input(pad));
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::InputPads;
    use crate::media::tests::{image_media, video_media};
    use assert_matches::assert_matches;
    use rf_core::{Format, OptionValue};

    #[test]
    fn reads_the_source_pad() {
        let media = video_media();
        let logo = image_media();
        let overlay = Overlay::new(logo.clone(), Point::new(10, 10));
        assert_eq!(overlay.inputs().len(), 1);

        let format = Format::video();
        let mut pads = InputPads::new(media.source());
        pads.resolve(logo.source());
        let options = overlay.apply(&FilterContext::new(&media, &format, &pads)).unwrap();
        let token = match options.last("filter:v") {
            Some(OptionValue::Filter(token)) => token.clone(),
            other => panic!("unexpected value {other:?}"),
        };
        assert_eq!(token.to_string(), "overlay=x=10:y=10");
        assert_eq!(token.extra_inputs, vec!["[1:v]".to_string()]);
    }

    #[test]
    fn unknown_source_is_an_error() {
        let media = video_media();
        let overlay = Overlay::new(image_media(), Point::default());
        let format = Format::video();
        let pads = InputPads::new(media.source());
        assert_matches!(
            overlay.apply(&FilterContext::new(&media, &format, &pads)),
            Err(Error::Validation(_))
        );
    }
}
