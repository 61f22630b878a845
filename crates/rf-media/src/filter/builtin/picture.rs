//! Picture edits. They apply to still images and to the picture of a video.

use rf_core::{Dimension, Error, FilterToken, OptionMap, Point, Result, StreamMask};

use crate::filter::{join_args, Filter, FilterContext};

fn picture_only(filter: &str, ctx: &FilterContext<'_>) -> Result<()> {
    if ctx.format.frame_traits().is_none() {
        return Err(Error::validation(format!(
            "the {filter} filter needs an output format with a picture, got {}",
            ctx.format
        )));
    }
    Ok(())
}

fn video_filter(token: FilterToken) -> OptionMap {
    let mut options = OptionMap::new();
    options.push("filter:v", token);
    options
}

// ---------------------------------------------------------------------------
// Crop
// ---------------------------------------------------------------------------

/// Keep a `dimension`-sized rectangle whose top-left corner is `point`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crop {
    point: Point,
    dimension: Dimension,
}

impl Crop {
    pub fn new(point: Point, dimension: Dimension) -> Self {
        Self { point, dimension }
    }
}

impl Filter for Crop {
    fn name(&self) -> &str {
        "crop"
    }

    fn kinds(&self) -> StreamMask {
        StreamMask::FRAME
    }

    fn apply(&self, _ctx: &FilterContext<'_>) -> Result<OptionMap> {
        let args = join_args([
            ("out_w", Some(self.dimension.width().to_string())),
            ("out_h", Some(self.dimension.height().to_string())),
            ("x", Some(self.point.x.to_string())),
            ("y", Some(self.point.y.to_string())),
        ]);
        Ok(video_filter(FilterToken::new("crop", args)))
    }
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

/// Scale the picture. With only one side given the other follows the
/// aspect ratio of the reference picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resize {
    width: Option<u32>,
    height: Option<u32>,
}

impl Resize {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Result<Self> {
        match (width, height) {
            (None, None) => Err(Error::validation("resize needs a width, a height or both")),
            (Some(0), _) | (_, Some(0)) => Err(Error::validation("resize sides must be at least 1")),
            _ => Ok(Self { width, height }),
        }
    }

    pub fn to_width(width: u32) -> Result<Self> {
        Self::new(Some(width), None)
    }

    pub fn to_height(height: u32) -> Result<Self> {
        Self::new(None, Some(height))
    }

    /// Picture size the missing side is derived from: the target format's
    /// when set, the source's otherwise.
    fn reference(ctx: &FilterContext<'_>) -> Option<Dimension> {
        let sized = |f: &rf_core::Format| {
            let frame = f.frame_traits()?;
            Dimension::new(frame.width()?, frame.height()?).ok()
        };
        sized(ctx.format).or_else(|| sized(ctx.media.format()))
    }
}

impl Filter for Resize {
    fn name(&self) -> &str {
        "resize"
    }

    fn kinds(&self) -> StreamMask {
        StreamMask::FRAME
    }

    fn apply(&self, ctx: &FilterContext<'_>) -> Result<OptionMap> {
        picture_only("resize", ctx)?;
        let reference = Self::reference(ctx);

        let side = |v: Option<u32>| v.map_or_else(|| "-1".to_string(), |v| v.to_string());
        let (width, height) = match (self.width, self.height, reference) {
            (Some(w), None, Some(r)) => (w.to_string(), (f64::from(w) / r.ratio()).round().to_string()),
            (None, Some(h), Some(r)) => ((f64::from(h) * r.ratio()).round().to_string(), h.to_string()),
            // Without a reference -1 lets the transcoder keep the aspect ratio.
            (w, h, _) => (side(w), side(h)),
        };

        if let Some(r) = reference {
            if width == r.width().to_string() && height == r.height().to_string() {
                tracing::debug!("resize to {r} is a no-op");
                return Ok(OptionMap::new());
            }
        }

        let args = join_args([("w", Some(width)), ("h", Some(height))]);
        Ok(video_filter(FilterToken::new("scale", args)))
    }
}

// ---------------------------------------------------------------------------
// Rotate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Angle {
    Radians(f64),
    Expression(String),
}

/// Rotate the picture by a fixed angle or a per-frame expression.
///
/// Expressions may use `%frame%`, `%frame_time%`, `%width%`, `%height%`,
/// `%width_out%` and `%height_out%`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rotate {
    angle: Angle,
    bilinear: bool,
    fill_color: String,
}

impl Rotate {
    fn with_angle(angle: Angle) -> Self {
        Self {
            angle,
            bilinear: true,
            fill_color: "black".to_string(),
        }
    }

    pub fn radians(radians: f64) -> Result<Self> {
        if !radians.is_finite() {
            return Err(Error::validation("rotation angle must be a finite number"));
        }
        Ok(Self::with_angle(Angle::Radians(radians)))
    }

    pub fn degrees(degrees: f64) -> Result<Self> {
        Self::radians(degrees.to_radians())
    }

    pub fn expression(expression: impl Into<String>) -> Result<Self> {
        let expression = expression.into();
        if expression.trim().is_empty() {
            return Err(Error::validation("rotation expression is empty"));
        }
        Ok(Self::with_angle(Angle::Expression(expression)))
    }

    pub fn with_bilinear(mut self, bilinear: bool) -> Self {
        self.bilinear = bilinear;
        self
    }

    pub fn with_fill_color(mut self, color: impl Into<String>) -> Self {
        self.fill_color = color.into();
        self
    }

    fn angle_arg(&self) -> String {
        match &self.angle {
            Angle::Radians(r) => r.to_string(),
            Angle::Expression(e) => [
                ("%frame_time%", "t"),
                ("%frame%", "n"),
                ("%width_out%", "out_w"),
                ("%height_out%", "out_h"),
                ("%width%", "in_w"),
                ("%height%", "in_h"),
            ]
            .iter()
            .fold(e.clone(), |acc, (from, to)| acc.replace(from, to)),
        }
    }
}

impl Filter for Rotate {
    fn name(&self) -> &str {
        "rotate"
    }

    fn kinds(&self) -> StreamMask {
        StreamMask::FRAME
    }

    fn apply(&self, _ctx: &FilterContext<'_>) -> Result<OptionMap> {
        let args = join_args([
            ("angle", Some(self.angle_arg())),
            ("bilinear", Some(u8::from(self.bilinear).to_string())),
            ("fillcolor", Some(self.fill_color.clone())),
        ]);
        Ok(video_filter(FilterToken::new("rotate", args)))
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Draw a line of text on the picture.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    content: String,
    size: u32,
    color: String,
    position: Point,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            size: 16,
            color: "black".to_string(),
            position: Point::new(0, 0),
        }
    }

    pub fn with_size(mut self, size: u32) -> Result<Self> {
        if size < 1 {
            return Err(Error::validation("font size must be at least 1"));
        }
        self.size = size;
        Ok(self)
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Escape `text` for a quoted drawtext value inside a filtergraph.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ':' => escaped.push_str("\\:"),
            '\'' => escaped.push_str("'\\\\\\''"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl Filter for Text {
    fn name(&self) -> &str {
        "text"
    }

    fn kinds(&self) -> StreamMask {
        StreamMask::FRAME
    }

    fn apply(&self, ctx: &FilterContext<'_>) -> Result<OptionMap> {
        picture_only("text", ctx)?;
        let args = join_args([
            ("fontsize", Some(self.size.to_string())),
            ("fontcolor", Some(self.color.clone())),
            ("x", Some(self.position.x.to_string())),
            ("y", Some(self.position.y.to_string())),
        ]);
        let text = escape_text(&self.content);
        Ok(video_filter(FilterToken::new(
            "drawtext",
            format!("text='{text}':{args}"),
        )))
    }
}
