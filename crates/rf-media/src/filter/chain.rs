//! Priority-ordered sequence of filters rendered as one filter expression.

use std::sync::Arc;

use rf_core::{is_filter_key, OptionMap, OptionValue, Result, StreamMask};

use super::{check_priority, Filter, FilterContext};
use crate::media::Media;

#[derive(Debug, Clone)]
struct Entry {
    priority: u32,
    seq: u64,
    filter: Arc<dyn Filter>,
}

/// Pad labels wrapped around a collapsed chain expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainPads {
    /// Labels prefixed to the expression, e.g. `[c0_main]`.
    pub inputs: Vec<String>,
    /// Labels appended to the expression.
    pub outputs: Vec<String>,
    /// Unique prefix for labels created when the chain has to be split.
    pub tag: String,
    /// Input whose raw stream feeds a split chain that has no input label.
    pub default_input: usize,
}

/// Ordered filters. Iteration is by descending priority, then by insertion
/// order for equal priorities.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter with a priority in `0..=99`.
    pub fn add_filter(&mut self, filter: impl Filter + 'static, priority: u32) -> Result<&mut Self> {
        self.add_shared(Arc::new(filter), priority)
    }

    pub fn add_shared(&mut self, filter: Arc<dyn Filter>, priority: u32) -> Result<&mut Self> {
        check_priority(priority)?;
        self.entries.push(Entry {
            priority,
            seq: self.next_seq,
            filter,
        });
        self.next_seq += 1;
        Ok(self)
    }

    fn ordered(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.entries.iter().collect();
        entries.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
        entries
    }

    /// Filters in application order.
    pub fn filters(&self) -> Vec<&Arc<dyn Filter>> {
        self.ordered().into_iter().map(|e| &e.filter).collect()
    }

    /// Union of the kinds of every filter.
    pub fn kinds(&self) -> StreamMask {
        self.entries
            .iter()
            .fold(StreamMask::NONE, |acc, e| acc | e.filter.kinds())
    }

    /// Extra sources referenced by the filters, in application order.
    pub fn inputs(&self) -> Vec<&Media> {
        self.ordered()
            .into_iter()
            .flat_map(|e| e.filter.inputs())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merged fragments of every filter, filter tokens not yet collapsed.
    pub fn fragments(&self, ctx: &FilterContext<'_>) -> Result<OptionMap> {
        let mut options = OptionMap::new();
        for entry in self.ordered() {
            let fragment = entry.filter.apply(ctx)?;
            tracing::trace!("filter {} produced {} option(s)", entry.filter.name(), fragment.len());
            options.merge_append(fragment);
        }
        Ok(options)
    }

    /// Fragments with each filter-class key collapsed into one expression
    /// wrapped in `pads`.
    pub fn apply(&self, ctx: &FilterContext<'_>, pads: &ChainPads) -> Result<OptionMap> {
        let mut collapsed = OptionMap::new();
        for (key, values) in self.fragments(ctx)? {
            if !is_filter_key(&key) {
                collapsed.set_all(&key, values);
                continue;
            }
            let expression = collapse(&values, pads, super::pad_type(&key));
            if !expression.is_empty() {
                collapsed.set(&key, expression);
            }
        }
        Ok(collapsed)
    }
}

/// Render filter values as one expression: tokens joined by `, `, prefixed
/// by the input labels and suffixed by the output labels.
///
/// A token that consumes extra inputs must see the main stream on its first
/// pad, so when it follows other tokens the chain is split there through a
/// `[<tag>m<n>]` label.
pub fn collapse(values: &[OptionValue], pads: &ChainPads, stream_type: char) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut prefix: String = pads.inputs.concat();
    let mut tokens: Vec<String> = Vec::new();
    let mut splits = 0;

    for value in values.iter().filter(|v| !v.is_blank()) {
        if let OptionValue::Filter(token) = value {
            if !token.extra_inputs.is_empty() {
                if tokens.is_empty() {
                    if prefix.is_empty() {
                        prefix = format!("[{}:{stream_type}]", pads.default_input);
                    }
                } else {
                    let label = format!("[{}m{splits}]", pads.tag);
                    splits += 1;
                    segments.push(format!("{prefix}{}{label}", tokens.join(", ")));
                    tokens.clear();
                    prefix = label;
                }
                prefix.push_str(&token.extra_inputs.concat());
            }
        }
        tokens.push(value.to_string());
    }

    if tokens.is_empty() && segments.is_empty() {
        return String::new();
    }
    segments.push(format!("{prefix}{}{}", tokens.join(", "), pads.outputs.concat()));
    segments.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::builtin::SimpleFilter;
    use crate::filter::InputPads;
    use crate::media::tests::audio_media;
    use rf_core::{FilterToken, Format};

    fn token_filter(name: &str) -> SimpleFilter {
        let mut map = OptionMap::new();
        map.push("filter:a", FilterToken::new(name, ""));
        SimpleFilter::new(map)
    }

    fn render(chain: &FilterChain) -> String {
        let media = audio_media();
        let format = Format::mp3();
        let pads = InputPads::new(media.source());
        let ctx = FilterContext::new(&media, &format, &pads);
        let options = chain.apply(&ctx, &ChainPads::default()).unwrap();
        options.text("filter:a").unwrap_or_default().to_string()
    }

    #[test]
    fn priority_then_insertion_order() {
        let mut chain = FilterChain::new();
        chain.add_filter(token_filter("a"), 1).unwrap();
        chain.add_filter(token_filter("b"), 5).unwrap();
        chain.add_filter(token_filter("c"), 1).unwrap();
        chain.add_filter(token_filter("d"), 5).unwrap();
        assert_eq!(render(&chain), "b, d, a, c");
    }

    #[test]
    fn priority_out_of_range() {
        let mut chain = FilterChain::new();
        let err = chain.add_filter(token_filter("a"), 100).unwrap_err();
        assert!(matches!(err, rf_core::Error::Configuration(_)));
        assert!(chain.is_empty());
    }

    #[test]
    fn labels_wrap_expression() {
        let values = vec![
            OptionValue::Filter(FilterToken::new("scale", "w=100:h=50")),
            OptionValue::Filter(FilterToken::new("hflip", "")),
        ];
        let pads = ChainPads {
            inputs: vec!["[in]".into()],
            outputs: vec!["[out]".into()],
            ..ChainPads::default()
        };
        assert_eq!(collapse(&values, &pads, 'v'), "[in]scale=w=100:h=50, hflip[out]");
    }

    #[test]
    fn extra_input_splits_chain() {
        let values = vec![
            OptionValue::Filter(FilterToken::new("scale", "w=100:h=50")),
            OptionValue::Filter(FilterToken::new("overlay", "x=1:y=2").with_input("[1:v]")),
        ];
        let pads = ChainPads {
            tag: "i0c0".into(),
            ..ChainPads::default()
        };
        assert_eq!(
            collapse(&values, &pads, 'v'),
            "scale=w=100:h=50[i0c0m0]; [i0c0m0][1:v]overlay=x=1:y=2"
        );
    }

    #[test]
    fn extra_input_first_uses_default_pad() {
        let values = vec![OptionValue::Filter(
            FilterToken::new("overlay", "x=0:y=0").with_input("[2:v]"),
        )];
        assert_eq!(
            collapse(&values, &ChainPads::default(), 'v'),
            "[0:v][2:v]overlay=x=0:y=0"
        );
    }

    #[test]
    fn blank_values_collapse_to_nothing() {
        let values = vec![OptionValue::Text(String::new())];
        assert_eq!(collapse(&values, &ChainPads::default(), 'a'), "");
    }
}
