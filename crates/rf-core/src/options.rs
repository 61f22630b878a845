//! Option fragments: the insertion-ordered `name -> values` map that filters,
//! formats and callers produce and the option heap later flattens.

use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// FilterToken
// ---------------------------------------------------------------------------

/// One atomic filter invocation such as `volume=volume=0.5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterToken {
    pub name: String,
    pub args: String,
    /// Pad labels of additional inputs the filter consumes, in pad order
    /// after the main input.
    pub extra_inputs: Vec<String>,
}

impl FilterToken {
    pub fn new(name: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: args.into(),
            extra_inputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, label: impl Into<String>) -> Self {
        self.extra_inputs.push(label.into());
        self
    }
}

impl fmt::Display for FilterToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}={}", self.name, self.args)
        }
    }
}

// ---------------------------------------------------------------------------
// OptionValue
// ---------------------------------------------------------------------------

/// A single value attached to an option name.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Keyed value rendered as `key=value` (metadata tags).
    Pair(String, String),
    /// Raw filter token, collapsed into an expression by a filter chain.
    Filter(FilterToken),
}

impl OptionValue {
    /// Text content, when this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Falsy values carry nothing worth emitting: false, zero, empty text
    /// and empty pairs. Negative numbers are not falsy.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
            Self::Float(v) => *v == 0.0,
            Self::Text(s) => s.is_empty(),
            Self::Pair(k, _) => k.is_empty(),
            Self::Filter(t) => t.name.is_empty(),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("1"),
            Self::Bool(false) => f.write_str("0"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Pair(k, v) => write!(f, "{k}={v}"),
            Self::Filter(t) => write!(f, "{t}"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for OptionValue {
    fn from(v: u64) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<usize> for OptionValue {
    fn from(v: usize) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&Path> for OptionValue {
    fn from(v: &Path) -> Self {
        Self::Text(v.to_string_lossy().into_owned())
    }
}

impl From<FilterToken> for OptionValue {
    fn from(v: FilterToken) -> Self {
        Self::Filter(v)
    }
}

/// True for filter-class option names (`filter`, `filter:a`, `-filter_complex`, ...).
pub fn is_filter_key(name: &str) -> bool {
    name.trim_start_matches('-').starts_with("filter")
}

// ---------------------------------------------------------------------------
// OptionMap
// ---------------------------------------------------------------------------

/// Insertion-ordered map from option name to its list of values.
///
/// Replacing a key keeps its original position; new keys go last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionMap {
    entries: Vec<(String, Vec<OptionValue>)>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding only the `output` path, the one option every
    /// composition requires.
    pub fn with_output(path: impl AsRef<Path>) -> Self {
        let mut map = Self::new();
        map.set("output", path.as_ref());
        map
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == name)
    }

    /// Replace all values of `name` with `value`.
    pub fn set(&mut self, name: &str, value: impl Into<OptionValue>) -> &mut Self {
        self.set_all(name, vec![value.into()])
    }

    /// Replace all values of `name` with `values`.
    pub fn set_all(&mut self, name: &str, values: Vec<OptionValue>) -> &mut Self {
        match self.position(name) {
            Some(i) => self.entries[i].1 = values,
            None => self.entries.push((name.to_string(), values)),
        }
        self
    }

    /// Append `value` to the values of `name`.
    pub fn push(&mut self, name: &str, value: impl Into<OptionValue>) -> &mut Self {
        let value = value.into();
        match self.position(name) {
            Some(i) => self.entries[i].1.push(value),
            None => self.entries.push((name.to_string(), vec![value])),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&[OptionValue]> {
        self.position(name).map(|i| self.entries[i].1.as_slice())
    }

    /// The last value of `name`, which is the one a scalar flag uses.
    pub fn last(&self, name: &str) -> Option<&OptionValue> {
        self.get(name).and_then(<[OptionValue]>::last)
    }

    /// The last value of `name` when it is text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.last(name).and_then(OptionValue::as_text)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<OptionValue>> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[OptionValue])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Concatenate the values of every key of `other` onto this map.
    pub fn merge_append(&mut self, other: OptionMap) -> &mut Self {
        for (name, values) in other.entries {
            match self.position(&name) {
                Some(i) => self.entries[i].1.extend(values),
                None => self.entries.push((name, values)),
            }
        }
        self
    }

    /// Let every key of `other` replace the same key here.
    pub fn merge_replace(&mut self, other: OptionMap) -> &mut Self {
        for (name, values) in other.entries {
            self.set_all(&name, values);
        }
        self
    }

    /// Merge lower-precedence fragments: filter-class keys append, any
    /// other key is only taken when absent here.
    pub fn merge_missing(&mut self, other: OptionMap) -> &mut Self {
        for (name, values) in other.entries {
            match self.position(&name) {
                Some(i) if is_filter_key(&name) => self.entries[i].1.extend(values),
                Some(_) => {}
                None => self.entries.push((name, values)),
            }
        }
        self
    }
}

impl<K: AsRef<str>, V: Into<OptionValue>> FromIterator<(K, V)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OptionMap::new();
        for (k, v) in iter {
            map.push(k.as_ref(), v);
        }
        map
    }
}

impl IntoIterator for OptionMap {
    type Item = (String, Vec<OptionValue>);
    type IntoIter = std::vec::IntoIter<(String, Vec<OptionValue>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
