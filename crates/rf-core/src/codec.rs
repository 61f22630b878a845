//! Codec identifiers.

use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};

/// A codec as understood by the transcoder: a short `code` passed on the
/// command line and a human-readable `name`.
///
/// Two codecs are equal when their codes match.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct Codec {
    code: String,
    name: String,
}

impl Codec {
    /// Create a codec, rejecting an empty code.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(Error::validation("codec code must not be empty"));
        }
        Ok(Self {
            code,
            name: name.into(),
        })
    }

    /// Create a codec whose name is its code.
    pub fn from_code(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        let name = code.clone();
        Self::new(code, name)
    }

    /// Codec from a compile-time constant code.
    pub(crate) fn known(code: &'static str) -> Self {
        Self {
            code: code.to_string(),
            name: code.to_string(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Codec {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_code_rejected() {
        assert!(Codec::new("", "nothing").is_err());
        assert!(Codec::new("   ", "blank").is_err());
    }

    #[test]
    fn equality_by_code() {
        let a = Codec::new("aac", "AAC (Advanced Audio Coding)").unwrap();
        let b = Codec::from_code("aac").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "aac");
        assert_eq!(b.name(), "aac");
    }
}
