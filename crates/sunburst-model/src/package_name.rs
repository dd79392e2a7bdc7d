use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// A package name: one or more dot-separated segments, each matching
/// `[a-z][a-z0-9_-]*`, at most 255 characters in total. Case-sensitive.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageName(String);

impl PackageName {
    pub fn new(text: impl Into<String>) -> Result<Self, ModelError> {
        let text = text.into();
        if valid(&text) {
            Ok(Self(text))
        } else {
            Err(ModelError::InvalidPackageName(text))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn valid(text: &str) -> bool {
    !text.is_empty() && text.len() <= 255 && text.split('.').all(segment_valid)
}

fn segment_valid(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
    })
}

impl FromStr for PackageName {
    type Err = ModelError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::new(text)
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
