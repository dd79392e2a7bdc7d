use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// An absolute virtual path inside a package, rooted at `/`.
///
/// Segments match `[a-z0-9_-][a-z0-9_.-]*` and are at most 255 characters
/// each; the printed form is at most 255 characters in total. Consecutive
/// slashes in the parsed form collapse to one.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualPath {
    elements: Vec<String>,
}

impl VirtualPath {
    /// The root path `/`.
    #[must_use]
    pub fn root() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Extend this path with one extra segment.
    pub fn plus(&self, segment: &str) -> Result<Self, ModelError> {
        if !segment_valid(segment) {
            return Err(ModelError::InvalidPath(segment.to_string()));
        }
        let mut elements = self.elements.clone();
        elements.push(segment.to_string());
        let path = Self { elements };
        path.check_total_length()?;
        Ok(path)
    }

    #[must_use]
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(String::as_str)
    }

    fn check_total_length(&self) -> Result<(), ModelError> {
        if self.to_string().len() > 255 {
            return Err(ModelError::InvalidPath(self.to_string()));
        }
        Ok(())
    }
}

fn segment_valid(segment: &str) -> bool {
    if segment.is_empty() || segment.len() > 255 {
        return false;
    }
    let mut chars = segment.chars();
    let first_valid = chars
        .next()
        .is_some_and(|c| segment_char(c) && c != '.');
    first_valid && chars.all(segment_char)
}

fn segment_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' || c == '.'
}

impl FromStr for VirtualPath {
    type Err = ModelError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidPath(text.to_string());
        if !text.starts_with('/') {
            return Err(invalid());
        }

        let mut elements = Vec::new();
        for segment in text.split('/').filter(|s| !s.is_empty()) {
            if !segment_valid(segment) {
                return Err(invalid());
            }
            elements.push(segment.to_string());
        }

        let path = Self { elements };
        path.check_total_length()?;
        Ok(path)
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return f.write_str("/");
        }
        for element in &self.elements {
            write!(f, "/{element}")?;
        }
        Ok(())
    }
}
