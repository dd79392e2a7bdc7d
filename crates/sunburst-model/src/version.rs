use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// The qualifier text that marks a version as a snapshot.
const SNAPSHOT: &str = "SNAPSHOT";

/// A version qualifier: `[A-Za-z0-9_]{1,255}`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionQualifier(String);

impl VersionQualifier {
    pub fn new(text: impl Into<String>) -> Result<Self, ModelError> {
        let text = text.into();
        let valid = !text.is_empty()
            && text.len() <= 255
            && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(Self(text))
        } else {
            Err(ModelError::InvalidQualifier(text))
        }
    }

    /// The `SNAPSHOT` qualifier.
    #[must_use]
    pub fn snapshot() -> Self {
        Self(SNAPSHOT.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A (semantic) version number with an optional qualifier.
///
/// The textual form is `MAJOR.MINOR.PATCH[-QUALIFIER]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
    qualifier: Option<VersionQualifier>,
}

impl Version {
    #[must_use]
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            qualifier: None,
        }
    }

    #[must_use]
    pub fn with_qualifier(
        major: u32,
        minor: u32,
        patch: u32,
        qualifier: VersionQualifier,
    ) -> Self {
        Self {
            major,
            minor,
            patch,
            qualifier: Some(qualifier),
        }
    }

    #[must_use]
    pub fn major(&self) -> u32 {
        self.major
    }

    #[must_use]
    pub fn minor(&self) -> u32 {
        self.minor
    }

    #[must_use]
    pub fn patch(&self) -> u32 {
        self.patch
    }

    #[must_use]
    pub fn qualifier(&self) -> Option<&VersionQualifier> {
        self.qualifier.as_ref()
    }

    /// `true` if this version's qualifier is `SNAPSHOT`.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.qualifier
            .as_ref()
            .is_some_and(|q| q.as_str() == SNAPSHOT)
    }
}

impl FromStr for Version {
    type Err = ModelError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidVersion(text.to_string());
        let (numbers, qualifier) = match text.split_once('-') {
            Some((numbers, qualifier)) => (numbers, Some(qualifier)),
            None => (text, None),
        };

        let mut parts = numbers.split('.');
        let major = parse_number(parts.next(), text)?;
        let minor = parse_number(parts.next(), text)?;
        let patch = parse_number(parts.next(), text)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        let qualifier = match qualifier {
            Some(q) => Some(VersionQualifier::new(q)?),
            None => None,
        };

        Ok(Self {
            major,
            minor,
            patch,
            qualifier,
        })
    }
}

fn parse_number(part: Option<&str>, whole: &str) -> Result<u32, ModelError> {
    let invalid = || ModelError::InvalidVersion(whole.to_string());
    let part = part.ok_or_else(invalid)?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    part.parse().map_err(|_| invalid())
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, "-{qualifier}")?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| {
                compare_qualifiers(
                    self.qualifier.as_ref(),
                    other.qualifier.as_ref(),
                )
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// An absent qualifier sorts after any present qualifier: a release is
// greater than any of its qualified builds.
fn compare_qualifiers(
    a: Option<&VersionQualifier>,
    b: Option<&VersionQualifier>,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.as_str().cmp(y.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(text: &str) -> Version {
        text.parse().expect(text)
    }

    #[test]
    fn parses_and_prints() {
        for text in ["1.0.0", "1.0.0-SNAPSHOT", "0.0.0", "10.20.30-rc1"] {
            assert_eq!(version(text).to_string(), text);
        }
    }

    #[test]
    fn rejects_malformed_versions() {
        for text in [
            "",
            "1",
            "1.0",
            "1.0.0.0",
            "1.0.x",
            "1.0.0-",
            "-1.0.0",
            "1.0.0-β",
            "1.+0.0",
            "a.b.c",
        ] {
            assert!(text.parse::<Version>().is_err(), "{text:?}");
        }
    }

    #[test]
    fn rejects_invalid_qualifier() {
        assert!(VersionQualifier::new("β").is_err());
        assert!(VersionQualifier::new("").is_err());
        assert!(VersionQualifier::new("a".repeat(256)).is_err());
    }

    #[test]
    fn detects_snapshots() {
        assert!(version("1.0.0-SNAPSHOT").is_snapshot());
        assert!(!version("1.0.0").is_snapshot());
        assert!(!version("1.0.0-snapshot").is_snapshot());
    }

    #[test]
    fn orders_numerically_then_by_qualifier() {
        assert_eq!(version("1.0.0").cmp(&version("1.0.0")), Ordering::Equal);
        assert!(version("2.0.0") > version("1.0.0"));
        assert!(version("1.2.0") > version("1.0.0"));
        assert!(version("1.0.2") > version("1.0.0"));
        assert!(version("1.0.0") > version("1.0.0-SNAPSHOT"));
        assert!(version("1.0.0-SNAPSHOT") < version("1.0.0"));
        assert_eq!(
            version("1.0.0-SNAPSHOT").cmp(&version("1.0.0-SNAPSHOT")),
            Ordering::Equal
        );
        assert!(version("1.0.0-B") > version("1.0.0-A"));
    }
}
