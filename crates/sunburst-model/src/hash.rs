use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::ModelError;

/// The set of supported hash algorithms.
///
/// Each algorithm has a stable numeric index, a canonical text identifier,
/// and a fixed digest size; the set is closed but designed for extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashAlgorithm {
    Sha2_256,
}

impl HashAlgorithm {
    /// The stable numeric index of this algorithm.
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Sha2_256 => 0,
        }
    }

    /// The canonical text identifier of this algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha2_256 => "SHA2_256",
        }
    }

    /// The digest size in bytes.
    #[must_use]
    pub const fn digest_size(self) -> usize {
        match self {
            Self::Sha2_256 => 32,
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = ModelError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "SHA2_256" => Ok(Self::Sha2_256),
            other => Err(ModelError::UnknownHashAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hash value produced by one of the supported algorithms.
///
/// The textual form is `ALGORITHM:HEX` with upper-case hex digits.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash {
    algorithm: HashAlgorithm,
    value: Vec<u8>,
}

impl Hash {
    pub fn new(
        algorithm: HashAlgorithm,
        value: Vec<u8>,
    ) -> Result<Self, ModelError> {
        let expected = algorithm.digest_size();
        if value.len() != expected {
            return Err(ModelError::InvalidHashLength {
                algorithm,
                expected,
                received: value.len(),
            });
        }
        Ok(Self { algorithm, value })
    }

    /// Hash the given bytes with the given algorithm.
    #[must_use]
    pub fn of_bytes(algorithm: HashAlgorithm, data: &[u8]) -> Self {
        let value = match algorithm {
            HashAlgorithm::Sha2_256 => Sha256::digest(data).to_vec(),
        };
        Self { algorithm, value }
    }

    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The hash value as upper-case hex.
    #[must_use]
    pub fn value_hex(&self) -> String {
        hex::encode_upper(&self.value)
    }
}

impl FromStr for Hash {
    type Err = ModelError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidHash(text.to_string());
        let (algorithm, value) = text.split_once(':').ok_or_else(invalid)?;
        let algorithm: HashAlgorithm = algorithm.parse()?;
        let value = hex::decode(value).map_err(|_| invalid())?;
        Self::new(algorithm, value)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.value_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_HASH: &str =
        "2D8BD7D9BB5F85BA643F0110D50CB506A1FE439E769A22503193EA6046BB87F7";

    #[test]
    fn hashes_known_bytes() {
        let hash = Hash::of_bytes(HashAlgorithm::Sha2_256, b"Hello.");
        assert_eq!(hash.value_hex(), HELLO_HASH);
        assert_eq!(hash.to_string(), format!("SHA2_256:{HELLO_HASH}"));
    }

    #[test]
    fn round_trips_text() {
        let text = format!("SHA2_256:{HELLO_HASH}");
        let hash: Hash = text.parse().unwrap();
        assert_eq!(hash.to_string(), text);
        assert_eq!(hash.algorithm(), HashAlgorithm::Sha2_256);
        assert_eq!(hash.value().len(), 32);
    }

    #[test]
    fn accepts_lower_case_hex() {
        let text = format!("SHA2_256:{}", HELLO_HASH.to_lowercase());
        let hash: Hash = text.parse().unwrap();
        assert_eq!(hash.value_hex(), HELLO_HASH);
    }

    #[test]
    fn rejects_malformed_hashes() {
        for text in [
            "",
            "SHA2_256",
            "SHA2_256:",
            "SHA2_256:ZZ",
            "SHA2_256:2D8B",
            "MD5:00000000000000000000000000000000",
        ] {
            assert!(text.parse::<Hash>().is_err(), "{text:?}");
        }
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = Hash::new(HashAlgorithm::Sha2_256, vec![0; 16]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidHashLength { .. }));
    }

    #[test]
    fn orders_by_algorithm_then_value() {
        let a = Hash::new(HashAlgorithm::Sha2_256, vec![0; 32]).unwrap();
        let b = Hash::new(HashAlgorithm::Sha2_256, vec![1; 32]).unwrap();
        assert!(a < b);
    }
}
