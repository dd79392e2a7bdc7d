use thiserror::Error;

use crate::hash::HashAlgorithm;

/// Errors raised by value type constructors and parsers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error(
        "package name '{0}' must be one or more dot-separated segments \
         matching [a-z][a-z0-9_-]*, and be <= 255 characters long"
    )]
    InvalidPackageName(String),

    #[error("version '{0}' must match the pattern MAJOR.MINOR.PATCH[-QUALIFIER]")]
    InvalidVersion(String),

    #[error("version qualifier '{0}' must match [A-Za-z0-9_]{{1,255}}")]
    InvalidQualifier(String),

    #[error("package identifier '{0}' must match the pattern NAME:VERSION")]
    InvalidIdentifier(String),

    #[error(
        "path '{0}' must be absolute, with segments matching \
         [a-z0-9_-][a-z0-9_.-]*, and be <= 255 characters long"
    )]
    InvalidPath(String),

    #[error("unrecognized hash algorithm '{0}'")]
    UnknownHashAlgorithm(String),

    #[error("hash '{0}' must match the pattern ALGORITHM:HEX")]
    InvalidHash(String),

    #[error("hash value has {received} bytes, but {algorithm} digests have {expected}")]
    InvalidHashLength {
        algorithm: HashAlgorithm,
        expected: usize,
        received: usize,
    },
}
