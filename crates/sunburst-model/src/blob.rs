use crate::hash::Hash;

/// An immutable byte sequence addressed by its hash.
///
/// The size and content type are advisory metadata; the hash alone
/// identifies the blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub size: u64,
    pub content_type: String,
    pub hash: Hash,
}

impl Blob {
    pub fn new(size: u64, content_type: impl Into<String>, hash: Hash) -> Self {
        Self {
            size,
            content_type: content_type.into(),
            hash,
        }
    }
}
