use std::fmt;

use serde::{Deserialize, Serialize};

/// Content-addressed identifier for a stored blob.
///
/// An `ObjectId` is the BLAKE3 hash of an object's content. The all-zero
/// value is reserved: a file side whose identifier is null does not exist
/// (pure add or delete), or its identity has not been computed yet.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; 32]);

impl ObjectId {
    /// Number of hex characters in the abbreviated form used by patch headers.
    pub const ABBREV_LEN: usize = 7;

    /// Plain BLAKE3 of `data`, without a domain tag.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    pub const fn null() -> Self {
        Self([0u8; 32])
    }

    pub fn is_null(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The first `len` hex characters, clamped to the full 64.
    pub fn abbrev(&self, len: usize) -> String {
        let bytes = len.div_ceil(2).min(self.0.len());
        let mut out = hex::encode(&self.0[..bytes]);
        out.truncate(len);
        out
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.abbrev(Self::ABBREV_LEN))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_null() {
        assert!(ObjectId::default().is_null());
        assert_eq!(ObjectId::default(), ObjectId::null());
        assert!(!ObjectId::from_bytes(b"").is_null());
    }

    #[test]
    fn abbrev_lengths() {
        let id = ObjectId::from_bytes(b"test");
        assert_eq!(id.abbrev(ObjectId::ABBREV_LEN).len(), 7);
        assert!(id.to_hex().starts_with(&id.abbrev(7)));
        assert_eq!(id.abbrev(100), id.to_hex());
        assert_eq!(ObjectId::null().abbrev(7), "0000000");
    }

    #[test]
    fn debug_shows_abbreviation() {
        let id = ObjectId::from_hash([0xab; 32]);
        assert_eq!(format!("{id:?}"), "ObjectId(abababa)");
        assert_eq!(id.to_string().len(), 64);
    }

    #[test]
    fn serializes_as_byte_array() {
        let json = serde_json::to_string(&ObjectId::null()).unwrap();
        let parsed: ObjectId = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_null());
    }
}
