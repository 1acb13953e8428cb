use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Name of a commit, tree or blob in the in-memory backend.
///
/// Ids are BLAKE3 digests of object content, so equal ids mean equal
/// content. The engine leans on this: two commits whose tree ids match have
/// identical snapshots without looking inside them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; ObjectId::LEN]);

impl ObjectId {
    /// Digest length in bytes.
    pub const LEN: usize = 32;
    /// Length of the full hex form.
    pub const HEX_LEN: usize = Self::LEN * 2;
    /// Length of [`ObjectId::short_hex`], as git abbreviates.
    pub const SHORT_LEN: usize = 7;

    /// Plain BLAKE3 of `data`, without any object-kind domain.
    ///
    /// Handy for fabricating distinct ids; stored objects get theirs from
    /// the store's kind-aware hashing.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(blake3::hash(data).into())
    }

    pub fn from_hash(hash: [u8; Self::LEN]) -> Self {
        Self(hash)
    }

    /// The all-zero id, never produced by hashing.
    pub const fn null() -> Self {
        Self([0; Self::LEN])
    }

    pub fn is_null(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated hex form for logs and reports.
    pub fn short_hex(&self) -> String {
        let mut s = self.to_hex();
        s.truncate(Self::SHORT_LEN);
        s
    }

    /// Case-insensitive hex prefix test. An empty prefix matches nothing.
    pub fn matches_hex_prefix(&self, prefix: &str) -> bool {
        !prefix.is_empty()
            && prefix.len() <= Self::HEX_LEN
            && self.to_hex().starts_with(&prefix.to_ascii_lowercase())
    }

    /// Returns `true` if this id begins with `prefix`.
    pub fn starts_with(&self, prefix: &IdPrefix) -> bool {
        self.matches_hex_prefix(prefix.as_str())
    }

    /// Parse the full hex form.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != Self::HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: Self::HEX_LEN,
                actual: s.len(),
            });
        }
        let mut bytes = [0; Self::LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.short_hex()).finish()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// An abbreviated object id as typed by a user: lowercase hex, at least
/// [`IdPrefix::MIN_LEN`] and at most [`ObjectId::HEX_LEN`] characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdPrefix(String);

impl IdPrefix {
    /// Shortest prefix accepted, matching git's minimum abbreviation.
    pub const MIN_LEN: usize = 4;

    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.len() < Self::MIN_LEN || s.len() > ObjectId::HEX_LEN {
            return Err(TypeError::InvalidPrefix(s.to_string()));
        }
        if let Some(bad) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidHex(format!("invalid character {bad:?} in {s:?}")));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the prefix names exactly one full-length id.
    pub fn is_complete(&self) -> bool {
        self.0.len() == ObjectId::HEX_LEN
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
