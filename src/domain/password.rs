//! Hashed credentials.
//!
//! A [PasswordHash] only ever holds the output of a credential hasher. The raw
//! secret it was derived from is never kept around.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A salted and hashed password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an existing hash string, e.g. one loaded from the database.
    ///
    /// The caller should ensure that `raw_hash` really is a hash produced by a
    /// credential hasher.
    pub fn new_unchecked(raw_hash: impl Into<String>) -> Self {
        Self(raw_hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(********)")
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
