//! Party identity and the mutually-computed exchange identifier.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque short identifier for a party in an exchange.
///
/// In the reference flow this is the first 32 characters of a
/// hex-rendered UUID with separators removed; this type makes no
/// assumption beyond "printable-ASCII, nonempty, fixed-length per
/// exchange" so other id schemes remain valid.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartyId(String);

impl PartyId {
    /// Wrap a raw id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id: the first 32 hex characters of a v4 UUID with
    /// dashes removed, matching the reference `getid` helper.
    pub fn generate() -> Self {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        Self(uuid[..32].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PartyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identifier both parties compute independently and deposit under
/// at the escrow box.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExchangeId(String);

impl ExchangeId {
    /// Construct the `ExchangeId` from the two parties' 16-hex-char
    /// `id_part` strings.
    ///
    /// Scans left-to-right to the first differing byte and concatenates
    /// larger-first then smaller. If the two parts are byte-identical
    /// (probability ~2⁻⁶⁴ for random 16-hex-char parts) this returns
    /// `Err(Error::DegenerateExchangeId)`; callers MUST treat that as a
    /// fatal protocol error rather than proceeding with an empty id.
    pub fn from_id_parts(a: &str, b: &str) -> Result<Self> {
        let (a_bytes, b_bytes) = (a.as_bytes(), b.as_bytes());
        let mut differing = None;
        for i in 0..a_bytes.len().min(b_bytes.len()) {
            if a_bytes[i] != b_bytes[i] {
                differing = Some(i);
                break;
            }
        }
        let Some(i) = differing else {
            return Err(Error::DegenerateExchangeId);
        };
        let (larger, smaller) = if a_bytes[i] > b_bytes[i] { (a, b) } else { (b, a) };
        Ok(Self(format!("{larger}{smaller}")))
    }

    /// Wrap an already-computed exchange id string (e.g. read back from
    /// storage). Empty strings are rejected: §6 mandates treating an
    /// empty `exID` as a fatal protocol error.
    pub fn from_raw(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::DegenerateExchangeId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
