use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::{NoContext, Timestamp, Uuid};

const ID_LEN: usize = 24;

/// Error returned when a string is not a well-formed document identifier.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid document id '{0}': expected 24 hexadecimal characters")]
pub struct ParseIdError(String);

/// Store-assigned document identifier: 24 lowercase hexadecimal characters.
///
/// Parsing accepts either case and normalizes to lowercase, so an id survives
/// a round trip through clients that uppercase it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh identifier: the leading 12 bytes of a UUIDv7,
    /// hex-encoded. Time-ordered, so identifier order tracks creation order.
    pub fn generate() -> Self {
        let uuid = Uuid::new_v7(Timestamp::now(NoContext));
        let mut encoded = String::with_capacity(ID_LEN);
        for byte in &uuid.into_bytes()[..ID_LEN / 2] {
            let _ = write!(encoded, "{byte:02x}");
        }
        Self(encoded)
    }

    /// Parse and normalize an identifier from its string form.
    pub fn parse(raw: &str) -> Result<Self, ParseIdError> {
        if raw.len() == ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(ParseIdError(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentId {
    type Err = ParseIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = ParseIdError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}
