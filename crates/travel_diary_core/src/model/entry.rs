//! Travel entry domain model.
//!
//! # Responsibility
//! - Define the canonical persisted record pairing a photo with an address.
//! - Generate time-ordered, collision-free entry identifiers.
//!
//! # Invariants
//! - `id`, `image_uri` and `address` are all non-blank for a valid entry.
//! - Entries are immutable once created; there is no update path.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque identifier of a persisted travel entry.
///
/// Freshly generated ids are UUIDv7 strings, so their lexical order follows
/// creation order. Ids loaded from storage are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generates a new time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One journal record: a captured photo and the place it was taken.
///
/// Serialized with camelCase keys (`id`, `imageUri`, `address`) to stay
/// readable by earlier builds of the client that wrote the same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelEntry {
    pub id: EntryId,
    /// Reference to an image owned by the device capture subsystem.
    pub image_uri: String,
    /// Human-readable address resolved at capture time.
    pub address: String,
}

impl TravelEntry {
    /// Creates a validated entry with a freshly generated id.
    ///
    /// # Errors
    /// Returns `EntryValidationError` when `image_uri` or `address` is blank.
    pub fn new(
        image_uri: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self, EntryValidationError> {
        Self::with_id(EntryId::generate(), image_uri, address)
    }

    /// Creates a validated entry with a caller-provided id.
    pub fn with_id(
        id: EntryId,
        image_uri: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self, EntryValidationError> {
        let entry = Self {
            id,
            image_uri: image_uri.into(),
            address: address.into(),
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Checks the persistence invariant.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(EntryValidationError::EmptyId);
        }
        if self.image_uri.trim().is_empty() {
            return Err(EntryValidationError::EmptyImageUri);
        }
        if self.address.trim().is_empty() {
            return Err(EntryValidationError::EmptyAddress);
        }
        Ok(())
    }
}

/// Reasons a `TravelEntry` may not be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyId,
    EmptyImageUri,
    EmptyAddress,
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "entry id must not be empty"),
            Self::EmptyImageUri => write!(f, "entry image_uri must not be empty"),
            Self::EmptyAddress => write!(f, "entry address must not be empty"),
        }
    }
}

impl Error for EntryValidationError {}
