//! Transient capture state held by an active entry workflow.

use serde::{Deserialize, Serialize};

/// A single geolocation fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns whether both components are finite and inside WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Address half of a pending capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressState {
    /// Location and reverse geocoding are in flight.
    Resolving,
    Resolved(String),
    /// Resolution failed; the user has to retake the photo.
    Failed,
}

/// Photo taken but not yet saved or discarded.
///
/// Owned by exactly one workflow instance and dropped on save, discard or
/// navigation away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCapture {
    pub image_uri: String,
    pub address: AddressState,
    pub error_message: Option<String>,
}

impl PendingCapture {
    /// Starts a capture whose address is still being resolved.
    pub fn resolving(image_uri: impl Into<String>) -> Self {
        Self {
            image_uri: image_uri.into(),
            address: AddressState::Resolving,
            error_message: None,
        }
    }

    /// Returns the resolved address when one is available.
    pub fn resolved_address(&self) -> Option<&str> {
        match &self.address {
            AddressState::Resolved(address) if !address.trim().is_empty() => {
                Some(address.as_str())
            }
            _ => None,
        }
    }

    /// Save/remove controls are only offered once this returns `true`.
    pub fn is_confirmable(&self) -> bool {
        !self.image_uri.trim().is_empty() && self.resolved_address().is_some()
    }
}
