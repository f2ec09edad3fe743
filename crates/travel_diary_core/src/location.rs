//! Device geolocation and address resolution.
//!
//! # Responsibility
//! - Gate the device location fix behind a foreground permission grant.
//! - Turn coordinates into a `"{name}, {city}, {region}"` display string.
//!
//! # Invariants
//! - `current_coordinates` never queries the device without a cached grant.
//! - `format_address` always emits both separators, even for missing parts.
//! - Neither provider retries; failures propagate immediately.

use crate::device::{LocationService, ReverseGeocoder};
use crate::model::capture::Coordinates;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    PermissionDenied,
    Unavailable(String),
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Permission to access location was denied.",
            Self::Unavailable(_) => "Error fetching location.",
        }
    }
}

impl Display for LocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "location permission denied"),
            Self::Unavailable(message) => write!(f, "location unavailable: {message}"),
        }
    }
}

impl Error for LocationError {}

/// Permission-gated single-fix location lookup.
pub struct LocationProvider<L: LocationService> {
    service: L,
    granted: bool,
}

impl<L: LocationService> LocationProvider<L> {
    pub fn new(service: L) -> Self {
        Self {
            service,
            granted: false,
        }
    }

    /// Prompts for foreground location permission unless already granted.
    ///
    /// Only a grant is remembered, so a later call may prompt again after
    /// a denial.
    pub fn ensure_permission(&mut self) -> Result<(), LocationError> {
        if self.granted {
            return Ok(());
        }
        if self.service.request_foreground_permission().is_granted() {
            self.granted = true;
            info!("event=location_permission module=location status=granted");
            Ok(())
        } else {
            warn!("event=location_permission module=location status=denied");
            Err(LocationError::PermissionDenied)
        }
    }

    pub fn has_permission(&self) -> bool {
        self.granted
    }

    /// Returns the best available fix.
    pub fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        if !self.granted {
            return Err(LocationError::PermissionDenied);
        }

        let coordinates = self.service.current_position().map_err(|err| {
            warn!("event=location_fix module=location status=error error={err}");
            LocationError::Unavailable(err.message)
        })?;
        if !coordinates.is_valid() {
            warn!("event=location_fix module=location status=error error_code=invalid_coordinates");
            return Err(LocationError::Unavailable(
                "device returned out-of-range coordinates".to_string(),
            ));
        }
        Ok(coordinates)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The geocoder returned no place for the coordinates.
    NoMatch,
    Geocoder(String),
}

impl ResolutionError {
    pub fn user_message(&self) -> &'static str {
        "Error fetching address."
    }
}

impl Display for ResolutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMatch => write!(f, "no address found for coordinates"),
            Self::Geocoder(message) => write!(f, "reverse geocoding failed: {message}"),
        }
    }
}

impl Error for ResolutionError {}

/// Formats a place as `"{name}, {city}, {region}"`.
///
/// Missing components become empty strings; separators are never dropped.
pub fn format_address(name: Option<&str>, city: Option<&str>, region: Option<&str>) -> String {
    format!(
        "{}, {}, {}",
        name.unwrap_or_default(),
        city.unwrap_or_default(),
        region.unwrap_or_default()
    )
}

/// Coordinates to display-string resolution over a reverse geocoder.
pub struct AddressResolver<G: ReverseGeocoder> {
    geocoder: G,
}

impl<G: ReverseGeocoder> AddressResolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    /// Resolves the best match for `coordinates`.
    pub fn resolve(&self, coordinates: Coordinates) -> Result<String, ResolutionError> {
        let places = self.geocoder.reverse_geocode(coordinates).map_err(|err| {
            warn!("event=address_resolve module=location status=error error={err}");
            ResolutionError::Geocoder(err.message)
        })?;
        let Some(place) = places.into_iter().next() else {
            warn!("event=address_resolve module=location status=error error_code=no_match");
            return Err(ResolutionError::NoMatch);
        };

        let address = format_address(
            place.name.as_deref(),
            place.city.as_deref(),
            place.region.as_deref(),
        );
        info!(
            "event=address_resolve module=location status=ok address_len={}",
            address.len()
        );
        Ok(address)
    }
}
