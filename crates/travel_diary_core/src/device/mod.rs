//! Device capability interfaces consumed by the capture workflow.
//!
//! # Responsibility
//! - Describe camera, geolocation, reverse-geocoding and notification
//!   services as host-implemented traits.
//! - Keep permission prompts as explicit, separately callable steps.
//!
//! # Invariants
//! - Core code never performs a gated action before its permission step
//!   returned `PermissionStatus::Granted`.

use crate::model::capture::Coordinates;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Answer to a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Opaque failure reported by a host device service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceError {
    pub message: String,
}

impl DeviceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for DeviceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "device service failure: {}", self.message)
    }
}

impl Error for DeviceError {}

pub type DeviceResult<T> = Result<T, DeviceError>;

/// Camera launch options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Lets the user crop the photo before returning.
    pub allows_editing: bool,
    /// JPEG quality in `0.0..=1.0`.
    pub quality: f32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            allows_editing: true,
            quality: 1.0,
        }
    }
}

/// Result of one camera session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraOutcome {
    Captured { uri: String },
    Cancelled,
}

pub trait CameraService {
    fn request_permission(&self) -> PermissionStatus;
    fn launch_camera(&self, options: &CaptureOptions) -> DeviceResult<CameraOutcome>;
}

pub trait LocationService {
    fn request_foreground_permission(&self) -> PermissionStatus;
    /// One high-accuracy position fix.
    fn current_position(&self) -> DeviceResult<Coordinates>;
}

/// One reverse-geocoding match. Any component may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodedPlace {
    pub name: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

pub trait ReverseGeocoder {
    /// Returns matches ordered best-first.
    fn reverse_geocode(&self, coordinates: Coordinates) -> DeviceResult<Vec<GeocodedPlace>>;
}

/// Android notification channel description. Ignored by other platforms.
///
/// Hosts create the channel at maximum importance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub vibration_pattern_ms: Vec<u64>,
    pub light_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub sound: Option<String>,
}

pub trait NotificationService {
    /// Sets up a delivery channel; hosts without channels return `Ok(())`.
    fn configure_channel(&self, channel: &NotificationChannel) -> DeviceResult<()>;
    /// Simulators and emulators cannot receive notifications.
    fn is_physical_device(&self) -> bool;
    fn permission_granted(&self) -> bool;
    fn request_permission(&self) -> PermissionStatus;
    fn push_token(&self, project_id: &str) -> DeviceResult<String>;
    /// Posts `content` immediately.
    fn schedule(&self, content: &NotificationContent) -> DeviceResult<()>;
}

impl<T: CameraService + ?Sized> CameraService for &T {
    fn request_permission(&self) -> PermissionStatus {
        (**self).request_permission()
    }

    fn launch_camera(&self, options: &CaptureOptions) -> DeviceResult<CameraOutcome> {
        (**self).launch_camera(options)
    }
}

impl<T: LocationService + ?Sized> LocationService for &T {
    fn request_foreground_permission(&self) -> PermissionStatus {
        (**self).request_foreground_permission()
    }

    fn current_position(&self) -> DeviceResult<Coordinates> {
        (**self).current_position()
    }
}

impl<T: ReverseGeocoder + ?Sized> ReverseGeocoder for &T {
    fn reverse_geocode(&self, coordinates: Coordinates) -> DeviceResult<Vec<GeocodedPlace>> {
        (**self).reverse_geocode(coordinates)
    }
}

impl<T: NotificationService + ?Sized> NotificationService for &T {
    fn configure_channel(&self, channel: &NotificationChannel) -> DeviceResult<()> {
        (**self).configure_channel(channel)
    }

    fn is_physical_device(&self) -> bool {
        (**self).is_physical_device()
    }

    fn permission_granted(&self) -> bool {
        (**self).permission_granted()
    }

    fn request_permission(&self) -> PermissionStatus {
        (**self).request_permission()
    }

    fn push_token(&self, project_id: &str) -> DeviceResult<String> {
        (**self).push_token(project_id)
    }

    fn schedule(&self, content: &NotificationContent) -> DeviceResult<()> {
        (**self).schedule(content)
    }
}
