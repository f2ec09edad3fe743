//! Permission-gated photo acquisition.
//!
//! # Invariants
//! - Camera permission is requested before every launch; a denial never
//!   opens the camera.
//! - A user cancellation is reported as `CaptureError::Cancelled`, distinct
//!   from a failure.

use crate::device::{CameraOutcome, CameraService, CaptureOptions};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable reference to a captured image, owned by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn uri(&self) -> &str {
        &self.0
    }

    pub fn into_uri(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    PermissionDenied,
    /// The user closed the camera without taking a photo.
    Cancelled,
    Failed(String),
}

impl CaptureError {
    /// Message shown to the user, `None` for a silent cancellation.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::PermissionDenied => Some("Camera permission is required to take pictures."),
            Self::Cancelled => None,
            Self::Failed(_) => Some("Could not take a picture."),
        }
    }
}

impl Display for CaptureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "camera permission denied"),
            Self::Cancelled => write!(f, "capture cancelled by user"),
            Self::Failed(message) => write!(f, "capture failed: {message}"),
        }
    }
}

impl Error for CaptureError {}

pub struct CaptureProvider<C: CameraService> {
    camera: C,
    options: CaptureOptions,
}

impl<C: CameraService> CaptureProvider<C> {
    pub fn new(camera: C) -> Self {
        Self::with_options(camera, CaptureOptions::default())
    }

    pub fn with_options(camera: C, options: CaptureOptions) -> Self {
        Self { camera, options }
    }

    /// Asks for camera permission, then runs one camera session.
    pub fn request_capture(&self) -> Result<ImageRef, CaptureError> {
        if !self.camera.request_permission().is_granted() {
            warn!("event=capture module=capture status=denied");
            return Err(CaptureError::PermissionDenied);
        }

        match self.camera.launch_camera(&self.options) {
            Ok(CameraOutcome::Captured { uri }) if !uri.trim().is_empty() => {
                info!("event=capture module=capture status=ok uri_len={}", uri.len());
                Ok(ImageRef(uri))
            }
            Ok(CameraOutcome::Captured { .. }) => {
                warn!("event=capture module=capture status=error error_code=empty_uri");
                Err(CaptureError::Failed("camera returned an empty image uri".to_string()))
            }
            Ok(CameraOutcome::Cancelled) => {
                info!("event=capture module=capture status=cancelled");
                Err(CaptureError::Cancelled)
            }
            Err(err) => {
                warn!("event=capture module=capture status=error error={err}");
                Err(CaptureError::Failed(err.message))
            }
        }
    }
}
