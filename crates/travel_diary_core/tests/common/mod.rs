#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use travel_diary_core::device::{
    CameraOutcome, CameraService, CaptureOptions, DeviceError, DeviceResult, GeocodedPlace,
    LocationService, NotificationChannel, NotificationContent, NotificationService,
    PermissionStatus, ReverseGeocoder,
};
use travel_diary_core::{
    AddressResolver, CaptureProvider, Coordinates, EntryStore, EntryWorkflow, KeyValueStore,
    KvError, KvResult, LocationProvider, MemoryKvStore, NotificationGateway,
};

pub const IMAGE_URI: &str = "file:///data/camera/IMG_0001.jpg";
pub const EIFFEL: &str = "Eiffel Tower, Paris, Ile-de-France";

pub fn paris() -> Coordinates {
    Coordinates::new(48.8566, 2.3522)
}

pub fn eiffel_place() -> GeocodedPlace {
    GeocodedPlace {
        name: Some("Eiffel Tower".to_string()),
        city: Some("Paris".to_string()),
        region: Some("Ile-de-France".to_string()),
    }
}

/// Camera returning queued outcomes, one per launch.
pub struct FakeCamera {
    pub permission: Cell<PermissionStatus>,
    pub outcomes: RefCell<VecDeque<DeviceResult<CameraOutcome>>>,
    pub launches: Cell<u32>,
}

impl FakeCamera {
    pub fn with(outcomes: Vec<DeviceResult<CameraOutcome>>) -> Self {
        Self {
            permission: Cell::new(PermissionStatus::Granted),
            outcomes: RefCell::new(outcomes.into()),
            launches: Cell::new(0),
        }
    }

    pub fn capturing(uri: &str) -> Self {
        Self::with(vec![Ok(CameraOutcome::Captured {
            uri: uri.to_string(),
        })])
    }
}

impl CameraService for FakeCamera {
    fn request_permission(&self) -> PermissionStatus {
        self.permission.get()
    }

    fn launch_camera(&self, _options: &CaptureOptions) -> DeviceResult<CameraOutcome> {
        self.launches.set(self.launches.get() + 1);
        self.outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(CameraOutcome::Cancelled))
    }
}

pub struct FakeLocation {
    pub permission: Cell<PermissionStatus>,
    pub fix: RefCell<DeviceResult<Coordinates>>,
    pub prompts: Cell<u32>,
}

impl FakeLocation {
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            permission: Cell::new(PermissionStatus::Granted),
            fix: RefCell::new(Ok(coordinates)),
            prompts: Cell::new(0),
        }
    }

    pub fn denied() -> Self {
        let location = Self::at(paris());
        location.permission.set(PermissionStatus::Denied);
        location
    }
}

impl LocationService for FakeLocation {
    fn request_foreground_permission(&self) -> PermissionStatus {
        self.prompts.set(self.prompts.get() + 1);
        self.permission.get()
    }

    fn current_position(&self) -> DeviceResult<Coordinates> {
        self.fix.borrow().clone()
    }
}

pub struct FakeGeocoder {
    pub places: RefCell<DeviceResult<Vec<GeocodedPlace>>>,
    pub queries: RefCell<Vec<Coordinates>>,
}

impl FakeGeocoder {
    pub fn returning(places: Vec<GeocodedPlace>) -> Self {
        Self {
            places: RefCell::new(Ok(places)),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            places: RefCell::new(Err(DeviceError::new("geocoder offline"))),
            queries: RefCell::new(Vec::new()),
        }
    }
}

impl ReverseGeocoder for FakeGeocoder {
    fn reverse_geocode(&self, coordinates: Coordinates) -> DeviceResult<Vec<GeocodedPlace>> {
        self.queries.borrow_mut().push(coordinates);
        self.places.borrow().clone()
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub emulator: bool,
    pub fail_schedule: bool,
    pub scheduled: RefCell<Vec<NotificationContent>>,
    pub schedule_attempts: Cell<u32>,
}

impl NotificationService for FakeNotifier {
    fn configure_channel(&self, _channel: &NotificationChannel) -> DeviceResult<()> {
        Ok(())
    }

    fn is_physical_device(&self) -> bool {
        !self.emulator
    }

    fn permission_granted(&self) -> bool {
        true
    }

    fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    fn push_token(&self, project_id: &str) -> DeviceResult<String> {
        Ok(format!("token-{project_id}"))
    }

    fn schedule(&self, content: &NotificationContent) -> DeviceResult<()> {
        self.schedule_attempts.set(self.schedule_attempts.get() + 1);
        if self.fail_schedule {
            return Err(DeviceError::new("scheduler offline"));
        }
        self.scheduled.borrow_mut().push(content.clone());
        Ok(())
    }
}

/// Key-value store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyKv {
    pub inner: MemoryKvStore,
    pub fail_writes: Cell<bool>,
}

impl KeyValueStore for FlakyKv {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        if self.fail_writes.get() {
            return Err(KvError::Backend("disk full".to_string()));
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        self.inner.delete(key)
    }
}

pub type TestWorkflow<'a, S> = EntryWorkflow<
    &'a FakeCamera,
    &'a FakeLocation,
    &'a FakeGeocoder,
    &'a FakeNotifier,
    S,
>;

pub fn workflow<'a, S: EntryStore>(
    camera: &'a FakeCamera,
    location: &'a FakeLocation,
    geocoder: &'a FakeGeocoder,
    notifier: &'a FakeNotifier,
    store: S,
) -> TestWorkflow<'a, S> {
    workflow_with_project(
        camera,
        location,
        geocoder,
        notifier,
        store,
        Some("travel-diary".to_string()),
    )
}

pub fn workflow_with_project<'a, S: EntryStore>(
    camera: &'a FakeCamera,
    location: &'a FakeLocation,
    geocoder: &'a FakeGeocoder,
    notifier: &'a FakeNotifier,
    store: S,
    project_id: Option<String>,
) -> TestWorkflow<'a, S> {
    EntryWorkflow::new(
        CaptureProvider::new(camera),
        LocationProvider::new(location),
        AddressResolver::new(geocoder),
        NotificationGateway::new(notifier, project_id),
        store,
    )
}
