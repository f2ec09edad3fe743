//! Best-effort local notification after a successful save.
//!
//! # Responsibility
//! - Install the process-wide foreground presentation policy exactly once.
//! - Register for a push token lazily on first use.
//! - Post the "entry saved" notification without ever failing the caller.
//!
//! # Invariants
//! - `notify_saved` never returns an error and never panics.
//! - Registration runs at most once per gateway; its outcome is memoized.
//! - Registration only yields the push token. Every `notify_saved` attempts
//!   to schedule the local notification whatever the registration outcome.

use crate::device::{
    DeviceError, DeviceResult, NotificationChannel, NotificationContent, NotificationService,
    PermissionStatus,
};
use log::{info, warn};
use once_cell::sync::OnceCell;
use once_cell::unsync::OnceCell as LocalOnceCell;
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

const CHANNEL_ID: &str = "default";
const VIBRATION_PATTERN_MS: [u64; 4] = [0, 250, 250, 250];
const CHANNEL_LIGHT_COLOR: &str = "#FF231F7C";
const SAVED_TITLE: &str = "Travel Diary";
const SAVED_BODY: &str = "New travel entry added successfully!";
const SAVED_SOUND: &str = "default";

static PRESENTATION_POLICY: OnceCell<PresentationPolicy> = OnceCell::new();

/// How notifications are presented while the app is in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationPolicy {
    pub show_alert: bool,
    pub play_sound: bool,
    pub set_badge: bool,
}

impl Default for PresentationPolicy {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: false,
            set_badge: false,
        }
    }
}

/// Installs the process-wide presentation policy.
///
/// Idempotent: the first installed policy wins and is returned on every call.
pub fn install_presentation_policy(policy: PresentationPolicy) -> PresentationPolicy {
    *PRESENTATION_POLICY.get_or_init(|| {
        info!(
            "event=notification_policy module=notify status=ok show_alert={} play_sound={} set_badge={}",
            policy.show_alert, policy.play_sound, policy.set_badge
        );
        policy
    })
}

/// Returns the installed presentation policy, if any.
pub fn presentation_policy() -> Option<PresentationPolicy> {
    PRESENTATION_POLICY.get().copied()
}

/// Why registration or scheduling did not complete. Logged, never surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    ChannelSetup(String),
    NotPhysicalDevice,
    PermissionDenied,
    MissingProjectId,
    PushToken(String),
    Schedule(String),
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChannelSetup(message) => write!(f, "channel setup failed: {message}"),
            Self::NotPhysicalDevice => write!(f, "notifications require a physical device"),
            Self::PermissionDenied => write!(f, "notification permission denied"),
            Self::MissingProjectId => write!(f, "project id is not configured"),
            Self::PushToken(message) => write!(f, "push token request failed: {message}"),
            Self::Schedule(message) => write!(f, "scheduling failed: {message}"),
        }
    }
}

impl Error for NotificationError {}

/// Memoized registration outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Registered { push_token: String },
    Unavailable(NotificationError),
}

/// Lazily registered notifier for saved entries.
pub struct NotificationGateway<N: NotificationService> {
    service: N,
    project_id: Option<String>,
    android_channel: bool,
    registration: LocalOnceCell<Registration>,
}

impl<N: NotificationService> NotificationGateway<N> {
    /// `project_id` is required to obtain a push token; `None` leaves the
    /// gateway unregistered but still posting local notifications.
    pub fn new(service: N, project_id: Option<String>) -> Self {
        Self {
            service,
            project_id: project_id.filter(|value| !value.trim().is_empty()),
            android_channel: cfg!(target_os = "android"),
            registration: LocalOnceCell::new(),
        }
    }

    /// Forces channel setup on or off regardless of the build target.
    pub fn with_android_channel(mut self, enabled: bool) -> Self {
        self.android_channel = enabled;
        self
    }

    /// Registration outcome, running registration on first call.
    pub fn registration(&self) -> &Registration {
        self.registration.get_or_init(|| match self.register() {
            Ok(push_token) => {
                info!(
                    "event=notification_register module=notify status=ok token_len={}",
                    push_token.len()
                );
                Registration::Registered { push_token }
            }
            Err(err) => {
                warn!("event=notification_register module=notify status=degraded error={err}");
                Registration::Unavailable(err)
            }
        })
    }

    /// Posts the "entry saved" notification; failures are only logged.
    pub fn notify_saved(&self) {
        install_presentation_policy(PresentationPolicy::default());
        self.registration();

        let content = NotificationContent {
            title: SAVED_TITLE.to_string(),
            body: SAVED_BODY.to_string(),
            sound: Some(SAVED_SOUND.to_string()),
        };
        match self.service.schedule(&content) {
            Ok(()) => info!("event=notify_saved module=notify status=ok"),
            Err(err) => warn!(
                "event=notify_saved module=notify status=error error={}",
                NotificationError::Schedule(err.message)
            ),
        }
    }

    fn register(&self) -> Result<String, NotificationError> {
        if self.android_channel {
            let channel = NotificationChannel {
                id: CHANNEL_ID.to_string(),
                name: CHANNEL_ID.to_string(),
                vibration_pattern_ms: VIBRATION_PATTERN_MS.to_vec(),
                light_color: CHANNEL_LIGHT_COLOR.to_string(),
            };
            self.service
                .configure_channel(&channel)
                .map_err(|err| NotificationError::ChannelSetup(err.message))?;
        }

        if !self.service.is_physical_device() {
            return Err(NotificationError::NotPhysicalDevice);
        }

        let granted = self.service.permission_granted()
            || self.service.request_permission().is_granted();
        if !granted {
            return Err(NotificationError::PermissionDenied);
        }

        let project_id = self
            .project_id
            .as_deref()
            .ok_or(NotificationError::MissingProjectId)?;
        self.service
            .push_token(project_id)
            .map_err(|err| NotificationError::PushToken(err.message))
    }
}

/// Notification service that queues content for a host to deliver.
///
/// Used where the platform notifier lives on the far side of the FFI: the
/// host drains the queue after each call and posts what it finds. Push
/// registration is never available through the outbox.
#[derive(Debug, Default)]
pub struct NotificationOutbox {
    queued: RefCell<Vec<NotificationContent>>,
}

impl NotificationOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every queued notification, oldest first.
    pub fn take(&self) -> Vec<NotificationContent> {
        self.queued.take()
    }
}

impl NotificationService for NotificationOutbox {
    fn configure_channel(&self, _channel: &NotificationChannel) -> DeviceResult<()> {
        Ok(())
    }

    fn is_physical_device(&self) -> bool {
        true
    }

    fn permission_granted(&self) -> bool {
        true
    }

    fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    fn push_token(&self, _project_id: &str) -> DeviceResult<String> {
        Err(DeviceError::new("push registration is owned by the host"))
    }

    fn schedule(&self, content: &NotificationContent) -> DeviceResult<()> {
        self.queued.borrow_mut().push(content.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        install_presentation_policy, presentation_policy, NotificationError,
        NotificationGateway, NotificationOutbox, PresentationPolicy, Registration,
    };
    use crate::device::{
        DeviceError, DeviceResult, NotificationChannel, NotificationContent,
        NotificationService, PermissionStatus,
    };
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct StubNotifier {
        emulator: bool,
        already_granted: bool,
        grant_on_request: bool,
        fail_schedule: bool,
        channels: RefCell<Vec<NotificationChannel>>,
        permission_requests: Cell<u32>,
        token_requests: Cell<u32>,
        scheduled: RefCell<Vec<NotificationContent>>,
    }

    impl NotificationService for StubNotifier {
        fn configure_channel(&self, channel: &NotificationChannel) -> DeviceResult<()> {
            self.channels.borrow_mut().push(channel.clone());
            Ok(())
        }

        fn is_physical_device(&self) -> bool {
            !self.emulator
        }

        fn permission_granted(&self) -> bool {
            self.already_granted
        }

        fn request_permission(&self) -> PermissionStatus {
            self.permission_requests
                .set(self.permission_requests.get() + 1);
            if self.grant_on_request {
                PermissionStatus::Granted
            } else {
                PermissionStatus::Denied
            }
        }

        fn push_token(&self, project_id: &str) -> DeviceResult<String> {
            self.token_requests.set(self.token_requests.get() + 1);
            Ok(format!("token-for-{project_id}"))
        }

        fn schedule(&self, content: &NotificationContent) -> DeviceResult<()> {
            if self.fail_schedule {
                return Err(DeviceError::new("scheduler offline"));
            }
            self.scheduled.borrow_mut().push(content.clone());
            Ok(())
        }
    }

    fn granted() -> StubNotifier {
        StubNotifier {
            already_granted: true,
            ..StubNotifier::default()
        }
    }

    #[test]
    fn registers_once_and_posts_saved_notification() {
        let service = granted();
        let gateway = NotificationGateway::new(&service, Some("diary-project".to_string()));

        gateway.notify_saved();
        gateway.notify_saved();

        assert_eq!(service.token_requests.get(), 1);
        assert_eq!(
            gateway.registration(),
            &Registration::Registered {
                push_token: "token-for-diary-project".to_string()
            }
        );
        let scheduled = service.scheduled.borrow();
        assert_eq!(scheduled.len(), 2);
        assert_eq!(scheduled[0].title, "Travel Diary");
        assert_eq!(scheduled[0].body, "New travel entry added successfully!");
        assert_eq!(scheduled[0].sound.as_deref(), Some("default"));
    }

    #[test]
    fn android_channel_is_configured_when_enabled() {
        let service = granted();
        let gateway = NotificationGateway::new(&service, Some("p".to_string()))
            .with_android_channel(true);
        gateway.notify_saved();

        let channels = service.channels.borrow();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].id, "default");
        assert_eq!(channels[0].vibration_pattern_ms, vec![0, 250, 250, 250]);
    }

    #[test]
    fn emulator_skips_registration_but_still_schedules() {
        let service = StubNotifier {
            emulator: true,
            ..granted()
        };
        let gateway = NotificationGateway::new(&service, Some("p".to_string()));
        gateway.notify_saved();

        assert_eq!(
            gateway.registration(),
            &Registration::Unavailable(NotificationError::NotPhysicalDevice)
        );
        assert_eq!(service.token_requests.get(), 0);
        assert_eq!(service.scheduled.borrow().len(), 1);
    }

    #[test]
    fn permission_is_requested_when_not_yet_granted() {
        let service = StubNotifier {
            grant_on_request: false,
            ..StubNotifier::default()
        };
        let gateway = NotificationGateway::new(&service, Some("p".to_string()));
        gateway.notify_saved();
        gateway.notify_saved();

        assert_eq!(service.permission_requests.get(), 1);
        assert_eq!(
            gateway.registration(),
            &Registration::Unavailable(NotificationError::PermissionDenied)
        );
        assert_eq!(service.scheduled.borrow().len(), 2);
    }

    #[test]
    fn missing_project_id_still_posts_local_notification() {
        let service = granted();
        let gateway = NotificationGateway::new(&service, Some("  ".to_string()));
        gateway.notify_saved();

        assert_eq!(
            gateway.registration(),
            &Registration::Unavailable(NotificationError::MissingProjectId)
        );
        assert_eq!(service.token_requests.get(), 0);
        assert_eq!(service.scheduled.borrow().len(), 1);
    }

    #[test]
    fn schedule_failure_is_swallowed() {
        let service = StubNotifier {
            fail_schedule: true,
            ..granted()
        };
        let gateway = NotificationGateway::new(&service, Some("p".to_string()));
        gateway.notify_saved();
        assert!(matches!(
            gateway.registration(),
            Registration::Registered { .. }
        ));
    }

    #[test]
    fn outbox_queues_saved_notification_for_the_host() {
        let outbox = NotificationOutbox::new();
        let gateway = NotificationGateway::new(&outbox, Some("p".to_string()));
        gateway.notify_saved();

        assert!(matches!(
            gateway.registration(),
            Registration::Unavailable(NotificationError::PushToken(_))
        ));
        let queued = outbox.take();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].body, "New travel entry added successfully!");
        assert!(outbox.take().is_empty());
    }

    #[test]
    fn presentation_policy_is_installed_once() {
        let first = install_presentation_policy(PresentationPolicy::default());
        let second = install_presentation_policy(PresentationPolicy {
            show_alert: false,
            play_sound: true,
            set_badge: true,
        });
        assert_eq!(first, second);
        assert_eq!(presentation_policy(), Some(first));
    }
}
