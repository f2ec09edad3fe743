//! Entry capture workflow.
//!
//! # Responsibility
//! - Drive capture -> location -> address -> confirmation -> save -> notify.
//! - Own the transient `PendingCapture` for one capture screen.
//!
//! # Invariants
//! - Only a confirmable pending capture (image and non-empty address) is
//!   ever handed to the entry store.
//! - Device failures are reported through `error_message()` and the `Error`
//!   state, never as `Err`; `Err` means the call itself was not allowed or
//!   the save did not take effect.
//! - A rejected call leaves state and pending capture untouched.
//! - There is no timeout on resolution; `leave()` is the cancel path.

use crate::capture::{CaptureError, CaptureProvider};
use crate::device::{CameraService, LocationService, NotificationService, ReverseGeocoder};
use crate::location::{AddressResolver, LocationProvider};
use crate::model::capture::{AddressState, PendingCapture};
use crate::model::entry::TravelEntry;
use crate::notify::NotificationGateway;
use crate::repo::entry_store::{EntryStore, StoreError};
use crate::service::entry_save::save_confirmed;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SAVE_FAILED_MESSAGE: &str = "Could not save entry.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Capturing,
    LocatingAndResolving,
    AwaitingConfirmation,
    Saving,
    /// Entry saved; the host should navigate back to the list.
    Done,
    Error,
}

impl WorkflowState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::LocatingAndResolving => "locating_and_resolving",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Saving => "saving",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Enter,
    TakePhoto,
    ResolveAddress,
    Save,
    Discard,
    AcknowledgeError,
}

impl WorkflowAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::TakePhoto => "take_photo",
            Self::ResolveAddress => "resolve_address",
            Self::Save => "save",
            Self::Discard => "discard",
            Self::AcknowledgeError => "acknowledge_error",
        }
    }
}

#[derive(Debug)]
pub enum WorkflowError {
    InvalidTransition {
        state: WorkflowState,
        action: WorkflowAction,
    },
    Storage(StoreError),
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { state, action } => write!(
                f,
                "action `{}` is not allowed in state `{}`",
                action.as_str(),
                state.as_str()
            ),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkflowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

/// State machine behind one "add travel entry" screen.
///
/// Each device suspension point is its own call (`enter`, `take_photo`,
/// `resolve_address`), so the host can show the captured image while
/// `resolve_address` runs off the UI thread.
pub struct EntryWorkflow<C, L, G, N, S>
where
    C: CameraService,
    L: LocationService,
    G: ReverseGeocoder,
    N: NotificationService,
    S: EntryStore,
{
    capture: CaptureProvider<C>,
    location: LocationProvider<L>,
    resolver: AddressResolver<G>,
    notifier: NotificationGateway<N>,
    store: S,
    state: WorkflowState,
    pending: Option<PendingCapture>,
    error_message: Option<String>,
}

impl<C, L, G, N, S> EntryWorkflow<C, L, G, N, S>
where
    C: CameraService,
    L: LocationService,
    G: ReverseGeocoder,
    N: NotificationService,
    S: EntryStore,
{
    pub fn new(
        capture: CaptureProvider<C>,
        location: LocationProvider<L>,
        resolver: AddressResolver<G>,
        notifier: NotificationGateway<N>,
        store: S,
    ) -> Self {
        Self {
            capture,
            location,
            resolver,
            notifier,
            store,
            state: WorkflowState::Idle,
            pending: None,
            error_message: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn pending(&self) -> Option<&PendingCapture> {
        self.pending.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Whether Save/Remove may be offered.
    pub fn can_confirm(&self) -> bool {
        self.state == WorkflowState::AwaitingConfirmation
            && self
                .pending
                .as_ref()
                .is_some_and(PendingCapture::is_confirmable)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Screen became active: asks for location permission up front.
    pub fn enter(&mut self) -> Result<WorkflowState, WorkflowError> {
        self.require(WorkflowAction::Enter, &[WorkflowState::Idle, WorkflowState::Error])?;

        match self.location.ensure_permission() {
            Ok(()) => {
                self.error_message = None;
                self.set_state(WorkflowState::Idle);
            }
            Err(err) => {
                self.error_message = Some(err.user_message().to_string());
                self.set_state(WorkflowState::Error);
            }
        }
        Ok(self.state)
    }

    /// Takes (or retakes) a photo, replacing any pending capture.
    pub fn take_photo(&mut self) -> Result<WorkflowState, WorkflowError> {
        self.require(
            WorkflowAction::TakePhoto,
            &[
                WorkflowState::Idle,
                WorkflowState::Error,
                WorkflowState::LocatingAndResolving,
                WorkflowState::AwaitingConfirmation,
            ],
        )?;

        self.pending = None;
        self.error_message = None;
        self.set_state(WorkflowState::Capturing);

        match self.capture.request_capture() {
            Ok(image) => {
                self.pending = Some(PendingCapture::resolving(image.into_uri()));
                self.set_state(WorkflowState::LocatingAndResolving);
            }
            Err(CaptureError::Cancelled) => self.set_state(WorkflowState::Idle),
            Err(err) => {
                self.error_message = err.user_message().map(str::to_string);
                self.set_state(WorkflowState::Error);
            }
        }
        Ok(self.state)
    }

    /// Resolves the current location into an address for the pending photo.
    pub fn resolve_address(&mut self) -> Result<WorkflowState, WorkflowError> {
        self.require(
            WorkflowAction::ResolveAddress,
            &[WorkflowState::LocatingAndResolving],
        )?;

        if !self.location.has_permission() {
            if let Err(err) = self.location.ensure_permission() {
                self.fail_resolution(err.user_message());
                return Ok(self.state);
            }
        }

        let resolved = self
            .location
            .current_coordinates()
            .map_err(|err| err.user_message())
            .and_then(|coordinates| {
                self.resolver
                    .resolve(coordinates)
                    .map_err(|err| err.user_message())
            });

        match resolved {
            Ok(address) => {
                let Some(pending) = self.pending.as_mut() else {
                    self.fail_resolution("Error fetching address.");
                    return Ok(self.state);
                };
                pending.address = AddressState::Resolved(address);
                pending.error_message = None;
                if pending.is_confirmable() {
                    self.set_state(WorkflowState::AwaitingConfirmation);
                } else {
                    self.fail_resolution("Error fetching address.");
                }
            }
            Err(message) => self.fail_resolution(message),
        }
        Ok(self.state)
    }

    /// Persists the pending capture and posts the saved notification.
    ///
    /// # Errors
    /// - `InvalidTransition` outside `AwaitingConfirmation`.
    /// - `Storage` when the append did not take effect; the workflow stays
    ///   in `AwaitingConfirmation` so the user can try again.
    pub fn save(&mut self) -> Result<TravelEntry, WorkflowError> {
        self.require(WorkflowAction::Save, &[WorkflowState::AwaitingConfirmation])?;
        let Some(pending) = self.pending.clone() else {
            return Err(WorkflowError::InvalidTransition {
                state: self.state,
                action: WorkflowAction::Save,
            });
        };

        self.set_state(WorkflowState::Saving);
        match save_confirmed(&self.store, &self.notifier, &pending) {
            Ok(entry) => {
                self.pending = None;
                self.error_message = None;
                self.set_state(WorkflowState::Done);
                Ok(entry)
            }
            Err(err) => {
                self.error_message = Some(SAVE_FAILED_MESSAGE.to_string());
                self.set_state(WorkflowState::AwaitingConfirmation);
                Err(WorkflowError::Storage(err))
            }
        }
    }

    /// Drops the pending capture without touching the store.
    pub fn discard(&mut self) -> Result<WorkflowState, WorkflowError> {
        self.require(WorkflowAction::Discard, &[WorkflowState::AwaitingConfirmation])?;
        self.reset();
        Ok(self.state)
    }

    /// Dismisses the current error message.
    pub fn acknowledge_error(&mut self) -> Result<WorkflowState, WorkflowError> {
        self.require(WorkflowAction::AcknowledgeError, &[WorkflowState::Error])?;
        self.reset();
        Ok(self.state)
    }

    /// Navigation away from the screen; always allowed.
    pub fn leave(&mut self) {
        info!(
            "event=workflow_leave module=workflow state={} had_pending={}",
            self.state.as_str(),
            self.pending.is_some()
        );
        self.reset();
    }

    fn reset(&mut self) {
        self.pending = None;
        self.error_message = None;
        self.set_state(WorkflowState::Idle);
    }

    fn fail_resolution(&mut self, message: &str) {
        if let Some(pending) = self.pending.as_mut() {
            pending.address = AddressState::Failed;
            pending.error_message = Some(message.to_string());
        }
        self.error_message = Some(message.to_string());
        self.set_state(WorkflowState::Error);
    }

    fn require(
        &self,
        action: WorkflowAction,
        allowed: &[WorkflowState],
    ) -> Result<(), WorkflowError> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        warn!(
            "event=workflow_reject module=workflow state={} action={}",
            self.state.as_str(),
            action.as_str()
        );
        Err(WorkflowError::InvalidTransition {
            state: self.state,
            action,
        })
    }

    fn set_state(&mut self, next: WorkflowState) {
        if self.state != next {
            info!(
                "event=workflow_transition module=workflow from={} to={}",
                self.state.as_str(),
                next.as_str()
            );
        }
        self.state = next;
    }
}
