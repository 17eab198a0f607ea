use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use deck_api::{Image, MachineAction, MachineListing};
use parking_lot::RwLock;
use tracing::{error, info, warn};

use crate::Result;
use crate::backend::Backend;
use crate::state::MachineState;

/// One remote machine, as last reported by its backend.
///
/// The record never mutates state optimistically: actions are acknowledged
/// by the server, and the new state arrives through the next listing
/// refresh via [`Machine::set_state`].
pub struct Machine {
    id: String,
    image_id: Option<String>,
    name: RwLock<String>,
    backend: Arc<Backend>,
    selected: AtomicBool,
    has_key: bool,
    state: AtomicU8,
    image: RwLock<Option<Image>>,
}

impl Machine {
    /// Build a record from a listing entry and kick off its image lookup
    /// on the current Tokio runtime.
    pub fn from_listing(backend: Arc<Backend>, listing: MachineListing) -> Arc<Self> {
        let machine = Arc::new(Self {
            id: listing.id,
            image_id: listing.image_id,
            name: RwLock::new(listing.name),
            backend,
            selected: AtomicBool::new(false),
            has_key: listing.has_key,
            state: AtomicU8::new(listing.state),
            image: RwLock::new(None),
        });
        machine.spawn_image_lookup();
        machine
    }

    /// Resolve `image_id` in the background; `image` stays unset on failure.
    fn spawn_image_lookup(self: &Arc<Self>) {
        let Some(image_id) = self.image_id.clone() else {
            return;
        };
        let this = Arc::clone(self);
        tokio::spawn(async move {
            match this.backend.images().get_image(&image_id).await {
                Ok(image) => *this.image.write() = Some(image),
                Err(e) => {
                    warn!(machine_id = %this.id, %image_id, error = %e, "image lookup failed");
                }
            }
        });
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref()
    }

    /// Resolved image, once the lookup has completed.
    pub fn image(&self) -> Option<Image> {
        self.image.read().clone()
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    /// UI selection flag; only the UI layer flips this.
    pub fn selected(&self) -> bool {
        self.selected.load(Ordering::Relaxed)
    }

    pub fn set_selected(&self, selected: bool) {
        self.selected.store(selected, Ordering::Relaxed);
    }

    pub fn has_key(&self) -> bool {
        self.has_key
    }

    /// Raw server-reported state code.
    pub fn state_code(&self) -> u8 {
        self.state.load(Ordering::Relaxed)
    }

    /// Overwrite the state code with a freshly reported one.
    pub fn set_state(&self, code: u8) {
        self.state.store(code, Ordering::Relaxed);
    }

    pub fn state(&self) -> Result<MachineState> {
        MachineState::from_code(self.state_code())
    }

    /// Lower-cased display label for the current state.
    pub fn state_label(&self) -> Result<&'static str> {
        Ok(self.state()?.label())
    }

    /// Always `false`; alert wiring is not implemented yet.
    pub fn has_alert(&self) -> bool {
        false
    }

    // ── Lifecycle actions ────────────────────────────────────────────

    pub async fn reboot(&self) {
        self.run_action(MachineAction::Reboot, "rebooting").await;
    }

    pub async fn start(&self) {
        self.run_action(MachineAction::Start, "starting").await;
    }

    pub async fn stop(&self) {
        self.run_action(MachineAction::Stop, "shutting down").await;
    }

    pub async fn destroy(&self) {
        self.run_action(MachineAction::Destroy, "destroying").await;
    }

    /// Fire one action request at the backend.
    ///
    /// Failures are terminal here: one user notification plus an error log,
    /// no retry, and no local state change. Overlapping actions on the same
    /// machine are not guarded against each other.
    async fn run_action(&self, action: MachineAction, verb: &str) {
        let result = self
            .backend
            .client()
            .machine_action(self.backend.id(), &self.id, action)
            .await;

        match result {
            Ok(()) => {
                info!(machine_id = %self.id, %action, "machine action accepted");
            }
            Err(e) => {
                let message = format!("Error {verb} machine: {}", self.name());
                self.backend.notifier().notify(&message);
                error!(machine_id = %self.id, %action, error = %e, "machine action failed");
            }
        }
    }
}
