use serde::{Deserialize, Serialize};
use std::fmt;

// ── Machine types ────────────────────────────────────────────────────

/// Lifecycle action verbs accepted by the machine action endpoint.
///
/// One verb per capability; the stop capability goes over the wire as
/// `stop`, not `shutdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineAction {
    Reboot,
    Start,
    Stop,
    Destroy,
}

impl MachineAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reboot => "reboot",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for MachineAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form body of `POST /backends/{backend_id}/machines/{machine_id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ActionRequest {
    pub action: MachineAction,
}

/// One machine entry from the backend's machine listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineListing {
    pub id: String,
    pub name: String,
    pub image_id: Option<String>,
    /// Raw server-reported state code.
    pub state: u8,
    #[serde(default)]
    pub has_key: bool,
}

// ── Image types ──────────────────────────────────────────────────────

/// An OS image known to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Image {
    pub id: String,
    pub name: String,
}
