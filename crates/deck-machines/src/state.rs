use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Server-reported machine lifecycle phase.
///
/// The backend reports states as small integer codes; the mapping is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineState {
    Running,
    Rebooting,
    Terminated,
    Pending,
    Unknown,
}

impl MachineState {
    /// Translate a raw state code from the server.
    ///
    /// A code outside the known set is an [`Error::InvalidStateCode`], never
    /// a silently undefined label.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Running),
            1 => Ok(Self::Rebooting),
            2 => Ok(Self::Terminated),
            3 => Ok(Self::Pending),
            4 => Ok(Self::Unknown),
            other => Err(Error::InvalidStateCode(other)),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Running => 0,
            Self::Rebooting => 1,
            Self::Terminated => 2,
            Self::Pending => 3,
            Self::Unknown => 4,
        }
    }

    /// Lower-cased display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Rebooting => "rebooting",
            Self::Terminated => "terminated",
            Self::Pending => "pending",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
