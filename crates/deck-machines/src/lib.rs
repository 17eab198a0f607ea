pub mod backend;
pub mod machine;
pub mod state;

pub use backend::{Backend, ImageLookup, ImageStore};
pub use machine::Machine;
pub use state::MachineState;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("backend api error: {0}")]
    Api(#[from] deck_api::Error),

    #[error("unknown machine state code: {0}")]
    InvalidStateCode(u8),

    #[error("unknown image: {0}")]
    UnknownImage(String),

    #[error("missing env var: {0}")]
    MissingEnv(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// User-visible notification side-channel.
///
/// Injected into a [`Backend`] at construction and shared by its machines,
/// so the model layer reports failures without knowing how the dashboard
/// displays them. Fire-and-forget; implementations must not block.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, message: &str);
}

/// Notifier that routes messages to the log instead of a UI.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!("{message}");
    }
}
