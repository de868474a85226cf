/// Core error type.
///
/// Adapter crates map their specific errors into this type (or into
/// [`OffloadError`] for the upload path) so the hook can handle failures
/// consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single upload attempt failed.
///
/// Every variant is recoverable: the message passes through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OffloadError {
    /// Connect, DNS, TLS, timeout or body-read failure.
    #[error("transport failure: {reason}")]
    Transport { reason: String },

    #[error("paste service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("paste service returned an empty response")]
    EmptyResponse,

    #[error("paste service returned an unusable response: {reason}")]
    InvalidResponse { reason: String },

    /// The service answered but refused the paste (e.g. a bad dev key).
    #[error("paste service rejected the request: {reason}")]
    Rejected { reason: String },

    #[error("offload is misconfigured: {reason}")]
    Config { reason: String },
}

impl OffloadError {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
