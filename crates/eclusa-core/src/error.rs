/// Boundary error for the injected transport. Transport implementations can
/// only fail with these — domain errors never originate here.
///
/// The optional status code is the queue's sole retry signal: a rejection
/// whose status matches the configured throttle status is re-queued, every
/// other failure is terminal and forwarded to the caller untouched.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request task aborted: {0}")]
    Aborted(String),
}

impl TransportError {
    /// The server status code, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Caller-visible errors for requests submitted to the admission queue.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("request task panicked during invocation: {0}")]
    TaskPanicked(String),

    #[error("request queue shut down before the request settled")]
    Closed,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type AdmissionResult<T> = std::result::Result<T, AdmissionError>;
