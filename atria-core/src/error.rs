use atria_domain::StoreError;

/// Workflow-level failure taxonomy. API handlers map each variant to a
/// distinct HTTP status; messages are user-visible.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid Payment Signature")]
    InvalidSignature,

    /// The requested slot overlaps an existing live booking.
    #[error("This time is already booked. Please choose another.")]
    RoomUnavailable,

    #[error("payment gateway failure: {0}")]
    Upstream(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    pub fn validation(msg: impl Into<String>) -> Self {
        WorkflowError::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        WorkflowError::Unauthorized(msg.into())
    }
}
