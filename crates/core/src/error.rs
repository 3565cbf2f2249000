#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid transition: cannot {event} while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

impl CoreError {
    /// The message shown to the user, without the category prefix.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Validation(msg)
            | CoreError::Rejected(msg)
            | CoreError::InvalidPayload(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
