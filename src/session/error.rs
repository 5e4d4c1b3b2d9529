use super::status::CallStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// The operation is not allowed from the lesson's current status
    #[error("cannot {action} a lesson that is {status}")]
    InvalidState {
        action: &'static str,
        status: CallStatus,
    },

    /// A voice channel command failed
    #[error(transparent)]
    Channel(#[from] anyhow::Error),
}
