use thiserror::Error;
use validator::ValidationErrors;

pub mod item;

#[cfg(test)]
pub mod test_util;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input was invalid: {0}")]
    Invalid(ValidationErrors),
    #[error("{message}")]
    NotFound { message: String },
    #[error("failed to {action}: {cause}")]
    RetrieveFailure {
        action: String,
        #[source]
        cause: anyhow::Error,
    },
    #[error("failed to {action}: {cause}")]
    PersistFailure {
        action: String,
        #[source]
        cause: anyhow::Error,
    },
}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Self::Invalid(value)
    }
}

impl Error {
    /// Wraps a failure reading from or inserting into a driven port while trying to perform [action]
    fn retrieve_failure(action: &str, cause: anyhow::Error) -> Self {
        Self::RetrieveFailure {
            action: action.into(),
            cause,
        }
    }

    /// Wraps a failure mutating existing data through a driven port while trying to perform [action]
    fn persist_failure(action: &str, cause: anyhow::Error) -> Self {
        Self::PersistFailure {
            action: action.into(),
            cause,
        }
    }
}
