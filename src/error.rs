use thiserror::Error;

pub type ExdResult<T> = Result<T, ExdError>;

#[derive(Error, Debug)]
pub enum ExdError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not implemented: {0}")]
    Unimplemented(String),

    #[error("Type inference failed: {0}")]
    TypeInference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),
}

impl ExdError {
    /// Stable status code reported to callers alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ExdError::NotFound(_) => "NOT_FOUND",
            ExdError::OutOfRange(_) => "OUT_OF_RANGE",
            ExdError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ExdError::Unimplemented(_) => "UNIMPLEMENTED",
            ExdError::TypeInference(_) => "FAILED_PRECONDITION",
            ExdError::Io(_) | ExdError::Workbook(_) => "INTERNAL",
        }
    }
}

impl From<calamine::Error> for ExdError {
    fn from(e: calamine::Error) -> Self {
        ExdError::Workbook(e.to_string())
    }
}
