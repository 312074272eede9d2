use thiserror::Error;

#[derive(Error, Debug)]
pub enum VolumeProfileError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Internal consistency fault: {0}")]
    InternalConsistency(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl VolumeProfileError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        VolumeProfileError::InvalidArgument(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        VolumeProfileError::InternalConsistency(msg.into())
    }

    /// True for caller-side validation failures
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, VolumeProfileError::InvalidArgument(_))
    }

    /// True for faults that indicate a defect in the calculation itself
    pub fn is_internal(&self) -> bool {
        matches!(self, VolumeProfileError::InternalConsistency(_))
    }
}

pub type Result<T> = std::result::Result<T, VolumeProfileError>;
