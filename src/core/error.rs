use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("resource {0} has no UUID; state cannot be migrated")]
    MissingIdentifier(String),

    #[error("remote lookup failed: {0}")]
    RemoteLookup(String),

    #[error("disk import failed: {0}")]
    DiskImport(String),

    #[error("invalid migration plan: {0}")]
    InvalidPlan(String),

    #[error("state store I/O error: {0}")]
    Io(String),

    #[error("state encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, StateError>;
