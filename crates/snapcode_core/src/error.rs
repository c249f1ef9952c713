use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Generic(String),
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    #[error("Branding overlay unavailable: {0}")]
    BrandingUnavailable(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Background task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Cannot infer a media type for '{0}'")]
    UnknownMimeType(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),
}
