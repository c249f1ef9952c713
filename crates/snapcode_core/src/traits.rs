use crate::error::*;

use bytes::Bytes;

/// A flat, name-addressed store of files (the asset store or the code store).
pub trait AssetStore: Send + Sync + 'static + Clone {
    /// Writes `data` under `name`. Readers never observe a partial file.
    fn write(
        &self,
        name: &str,
        data: Bytes,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
    fn read(&self, name: &str) -> impl Future<Output = Result<Bytes, StorageError>> + Send;
    fn exists(&self, name: &str) -> impl Future<Output = Result<bool, StorageError>> + Send;
    fn delete(&self, name: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Names of the files currently in the store, in no particular order.
    fn list(&self) -> impl Future<Output = Result<Vec<String>, StorageError>> + Send;
}

/// A final asset handed to a [`Notifier`].
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub data: Bytes,
}

/// Delivers a finished asset to a recipient, e.g. by email.
pub trait Notifier: Send + Sync + 'static + Clone {
    fn deliver(
        &self,
        to: &str,
        attachment: Attachment,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}
