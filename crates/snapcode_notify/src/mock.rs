use crate::infer_mime;
use bytes::Bytes;
use snapcode_core::prelude::*;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::info;

/// Logs deliveries instead of sending them. Don't use this when attendees
/// actually expect an email.
#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn deliver(&self, to: &str, attachment: Attachment) -> Result<(), NotifyError> {
        let mime = infer_mime(&attachment.filename)?;
        info!(
            to,
            file = %attachment.filename,
            mime = %mime,
            size = attachment.data.len(),
            "No mail transport configured, skipping email"
        );
        Ok(())
    }
}

/// A delivery captured by [`RecordingNotifier`].
#[derive(Clone, Debug)]
pub struct Delivery {
    pub to: String,
    pub filename: String,
    pub mime_type: String,
    pub data: Bytes,
}

/// Keeps deliveries in memory so tests can inspect them.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Self::default()
        }
    }

    /// A notifier that waits `delay` before recording.
    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn deliver(&self, to: &str, attachment: Attachment) -> Result<(), NotifyError> {
        let mime = infer_mime(&attachment.filename)?;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.fail_with {
            return Err(NotifyError::DeliveryFailed(reason.clone()));
        }

        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Delivery {
                to: to.to_string(),
                filename: attachment.filename,
                mime_type: mime.essence_str().to_string(),
                data: attachment.data,
            });
        Ok(())
    }
}
