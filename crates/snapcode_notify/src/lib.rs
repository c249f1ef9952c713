//! # snapcode notifiers
//!
//! Implementations of the [`Notifier`] trait, which hands a finished asset to
//! its owner.
//!
//! * [`SmtpNotifier`] sends the asset as an email attachment (feature `smtp`).
//! * [`LogNotifier`] only logs; used when no mail server is configured.
//! * [`RecordingNotifier`] keeps deliveries in memory for tests.
//!
//! Every notifier infers the attachment media type from its filename with
//! [`infer_mime`] and refuses to deliver when that fails.

use snapcode_core::prelude::*;

pub mod mock;
#[cfg(feature = "smtp")]
pub mod smtp;

pub use mock::{Delivery, LogNotifier, RecordingNotifier};
#[cfg(feature = "smtp")]
pub use smtp::{SmtpConfig, SmtpNotifier};

/// Media type of an attachment, guessed from its extension.
pub fn infer_mime(filename: &str) -> Result<mime_guess::Mime, NotifyError> {
    mime_guess::from_path(filename)
        .first()
        .ok_or_else(|| NotifyError::UnknownMimeType(filename.to_string()))
}

/// Chooses the delivery mechanism at runtime.
#[derive(Clone, Debug)]
pub enum ConfiguredNotifier {
    #[cfg(feature = "smtp")]
    Smtp(SmtpNotifier),
    Log(LogNotifier),
}

impl Notifier for ConfiguredNotifier {
    async fn deliver(&self, to: &str, attachment: Attachment) -> Result<(), NotifyError> {
        match self {
            #[cfg(feature = "smtp")]
            ConfiguredNotifier::Smtp(smtp) => smtp.deliver(to, attachment).await,
            ConfiguredNotifier::Log(log) => log.deliver(to, attachment).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_asset_media_types() {
        assert_eq!(infer_mime("a.jpg").unwrap().essence_str(), "image/jpeg");
        assert_eq!(infer_mime("a.jpeg").unwrap().essence_str(), "image/jpeg");
        assert_eq!(infer_mime("a.png").unwrap().essence_str(), "image/png");
        assert_eq!(infer_mime("a.gif").unwrap().essence_str(), "image/gif");
        assert_eq!(infer_mime("a.mp4").unwrap().essence_str(), "video/mp4");
        assert_eq!(infer_mime("a.mov").unwrap().essence_str(), "video/quicktime");
    }

    #[test]
    fn unknown_extension_fails() {
        for name in ["noext", "a.zzzunknown"] {
            assert!(matches!(
                infer_mime(name),
                Err(NotifyError::UnknownMimeType(_))
            ));
        }
    }
}
