use crate::infer_mime;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use snapcode_core::prelude::*;
use std::time::Duration;
use tracing::info;

const SUBJECT: &str = "Your Photo from Event";
const BODY: &str = "Thank you for joining our event! Find your photo attached.";

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    /// Relay host, reached with STARTTLS.
    pub host: String,
    /// Defaults to `587`.
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address, e.g. `Event Photos <noreply@example.com>`.
    pub from: String,
    /// Defaults to 30 seconds.
    pub timeout: Duration,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: None,
            password: None,
            from: "noreply@localhost".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Sends assets as email attachments through an SMTP relay.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&config.from)?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotifyError::DeliveryFailed(format!("Invalid SMTP relay: {e}")))?
            .port(config.port)
            .timeout(Some(config.timeout));
        if let (Some(user), Some(password)) = (config.username, config.password) {
            builder = builder.credentials(Credentials::new(user, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse()
        .map_err(|e| NotifyError::InvalidAddress(format!("{address}: {e}")))
}

/// Builds the email carrying `attachment` to `to`.
pub fn build_message(
    from: Mailbox,
    to: &str,
    attachment: Attachment,
) -> Result<Message, NotifyError> {
    let mime = infer_mime(&attachment.filename)?;
    let content_type = ContentType::parse(mime.essence_str())
        .map_err(|_| NotifyError::UnknownMimeType(attachment.filename.clone()))?;

    Message::builder()
        .from(from)
        .to(parse_mailbox(to)?)
        .subject(SUBJECT)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(BODY.to_string()))
                .singlepart(
                    MailAttachment::new(attachment.filename)
                        .body(attachment.data.to_vec(), content_type),
                ),
        )
        .map_err(|e| NotifyError::DeliveryFailed(format!("Cannot build email: {e}")))
}

impl Notifier for SmtpNotifier {
    async fn deliver(&self, to: &str, attachment: Attachment) -> Result<(), NotifyError> {
        let filename = attachment.filename.clone();
        let message = build_message(self.from.clone(), to, attachment)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;

        info!(to, file = %filename, "Emailed asset");
        Ok(())
    }
}
