//! The per-upload pipeline:
//! validate, name, brand (still images), encode the locator, store, notify.
//!
//! All image work happens in memory before the first write, so a rejected or
//! failed upload leaves both stores untouched. Delivery runs last and its
//! outcome never rolls back what was stored.

use bytes::Bytes;
use serde::Serialize;
use snapcode_core::prelude::*;
use snapcode_imaging::{BrandingLayer, encode_locator, locator_url};
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:5000";

pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// A file as received from a client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Bytes,
    /// Optional recipient for the finished asset.
    pub email: Option<String>,
}

/// Outcome of handing the asset to the [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Delivery {
    Sent,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReceipt {
    pub id: String,
    pub kind: AssetKind,
    /// Stored asset filename.
    pub asset: String,
    /// Stored locator filename.
    pub code: String,
    /// The URL the locator resolves to.
    pub url: String,
    pub branded: bool,
    pub delivery: Delivery,
}

#[derive(Clone)]
pub struct Ingestor<S: AssetStore, N: Notifier> {
    assets: S,
    codes: S,
    branding: BrandingLayer,
    notifier: N,
    public_url: String,
    notify_timeout: Duration,
}

impl<S: AssetStore, N: Notifier> Ingestor<S, N> {
    pub fn new(assets: S, codes: S, branding: BrandingLayer, notifier: N) -> Self {
        Self {
            assets,
            codes,
            branding,
            notifier,
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    /// Base URL locators point at, e.g. `https://photos.example.com`.
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = public_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    pub fn assets(&self) -> &S {
        &self.assets
    }

    pub fn codes(&self) -> &S {
        &self.codes
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    pub async fn ingest(&self, upload: Upload) -> Result<IngestReceipt, IngestError> {
        let kind = validate(&upload.filename)?;
        if upload.data.is_empty() {
            return Err(IngestError::InvalidAsset(format!(
                "'{}' is empty",
                upload.filename
            )));
        }

        let id = generate_token();
        let asset = asset_file_name(&id, kind);
        let code = code_file_name(&id);
        let url = locator_url(&self.public_url, &asset);

        let branding = self.branding.clone();
        let raw = upload.data;
        let target = url.clone();
        let (final_bytes, code_png) = tokio::task::spawn_blocking(move || {
            let final_bytes = if kind.is_still() {
                Bytes::from(branding.apply(&raw, kind)?)
            } else {
                raw
            };
            let code_png = encode_locator(&target)?;
            Ok::<_, IngestError>((final_bytes, Bytes::from(code_png)))
        })
        .await
        .map_err(|e| IngestError::Task(e.to_string()))??;

        self.assets.write(&asset, final_bytes.clone()).await?;
        if let Err(e) = self.codes.write(&code, code_png).await {
            error!("Failed to store locator {code}: {e}. Removing {asset}.");
            if let Err(e) = self.assets.delete(&asset).await {
                error!("Failed to remove orphaned asset {asset}: {e}");
            }
            return Err(e.into());
        }

        let delivery = match upload.email.as_deref().map(str::trim) {
            Some(to) if !to.is_empty() => {
                let attachment = Attachment {
                    filename: asset.clone(),
                    data: final_bytes,
                };
                self.notify(to, attachment).await
            }
            _ => Delivery::Skipped,
        };

        info!(%asset, %code, %kind, ?delivery, "Ingested upload");

        Ok(IngestReceipt {
            id,
            kind,
            asset,
            code,
            url,
            branded: kind.is_still(),
            delivery,
        })
    }

    async fn notify(&self, to: &str, attachment: Attachment) -> Delivery {
        let filename = attachment.filename.clone();
        let result =
            match tokio::time::timeout(self.notify_timeout, self.notifier.deliver(to, attachment))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(NotifyError::Timeout(self.notify_timeout)),
            };

        match result {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                warn!("Failed to deliver {filename} to {to}: {e}");
                Delivery::Failed(e.to_string())
            }
        }
    }

    /// Stored asset names containing `term` (case-insensitive), newest first.
    pub async fn gallery(&self, term: &str) -> Result<Vec<String>, StorageError> {
        Ok(filter_listing(self.assets.list().await?, term))
    }
}
