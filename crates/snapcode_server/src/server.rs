use crate::{api, prelude::*};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use snapcode_core::prelude::*;
use snapcode_imaging::BrandingLayer;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// The builder for the snapcode server.
#[derive(Clone, Debug, Default)]
pub struct SnapcodeServer {
    config: SnapcodeConfig,
}

impl SnapcodeServer {
    pub fn new(config: SnapcodeConfig) -> Self {
        Self { config }
    }
}

#[derive(Clone, Debug)]
pub struct SnapcodeConfig {
    /// The externally reachable base URL that locators encode.
    ///
    /// Defaults to `http://localhost:5000`.
    ///
    /// **NOTE:** Codes printed with the default only resolve on the server itself!
    pub public_url: String,
    /// Upper bound for a single notifier delivery.
    ///
    /// Defaults to 30 seconds.
    pub notify_timeout: Duration,
    /// Largest accepted request body in bytes.
    ///
    /// Defaults to 100 MiB.
    pub body_limit: usize,
}

impl Default for SnapcodeConfig {
    fn default() -> Self {
        Self {
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
            body_limit: 100 * 1024 * 1024,
        }
    }
}

impl SnapcodeServer {
    /// Builds the pipeline described by the config.
    pub fn ingestor<S: AssetStore, N: Notifier>(
        &self,
        assets: S,
        codes: S,
        branding: BrandingLayer,
        notifier: N,
    ) -> Ingestor<S, N> {
        Ingestor::new(assets, codes, branding, notifier)
            .with_public_url(self.config.public_url.clone())
            .with_notify_timeout(self.config.notify_timeout)
    }

    pub fn build<S: AssetStore, N: Notifier>(
        self,
        assets: S,
        codes: S,
        branding: BrandingLayer,
        notifier: N,
    ) -> Router {
        if self.config.public_url == DEFAULT_PUBLIC_URL {
            warn!(
                "Default public URL used. QR codes will only resolve locally, consider setting `public_url`!"
            )
        }
        let ingestor = self.ingestor(assets, codes, branding, notifier);
        let state = AppState { ingestor };

        Router::new()
            .route("/", get(api::index))
            .route("/health", get(|| async { "OK" }))
            .route("/upload", post(api::upload))
            .route("/api/assets", post(api::upload_json))
            .route("/download/{filename}", get(api::download_asset))
            .route("/qrcodes/{filename}", get(api::download_code))
            .route("/qr/{filename}/{qr_file}", get(api::show_code))
            .route("/gallery", get(api::gallery))
            .route("/api/gallery", get(api::gallery_json))
            .layer(DefaultBodyLimit::max(self.config.body_limit))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
