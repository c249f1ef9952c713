//! # snapcode server
//!
//! The ingestion pipeline ([`ingest::Ingestor`]) and the axum routes in front of it.
//!
//! ```no_run
//! use snapcode_fs::FileSystemStore;
//! use snapcode_imaging::BrandingLayer;
//! use snapcode_notify::LogNotifier;
//! use snapcode_server::prelude::*;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let branding = BrandingLayer::load("templates/frame.png")?;
//! let app = SnapcodeServer::default().build(
//!     FileSystemStore::new("uploads"),
//!     FileSystemStore::new("qrcodes"),
//!     branding,
//!     LogNotifier,
//! );
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod api;
mod pages;

pub mod ingest;
pub mod server;
pub mod state;

pub mod prelude {
    pub use crate::ingest::*;
    pub use crate::server::*;
    pub use crate::state::*;
}
