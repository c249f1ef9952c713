//! # snapcode imaging
//!
//! CPU-bound image work for the ingestion pipeline.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode / encode JPEG, PNG | `image` crate |
//! | Overlay resize | `image::imageops::resize` with `Triangle` filter |
//! | Alpha compositing | [`branding::composite_over`] (Porter-Duff "over") |
//! | QR matrix | `qrcode` crate |
//! | QR rendering | [`locator::render_code`] into an 8-bit greyscale PNG |
//!
//! Everything here is synchronous; callers on an async runtime should move it to a
//! blocking thread.

pub mod branding;
pub mod locator;

pub use branding::{BrandingLayer, still_format};
pub use locator::{encode_locator, locator_url};
