//! Shared fixtures for the server tests.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, header};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use snapcode_fs::FileSystemStore;
use snapcode_imaging::BrandingLayer;
use snapcode_notify::RecordingNotifier;
use snapcode_server::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

pub const PUBLIC_URL: &str = "https://host";
const BOUNDARY: &str = "snapcode-test-boundary";

pub struct Fixture {
    pub tmp: TempDir,
    pub assets: FileSystemStore,
    pub codes: FileSystemStore,
    pub notifier: RecordingNotifier,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_notifier(RecordingNotifier::new())
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        let tmp = TempDir::new().unwrap();
        let assets = FileSystemStore::new(tmp.path().join("uploads"));
        let codes = FileSystemStore::new(tmp.path().join("qrcodes"));
        Self {
            tmp,
            assets,
            codes,
            notifier,
        }
    }

    pub fn config(&self) -> SnapcodeConfig {
        SnapcodeConfig {
            public_url: PUBLIC_URL.to_string(),
            ..Default::default()
        }
    }

    pub fn ingestor(&self) -> Ingestor<FileSystemStore, RecordingNotifier> {
        SnapcodeServer::new(self.config()).ingestor(
            self.assets.clone(),
            self.codes.clone(),
            branding(),
            self.notifier.clone(),
        )
    }

    pub fn router(&self) -> axum::Router {
        self.router_with(self.config())
    }

    pub fn router_with(&self, config: SnapcodeConfig) -> axum::Router {
        SnapcodeServer::new(config).build(
            self.assets.clone(),
            self.codes.clone(),
            branding(),
            self.notifier.clone(),
        )
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.tmp.path().join("uploads")
    }

    pub fn codes_dir(&self) -> PathBuf {
        self.tmp.path().join("qrcodes")
    }

    /// Sorted names in a directory; a missing directory is empty.
    pub fn listing(dir: &std::path::Path) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// A frame with an opaque red left edge and a transparent centre.
pub fn branding() -> BrandingLayer {
    BrandingLayer::from_image(RgbaImage::from_fn(20, 20, |x, _| {
        if x < 4 { RED } else { Rgba([0, 0, 0, 0]) }
    }))
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 90, 200]));
    let mut out = Vec::new();
    JpegEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 200, 0, 255]));
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
    out
}

/// Decodes the single QR code found in a PNG.
pub fn decode_code(png: &[u8]) -> String {
    let img = image::load_from_memory(png).unwrap().to_luma8();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        img.width() as usize,
        img.height() as usize,
        |x, y| img.get_pixel(x as u32, y as u32)[0],
    );
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1);
    grids[0].decode().unwrap().1
}

/// A multipart upload request with an optional file and email field.
pub fn upload_request(
    uri: &str,
    file: Option<(&str, &[u8])>,
    email: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(email) = email {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"email\"\r\n\r\n{email}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}
