//! Scannable locators: the public download URL of an asset rendered as a QR code.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, Luma};
use qrcode::{Color, EcLevel, QrCode};
use snapcode_core::prelude::*;

/// Pixels per QR module.
const MODULE_PX: u32 = 10;
/// Quiet zone around the symbol, in modules.
const QUIET_ZONE: u32 = 4;

/// Absolute retrieval URL of a stored asset.
pub fn locator_url(public_url: &str, file_name: &str) -> String {
    format!("{}/download/{file_name}", public_url.trim_end_matches('/'))
}

/// Renders `url` as a black-on-white QR code.
pub fn render_code(url: &str) -> Result<GrayImage, IngestError> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M)
        .map_err(|e| IngestError::Encoding(format!("Cannot encode '{url}' as QR: {e}")))?;

    let width = code.width() as u32;
    let colors = code.to_colors();
    let size = (width + 2 * QUIET_ZONE) * MODULE_PX;

    Ok(GrayImage::from_fn(size, size, |x, y| {
        let (mx, my) = (x / MODULE_PX, y / MODULE_PX);
        let inside = (QUIET_ZONE..QUIET_ZONE + width).contains(&mx)
            && (QUIET_ZONE..QUIET_ZONE + width).contains(&my);
        if inside {
            let idx = ((my - QUIET_ZONE) * width + (mx - QUIET_ZONE)) as usize;
            if colors[idx] == Color::Dark {
                return Luma([0]);
            }
        }
        Luma([255])
    }))
}

/// Encodes `url` into a PNG QR code.
pub fn encode_locator(url: &str) -> Result<Vec<u8>, IngestError> {
    let img = render_code(url)?;
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::L8)
        .map_err(|e| IngestError::Encoding(format!("Cannot encode QR image: {e}")))?;
    Ok(out)
}
