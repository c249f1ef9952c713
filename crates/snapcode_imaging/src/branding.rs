//! The branding overlay and the compositor that stamps it onto still images.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage};
use snapcode_core::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const JPEG_QUALITY: u8 = 90;

/// The process-wide overlay, loaded once and shared read-only.
#[derive(Clone, Debug)]
pub struct BrandingLayer {
    overlay: Arc<RgbaImage>,
}

impl BrandingLayer {
    /// Loads the overlay image. A missing or undecodable file is reported as
    /// [`IngestError::BrandingUnavailable`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let overlay = image::open(path).map_err(|e| {
            IngestError::BrandingUnavailable(format!("{}: {e}", path.display()))
        })?;
        let overlay = overlay.to_rgba8();
        info!(
            path = %path.display(),
            width = overlay.width(),
            height = overlay.height(),
            "Loaded branding overlay"
        );
        Ok(Self::from_image(overlay))
    }

    pub fn from_image(overlay: RgbaImage) -> Self {
        Self {
            overlay: Arc::new(overlay),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.overlay.dimensions()
    }

    /// Composites the overlay, stretched to the base size, on top of `base`.
    pub fn composite(&self, base: &mut RgbaImage) {
        let (width, height) = base.dimensions();
        if self.overlay.dimensions() == (width, height) {
            blend_all(base, &self.overlay);
        } else {
            let resized =
                imageops::resize(self.overlay.as_ref(), width, height, FilterType::Triangle);
            blend_all(base, &resized);
        }
    }

    /// Decodes an uploaded still image, brands it, and encodes it again in the
    /// format its stored extension names.
    pub fn apply(&self, data: &[u8], kind: AssetKind) -> Result<Vec<u8>, IngestError> {
        let format = still_format(kind)
            .ok_or_else(|| IngestError::Encoding(format!("'{kind}' assets are not branded")))?;

        let decoded = image::load_from_memory(data)
            .map_err(|e| IngestError::InvalidAsset(format!("Cannot decode image: {e}")))?;
        let mut base = decoded.to_rgba8();
        self.composite(&mut base);

        encode(&base, format)
    }
}

/// Output format of a branded still; `None` for kinds stored as uploaded.
pub fn still_format(kind: AssetKind) -> Option<ImageFormat> {
    match kind {
        AssetKind::Jpg | AssetKind::Jpeg => Some(ImageFormat::Jpeg),
        AssetKind::Png => Some(ImageFormat::Png),
        AssetKind::Mp4 | AssetKind::Mov | AssetKind::Gif => None,
    }
}

fn blend_all(base: &mut RgbaImage, overlay: &RgbaImage) {
    for (dst, src) in base.pixels_mut().zip(overlay.pixels()) {
        composite_over(dst, src);
    }
}

/// Porter-Duff "over": `top` is drawn on `base`. Opaque pixels replace the base
/// exactly; fully transparent ones leave it untouched.
pub fn composite_over(base: &mut Rgba<u8>, top: &Rgba<u8>) {
    let top_a = u32::from(top[3]);
    match top_a {
        0 => return,
        255 => {
            *base = *top;
            return;
        }
        _ => {}
    }

    let base_a = u32::from(base[3]);
    // Alpha of the result, scaled by 255.
    let out_a = top_a * 255 + base_a * (255 - top_a);
    if out_a == 0 {
        *base = Rgba([0, 0, 0, 0]);
        return;
    }

    for c in 0..3 {
        let top_c = u32::from(top[c]) * top_a * 255;
        let base_c = u32::from(base[c]) * base_a * (255 - top_a);
        base[c] = ((top_c + base_c + out_a / 2) / out_a) as u8;
    }
    base[3] = ((out_a + 127) / 255) as u8;
}

fn encode(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, IngestError> {
    let (width, height) = image.dimensions();
    let mut out = Vec::new();
    let result = match format {
        ImageFormat::Png => PngEncoder::new(&mut out).write_image(
            image.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        // JPEG has no alpha channel
        ImageFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        other => return Err(IngestError::Encoding(format!("No encoder for {other:?}"))),
    };
    result.map_err(|e| IngestError::Encoding(format!("Cannot encode {format:?}: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    /// Left half opaque red, right half fully transparent.
    fn half_frame(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| if x < width / 2 { RED } else { CLEAR })
    }

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
            .unwrap();
        out
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut out = Vec::new();
        JpegEncoder::new(&mut out)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    fn close(a: Rgba<u8>, b: Rgba<u8>) -> bool {
        a.0.iter().zip(b.0.iter()).all(|(x, y)| x.abs_diff(*y) <= 2)
    }

    #[test]
    fn opaque_replaces_and_transparent_keeps() {
        let mut px = Rgba([10, 20, 30, 255]);
        composite_over(&mut px, &CLEAR);
        assert_eq!(px, Rgba([10, 20, 30, 255]));
        composite_over(&mut px, &RED);
        assert_eq!(px, RED);
    }

    #[test]
    fn half_transparent_blends() {
        let mut px = Rgba([0, 0, 255, 255]);
        composite_over(&mut px, &Rgba([255, 0, 0, 128]));
        assert_eq!(px[3], 255);
        assert!(px[0] > 120 && px[0] < 136, "{px:?}");
        assert!(px[2] > 120 && px[2] < 136, "{px:?}");
    }

    #[test]
    fn transparent_base_takes_overlay_colour() {
        let mut px = CLEAR;
        composite_over(&mut px, &Rgba([40, 80, 120, 100]));
        assert_eq!(px, Rgba([40, 80, 120, 100]));
    }

    #[test]
    fn png_keeps_dimensions_and_applies_overlay() {
        let layer = BrandingLayer::from_image(half_frame(10, 10));
        let base = RgbaImage::from_pixel(80, 60, Rgba([0, 200, 0, 255]));
        let raw = png_bytes(&base);

        let branded = layer.apply(&raw, AssetKind::Png).unwrap();
        assert_ne!(branded, raw);

        let out = image::load_from_memory(&branded).unwrap().to_rgba8();
        assert_eq!(out.dimensions(), (80, 60));
        assert!(close(*out.get_pixel(2, 30), RED));
        assert!(close(*out.get_pixel(77, 30), Rgba([0, 200, 0, 255])));
    }

    #[test]
    fn jpeg_keeps_dimensions_and_differs() {
        let layer = BrandingLayer::from_image(half_frame(32, 32));
        let raw = jpeg_bytes(120, 90);

        let branded = layer.apply(&raw, AssetKind::Jpg).unwrap();
        assert_ne!(branded, raw);

        let out = image::load_from_memory(&branded).unwrap();
        assert_eq!((out.width(), out.height()), (120, 90));
        let px = out.to_rgb8().get_pixel(5, 45).0;
        assert!(px[0] > 230 && px[1] < 30 && px[2] < 30, "{px:?}");
    }

    #[test]
    fn same_size_overlay_is_used_as_is() {
        let layer = BrandingLayer::from_image(half_frame(4, 2));
        let mut base = RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 255]));
        layer.composite(&mut base);
        assert_eq!(*base.get_pixel(0, 0), RED);
        assert_eq!(*base.get_pixel(1, 1), RED);
        assert_eq!(*base.get_pixel(3, 0), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn undecodable_upload_is_invalid() {
        let layer = BrandingLayer::from_image(half_frame(4, 4));
        let err = layer.apply(b"definitely not a jpeg", AssetKind::Jpeg).unwrap_err();
        assert!(matches!(err, IngestError::InvalidAsset(_)));
    }

    #[test]
    fn each_still_kind_is_encoded_in_its_own_format() {
        for kind in AssetKind::ALL {
            assert_eq!(still_format(kind).is_some(), kind.is_still(), "{kind}");
        }

        let layer = BrandingLayer::from_image(half_frame(4, 4));
        let raw = png_bytes(&RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255])));
        for (kind, expected) in [
            (AssetKind::Jpg, ImageFormat::Jpeg),
            (AssetKind::Jpeg, ImageFormat::Jpeg),
            (AssetKind::Png, ImageFormat::Png),
        ] {
            let branded = layer.apply(&raw, kind).unwrap();
            assert_eq!(image::guess_format(&branded).unwrap(), expected, "{kind}");
        }
    }

    #[test]
    fn motion_kinds_are_refused() {
        let layer = BrandingLayer::from_image(half_frame(4, 4));
        assert!(layer.apply(b"....", AssetKind::Mp4).is_err());
    }

    #[test]
    fn missing_overlay_is_unavailable() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = BrandingLayer::load(tmp.path().join("frame.png")).unwrap_err();
        assert!(matches!(err, IngestError::BrandingUnavailable(_)));
    }

    #[test]
    fn corrupt_overlay_is_unavailable() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("frame.png");
        std::fs::write(&path, b"not a png").unwrap();
        let err = BrandingLayer::load(&path).unwrap_err();
        assert!(matches!(err, IngestError::BrandingUnavailable(_)));
    }

    #[test]
    fn load_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("frame.png");
        std::fs::write(&path, png_bytes(&half_frame(6, 3))).unwrap();
        let layer = BrandingLayer::load(&path).unwrap();
        assert_eq!(layer.dimensions(), (6, 3));
    }
}
