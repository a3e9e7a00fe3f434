//! Image assets loaded from disk or returned by the model

use std::path::Path;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};

use crate::domain::ImageDimensions;
use crate::error::Error;

/// Formats accepted from the image source
const ACCEPTED_FORMATS: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

/// Encoded image bytes plus their MIME type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAsset {
    bytes: Arc<[u8]>,
    mime: String,
}

impl ImageAsset {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: mime.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Decode into RGBA pixels
    pub fn decode(&self) -> Result<RgbaImage, Error> {
        image::load_from_memory(&self.bytes)
            .map(|img| img.to_rgba8())
            .map_err(|e| Error::ImageDecodeFailed(e.to_string()))
    }

    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        ImageFormat::from_mime_type(&self.mime)
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("png")
    }
}

/// An image the user selected, with its native pixel size
#[derive(Clone, Debug)]
pub struct LoadedImage {
    pub asset: ImageAsset,
    pub dimensions: ImageDimensions,
}

impl LoadedImage {
    /// Read an image file, accepting only PNG, JPEG and WEBP
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::ImageDecodeFailed(format!("{}: {e}", path.display())))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
        let format = image::guess_format(&bytes)
            .map_err(|_| Error::UnsupportedImageType("unrecognized data".to_string()))?;
        if !ACCEPTED_FORMATS.contains(&format) {
            return Err(Error::UnsupportedImageType(format.to_mime_type().to_string()));
        }

        let asset = ImageAsset::new(bytes, format.to_mime_type());
        let rgba = asset.decode()?;
        let dimensions = ImageDimensions::new(rgba.width(), rgba.height());
        log::debug!("Loaded {} image: {} pixels", asset.mime(), dimensions);

        Ok(Self { asset, dimensions })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    pub(crate) fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, format)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn png_bytes_load_with_dimensions() {
        let loaded = LoadedImage::from_bytes(encoded(40, 30, ImageFormat::Png)).unwrap();
        assert_eq!(loaded.dimensions, ImageDimensions::new(40, 30));
        assert_eq!(loaded.asset.mime(), "image/png");
        assert_eq!(loaded.asset.extension(), "png");
    }

    #[test]
    fn non_image_types_are_rejected() {
        let gif = encoded(4, 4, ImageFormat::Gif);
        assert!(matches!(
            LoadedImage::from_bytes(gif),
            Err(Error::UnsupportedImageType(mime)) if mime == "image/gif"
        ));
        assert!(matches!(
            LoadedImage::from_bytes(b"plain text".to_vec()),
            Err(Error::UnsupportedImageType(_))
        ));
    }

    #[test]
    fn truncated_png_fails_to_decode() {
        let mut bytes = encoded(16, 16, ImageFormat::Png);
        bytes.truncate(40);
        assert!(matches!(
            LoadedImage::from_bytes(bytes),
            Err(Error::ImageDecodeFailed(_))
        ));
    }
}
