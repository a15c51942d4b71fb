//! Image decoding, width-bound resizing and re-encoding.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use mediabox_core::{Error, Result};

/// An image ready to be stored.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Encoded bytes, identical to the input unless the image was resized.
    pub data: Bytes,
    /// Pixel width after resizing.
    pub width: u32,
    /// Pixel height after resizing.
    pub height: u32,
    /// MIME type of the detected format.
    pub mime_type: &'static str,
    /// Whether the image was scaled down.
    pub resized: bool,
}

/// Decodes `data`, scales it down to `max_width` if wider, and re-encodes it
/// in its original format.
///
/// CPU bound; call from a blocking task.
pub fn process(data: Bytes, max_width: Option<u32>, jpeg_quality: u8) -> Result<ProcessedImage> {
    let format = image::guess_format(&data)
        .map_err(|e| Error::invalid_content("unrecognized image format").with_source(e))?;
    let decoded = image::load_from_memory_with_format(&data, format)
        .map_err(|e| Error::invalid_content("failed to decode image").with_source(e))?;

    let (width, height) = decoded.dimensions();
    let Some(target) = max_width.filter(|max| width > *max) else {
        return Ok(ProcessedImage {
            data,
            width,
            height,
            mime_type: format.to_mime_type(),
            resized: false,
        });
    };

    let (width, height) = width_bound(width, height, target);
    let resized = decoded.resize_exact(width, height, FilterType::Triangle);
    let data = encode(&resized, format, jpeg_quality)?;

    Ok(ProcessedImage {
        data,
        width,
        height,
        mime_type: format.to_mime_type(),
        resized: true,
    })
}

/// Scales `(width, height)` to `max_width` keeping the aspect ratio.
fn width_bound(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    let scaled = (f64::from(height) * f64::from(max_width) / f64::from(width)).round() as u32;
    (max_width, scaled.max(1))
}

fn encode(image: &DynamicImage, format: ImageFormat, jpeg_quality: u8) -> Result<Bytes> {
    let mut buffer = Cursor::new(Vec::new());
    let written = match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality);
            image.write_with_encoder(encoder)
        }
        format => image.write_to(&mut buffer, format),
    };

    written.map_err(|e| Error::invalid_content("failed to encode image").with_source(e))?;
    Ok(Bytes::from(buffer.into_inner()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encodes a blank image of the given size.
    pub(crate) fn sample(width: u32, height: u32, format: ImageFormat) -> Bytes {
        let image = DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        Bytes::from(buffer.into_inner())
    }

    #[test]
    fn keeps_small_images_untouched() -> Result<()> {
        let data = sample(40, 20, ImageFormat::Png);
        let processed = process(data.clone(), Some(100), 90)?;

        assert!(!processed.resized);
        assert_eq!(processed.data, data);
        assert_eq!((processed.width, processed.height), (40, 20));
        assert_eq!(processed.mime_type, "image/png");
        Ok(())
    }

    #[test]
    fn resizes_to_max_width() -> Result<()> {
        let processed = process(sample(200, 100, ImageFormat::Jpeg), Some(50), 80)?;

        assert!(processed.resized);
        assert_eq!((processed.width, processed.height), (50, 25));
        assert_eq!(processed.mime_type, "image/jpeg");

        let decoded = image::load_from_memory(&processed.data).unwrap();
        assert_eq!(decoded.dimensions(), (50, 25));
        Ok(())
    }

    #[test]
    fn rejects_non_images() {
        let err = process(Bytes::from_static(b"plain text"), None, 90).unwrap_err();
        assert_eq!(err.kind(), mediabox_core::ErrorKind::InvalidContent);
    }

    #[test]
    fn width_bound_never_collapses_height() {
        assert_eq!(width_bound(10_000, 1, 100), (100, 1));
        assert_eq!(width_bound(300, 200, 150), (150, 100));
    }
}
