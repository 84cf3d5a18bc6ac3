//! PNG export.

use scribble_core::PixelBuffer;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Pixel data is {actual} bytes, expected {expected} for {width}x{height}")]
    BadLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("Empty image")]
    Empty,
    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),
}

/// Encode straight-alpha RGBA pixels as PNG bytes.
pub fn encode_png(pixels: &PixelBuffer) -> Result<Vec<u8>, ExportError> {
    let PixelBuffer { rgba_data, width, height } = pixels;
    if *width == 0 || *height == 0 {
        return Err(ExportError::Empty);
    }

    let expected = *width as usize * *height as usize * 4;
    if rgba_data.len() != expected {
        return Err(ExportError::BadLength {
            width: *width,
            height: *height,
            expected,
            actual: rgba_data.len(),
        });
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, *width, *height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
        writer.finish()?;
    }

    log::debug!("Encoded {}x{} PNG, {} bytes", width, height, png_data.len());
    Ok(png_data)
}
