use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::cli::CompressionLevel;
use crate::error::{Result, StitchError};

/// Save an atlas image as PNG, optionally squeezed with oxipng
pub fn save_atlas_image(
    image: &RgbaImage,
    path: &Path,
    compress: Option<CompressionLevel>,
) -> Result<()> {
    let mut png_data = Cursor::new(Vec::new());
    image
        .write_to(&mut png_data, ImageFormat::Png)
        .map_err(|e| StitchError::ImageSave {
            path: path.to_path_buf(),
            source: e,
        })?;

    let output_data = if let Some(level) = compress {
        let opts = match level {
            CompressionLevel::Level(n) => oxipng::Options::from_preset(n),
            CompressionLevel::Max => oxipng::Options::max_compression(),
        };
        oxipng::optimize_from_memory(&png_data.into_inner(), &opts).map_err(|e| {
            StitchError::PngCompress {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?
    } else {
        png_data.into_inner()
    };

    fs::write(path, output_data).map_err(|e| StitchError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_png_decodes_to_same_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.png");
        let mut image = RgbaImage::new(4, 2);
        image.put_pixel(3, 1, image::Rgba([1, 2, 3, 4]));

        save_atlas_image(&image, &path, None).unwrap();
        let loaded = crate::sprite::decode_image(&path).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_compressed_png_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.png");
        let image = RgbaImage::from_fn(16, 16, |x, y| {
            image::Rgba([u8::try_from(x * 16).unwrap(), u8::try_from(y * 16).unwrap(), 0, 255])
        });

        save_atlas_image(&image, &path, Some(CompressionLevel::Level(1))).unwrap();
        let loaded = crate::sprite::decode_image(&path).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_unwritable_path_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("atlas.png");
        let err = save_atlas_image(&RgbaImage::new(1, 1), &path, None).unwrap_err();
        assert!(matches!(err, StitchError::OutputWrite { .. }));
    }
}
