use image::{imageops::FilterType, DynamicImage, ImageFormat};
use log::debug;
use std::path::{Path, PathBuf};

use super::MediaError;

/// Size of generated thumbnails (square bounding box)
pub const THUMBNAIL_SIZE: u32 = 256;

/// Decode a downloaded image and save a 256px thumbnail next to the others.
/// Returns the path of the saved JPEG.
pub fn generate_thumbnail(
    bytes: &[u8],
    thumbnail_dir: &Path,
    stem: &str,
) -> Result<PathBuf, MediaError> {
    let img = image::load_from_memory(bytes)?;

    // Resize keeps the aspect ratio inside the square
    let thumbnail = img.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);

    // JPEG has no alpha channel
    let thumbnail = DynamicImage::ImageRgb8(thumbnail.to_rgb8());

    let thumbnail_path = thumbnail_dir.join(format!("{stem}.jpg"));
    thumbnail.save_with_format(&thumbnail_path, ImageFormat::Jpeg)?;

    debug!("📸 Generated thumbnail: {}", thumbnail_path.display());
    Ok(thumbnail_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_thumbnail_fits_in_square() {
        let dir = std::env::temp_dir().join(format!("dm-display-thumbs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = generate_thumbnail(&png_bytes(600, 300), &dir, "wide").unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));

        let (width, height) = image::image_dimensions(&path).unwrap();
        assert_eq!(width, THUMBNAIL_SIZE);
        assert_eq!(height, THUMBNAIL_SIZE / 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_thumbnail_rejects_garbage() {
        let dir = std::env::temp_dir();
        assert!(matches!(
            generate_thumbnail(b"definitely not an image", &dir, "garbage"),
            Err(MediaError::Image(_))
        ));
    }
}
