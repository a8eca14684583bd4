use std::path::Path;

use image::ImageReader;

use crate::AssetError;

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 rows.
    pub rgba: Vec<u8>,
}

/// Load and decode an image file.
pub fn load_texture(path: &Path) -> Result<TextureImage, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = reader.with_guessed_format().map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = reader.decode().map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(into_texture(image))
}

/// Decode an in-memory image. `origin` is only used for error messages.
pub fn decode_texture(bytes: &[u8], origin: &Path) -> Result<TextureImage, AssetError> {
    let image = image::load_from_memory(bytes).map_err(|source| AssetError::Image {
        path: origin.to_path_buf(),
        source,
    })?;
    Ok(into_texture(image))
}

fn into_texture(image: image::DynamicImage) -> TextureImage {
    let rgba = image.to_rgba8();
    TextureImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("gallery_texture_{tag}_{timestamp}"));
        std::fs::create_dir_all(&dir).expect("scratch dir create");
        dir
    }

    #[test]
    fn png_round_trips_through_loader() {
        let dir = scratch_dir("png");
        let path = dir.join("label.png");
        let mut img = image::RgbaImage::new(2, 3);
        img.put_pixel(1, 2, image::Rgba([10, 20, 30, 255]));
        img.save(&path).expect("write png");

        let texture = load_texture(&path).expect("png loads");
        assert_eq!((texture.width, texture.height), (2, 3));
        assert_eq!(texture.rgba.len(), 2 * 3 * 4);
        let last = &texture.rgba[texture.rgba.len() - 4..];
        assert_eq!(last, &[10, 20, 30, 255]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = scratch_dir("missing");
        let err = load_texture(&dir.join("nope.png")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn garbage_bytes_are_image_error() {
        let err = decode_texture(b"not an image", Path::new("inline")).unwrap_err();
        assert!(matches!(err, AssetError::Image { .. }));
    }
}
