//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image` crate (pure Rust decoders) |
//! | Fit calculation | [`calculate_fit_dimensions`](super::calculations::calculate_fit_dimensions) |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode | JPEG with quality, other formats by extension |

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::ThumbnailParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Extensions the gallery treats as photos; all have decoders compiled in.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Save a DynamicImage to the given path, inferring format from extension.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let format = ImageFormat::from_path(path).map_err(|e| {
        BackendError::ProcessingFailed(format!(
            "Unsupported output format {}: {}",
            path.display(),
            e
        ))
    })?;

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path).map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to create {}: {}", path.display(), e))
            })?;
            let writer = std::io::BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(writer, quality as u8);
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
        }
        other => img.save_with_format(path, other).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to write {}: {}",
                path.display(),
                e
            ))
        }),
    }
}

impl ImageBackend for RustBackend {
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let (width, height) = calculate_fit_dimensions(
            (img.width(), img.height()),
            (params.max_width, params.max_height),
        );

        let resized = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3)
        };

        save_image(&resized, &params.output, params.quality.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use image::{ImageEncoder, RgbImage};

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    fn params(source: &Path, output: &Path, max: u32) -> ThumbnailParams {
        ThumbnailParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            max_width: max,
            max_height: max,
            quality: Quality::default(),
        }
    }

    #[test]
    fn supported_extensions_cover_common_rasters() {
        let exts = supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "gif", "webp"] {
            assert!(exts.contains(expected), "expected {expected}");
        }
    }

    #[test]
    fn thumbnail_landscape_fits_bounding_box() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("thumb.jpg");
        create_test_jpeg(&source, 800, 600);

        RustBackend::new()
            .thumbnail(&params(&source, &output, 400))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (400, 300));
    }

    #[test]
    fn thumbnail_portrait_fits_bounding_box() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("thumb.jpg");
        create_test_jpeg(&source, 300, 600);

        RustBackend::new()
            .thumbnail(&params(&source, &output, 200))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (100, 200));
    }

    #[test]
    fn thumbnail_small_source_is_not_upscaled() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("thumb.png");
        create_test_jpeg(&source, 120, 80);

        RustBackend::new()
            .thumbnail(&params(&source, &output, 400))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (120, 80));
    }

    #[test]
    fn thumbnail_nonexistent_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = RustBackend::new().thumbnail(&params(
            Path::new("/nonexistent/image.jpg"),
            &tmp.path().join("thumb.jpg"),
            400,
        ));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn thumbnail_corrupt_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"not really a jpeg").unwrap();

        let result =
            RustBackend::new().thumbnail(&params(&source, &tmp.path().join("thumb.jpg"), 400));
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }
}
