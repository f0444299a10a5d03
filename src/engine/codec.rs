//! Image decode / resize / encode behind a trait so the worker pool can be driven by any backend.

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;
use std::sync::Arc;

use crate::error::ThumbError;
use crate::types::Thumbnail;

/// The three image operations the pipeline needs. Implementations must be callable from many
/// worker threads at once.
pub trait Codec: Send + Sync {
    /// Decode the file at `path`, keeping the detected source format.
    fn decode(&self, path: &Path) -> Result<Thumbnail, ThumbError>;

    /// Resize a decoded image to exactly `width` x `height`.
    fn thumbnail(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage;

    /// Write `thumb` to `dest` in its source format, replacing any existing file.
    fn save(&self, thumb: &Thumbnail, dest: &Path) -> Result<(), ThumbError>;
}

/// [`Codec`] backed by the `image` crate. Resizing scales to cover the target box and crops
/// the centre (Lanczos3), so output dimensions are always exact and deterministic.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    fn decode(&self, path: &Path) -> Result<Thumbnail, ThumbError> {
        let decode_err = |source| ThumbError::Decode {
            path: path.to_path_buf(),
            source: Arc::new(source),
        };
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| decode_err(image::ImageError::IoError(e)))?;
        let format = reader.format().ok_or_else(|| {
            decode_err(image::ImageError::Unsupported(
                image::error::UnsupportedError::from_format_and_kind(
                    image::error::ImageFormatHint::PathExtension(path.to_path_buf()),
                    image::error::UnsupportedErrorKind::Format(
                        image::error::ImageFormatHint::Unknown,
                    ),
                ),
            ))
        })?;
        let image = reader.decode().map_err(decode_err)?;
        Ok(Thumbnail { image, format })
    }

    fn thumbnail(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize_to_fill(width, height, FilterType::Lanczos3)
    }

    fn save(&self, thumb: &Thumbnail, dest: &Path) -> Result<(), ThumbError> {
        thumb
            .image
            .save_with_format(dest, thumb.format)
            .map_err(|e| ThumbError::Persist {
                path: dest.to_path_buf(),
                msg: e.to_string(),
            })
    }
}
