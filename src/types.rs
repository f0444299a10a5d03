//! Public and internal types for the thumbnailer API and pipeline.

use image::{DynamicImage, ImageFormat};
use std::path::PathBuf;

use crate::error::ThumbError;
use crate::utils::config::ThumbnailDefaults;

/// A resized image plus the format it was decoded from (thumbnails are written back in that format).
#[derive(Clone, Debug)]
pub struct Thumbnail {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

/// What one worker produced for one source path: either a thumbnail or the per-item error.
#[derive(Debug)]
pub struct ThumbnailResult {
    pub source: PathBuf,
    pub outcome: Result<Thumbnail, ThumbError>,
}

impl ThumbnailResult {
    pub fn ok(source: PathBuf, thumbnail: Thumbnail) -> Self {
        Self {
            source,
            outcome: Ok(thumbnail),
        }
    }

    pub fn err(source: PathBuf, err: ThumbError) -> Self {
        Self {
            source,
            outcome: Err(err),
        }
    }
}

/// Returned by a successful run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Paths the walk handed to the worker pool.
    pub discovered: usize,
    /// Thumbnails written to `output_dir`.
    pub written: usize,
    pub output_dir: PathBuf,
}

/// Lib-only options for [`thumbnail_dir`](crate::thumbnail_dir). `None` fields take the defaults from
/// [`ThumbnailDefaults`].
#[derive(Clone, Debug, Default)]
pub struct ThumbOpts {
    /// Directory thumbnails are written to. Default: `thumbnail` (relative to the working directory).
    pub output_dir: Option<PathBuf>,
    /// Worker pool size. Default: 5.
    pub workers: Option<usize>,
    /// Thumbnail width in pixels. Default: 100.
    pub width: Option<u32>,
    /// Thumbnail height in pixels. Default: 100.
    pub height: Option<u32>,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
}

impl From<&ThumbOpts> for Opts {
    fn from(o: &ThumbOpts) -> Self {
        let d = Opts::default();
        Opts {
            output_dir: o.output_dir.clone().unwrap_or(d.output_dir),
            workers: o.workers.unwrap_or(d.workers),
            width: o.width.unwrap_or(d.width),
            height: o.height.unwrap_or(d.height),
            follow_links: o.follow_links,
            verbose: false,
        }
    }
}

/// Full options (CLI and lib). Use [`ThumbOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    pub output_dir: PathBuf,
    pub workers: usize,
    pub width: u32,
    pub height: u32,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
    /// Debug logging and a progress counter.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(ThumbnailDefaults::OUTPUT_DIR),
            workers: ThumbnailDefaults::WORKERS,
            width: ThumbnailDefaults::WIDTH,
            height: ThumbnailDefaults::HEIGHT,
            follow_links: false,
            verbose: false,
        }
    }
}

impl Opts {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workers == 0 {
            anyhow::bail!("worker count must be at least 1");
        }
        if self.width == 0 || self.height == 0 {
            anyhow::bail!(
                "thumbnail dimensions must be non-zero (got {}x{})",
                self.width,
                self.height
            );
        }
        Ok(())
    }
}
