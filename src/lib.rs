//! Thumbnailer: walk a tree, thumbnail every image on a bounded worker pool, persist the results.
//!
//! Three stages joined by rendezvous channels: one walk thread, `N` worker threads, and the
//! persister on the caller's thread. One [`CancelToken`](pipeline::CancelToken) unwinds every stage;
//! the first real error wins.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::ThumbError;
pub use types::*;

use std::path::Path;
use std::sync::Arc;

use engine::codec::{Codec, ImageCodec};
use pipeline::CancelToken;

/// Result alias used by public thumbnailer API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Thumbnail every image under `root` into `opts.output_dir` with the `image` crate backend.
///
/// Fails on the first non-image file, decode error or write error; the underlying [`ThumbError`]
/// can be recovered with `err.downcast_ref::<ThumbError>()`.
pub fn thumbnail_dir(root: &Path, opts: &ThumbOpts) -> Result<RunSummary> {
    thumbnail_dir_with(root, opts, Arc::new(ImageCodec), &CancelToken::new())
}

/// Like [`thumbnail_dir`] with a caller-supplied codec and cancel token. Firing `cancel` from
/// another thread stops the run; it then returns [`ThumbError::Cancelled`] unless a real error came first.
pub fn thumbnail_dir_with(
    root: &Path,
    opts: &ThumbOpts,
    codec: Arc<dyn Codec>,
    cancel: &CancelToken,
) -> Result<RunSummary> {
    let opts = Opts::from(opts);
    pipeline::run_pipeline(root, &opts, codec, cancel)
}
