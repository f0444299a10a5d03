//! Error taxonomy for the walk → thumbnail → persist pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Every way a run can fail. Stage errors carry the path they were raised for.
///
/// [`ThumbError::Cancelled`] is a liveness artifact: a stage reports it when it unwound because
/// the shared [`CancelToken`](crate::pipeline::CancelToken) fired. It is never recorded in the
/// error slot, so the real cause always wins over it.
///
/// Cheap to clone: the walk both records its failure and reports it on its outcome channel.
#[derive(Clone, Debug, Error)]
pub enum ThumbError {
    #[error("walk failed at {}: {msg}", display_opt(.path))]
    Traversal { path: Option<PathBuf>, msg: String },

    #[error("could not classify {}: {source}", .path.display())]
    Classification {
        path: PathBuf,
        source: Arc<std::io::Error>,
    },

    #[error("{} is not a supported image (detected {mime})", .path.display())]
    UnsupportedType { path: PathBuf, mime: String },

    #[error("could not decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: Arc<image::ImageError>,
    },

    #[error("could not write thumbnail {}: {msg}", .path.display())]
    Persist { path: PathBuf, msg: String },

    #[error("walk canceled")]
    Cancelled,
}

impl ThumbError {
    /// True for the cancellation artifact, false for a real failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ThumbError::Cancelled)
    }

    /// Path the error was raised for, when there is one.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ThumbError::Traversal { path, .. } => path.as_ref(),
            ThumbError::Classification { path, .. }
            | ThumbError::UnsupportedType { path, .. }
            | ThumbError::Decode { path, .. }
            | ThumbError::Persist { path, .. } => Some(path),
            ThumbError::Cancelled => None,
        }
    }
}

impl From<walkdir::Error> for ThumbError {
    fn from(err: walkdir::Error) -> Self {
        ThumbError::Traversal {
            path: err.path().map(PathBuf::from),
            msg: err.to_string(),
        }
    }
}

fn display_opt(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<no-path>".to_string())
}
