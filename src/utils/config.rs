//! Application configuration constants.
//! Tuning and defaults in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    /// Optional settings file looked up in the working directory (e.g. `.thumbnailer.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Thumbnails ----

/// Defaults for a run. Only pool size, dimensions and output location are configurable.
pub struct ThumbnailDefaults;

impl ThumbnailDefaults {
    pub const WIDTH: u32 = 100;
    pub const HEIGHT: u32 = 100;
    /// Fixed worker pool size.
    pub const WORKERS: usize = 5;
    /// Relative to the working directory.
    pub const OUTPUT_DIR: &'static str = "thumbnail";
}

// ---- Classification ----

/// Bytes read from the head of a file to sniff its content type.
pub const SNIFF_LEN: usize = 512;

/// MIME types the walk accepts as source images. Anything else stops the walk.
pub const ACCEPTED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
];

pub fn is_accepted_mime(mime: &str) -> bool {
    ACCEPTED_MIME_TYPES.contains(&mime)
}

// ---- Progress ----

/// Progress counter tuning.
pub struct ProgressConsts;

impl ProgressConsts {
    /// Refresh the counter every N thumbnails written.
    pub const UPDATE_BATCH_SIZE: usize = 10;
}
