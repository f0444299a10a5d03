pub mod config;
pub mod logger;
pub mod thumbnailer_toml;

pub use config::*;
pub use logger::setup_logging;
pub use thumbnailer_toml::{apply_file_to_opts, load_thumbnailer_toml};
