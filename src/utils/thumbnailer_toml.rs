//! Load `.thumbnailer.toml` from a directory (CLI only). Lib callers inject config via ThumbOpts.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct ThumbnailerToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    output_dir: Option<String>,
    workers: Option<usize>,
    width: Option<u32>,
    height: Option<u32>,
    follow_links: Option<bool>,
    verbose: Option<bool>,
}

/// Load the package config file from `dir` if present. Returns None if missing, unreadable or malformed.
pub fn load_thumbnailer_toml(dir: &Path) -> Option<ThumbnailerToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_thumbnailer_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub fn parse_thumbnailer_toml(s: &str) -> Result<ThumbnailerToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($file:expr, $opts:expr, $file_field:ident => $opts_field:ident) => {
        if let Some(v) = $file.$file_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub fn apply_file_to_opts(file: &ThumbnailerToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref p) = s.output_dir {
        opts.output_dir = PathBuf::from(p);
    }
    apply_file_opt!(s, opts, workers => workers);
    apply_file_opt!(s, opts, width => width);
    apply_file_opt!(s, opts, height => height);
    apply_file_opt!(s, opts, follow_links => follow_links);
    apply_file_opt!(s, opts, verbose => verbose);
}
