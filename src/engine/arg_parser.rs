use clap::Parser;
use std::path::PathBuf;

/// Concurrent thumbnail generator.
#[derive(Clone, Debug, Parser)]
#[command(name = "thumbnailer")]
#[command(
    about = "Walk DIR, thumbnail every image on a bounded worker pool, and write the results to ./thumbnail."
)]
pub struct Cli {
    /// Directory to walk. Every regular file under it must be a supported image.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Output directory. Default: `thumbnail` in the working directory.
    #[arg(long, short = 'o')]
    pub out_dir: Option<PathBuf>,

    /// Number of thumbnail workers. Default: 5.
    #[arg(long, short = 'j', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Verbose output (debug logging and a progress counter).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Follow symbolic links.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,
}
