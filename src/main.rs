//! Thumbnailer CLI: thumbnail every image under DIR into ./thumbnail.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use thumbnailer::engine::arg_parser::Cli;
use thumbnailer::engine::handle_run;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let summary = handle_run(&cli)?;
    log::debug!(
        "{} thumbnails written to {}",
        summary.written,
        summary.output_dir.display()
    );
    println!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
