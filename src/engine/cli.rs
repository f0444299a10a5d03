//! CLI command handler: merge file config and flags, wire Ctrl-C to the cancel token, run.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::sync::Arc;

use crate::engine::arg_parser::Cli;
use crate::engine::codec::ImageCodec;
use crate::pipeline::{CancelToken, run_pipeline};
use crate::utils::{apply_file_to_opts, load_thumbnailer_toml, setup_logging};
use crate::{Opts, RunSummary};

/// Overwrite opts field from a CLI flag when given.
macro_rules! apply_cli_opt {
    ($cli:expr, $opts:expr, $cli_field:ident => $opts_field:ident) => {
        if let Some(v) = $cli.$cli_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Defaults, then `.thumbnailer.toml` in the working directory, then flags.
pub fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = std::env::current_dir()
        .ok()
        .and_then(|dir| load_thumbnailer_toml(&dir))
    {
        apply_file_to_opts(&file, &mut opts);
    }
    apply_cli_opt!(cli, opts, out_dir => output_dir);
    apply_cli_opt!(cli, opts, workers => workers);
    apply_cli_opt!(cli, opts, verbose => verbose);
    apply_cli_opt!(cli, opts, follow_links => follow_links);
    opts
}

/// Run the pipeline over `cli.dir`. Ctrl-C fires the shared cancel token.
pub fn handle_run(cli: &Cli) -> Result<RunSummary> {
    let opts = setup_opts(cli);
    setup_logging(opts.verbose);
    debug!("{} CONFIG: {:#?}", env!("CARGO_PKG_NAME").to_uppercase(), opts);

    let cancel = CancelToken::new();
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || {
        if cancel_handler.cancel() {
            warn!("Interrupted; stopping pipeline...");
        }
    })
    .context("set Ctrl+C handler")?;

    run_pipeline(&cli.dir, &opts, Arc::new(ImageCodec), &cancel)
}
