//! Engine module: CLI surface, image codec, progress and path tools

pub mod arg_parser;
pub mod cli;
pub mod codec;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{handle_run, setup_opts};
pub use codec::{Codec, ImageCodec};
pub use tools::{classify, destination_for, sniff_mime};
