//! Error types at component boundaries. Framing and format errors are consumed internally
//! (see `frame.rs` and `format.rs`); what bubbles up to `main` is configuration and I/O failure,
//! expressed with `thiserror` leaf types wrapped in `anyhow::Result` at the call sites.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("exactly one of --serial or --file must be given")]
    NoInputSource,
    #[error("both --serial and --file were given; only one input source is allowed")]
    ConflictingInputSources,
}
