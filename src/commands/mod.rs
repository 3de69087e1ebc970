//! Command implementations behind the `pipedemo` subcommands and the
//! single-purpose `pd-*` binaries.

pub mod chat;
pub mod config;
pub mod sentiment;
pub mod summarize;

use crate::logging;

/// Loads `.env` and installs logging. Call once at the top of `main`.
pub fn init_runtime(verbose: bool) {
    let dotenv = dotenvy::dotenv();
    logging::init(verbose);
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "ignoring unreadable .env file"),
    }
}
