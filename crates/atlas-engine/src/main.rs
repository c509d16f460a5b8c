//! Multi-symbol matching engine.
//!
//! Reads the line protocol from stdin, dispatches each command to the
//! engine owning its symbol (created lazily on first sight), and exits
//! cleanly on EOF. Trade reports and snapshots go to stdout; diagnostics go
//! to stderr so the protocol stream stays clean.

mod app;
mod error;

use std::collections::HashMap;
use std::io::{self, BufRead};

use app::EngineApp;
use error::EngineError;

fn main() -> Result<(), EngineError> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let mut engines: HashMap<String, EngineApp> = HashMap::new();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let parsed = match atlas_proto::parse_line(&line) {
            Ok(parsed) => parsed,
            Err(err) => {
                if !line.trim().is_empty() {
                    tracing::debug!(?err, line = %line, "ignored malformed line");
                }
                continue;
            }
        };

        let engine = engines
            .entry(parsed.symbol.to_owned())
            .or_insert_with(|| EngineApp::new(parsed.symbol));
        engine.submit(parsed.verb);
    }

    // EOF: dropping the engines drains and joins every worker and logger.
    drop(engines);
    Ok(())
}
