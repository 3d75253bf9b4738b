//! fieldsnap CLI: export and import custom-field snapshots.
//!
//! Operates on a JSON site fixture:
//! - `fieldsnap import <FILE> --site <SITE>`: apply a snapshot, rolling back on failure
//! - `fieldsnap export --site <SITE> --group <KEY> ...`: write a snapshot
//! - `fieldsnap validate <FILE>`: check a snapshot without importing it
//! - `fieldsnap init-config [PATH]`: write a default `fieldsnap.toml`
//!
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG` to see them.

mod commands;
mod format;
mod parse;
mod run;

use std::io;
use std::process;

use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::OutputMode;
use parse::matches_to_action;

fn main() {
    init_tracing();

    let matches = build_cli().get_matches();
    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let action = match matches_to_action(&matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    let result = {
        let mut stdout = io::stdout().lock();
        run::execute(action, mode, &mut stdout)
    };
    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
