//! `tree-patch`: apply a patch to a JSON document.
//!
//! Usage:
//!   tree-patch [--array] [--chained] '<patch-json>'
//!
//! Built with `--features cli`.
//!
//! The document is read from stdin and the patched document is written to
//! stdout. Log verbosity is taken from `RUST_LOG` (default `warn`).

use std::io::{self, Read, Write};

use tracing::debug;
use tree_patch::cli::{parse_args, run};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    debug!(array = args.array, chained = args.chained, bytes = buf.len(), "applying patch");
    match run(&args, buf.trim()) {
        Ok(result) => {
            let mut out = io::stdout().lock();
            if let Err(e) = out.write_all(result.as_bytes()).and_then(|_| out.write_all(b"\n")) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
