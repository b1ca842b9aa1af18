//! fmu-dataio CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. A failed command
//! has already reported itself on stdout; this only sets the exit code.

use fmu_dataio::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
