#![forbid(unsafe_code)]

pub mod adapters;
pub mod app;
pub mod commands;
pub mod domain;
pub mod infrastructure;
pub mod ports;

use clap::Parser;

use commands::{Cli, EXIT_ERROR};

/// Parse the command line, run it, and exit with its status code.
pub fn run() {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            std::process::exit(EXIT_ERROR);
        }
    };

    let exit_code = match runtime.block_on(commands::dispatch(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    // process::exit skips destructors
    drop(runtime);
    std::process::exit(exit_code);
}
