// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use colorful::Colorful;

use nyquistlab::cli::{self, Args};

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match cli::run(&args) {
        Ok(report) => {
            print!("{}", report);
            if !report.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{} {}", "Error:".red(), err);
            Err(err).context("nyquistlab failed")
        }
    }
}
