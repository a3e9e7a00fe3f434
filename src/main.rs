mod analysis;
mod capture;
mod cli;
mod config;
mod core;
mod domain;
mod error;
mod render;
mod session;
mod speech;

use clap::Parser;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = cli::run(cli::Cli::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
