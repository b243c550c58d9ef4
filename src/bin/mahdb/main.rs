use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod cmd_create;
mod cmd_insert;
mod cmd_select;
mod cmd_stats;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug mahdb stats --json mydata/R
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:?}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Create {
            name,
            nattrs,
            npages,
            depth,
            chvec,
        } => cmd_create::exec(name, nattrs, npages, depth, chvec),

        cli::Cmd::Insert { name, tuple } => cmd_insert::exec(name, tuple),

        cli::Cmd::Select { name, pattern } => cmd_select::exec(name, pattern),

        cli::Cmd::Stats { name, json } => cmd_stats::exec(name, json),
    }
}
