use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod pipeline;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let cfg = config::Config::load(args.config.as_deref())?;
    config::init_tracing(&cfg.logging, args.log_level.as_deref())?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "subov starting");

    match args.command {
        cli::Command::Convert(cmd) => pipeline::run_convert(cmd, &cfg),
        cli::Command::Play(cmd) => pipeline::run_play(cmd, &cfg),
        cli::Command::Edit(cmd) => pipeline::run_edit(cmd, &cfg),
        cli::Command::Pack(cmd) => pipeline::run_pack(cmd),
        cli::Command::Unpack(cmd) => pipeline::run_unpack(cmd),
        cli::Command::PrintDefaultConfig => {
            let s = cfg.to_toml_pretty()?;
            print!("{s}");
            Ok(())
        }
    }
}
