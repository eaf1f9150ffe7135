mod bask;
mod burrow;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    cli::{bask::BaskArgs, burrow::BurrowArgs},
    config::Config,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: fetch the forecast, calculate the prognosis, and store the records.
    #[clap(name = "bask")]
    Bask(Box<BaskArgs>),

    /// Development tools.
    #[clap(name = "burrow")]
    Burrow(Box<BurrowArgs>),
}

#[derive(Parser)]
pub struct ConfigArgs {
    /// Path to the TOML configuration file.
    #[clap(long = "config", env = "SUNGAZER_CONFIG", default_value = "config.toml")]
    path: PathBuf,
}

impl ConfigArgs {
    #[must_use]
    pub fn load(&self) -> Config {
        Config::load(&self.path)
    }
}
