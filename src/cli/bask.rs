use std::process::ExitCode;

use clap::Parser;

use crate::{
    cli::ConfigArgs,
    pipeline::{self, Outcome},
    prelude::*,
};

#[derive(Parser)]
pub struct BaskArgs {
    #[clap(flatten)]
    config: ConfigArgs,

    /// Do not write the snapshots or the history (dry run).
    #[clap(long)]
    scout: bool,
}

impl BaskArgs {
    pub fn run(self) -> Result<ExitCode> {
        let config = self.config.load();
        match pipeline::run(&config, self.scout)? {
            Outcome::Stored { n_days, n_hours } => {
                info!(n_days, n_hours, "stored");
                Ok(ExitCode::SUCCESS)
            }
            Outcome::Scouted => Ok(ExitCode::SUCCESS),
            Outcome::NoData => Ok(ExitCode::FAILURE),
        }
    }
}
