use std::{fs, path::PathBuf, process::ExitCode};

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::{
    cli::ConfigArgs,
    extract::{self, html},
    prelude::*,
    tables::{build_daily_table, build_hourly_table},
};

#[derive(Parser)]
pub struct BurrowArgs {
    #[command(subcommand)]
    command: BurrowCommand,
}

impl BurrowArgs {
    pub fn run(self) -> Result<ExitCode> {
        match self.command {
            BurrowCommand::Extract(args) => args.run(),
            BurrowCommand::Config(args) => args.run(),
        }
    }
}

#[derive(Subcommand)]
enum BurrowCommand {
    /// Extract the forecast from a saved page and print it.
    Extract(BurrowExtractArgs),

    /// Print the effective configuration with its calculation digest.
    Config(BurrowConfigArgs),
}

#[derive(Parser)]
struct BurrowExtractArgs {
    /// Path to the saved HTML page.
    #[clap(long)]
    page: PathBuf,

    /// Resolve relative dates against this date instead of today.
    #[clap(long)]
    reference_date: Option<NaiveDate>,
}

impl BurrowExtractArgs {
    #[instrument(skip_all)]
    fn run(self) -> Result<ExitCode> {
        let html = fs::read_to_string(&self.page)
            .with_context(|| format!("failed to read `{}`", self.page.display()))?;
        let reference = self.reference_date.unwrap_or_else(|| Local::now().date_naive());

        let page = html::flatten(&html);
        let extraction =
            extract::extract_forecast(&page, reference, "file", Local::now().naive_local());

        println!("{}", build_daily_table(&extraction.daily));
        if !extraction.hourly.is_empty() {
            println!("{}", build_hourly_table(&extraction.hourly));
        }
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Parser)]
struct BurrowConfigArgs {
    #[clap(flatten)]
    config: ConfigArgs,
}

impl BurrowConfigArgs {
    fn run(self) -> Result<ExitCode> {
        let config = self.config.load();
        info!(digest = config.digest()?, "effective configuration:");
        print!("{}", toml::to_string(&config)?);
        Ok(ExitCode::SUCCESS)
    }
}
