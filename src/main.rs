#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod cli;
mod config;
mod extract;
mod fetch;
mod fmt;
mod model;
mod pipeline;
mod prelude;
mod prognosis;
mod quantity;
mod store;
mod tables;

use std::process::ExitCode;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
};

fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let exit_code = match args.command {
        Command::Bask(args) => args.run()?,
        Command::Burrow(args) => args.run()?,
    };

    info!("done!");
    Ok(exit_code)
}
