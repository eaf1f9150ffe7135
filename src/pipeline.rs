//! The full workflow: fetch, extract, calculate, store.

use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::{
    config::Config,
    extract::{self, html},
    fetch::Fetcher,
    model::{DailyRow, HourlyRow, PrognosisRow},
    prelude::*,
    prognosis, store,
    tables::build_prognosis_table,
};

const SOURCE: &str = "tutiempo.net";

/// How many days of the prognosis the console summary shows.
const CONSOLE_DAYS: usize = 7;

#[derive(Debug)]
pub enum Outcome {
    Stored { n_days: usize, n_hours: usize },
    Scouted,
    NoData,
}

/// Runs the whole workflow against the live page.
#[instrument(skip_all)]
pub fn run(config: &Config, scout: bool) -> Result<Outcome> {
    let fetcher = Fetcher::builder()
        .max_retries(config.max_retries)
        .retry_delay(Duration::from_secs(config.retry_delay))
        .timeout(Duration::from_secs(config.timeout))
        .build();
    let url = fetcher.find_url(&config.location, &config.base_url, &config.fallback_url);
    let html = fetcher.fetch_html(&url)?;

    let now = Local::now();
    process(config, &html, now.date_naive(), now.naive_local(), scout)
}

/// Everything after the fetch. With `scout` set, the records are extracted,
/// calculated and printed, but nothing is written.
fn process(
    config: &Config,
    html: &str,
    reference: NaiveDate,
    fetched_at: NaiveDateTime,
    scout: bool,
) -> Result<Outcome> {
    let page = html::flatten(html);
    let extraction = extract::extract_forecast(&page, reference, SOURCE, fetched_at);
    if extraction.daily.is_empty() {
        warn!("no forecast on the page, nothing to store");
        return Ok(Outcome::NoData);
    }

    let config_hash = config.digest()?;
    let prognosis = prognosis::calculate(&extraction.daily, config, &config_hash);
    println!("{}", build_prognosis_table(&prognosis[..prognosis.len().min(CONSOLE_DAYS)]));

    if scout {
        info!("scouting, skipping the writes");
        return Ok(Outcome::Scouted);
    }

    let daily_rows: Vec<DailyRow> = extraction.daily.iter().map(DailyRow::from).collect();
    let hourly_rows: Vec<HourlyRow> = extraction.hourly.iter().map(HourlyRow::from).collect();
    let prognosis_rows: Vec<PrognosisRow> = prognosis.iter().map(PrognosisRow::from).collect();

    let exports_dir = config.exports_dir();
    store::write_snapshot(&daily_rows, &exports_dir.join("daily_forecast.csv"))?;
    store::write_snapshot(&hourly_rows, &exports_dir.join("hourly_detail.csv"))?;
    store::write_snapshot(&prognosis_rows, &exports_dir.join("battery_prognosis.csv"))?;

    let history_dir = config.history_dir();
    store::upsert_history(
        &daily_rows,
        &history_dir.join("daily_forecast_history.csv"),
        DailyRow::IDENTITY,
        DailyRow::ORDERING,
    )?;
    store::upsert_history(
        &hourly_rows,
        &history_dir.join("hourly_detail_history.csv"),
        HourlyRow::IDENTITY,
        HourlyRow::ORDERING,
    )?;
    store::upsert_history(
        &prognosis_rows,
        &history_dir.join("battery_prognosis_history.csv"),
        PrognosisRow::IDENTITY,
        PrognosisRow::ORDERING,
    )?;

    Ok(Outcome::Stored {
        n_days: extraction.daily.len(),
        n_hours: extraction.hourly.len(),
    })
}
