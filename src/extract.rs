//! Recovers daily and hourly radiation records from flattened page text.

pub mod date;
pub mod html;

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::LazyLock,
};

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use itertools::Itertools;
use regex::Regex;

use crate::{
    extract::{date::DateResolver, html::FlattenedPage},
    model::{DailyRecord, HourlyRecord},
    prelude::*,
    quantity::{irradiation::RadiationUnit, power_density::WattsPerSquareMetre},
};

/// The page prints one of these per day block, after the hourly breakdown.
static TOTAL_RADIATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)total\s+solar\s+radiation:\s*(\d+(?:\.\d+)?)\s*(wh|kwh|mj)\s*/?\s*m[²2]")
        .unwrap()
});

/// `HH:MM <power>` pairs of the hourly breakdown. The minutes may glue
/// directly onto the value ("09:004 w/m2" reads as 09:00, 4 W/m²).
static HOURLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(\d+(?:\.\d+)?)\s*w\s*/?\s*m[²2]").unwrap()
});

/// Marks where a day block's hourly breakdown begins.
static HOURLY_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)hourly\s+forecast").unwrap());

/// How far back a figure's context may reach when day blocks run long.
const CONTEXT_WINDOW: usize = 2500;

/// How much of the context tail holds the hourly breakdown when the page
/// carries no explicit heading for it.
const HOURLY_TAIL: usize = 1500;

pub struct Extraction {
    pub daily: Vec<DailyRecord>,
    pub hourly: Vec<HourlyRecord>,
}

/// Scans the flattened page for daily totals and their hourly breakdowns.
///
/// Each figure's context window is bounded below by the previous figure's
/// end, so one day's breakdown and boilerplate never bleed into the next
/// day's. An empty result is an expected outcome, not an error: the page may
/// simply have changed its layout.
#[instrument(skip_all, fields(reference = %reference))]
#[must_use]
pub fn extract_forecast(
    page: &FlattenedPage,
    reference: NaiveDate,
    source: &str,
    fetched_at: NaiveDateTime,
) -> Extraction {
    let mut resolver = DateResolver::new(reference);
    let mut daily: BTreeMap<NaiveDate, DailyRecord> = BTreeMap::new();
    let mut hourly: BTreeMap<NaiveDate, Vec<HourlyRecord>> = BTreeMap::new();

    let mut n_figures = 0;
    let mut previous_end = 0;
    for (index, captures) in TOTAL_RADIATION_RE.captures_iter(&page.text).enumerate() {
        let (Some(figure), Some(value), Some(unit)) =
            (captures.get(0), captures.get(1), captures.get(2))
        else {
            continue;
        };
        let Ok(value) = value.as_str().parse::<f64>() else {
            continue;
        };
        n_figures += 1;

        let radiation = RadiationUnit::from_capture(unit.as_str()).to_kilowatt_hours(value);

        let window_start = floor_char_boundary(
            &page.text,
            figure.start().saturating_sub(CONTEXT_WINDOW),
        )
        .max(previous_end);
        let window = window_start..figure.start();
        let context = &page.text[window.clone()];
        previous_end = figure.end();

        let heading = page.heading_within(&window);
        let date = resolver.resolve(heading, context, index);

        // The source may print a day's total twice. The larger reading wins,
        // and the hourly breakdown follows the winning figure.
        let keep = daily
            .get(&date)
            .is_none_or(|existing| radiation > existing.radiation);
        if !keep {
            debug!(%date, "duplicate figure, keeping the earlier larger value");
            continue;
        }
        if daily.insert(date, DailyRecord::new(date, radiation, source, fetched_at)).is_some() {
            debug!(%date, "duplicate figure, keeping the larger value");
        }
        hourly.insert(date, extract_hourly(context, date, source, fetched_at));
    }

    let daily = daily.into_values().collect_vec();
    let hourly = hourly.into_values().flatten().collect_vec();

    info!(n_figures, n_days = daily.len(), n_hours = hourly.len(), "extracted");
    observe_gaps(&daily);

    Extraction { daily, hourly }
}

/// The hourly breakdown sits between the "Hourly forecast" heading and the
/// day's total. Pages without the heading fall back to the context's tail.
fn extract_hourly(
    context: &str,
    date: NaiveDate,
    source: &str,
    fetched_at: NaiveDateTime,
) -> Vec<HourlyRecord> {
    let section = match HOURLY_HEADING_RE.find_iter(context).last() {
        Some(heading) => &context[heading.end()..],
        None => &context[floor_char_boundary(context, context.len().saturating_sub(HOURLY_TAIL))..],
    };

    let mut records = Vec::new();
    let mut seen = BTreeSet::new();
    for captures in HOURLY_RE.captures_iter(section) {
        let (Some(hour), Some(minute), Some(value)) =
            (captures.get(1), captures.get(2), captures.get(3))
        else {
            continue;
        };
        let (Ok(hour), Ok(minute), Ok(value)) = (
            hour.as_str().parse::<u32>(),
            minute.as_str().parse::<u32>(),
            value.as_str().parse::<f64>(),
        ) else {
            continue;
        };
        // Glued artefacts produce impossible times ("188:42"); skip them the
        // same way impossible minutes are skipped.
        let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
            continue;
        };
        if !seen.insert(time) {
            continue;
        }
        records.push(HourlyRecord {
            date,
            time,
            irradiance: WattsPerSquareMetre(value),
            source: source.to_owned(),
            fetched_at,
        });
    }
    records.sort_by_key(|record| record.time);
    records
}

/// A hole in the forecast is worth a look but is not an error.
fn observe_gaps(daily: &[DailyRecord]) {
    for (earlier, later) in daily.iter().tuple_windows() {
        if later.date > earlier.date + Days::new(1) {
            info!(from = %earlier.date, to = %later.date, "gap between forecast days");
        }
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
