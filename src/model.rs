//! Forecast records and their CSV row shapes.
//!
//! The domain types carry full-precision quantities; the `*Row` types are the
//! wire shapes, and rounding happens there and nowhere upstream.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::quantity::{
    energy::KilowattHours,
    irradiation::KilowattHoursPerSquareMetre,
    power::Kilowatts,
    power_density::WattsPerSquareMetre,
    surface_area::SquareMetres,
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One day's radiation total, as recovered from the page.
#[derive(Clone, Debug)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub day_name: String,
    pub radiation: KilowattHoursPerSquareMetre,
    pub source: String,
    pub fetched_at: NaiveDateTime,
}

impl DailyRecord {
    /// The weekday always derives from the date. Weekday text on the page is
    /// informational, never authoritative.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        radiation: KilowattHoursPerSquareMetre,
        source: &str,
        fetched_at: NaiveDateTime,
    ) -> Self {
        Self {
            date,
            day_name: date.format("%A").to_string(),
            radiation,
            source: source.to_owned(),
            fetched_at,
        }
    }
}

/// One `HH:MM` irradiance reading within a day's hourly breakdown.
#[derive(Clone, Debug)]
pub struct HourlyRecord {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub irradiance: WattsPerSquareMetre,
    pub source: String,
    pub fetched_at: NaiveDateTime,
}

/// A daily record extended with the production and battery charge estimate.
#[derive(Clone, Debug)]
pub struct PrognosisRecord {
    pub date: NaiveDate,
    pub day_name: String,
    pub radiation: KilowattHoursPerSquareMetre,
    pub source: String,
    pub fetched_at: NaiveDateTime,
    pub panel_count: u32,
    pub total_panel_area: SquareMetres,
    pub per_panel_production: KilowattHours,
    pub production: KilowattHours,
    pub battery_count: u32,
    pub battery_capacity: KilowattHours,
    pub total_charge_rate: Kilowatts,
    /// Share of the battery bank this day's production can fill, 0 to 100.
    pub charge_percentage: f64,
    pub config_hash: String,
}

#[derive(Debug, Serialize)]
pub struct DailyRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "DayName")]
    day_name: String,
    #[serde(rename = "SolarRadiation_kWh_m2")]
    radiation_kwh_m2: f64,
    #[serde(rename = "SolarRadiation_Wh_m2")]
    radiation_wh_m2: f64,
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "FetchedAt")]
    fetched_at: String,
}

impl DailyRow {
    /// A re-fetch of an unchanged forecast must not grow history, while a
    /// revised figure for the same date must: the volatile timestamp stays
    /// out of the identity set.
    pub const IDENTITY: &'static [&'static str] = &["Date", "SolarRadiation_kWh_m2"];
    pub const ORDERING: &'static [&'static str] = &["Date", "FetchedAt"];
}

impl From<&DailyRecord> for DailyRow {
    fn from(record: &DailyRecord) -> Self {
        Self {
            date: record.date.to_string(),
            day_name: record.day_name.clone(),
            radiation_kwh_m2: round_to(record.radiation.0, 6),
            radiation_wh_m2: round_to(record.radiation.watt_hours(), 2),
            source: record.source.clone(),
            fetched_at: record.fetched_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HourlyRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "SolarRadiation_W_m2")]
    irradiance_w_m2: f64,
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "FetchedAt")]
    fetched_at: String,
}

impl HourlyRow {
    pub const IDENTITY: &'static [&'static str] = &["Date", "Time", "SolarRadiation_W_m2"];
    pub const ORDERING: &'static [&'static str] = &["Date", "Time", "FetchedAt"];
}

impl From<&HourlyRecord> for HourlyRow {
    fn from(record: &HourlyRecord) -> Self {
        Self {
            date: record.date.to_string(),
            time: record.time.format("%H:%M").to_string(),
            irradiance_w_m2: round_to(record.irradiance.0, 2),
            source: record.source.clone(),
            fetched_at: record.fetched_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PrognosisRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "DayName")]
    day_name: String,
    #[serde(rename = "SolarRadiation_kWh_m2")]
    radiation_kwh_m2: f64,
    #[serde(rename = "SolarRadiation_Wh_m2")]
    radiation_wh_m2: f64,
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "FetchedAt")]
    fetched_at: String,
    #[serde(rename = "PanelCount")]
    panel_count: u32,
    #[serde(rename = "TotalPanelArea_m2")]
    total_panel_area_m2: f64,
    #[serde(rename = "PerPanelYield_kWh")]
    per_panel_yield_kwh: f64,
    #[serde(rename = "TotalYield_kWh")]
    total_yield_kwh: f64,
    #[serde(rename = "BatteryCount")]
    battery_count: u32,
    #[serde(rename = "BatteryCapacityTotal_kWh")]
    battery_capacity_total_kwh: f64,
    #[serde(rename = "TotalChargeRate_kW")]
    total_charge_rate_kw: f64,
    #[serde(rename = "ChargePercentage")]
    charge_percentage: f64,
    #[serde(rename = "ConfigHash")]
    config_hash: String,
}

impl PrognosisRow {
    /// The settings digest is part of the identity: re-running with changed
    /// panels or batteries retains a new history row instead of folding away
    /// as "no change".
    pub const IDENTITY: &'static [&'static str] =
        &["Date", "SolarRadiation_kWh_m2", "ConfigHash"];
    pub const ORDERING: &'static [&'static str] = &["Date", "FetchedAt"];
}

impl From<&PrognosisRecord> for PrognosisRow {
    fn from(record: &PrognosisRecord) -> Self {
        Self {
            date: record.date.to_string(),
            day_name: record.day_name.clone(),
            radiation_kwh_m2: round_to(record.radiation.0, 6),
            radiation_wh_m2: round_to(record.radiation.watt_hours(), 2),
            source: record.source.clone(),
            fetched_at: record.fetched_at.format(TIMESTAMP_FORMAT).to_string(),
            panel_count: record.panel_count,
            total_panel_area_m2: round_to(record.total_panel_area.0, 3),
            per_panel_yield_kwh: round_to(record.per_panel_production.0, 6),
            total_yield_kwh: round_to(record.production.0, 6),
            battery_count: record.battery_count,
            battery_capacity_total_kwh: round_to(record.battery_capacity.0, 6),
            total_charge_rate_kw: round_to(record.total_charge_rate.0, 3),
            charge_percentage: round_to(record.charge_percentage, 2),
            config_hash: record.config_hash.clone(),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn day_name_derives_from_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let record = DailyRecord::new(
            date,
            KilowattHoursPerSquareMetre(0.5),
            "tutiempo.net",
            date.and_hms_opt(8, 30, 0).unwrap(),
        );
        assert_eq!(record.day_name, "Thursday");
    }

    #[test]
    fn rounding_happens_at_the_row_boundary() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let record = DailyRecord::new(
            date,
            KilowattHoursPerSquareMetre(0.123_456_789),
            "tutiempo.net",
            date.and_hms_opt(8, 30, 0).unwrap(),
        );
        let row = DailyRow::from(&record);
        assert_abs_diff_eq!(row.radiation_kwh_m2, 0.123_457);
        assert_abs_diff_eq!(row.radiation_wh_m2, 123.46);
        assert_eq!(row.fetched_at, "2026-01-15 08:30:00");
    }
}
