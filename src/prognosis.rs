//! Battery charge prognosis from the daily radiation forecast.

use crate::{
    config::Config,
    model::{DailyRecord, PrognosisRecord},
    quantity::energy::KilowattHours,
};

/// Extends each daily record with the estimated production and the share of
/// the battery bank it can fill. The share is capped at 100: the battery
/// cannot take more than its capacity, however sunny the day.
#[must_use]
pub fn calculate(daily: &[DailyRecord], config: &Config, config_hash: &str) -> Vec<PrognosisRecord> {
    let panels = &config.solar_panel;
    let battery = &config.battery;

    let panel_count = f64::from(panels.count);
    let total_panel_area = panels.area_per_panel_m2 * panel_count;
    let battery_capacity = battery.capacity_kwh_per_battery * f64::from(battery.count);
    let total_charge_rate = battery.max_charge_rate_kw_per_battery * f64::from(battery.count);

    daily
        .iter()
        .map(|record| {
            let per_panel_production = record.radiation
                * panels.area_per_panel_m2
                * panels.efficiency
                * config.system.efficiency;
            let production = per_panel_production * panel_count;
            let charge_percentage = if battery_capacity > KilowattHours::zero() {
                production.min(battery_capacity).0 / battery_capacity.0 * 100.0
            } else {
                0.0
            };
            PrognosisRecord {
                date: record.date,
                day_name: record.day_name.clone(),
                radiation: record.radiation,
                source: record.source.clone(),
                fetched_at: record.fetched_at,
                panel_count: panels.count,
                total_panel_area,
                per_panel_production,
                production,
                battery_count: battery.count,
                battery_capacity,
                total_charge_rate,
                charge_percentage,
                config_hash: config_hash.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;
    use crate::quantity::{irradiation::KilowattHoursPerSquareMetre, surface_area::SquareMetres};

    fn record(radiation: f64) -> DailyRecord {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        DailyRecord::new(
            date,
            KilowattHoursPerSquareMetre(radiation),
            "tutiempo.net",
            date.and_hms_opt(8, 0, 0).unwrap(),
        )
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.solar_panel.count = 4;
        config.solar_panel.efficiency = 0.20;
        config.solar_panel.area_per_panel_m2 = SquareMetres(1.8);
        config.system.efficiency = 0.85;
        config
    }

    #[test]
    fn half_a_kilowatt_hour_fills_six_percent() {
        let prognosis = calculate(&[record(0.5)], &config(), "0a1b2c3d");

        assert_eq!(prognosis.len(), 1);
        let day = &prognosis[0];
        assert_abs_diff_eq!(day.per_panel_production.0, 0.153, epsilon = 1e-9);
        assert_abs_diff_eq!(day.production.0, 0.612, epsilon = 1e-9);
        assert_abs_diff_eq!(day.charge_percentage, 6.12, epsilon = 1e-9);
        assert_abs_diff_eq!(day.total_panel_area.0, 7.2, epsilon = 1e-9);
        assert_abs_diff_eq!(day.battery_capacity.0, 10.0);
        assert_abs_diff_eq!(day.total_charge_rate.0, 5.0);
        assert_eq!(day.config_hash, "0a1b2c3d");
    }

    #[test]
    fn charge_percentage_caps_at_one_hundred() {
        let mut config = Config::default();
        config.solar_panel.count = 1;
        config.solar_panel.efficiency = 1.0;
        config.solar_panel.area_per_panel_m2 = SquareMetres(1.0);
        config.system.efficiency = 1.0;

        let prognosis = calculate(&[record(15.0)], &config, "0a1b2c3d");

        assert_abs_diff_eq!(prognosis[0].production.0, 15.0);
        assert_abs_diff_eq!(prognosis[0].charge_percentage, 100.0);
    }

    #[test]
    fn zero_capacity_reads_as_zero_percent() {
        let mut config = config();
        config.battery.count = 0;

        let prognosis = calculate(&[record(0.5)], &config, "0a1b2c3d");

        assert_abs_diff_eq!(prognosis[0].charge_percentage, 0.0);
        assert_abs_diff_eq!(prognosis[0].battery_capacity.0, 0.0);
    }
}
