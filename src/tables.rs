use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    fmt::FormattedPercentage,
    model::{DailyRecord, HourlyRecord, PrognosisRecord},
};

pub fn build_prognosis_table(prognosis: &[PrognosisRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec![
        "Date", "Day", "Radiation", "Per panel", "Production", "Capacity", "Charge",
    ]);
    for record in prognosis {
        table.add_row(vec![
            Cell::new(record.date),
            Cell::new(&record.day_name).add_attribute(Attribute::Dim),
            Cell::new(record.radiation).set_alignment(CellAlignment::Right),
            Cell::new(record.per_panel_production)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(record.production).set_alignment(CellAlignment::Right),
            Cell::new(record.battery_capacity)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(FormattedPercentage(record.charge_percentage))
                .set_alignment(CellAlignment::Right)
                .fg(charge_color(record.charge_percentage)),
        ]);
    }
    table
}

pub fn build_daily_table(daily: &[DailyRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec!["Date", "Day", "Radiation"]);
    for record in daily {
        table.add_row(vec![
            Cell::new(record.date),
            Cell::new(&record.day_name).add_attribute(Attribute::Dim),
            Cell::new(record.radiation).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_hourly_table(hourly: &[HourlyRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec!["Date", "Time", "Irradiance"]);
    for record in hourly {
        table.add_row(vec![
            Cell::new(record.date).add_attribute(Attribute::Dim),
            Cell::new(record.time.format("%H:%M")),
            Cell::new(record.irradiance).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

const fn charge_color(percentage: f64) -> Color {
    if percentage >= 80.0 {
        Color::Green
    } else if percentage >= 30.0 {
        Color::DarkYellow
    } else {
        Color::Red
    }
}
