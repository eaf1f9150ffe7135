//! TOML configuration with per-field fallbacks to the built-in defaults.

use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts, surface_area::SquareMetres},
};

const DEFAULT_PANEL_EFFICIENCY: f64 = 0.20;

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub location: String,
    pub base_url: String,
    pub fallback_url: String,
    pub max_retries: u32,

    /// Base back-off delay in seconds, multiplied by the attempt number.
    pub retry_delay: u64,

    /// Request timeout in seconds.
    pub timeout: u64,

    pub data_dir: PathBuf,
    pub solar_panel: SolarPanelConfig,
    pub system: SystemConfig,
    pub battery: BatteryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: "Deinze".to_string(),
            base_url: "https://en.tutiempo.net".to_string(),
            fallback_url: "https://en.tutiempo.net/solar-radiation/deinze.html".to_string(),
            max_retries: 3,
            retry_delay: 2,
            timeout: 10,
            data_dir: PathBuf::from("data"),
            solar_panel: SolarPanelConfig::default(),
            system: SystemConfig::default(),
            battery: BatteryConfig::default(),
        }
    }
}

impl Config {
    /// Reads the configuration, falling back to the defaults so that a
    /// missing or broken file never blocks a scheduled run.
    pub fn load<P: AsRef<Path> + Debug>(path: P) -> Self {
        let path = path.as_ref();
        if !path.is_file() {
            info!(path = %path.display(), "no configuration file, using the defaults");
            return Self::default();
        }
        Self::read_from(path).unwrap_or_else(|error| {
            warn!(path = %path.display(), "unreadable configuration, using the defaults: {error:#}");
            Self::default()
        })
    }

    fn read_from(path: &Path) -> Result<Self> {
        Ok(toml::from_slice(&fs::read(path)?)?)
    }

    #[must_use]
    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }

    #[must_use]
    pub fn history_dir(&self) -> PathBuf {
        self.data_dir.join("history")
    }

    /// Short fingerprint of the calculation inputs. Prognosis rows carry it,
    /// so the history keeps one row per date and settings rather than
    /// overwriting estimates whenever the panels or batteries change.
    pub fn digest(&self) -> Result<String> {
        #[derive(Serialize)]
        struct CalculationConfig<'a> {
            location: &'a str,
            solar_panel: &'a SolarPanelConfig,
            system: &'a SystemConfig,
            battery: &'a BatteryConfig,
        }

        let subset = CalculationConfig {
            location: &self.location,
            solar_panel: &self.solar_panel,
            system: &self.system,
            battery: &self.battery,
        };
        let digest = md5::compute(
            serde_json::to_vec(&subset).context("failed to serialise the configuration")?,
        );
        Ok(format!("{digest:x}")[..8].to_string())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct SolarPanelConfig {
    pub count: u32,

    /// Fraction of irradiation the panel converts, from the manufacturer's
    /// datasheet. Percent-like input (`20` for `0.20`) is accepted too.
    #[serde(deserialize_with = "deserialize_efficiency")]
    pub efficiency: f64,

    #[serde(alias = "area_m2")]
    pub area_per_panel_m2: SquareMetres,
}

impl Default for SolarPanelConfig {
    fn default() -> Self {
        Self {
            count: 8,
            efficiency: DEFAULT_PANEL_EFFICIENCY,
            area_per_panel_m2: SquareMetres(1.8),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Wiring and inverter losses, as a remaining fraction.
    #[serde(alias = "system_efficiency")]
    pub efficiency: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self { efficiency: 0.85 }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub count: u32,

    #[serde(alias = "capacity_kwh")]
    pub capacity_kwh_per_battery: KilowattHours,

    #[serde(alias = "max_charge_rate_kw")]
    pub max_charge_rate_kw_per_battery: Kilowatts,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            count: 1,
            capacity_kwh_per_battery: KilowattHours(10.0),
            max_charge_rate_kw_per_battery: Kilowatts(5.0),
        }
    }
}

fn deserialize_efficiency<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Number(value) => value,
        Raw::Text(text) => text.trim().parse().unwrap_or_else(|_| {
            warn!("unreadable panel efficiency `{text}`, assuming the default");
            DEFAULT_PANEL_EFFICIENCY
        }),
    };
    Ok(normalise_efficiency(value))
}

const fn normalise_efficiency(value: f64) -> f64 {
    if value > 1.0 && value <= 100.0 { value / 100.0 } else { value }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn defaults_cover_a_typical_installation() {
        let config = Config::default();
        assert_eq!(config.location, "Deinze");
        assert_eq!(config.solar_panel.count, 8);
        assert_abs_diff_eq!(config.solar_panel.efficiency, 0.20);
        assert_abs_diff_eq!(config.solar_panel.area_per_panel_m2.0, 1.8);
        assert_abs_diff_eq!(config.system.efficiency, 0.85);
        assert_abs_diff_eq!(config.battery.capacity_kwh_per_battery.0, 10.0);
    }

    #[test]
    fn percent_like_efficiency_normalises() -> Result {
        let config: Config = toml::from_str("[solar_panel]\nefficiency = 20\n")?;
        assert_abs_diff_eq!(config.solar_panel.efficiency, 0.20);
        Ok(())
    }

    #[test]
    fn textual_efficiency_parses() -> Result {
        let config: Config = toml::from_str("[solar_panel]\nefficiency = \"0.22\"\n")?;
        assert_abs_diff_eq!(config.solar_panel.efficiency, 0.22);
        Ok(())
    }

    #[test]
    fn unreadable_efficiency_falls_back() -> Result {
        let config: Config = toml::from_str("[solar_panel]\nefficiency = \"plenty\"\n")?;
        assert_abs_diff_eq!(config.solar_panel.efficiency, DEFAULT_PANEL_EFFICIENCY);
        Ok(())
    }

    #[test]
    fn legacy_key_aliases_are_accepted() -> Result {
        let config: Config = toml::from_str(
            "[solar_panel]\narea_m2 = 2.0\n\n[system]\nsystem_efficiency = 0.9\n\n[battery]\ncapacity_kwh = 5.0\n",
        )?;
        assert_abs_diff_eq!(config.solar_panel.area_per_panel_m2.0, 2.0);
        assert_abs_diff_eq!(config.system.efficiency, 0.9);
        assert_abs_diff_eq!(config.battery.capacity_kwh_per_battery.0, 5.0);
        Ok(())
    }

    #[test]
    fn digest_covers_the_calculation_inputs_only() -> Result {
        let mut config = Config::default();
        let baseline = config.digest()?;
        assert_eq!(baseline.len(), 8);

        config.max_retries = 42;
        assert_eq!(config.digest()?, baseline, "fetch settings must not affect the digest");

        config.battery.count = 2;
        assert_ne!(config.digest()?, baseline);
        Ok(())
    }

    #[test]
    fn broken_file_falls_back_to_the_defaults() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("config.toml");
        fs::write(&path, "this is not TOML ][")?;

        let config = Config::load(&path);
        assert_eq!(config.location, "Deinze");
        Ok(())
    }
}
