use std::ops::Mul;

use crate::quantity::{energy::KilowattHours, surface_area::SquareMetres};

quantity!(KilowattHoursPerSquareMetre, via: f64, suffix: "kWh/m²", precision: 3);

/// One megajoule is 277.778 watt-hours.
const WATT_HOURS_PER_MEGAJOULE: f64 = 277.778;

impl KilowattHoursPerSquareMetre {
    #[must_use]
    pub fn watt_hours(self) -> f64 {
        self.0 * 1000.0
    }
}

/// Energy received by a surface over a day: irradiation times the surface area.
impl Mul<SquareMetres> for KilowattHoursPerSquareMetre {
    type Output = KilowattHours;

    fn mul(self, area: SquareMetres) -> Self::Output {
        KilowattHours(self.0 * area.0)
    }
}

/// Spelling of the radiation unit as printed next to a daily total.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RadiationUnit {
    WattHours,
    KilowattHours,
    Megajoules,
}

impl RadiationUnit {
    /// The capture group only ever matches the three known spellings,
    /// so anything else reads as already canonical.
    #[must_use]
    pub fn from_capture(text: &str) -> Self {
        match text.to_ascii_lowercase().as_str() {
            "wh" => Self::WattHours,
            "mj" => Self::Megajoules,
            _ => Self::KilowattHours,
        }
    }

    /// Converts a value in this unit to canonical kWh/m².
    #[must_use]
    pub fn to_kilowatt_hours(self, value: f64) -> KilowattHoursPerSquareMetre {
        match self {
            Self::KilowattHours => KilowattHoursPerSquareMetre(value),
            Self::WattHours => KilowattHoursPerSquareMetre(value / 1000.0),
            Self::Megajoules => {
                KilowattHoursPerSquareMetre(value * WATT_HOURS_PER_MEGAJOULE / 1000.0)
            }
        }
    }
}
