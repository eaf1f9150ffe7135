#[macro_use]
pub mod macros;

pub mod energy;
pub mod irradiation;
pub mod power;
pub mod power_density;
pub mod surface_area;
