use std::ops::Mul;

quantity!(Kilowatts, via: f64, suffix: "kW", precision: 3);

impl Mul<f64> for Kilowatts {
    type Output = Self;

    fn mul(self, factor: f64) -> Self::Output {
        Self(self.0 * factor)
    }
}
