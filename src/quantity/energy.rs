use std::ops::Mul;

quantity!(KilowattHours, via: f64, suffix: "kWh", precision: 3);

impl Mul<f64> for KilowattHours {
    type Output = Self;

    fn mul(self, factor: f64) -> Self::Output {
        Self(self.0 * factor)
    }
}
