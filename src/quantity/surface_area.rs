use std::ops::Mul;

quantity!(SquareMetres, via: f64, suffix: "m²", precision: 3);

impl Mul<f64> for SquareMetres {
    type Output = Self;

    fn mul(self, factor: f64) -> Self::Output {
        Self(self.0 * factor)
    }
}
