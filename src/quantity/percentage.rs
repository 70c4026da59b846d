use std::ops::Mul;

quantity!(Percentage, suffix: "%", precision: 1);

impl Percentage {
    pub fn to_proportion(self) -> f64 {
        self.0 / 100.0
    }

    /// Add the percentage on top of the value, for example, VAT on top of a price.
    pub fn add_to<T: Mul<f64, Output = T>>(self, value: T) -> T {
        value * (1.0 + self.to_proportion())
    }
}
