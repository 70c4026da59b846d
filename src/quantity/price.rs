use std::ops::Mul;

use crate::quantity::{cost::Euros, energy::KilowattHours};

quantity!(
    /// Euro cents per kilowatt-hour.
    KilowattHourPrice, suffix: "c/kWh", precision: 2
);

impl KilowattHourPrice {
    pub const ZERO: Self = Self(0.0);

    /// Convert the portal's raw price, which is ten times the cent price (euros per megawatt-hour).
    pub fn from_raw(raw: f64) -> Self {
        Self(raw / 10.0)
    }
}

impl Mul<KilowattHours> for KilowattHourPrice {
    type Output = Euros;

    fn mul(self, rhs: KilowattHours) -> Self::Output {
        Euros(self.0 * rhs.0 / 100.0)
    }
}
