quantity!(KilowattHours, suffix: "kWh", precision: 1);

impl KilowattHours {
    /// Convert the portal's raw megawatt-hours.
    pub fn from_megawatt_hours(megawatt_hours: f64) -> Self {
        Self(megawatt_hours * 1000.0)
    }
}
