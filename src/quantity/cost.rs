quantity!(
    /// Money in euros.
    Euros, suffix: "€", precision: 2
);
