//! Types and fixed-point helpers shared by the settlement stages.

/// Decimal places used when the caller does not pick any.
pub const DEFAULT_DECIMAL_PLACES: u32 = 2;

/// Largest supported number of decimal places.
pub const MAX_DECIMAL_PLACES: u32 = 8;

/// Units type, representing a non-negative fixed-point amount in minor units.
pub type Units = u64;

/// Controls how decimal amounts are scaled into minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    decimal_places: u32,
}

impl SplitConfig {
    /// Builds a config from a caller-supplied number of decimals.
    ///
    /// The value is truncated toward zero and clamped to
    /// `0..=MAX_DECIMAL_PLACES`; NaN falls back to the default.
    pub fn new(decimals: f64) -> Self {
        if decimals.is_nan() {
            return Self::default();
        }
        let clamped = decimals.trunc().clamp(0.0, MAX_DECIMAL_PLACES as f64);
        SplitConfig {
            decimal_places: clamped as u32,
        }
    }

    /// Gets the number of decimal places.
    pub fn get_decimal_places(&self) -> u32 {
        self.decimal_places
    }

    /// Gets the scale factor, `10^decimal_places`.
    pub fn scale(&self) -> Units {
        10u64.pow(self.decimal_places)
    }

    /// Converts minor units to a major-unit decimal for output.
    pub fn to_major(&self, units: Units) -> f64 {
        units as f64 / self.scale() as f64
    }

    /// Renders minor units as an exact fixed-point string, e.g. `1234` at three places is `1.234`.
    pub fn format_units(&self, units: Units) -> String {
        let places = self.decimal_places as usize;
        if places == 0 {
            return units.to_string();
        }
        let scale = self.scale();
        format!("{}.{:0places$}", units / scale, units % scale)
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }
}
