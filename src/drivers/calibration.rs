use serde::{Deserialize, Serialize};
use crate::drivers::parser::RawSamplePair;
use crate::drivers::ScopeError;
/// ADC midpoint of the 10-bit range, treated as 0 V.
pub const ZERO_OFFSET: i32 = 512;
/// Volts-per-step numerator/denominator of the front end.
pub const VOLT_RANGE: f64 = 200.0;
pub const ADC_STEPS: f64 = 1024.0;
pub const MAX_INPUT_SCALE: u32 = 100;
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub input_scale: u32,
    pub amplitude_multiplier: f64,
    /// Divides the base sampling interval; larger means faster sampling.
    pub time_scale: f64,
}
impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            input_scale: 1,
            amplitude_multiplier: 1.0,
            time_scale: 1.0,
        }
    }
}
impl CalibrationConfig {
    pub fn validate(&self) -> Result<(), ScopeError> {
        check_input_scale(self.input_scale)?;
        check_positive("amplitude_multiplier", self.amplitude_multiplier)?;
        check_positive("time_scale", self.time_scale)
    }
}
pub(crate) fn check_input_scale(value: u32) -> Result<(), ScopeError> {
    if (1..=MAX_INPUT_SCALE).contains(&value) {
        Ok(())
    } else {
        Err(ScopeError::config(
            "input_scale",
            format!("{value} is outside 1..={MAX_INPUT_SCALE}"),
        ))
    }
}
pub(crate) fn check_positive(field: &'static str, value: f64) -> Result<(), ScopeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ScopeError::config(field, format!("{value} must be a positive number")))
    }
}
/// `((raw - 512) * (200/1024) * (input_scale/1000)) * amplitude_multiplier`
pub fn calibrate(raw: i32, config: &CalibrationConfig) -> f64 {
    // subtract in f64: the parser accepts the full i32 range
    let centered = f64::from(raw) - f64::from(ZERO_OFFSET);
    let input_scale = f64::from(config.input_scale) / 1000.0;
    (centered * (VOLT_RANGE / ADC_STEPS) * input_scale) * config.amplitude_multiplier
}
pub fn calibrate_pair(pair: RawSamplePair, config: &CalibrationConfig) -> [f64; 2] {
    [calibrate(pair.a0_raw, config), calibrate(pair.a1_raw, config)]
}
