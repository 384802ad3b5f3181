use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::drivers::calibration::{check_input_scale, check_positive, CalibrationConfig};
use crate::drivers::ScopeError;
/// Sampling interval at `time_scale == 1.0`.
pub const BASE_SAMPLING_INTERVAL: Duration = Duration::from_millis(50);
pub const MIN_SAMPLING_INTERVAL: Duration = Duration::from_millis(1);
pub const MAX_SCROLL_SPEED: u32 = 100;
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub auto_scroll: bool,
    pub scroll_speed: u32,
    pub display_amplitude_factor: f64,
}
impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            auto_scroll: false,
            scroll_speed: 50,
            display_amplitude_factor: 1.0,
        }
    }
}
/// Everything a tick reads. The pipeline copies it once per tick, so a tick
/// never sees a half-applied change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub calibration: CalibrationConfig,
    pub display: DisplaySettings,
}
/// The only way configuration changes reach a running pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigUpdate {
    InputScale(u32),
    AmplitudeMultiplier(f64),
    TimeScale(f64),
    AutoScroll(bool),
    ScrollSpeed(u32),
    DisplayAmplitudeFactor(f64),
    ClearHistory,
}
impl AcquisitionConfig {
    pub fn validate(&self) -> Result<(), ScopeError> {
        self.calibration.validate()?;
        check_scroll_speed(self.display.scroll_speed)?;
        check_positive(
            "display_amplitude_factor",
            self.display.display_amplitude_factor,
        )
    }
    /// Applies one update. On error `self` is left untouched.
    /// `ClearHistory` carries no configuration and is a no-op here.
    pub fn apply(&mut self, update: ConfigUpdate) -> Result<(), ScopeError> {
        match update {
            ConfigUpdate::InputScale(v) => {
                check_input_scale(v)?;
                self.calibration.input_scale = v;
            }
            ConfigUpdate::AmplitudeMultiplier(v) => {
                check_positive("amplitude_multiplier", v)?;
                self.calibration.amplitude_multiplier = v;
            }
            ConfigUpdate::TimeScale(v) => {
                check_positive("time_scale", v)?;
                self.calibration.time_scale = v;
            }
            ConfigUpdate::AutoScroll(enabled) => self.display.auto_scroll = enabled,
            ConfigUpdate::ScrollSpeed(v) => {
                check_scroll_speed(v)?;
                self.display.scroll_speed = v;
            }
            ConfigUpdate::DisplayAmplitudeFactor(v) => {
                check_positive("display_amplitude_factor", v)?;
                self.display.display_amplitude_factor = v;
            }
            ConfigUpdate::ClearHistory => {}
        }
        Ok(())
    }
    pub fn sampling_interval(&self) -> Duration {
        let micros =
            (BASE_SAMPLING_INTERVAL.as_micros() as f64 / self.calibration.time_scale).round();
        if !micros.is_finite() {
            return MIN_SAMPLING_INTERVAL;
        }
        Duration::from_micros(micros as u64).max(MIN_SAMPLING_INTERVAL)
    }
}
fn check_scroll_speed(value: u32) -> Result<(), ScopeError> {
    if (1..=MAX_SCROLL_SPEED).contains(&value) {
        Ok(())
    } else {
        Err(ScopeError::config(
            "scroll_speed",
            format!("{value} is outside 1..={MAX_SCROLL_SPEED}"),
        ))
    }
}
