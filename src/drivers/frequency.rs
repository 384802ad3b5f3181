use std::time::Duration;
/// Length of one counting epoch.
pub const EPOCH: Duration = Duration::from_secs(1);
/// Zero-crossing counter for one channel.
///
/// A crossing is counted when `prev <= 0 && cur > 0` or `prev >= 0 && cur < 0`.
/// Both comparisons include zero, so a signal that touches exactly 0 V and
/// returns to the side it came from (`1, 0, 1`) still registers a crossing.
#[derive(Clone, Debug, Default)]
pub struct FrequencyEstimator {
    crossing_count: u32,
    previous_sample: Option<f64>,
}
impl FrequencyEstimator {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn observe(&mut self, current: f64) {
        if let Some(previous) = self.previous_sample {
            if (previous <= 0.0 && current > 0.0) || (previous >= 0.0 && current < 0.0) {
                self.crossing_count += 1;
            }
        }
        self.previous_sample = Some(current);
    }
    #[cfg(test)]
    pub fn crossings(&self) -> u32 {
        self.crossing_count
    }
    /// Returns the count for the elapsed epoch and starts a new one.
    pub fn end_epoch(&mut self) -> u32 {
        let count = self.crossing_count;
        self.crossing_count = 0;
        self.previous_sample = None;
        count
    }
}
/// Converts a crossing count over `epoch` into Hz.
pub fn frequency_hz(count: u32, epoch: Duration) -> f64 {
    let secs = epoch.as_secs_f64();
    if secs > 0.0 {
        f64::from(count) / secs
    } else {
        0.0
    }
}
