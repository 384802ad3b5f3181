use std::time::Duration;
use log::{debug, warn};
use crate::drivers::buffer::{BoundedHistory, DisplaySeries};
use crate::drivers::calibration::calibrate_pair;
use crate::drivers::error::ScopeError;
use crate::drivers::frequency::{frequency_hz, FrequencyEstimator};
use crate::drivers::parser::parse_line;
use crate::drivers::settings::{AcquisitionConfig, ConfigUpdate};
use crate::drivers::source::LineSource;
use crate::drivers::viewport::{self, ViewportRange};
/// Produced by every accepted sample.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleUpdate {
    pub latest_a0_voltage: f64,
    pub latest_a1_voltage: f64,
    pub display_series_a0: Vec<f64>,
    pub display_series_a1: Vec<f64>,
    /// Only present while auto-scroll is enabled.
    pub viewport: Option<ViewportRange>,
}
/// Zero-crossing counts for one elapsed epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrequencyUpdate {
    pub a0_count: u32,
    pub a1_count: u32,
}
impl FrequencyUpdate {
    pub fn hz(&self, epoch: Duration) -> (f64, f64) {
        (
            frequency_hz(self.a0_count, epoch),
            frequency_hz(self.a1_count, epoch),
        )
    }
}
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub accepted: u64,
    pub malformed: u64,
    pub transport_errors: u64,
}
/// Turns raw lines from a transport into calibrated, display-ready samples.
pub struct AcquisitionPipeline<S: LineSource> {
    source: S,
    config: AcquisitionConfig,
    history: BoundedHistory,
    estimators: [FrequencyEstimator; 2],
    stats: PipelineStats,
}
impl<S: LineSource> AcquisitionPipeline<S> {
    pub fn new(source: S, config: AcquisitionConfig) -> Result<Self, ScopeError> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            history: BoundedHistory::default(),
            estimators: [FrequencyEstimator::new(), FrequencyEstimator::new()],
            stats: PipelineStats::default(),
        })
    }
    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }
    #[cfg(test)]
    pub fn history(&self) -> &BoundedHistory {
        &self.history
    }
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }
    pub fn sampling_interval(&self) -> Duration {
        self.config.sampling_interval()
    }
    #[cfg(test)]
    pub fn epoch(&self) -> Duration {
        crate::drivers::frequency::EPOCH
    }
    pub fn apply(&mut self, update: ConfigUpdate) -> Result<(), ScopeError> {
        if update == ConfigUpdate::ClearHistory {
            self.history.clear();
            debug!("history cleared");
            return Ok(());
        }
        self.config.apply(update)
    }
    /// One sampling tick. `Ok(None)` when there was nothing to read or the
    /// line was dropped as malformed.
    pub fn sample_tick(&mut self) -> Result<Option<SampleUpdate>, ScopeError> {
        let config = self.config;
        let line = match self.poll_line() {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(None),
            Err(err) => {
                self.stats.transport_errors += 1;
                return Err(err);
            }
        };
        let pair = match parse_line(&line) {
            Ok(pair) => pair,
            Err(err) => {
                self.stats.malformed += 1;
                warn!("{err}");
                return Ok(None);
            }
        };
        let voltages = calibrate_pair(pair, &config.calibration);
        self.history.append_pair(voltages)?;
        for (estimator, value) in self.estimators.iter_mut().zip(voltages) {
            estimator.observe(value);
        }
        self.stats.accepted += 1;
        let DisplaySeries { a0, a1 } = self
            .history
            .snapshot(config.display.display_amplitude_factor);
        let viewport = config
            .display
            .auto_scroll
            .then(|| viewport::compute(self.history.len(), config.display.scroll_speed));
        Ok(Some(SampleUpdate {
            latest_a0_voltage: voltages[0],
            latest_a1_voltage: voltages[1],
            display_series_a0: a0,
            display_series_a1: a1,
            viewport,
        }))
    }
    /// Closes the current epoch on both channels together.
    pub fn epoch_tick(&mut self) -> FrequencyUpdate {
        let [a0, a1] = &mut self.estimators;
        FrequencyUpdate {
            a0_count: a0.end_epoch(),
            a1_count: a1.end_epoch(),
        }
    }
    /// Drops the current epoch's counts and the last-seen samples, so the
    /// next epoch starts fresh after acquisition was paused.
    pub fn reset_epoch(&mut self) {
        for estimator in &mut self.estimators {
            estimator.end_epoch();
        }
    }
    fn poll_line(&mut self) -> Result<Option<String>, ScopeError> {
        if !self.source.has_data()? {
            return Ok(None);
        }
        match self.source.read_line()? {
            Some(line) => Ok(Some(line)),
            None => Err(ScopeError::Transport("stream closed".into())),
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::source::ManualSource;
    fn pipeline(lines: &[&str]) -> AcquisitionPipeline<ManualSource> {
        AcquisitionPipeline::new(
            ManualSource::new(lines.iter().copied()),
            AcquisitionConfig::default(),
        )
        .unwrap()
    }
    #[test]
    fn calibrates_and_appends_in_order() {
        let mut pipeline = pipeline(&["512,512", "700,300"]);
        let first = pipeline.sample_tick().unwrap().unwrap();
        assert_eq!(first.latest_a0_voltage, 0.0);
        assert_eq!(first.latest_a1_voltage, 0.0);
        let second = pipeline.sample_tick().unwrap().unwrap();
        assert!((second.latest_a0_voltage - 0.03671875).abs() < 1e-9);
        assert!((second.latest_a1_voltage + 0.04140625).abs() < 1e-9);
        assert_eq!(second.display_series_a0.len(), 2);
        assert_eq!(second.display_series_a0[0], 0.0);
        assert_eq!(second.display_series_a1[1], second.latest_a1_voltage);
        assert_eq!(second.viewport, None);
        assert_eq!(pipeline.stats().accepted, 2);
    }
    #[test]
    fn full_i32_range_raws_are_extrapolated() {
        let mut pipeline = pipeline(&["-2147483648,512", "2147483647,512"]);
        let low = pipeline.sample_tick().unwrap().unwrap();
        assert!(low.latest_a0_voltage < -400_000.0);
        assert_eq!(low.latest_a1_voltage, 0.0);
        let high = pipeline.sample_tick().unwrap().unwrap();
        assert!(high.latest_a0_voltage > 400_000.0);
        assert_eq!(pipeline.stats().accepted, 2);
    }
    #[test]
    fn empty_transport_is_a_no_op() {
        let mut pipeline = pipeline(&[]);
        assert_eq!(pipeline.sample_tick().unwrap(), None);
        assert!(pipeline.history().is_empty());
    }
    #[test]
    fn malformed_lines_leave_state_untouched() {
        let mut pipeline = pipeline(&["600,400", "100", "100,200,300", "abc,200", "", "400,600"]);
        pipeline.sample_tick().unwrap().unwrap();
        for _ in 0..4 {
            assert_eq!(pipeline.sample_tick().unwrap(), None);
        }
        assert_eq!(pipeline.history().len(), 1);
        assert_eq!(pipeline.stats().malformed, 4);
        // the estimator still pairs 600,400 with 400,600: one crossing each
        pipeline.sample_tick().unwrap().unwrap();
        assert_eq!(
            pipeline.epoch_tick(),
            FrequencyUpdate {
                a0_count: 1,
                a1_count: 1
            }
        );
    }
    #[test]
    fn transport_errors_fail_the_tick_but_not_the_pipeline() {
        let mut source = ManualSource::new(["600,600"]);
        source.push_fault("device unplugged");
        source.push_line("700,700");
        let mut pipeline = AcquisitionPipeline::new(source, AcquisitionConfig::default()).unwrap();
        pipeline.sample_tick().unwrap().unwrap();
        assert!(matches!(
            pipeline.sample_tick(),
            Err(ScopeError::Transport(_))
        ));
        assert_eq!(pipeline.history().len(), 1);
        pipeline.sample_tick().unwrap().unwrap();
        assert_eq!(pipeline.history().len(), 2);
        assert_eq!(pipeline.stats().transport_errors, 1);
    }
    #[test]
    fn end_of_stream_is_reported_as_transport_error() {
        let mut source = ManualSource::default();
        source.close();
        let mut pipeline = AcquisitionPipeline::new(source, AcquisitionConfig::default()).unwrap();
        assert!(matches!(
            pipeline.sample_tick(),
            Err(ScopeError::Transport(_))
        ));
    }
    #[test]
    fn display_settings_shape_the_output() {
        let lines: Vec<String> = (0..300).map(|i| format!("{},{}", 512 + i % 7, 512)).collect();
        let mut pipeline = AcquisitionPipeline::new(
            ManualSource::new(lines),
            AcquisitionConfig::default(),
        )
        .unwrap();
        pipeline.apply(ConfigUpdate::AutoScroll(true)).unwrap();
        pipeline.apply(ConfigUpdate::ScrollSpeed(50)).unwrap();
        pipeline
            .apply(ConfigUpdate::DisplayAmplitudeFactor(2.0))
            .unwrap();
        let mut last = None;
        while let Some(update) = pipeline.sample_tick().unwrap() {
            last = Some(update);
        }
        let last = last.unwrap();
        assert_eq!(last.viewport, Some(ViewportRange { start: 150, end: 300 }));
        let stored = pipeline.history().snapshot(1.0);
        assert_eq!(last.display_series_a0[299], stored.a0[299] * 2.0);
    }
    #[test]
    fn epoch_tick_resets_both_channels() {
        let mut pipeline = pipeline(&["400,600", "600,400", "400,600"]);
        for _ in 0..3 {
            pipeline.sample_tick().unwrap();
        }
        let update = pipeline.epoch_tick();
        assert_eq!(update, FrequencyUpdate { a0_count: 2, a1_count: 2 });
        assert_eq!(update.hz(pipeline.epoch()), (2.0, 2.0));
        assert_eq!(
            pipeline.epoch_tick(),
            FrequencyUpdate { a0_count: 0, a1_count: 0 }
        );
    }
    #[test]
    fn reset_epoch_forgets_previous_samples() {
        let mut pipeline = pipeline(&["400,400", "600,600"]);
        pipeline.sample_tick().unwrap();
        pipeline.reset_epoch();
        pipeline.sample_tick().unwrap();
        assert_eq!(
            pipeline.epoch_tick(),
            FrequencyUpdate { a0_count: 0, a1_count: 0 }
        );
    }
    #[test]
    fn clear_history_and_rejected_config() {
        let mut pipeline = pipeline(&["600,600"]);
        pipeline.sample_tick().unwrap();
        pipeline.apply(ConfigUpdate::ClearHistory).unwrap();
        assert!(pipeline.history().is_empty());
        assert!(pipeline.apply(ConfigUpdate::TimeScale(0.0)).is_err());
        assert_eq!(pipeline.config().calibration.time_scale, 1.0);
        assert!(AcquisitionPipeline::new(ManualSource::default(), {
            let mut bad = AcquisitionConfig::default();
            bad.calibration.input_scale = 0;
            bad
        })
        .is_err());
    }
}
