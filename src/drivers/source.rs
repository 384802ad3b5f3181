use std::collections::VecDeque;
use std::f64::consts::TAU;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::drivers::ScopeError;
/// Poll-based line transport. Implementations must never block in
/// `has_data`; `read_line` is only called after `has_data` returned `true`.
pub trait LineSource {
    fn has_data(&mut self) -> Result<bool, ScopeError>;
    /// `Ok(None)` means the stream has ended.
    fn read_line(&mut self) -> Result<Option<String>, ScopeError>;
}
impl<T: LineSource + ?Sized> LineSource for Box<T> {
    fn has_data(&mut self) -> Result<bool, ScopeError> {
        (**self).has_data()
    }
    fn read_line(&mut self) -> Result<Option<String>, ScopeError> {
        (**self).read_line()
    }
}
/// In-memory source useful for tests and deterministic playback.
#[derive(Default)]
pub struct ManualSource {
    queue: VecDeque<Result<String, ScopeError>>,
    closed: bool,
}
impl ManualSource {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            queue: lines.into_iter().map(|l| Ok(l.into())).collect(),
            closed: false,
        }
    }
    #[cfg(test)]
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.queue.push_back(Ok(line.into()));
    }
    /// Queues a read failure, delivered in order with the lines.
    #[cfg(test)]
    pub fn push_fault(&mut self, message: impl Into<String>) {
        self.queue.push_back(Err(ScopeError::Transport(message.into())));
    }
    /// Once drained, the source reports end-of-stream instead of "no data".
    pub fn close(&mut self) {
        self.closed = true;
    }
}
impl LineSource for ManualSource {
    fn has_data(&mut self) -> Result<bool, ScopeError> {
        Ok(!self.queue.is_empty() || self.closed)
    }
    fn read_line(&mut self) -> Result<Option<String>, ScopeError> {
        match self.queue.pop_front() {
            Some(item) => item.map(Some),
            None => Ok(None),
        }
    }
}
/// Two sine waves around the ADC midpoint with a little noise on top, so the
/// host can run without a board attached.
pub struct SimulatedSource {
    rng: StdRng,
    phase: u64,
    /// Cycles per sample for A0 and A1.
    cycles_per_sample: [f64; 2],
    amplitude: f64,
}
impl SimulatedSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            phase: 0,
            cycles_per_sample: [0.02, 0.05],
            amplitude: 300.0,
        }
    }
    fn channel_value(&mut self, channel: usize) -> i32 {
        let angle = TAU * self.cycles_per_sample[channel] * self.phase as f64;
        let noise: f64 = self.rng.gen_range(-4.0..=4.0);
        let value = 512.0 + self.amplitude * angle.sin() + noise;
        value.round().clamp(0.0, 1023.0) as i32
    }
}
impl LineSource for SimulatedSource {
    fn has_data(&mut self) -> Result<bool, ScopeError> {
        Ok(true)
    }
    fn read_line(&mut self) -> Result<Option<String>, ScopeError> {
        let a0 = self.channel_value(0);
        let a1 = self.channel_value(1);
        self.phase = self.phase.wrapping_add(1);
        Ok(Some(format!("{a0},{a1}\n")))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::parser::parse_line;
    #[test]
    fn manual_source_replays_in_order_then_ends() {
        let mut source = ManualSource::new(["1,2", "3,4"]);
        source.push_fault("unplugged");
        assert!(source.has_data().unwrap());
        assert_eq!(source.read_line().unwrap().as_deref(), Some("1,2"));
        assert_eq!(source.read_line().unwrap().as_deref(), Some("3,4"));
        assert!(matches!(source.read_line(), Err(ScopeError::Transport(_))));
        assert!(!source.has_data().unwrap());
        source.close();
        assert!(source.has_data().unwrap());
        assert_eq!(source.read_line().unwrap(), None);
    }
    #[test]
    fn simulated_source_emits_parseable_lines_in_adc_range() {
        let mut source = SimulatedSource::new(7);
        for _ in 0..200 {
            assert!(source.has_data().unwrap());
            let line = source.read_line().unwrap().unwrap();
            let pair = parse_line(&line).unwrap();
            assert!((0..=1023).contains(&pair.a0_raw));
            assert!((0..=1023).contains(&pair.a1_raw));
        }
    }
}
