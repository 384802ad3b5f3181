use std::collections::VecDeque;
use crate::drivers::ScopeError;
pub const HISTORY_CAPACITY: usize = 1000;
pub const CHANNELS: usize = 2;
/// Scaled copy of the history, ready to hand to a plot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplaySeries {
    pub a0: Vec<f64>,
    pub a1: Vec<f64>,
}
/// Rolling buffer that keeps the most recent calibrated samples per channel.
///
/// Index `i` of channel 0 and channel 1 always belong to the same
/// acquisition event.
pub struct BoundedHistory {
    per_channel: [VecDeque<f64>; CHANNELS],
    capacity: usize,
}
impl Default for BoundedHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}
impl BoundedHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            per_channel: [
                VecDeque::with_capacity(capacity),
                VecDeque::with_capacity(capacity),
            ],
            capacity,
        }
    }
    /// Appends to one channel only, so a caller that uses it directly can
    /// leave the channels at unequal lengths. `append_pair` is the form that
    /// keeps them equal.
    pub fn append(&mut self, channel: usize, value: f64) -> Result<(), ScopeError> {
        let capacity = self.capacity;
        let queue = self
            .per_channel
            .get_mut(channel)
            .ok_or(ScopeError::ChannelOutOfRange {
                index: channel,
                channels: CHANNELS,
            })?;
        if queue.len() == capacity {
            queue.pop_front();
        }
        queue.push_back(value);
        Ok(())
    }
    /// Appends one acquisition event to both channels.
    pub fn append_pair(&mut self, values: [f64; CHANNELS]) -> Result<(), ScopeError> {
        for (channel, value) in values.into_iter().enumerate() {
            self.append(channel, value)?;
        }
        Ok(())
    }
    pub fn clear(&mut self) {
        for queue in &mut self.per_channel {
            queue.clear();
        }
    }
    pub fn len(&self) -> usize {
        self.per_channel[0].len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    #[cfg(test)]
    pub fn latest(&self) -> Option<[f64; CHANNELS]> {
        Some([*self.per_channel[0].back()?, *self.per_channel[1].back()?])
    }
    pub fn snapshot(&self, scale_factor: f64) -> DisplaySeries {
        let scaled =
            |queue: &VecDeque<f64>| -> Vec<f64> { queue.iter().map(|v| v * scale_factor).collect() };
        DisplaySeries {
            a0: scaled(&self.per_channel[0]),
            a1: scaled(&self.per_channel[1]),
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn evicts_oldest_first_past_capacity() {
        let mut history = BoundedHistory::default();
        for i in 0..1500 {
            history.append_pair([i as f64, -(i as f64)]).unwrap();
            assert!(history.len() <= HISTORY_CAPACITY);
        }
        let series = history.snapshot(1.0);
        let expected: Vec<f64> = (500..1500).map(|i| i as f64).collect();
        assert_eq!(series.a0, expected);
        assert_eq!(series.a1.len(), HISTORY_CAPACITY);
        assert_eq!(series.a1[0], -500.0);
        assert_eq!(history.latest(), Some([1499.0, -1499.0]));
    }
    #[test]
    fn per_channel_append_keeps_fifo_order() {
        let mut history = BoundedHistory::with_capacity(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            history.append(0, v).unwrap();
            history.append(1, v * 10.0).unwrap();
        }
        let series = history.snapshot(1.0);
        assert_eq!(series.a0, vec![2.0, 3.0, 4.0]);
        assert_eq!(series.a1, vec![20.0, 30.0, 40.0]);
        assert!(matches!(
            history.append(2, 0.0),
            Err(ScopeError::ChannelOutOfRange { index: 2, .. })
        ));
    }
    #[test]
    fn snapshot_scales_without_touching_storage() {
        let mut history = BoundedHistory::default();
        history.append_pair([0.5, -0.25]).unwrap();
        history.append_pair([1.0, 2.0]).unwrap();
        let doubled = history.snapshot(2.0);
        assert_eq!(doubled.a0, vec![1.0, 2.0]);
        assert_eq!(doubled.a1, vec![-0.5, 4.0]);
        let unscaled = history.snapshot(1.0);
        assert_eq!(unscaled.a0, vec![0.5, 1.0]);
        assert_eq!(unscaled.a1, vec![-0.25, 2.0]);
    }
    #[test]
    fn clear_empties_both_channels() {
        let mut history = BoundedHistory::default();
        history.append_pair([1.0, 1.0]).unwrap();
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.latest(), None);
        assert_eq!(history.snapshot(1.0), DisplaySeries::default());
    }
}
