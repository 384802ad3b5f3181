use serde::Serialize;
pub const BASE_WINDOW: usize = 100;
/// Visible slice `[start, end)` of the history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ViewportRange {
    pub start: usize,
    pub end: usize,
}
/// Auto-scroll window: the last `100 + scroll_speed` samples, clamped at 0.
pub fn compute(len: usize, scroll_speed: u32) -> ViewportRange {
    let width = BASE_WINDOW + scroll_speed as usize;
    ViewportRange {
        start: len.saturating_sub(width),
        end: len,
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn follows_newest_samples() {
        assert_eq!(compute(500, 50), ViewportRange { start: 350, end: 500 });
        assert_eq!(compute(1000, 100), ViewportRange { start: 800, end: 1000 });
    }
    #[test]
    fn clamps_start_to_zero() {
        assert_eq!(compute(80, 10), ViewportRange { start: 0, end: 80 });
        assert_eq!(compute(0, 1), ViewportRange { start: 0, end: 0 });
    }
}
