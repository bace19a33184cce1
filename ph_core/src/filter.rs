//! Moving-average smoothing of raw probe voltages.

/// Fixed-capacity ring buffer reporting the mean of the samples written so far.
///
/// Before the buffer fills, the mean covers only the `len()` samples pushed,
/// never the empty slots.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    buf: Vec<f32>,
    cursor: usize,
    filled: usize,
}

impl MovingAverage {
    /// Create an empty filter. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity.max(1)],
            cursor: 0,
            filled: 0,
        }
    }

    /// Overwrite the oldest slot with `sample` and return the current mean.
    pub fn push(&mut self, sample: f32) -> f32 {
        let cap = self.buf.len();
        self.buf[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % cap;
        if self.filled < cap {
            self.filled += 1;
        }
        self.mean()
    }

    /// Mean of the filled slots; 0.0 when nothing has been pushed yet.
    pub fn mean(&self) -> f32 {
        if self.filled == 0 {
            return 0.0;
        }
        // Slots [0, filled) are exactly the written ones until the first wrap,
        // and the whole buffer afterwards.
        let sum: f32 = self.buf[..self.filled].iter().sum();
        sum / self.filled as f32
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.buf.len()
    }

    /// Drop all samples.
    pub fn reset(&mut self) {
        self.buf.iter_mut().for_each(|s| *s = 0.0);
        self.cursor = 0;
        self.filled = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_fill_is_not_biased_toward_zero() {
        let mut f = MovingAverage::new(10);
        assert_eq!(f.push(3.0), 3.0);
        assert_eq!(f.push(1.0), 2.0);
        assert_eq!(f.len(), 2);
        assert!(!f.is_full());
    }

    #[test]
    fn oldest_sample_is_evicted() {
        let mut f = MovingAverage::new(3);
        f.push(1.0);
        f.push(2.0);
        f.push(3.0);
        // 1.0 drops out
        let m = f.push(7.0);
        assert!((m - 4.0).abs() < 1e-6);
        assert!(f.is_full());
    }

    #[test]
    fn zero_capacity_behaves_as_passthrough() {
        let mut f = MovingAverage::new(0);
        assert_eq!(f.capacity(), 1);
        assert_eq!(f.push(2.5), 2.5);
        assert_eq!(f.push(1.5), 1.5);
    }

    #[test]
    fn reset_empties_the_window() {
        let mut f = MovingAverage::new(4);
        f.push(9.0);
        f.push(9.0);
        f.reset();
        assert!(f.is_empty());
        assert_eq!(f.mean(), 0.0);
        assert_eq!(f.push(1.0), 1.0);
    }
}
