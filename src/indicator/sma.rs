/// Simple Moving Average over a ring buffer with a running sum for O(1) push.
///
/// The sum is re-added from the buffer each time the ring wraps, and a window of
/// identical values reads back that value exactly (a window of zeros is exactly zero).
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    buffer: Vec<f64>,
    head: usize,
    count: usize,
    sum: f64,
    /// Trailing pushes equal to the newest value, capped at `period`.
    run: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be > 0");
        Self {
            period,
            buffer: vec![0.0; period],
            head: 0,
            count: 0,
            sum: 0.0,
            run: 0,
        }
    }

    /// Push a new value, return the current SMA if enough data.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let prev = self.last();
        if self.count >= self.period {
            self.sum -= self.buffer[self.head];
        }
        self.buffer[self.head] = value;
        self.sum += value;
        self.run = if prev == Some(value) {
            (self.run + 1).min(self.period)
        } else {
            1
        };
        self.head = (self.head + 1) % self.period;
        if self.count < self.period {
            self.count += 1;
        }
        if self.head == 0 {
            self.sum = self.buffer.iter().sum();
        }
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if !self.is_ready() {
            return None;
        }
        if self.run >= self.period {
            return self.last();
        }
        Some(self.sum / self.period as f64)
    }

    /// Most recently pushed value.
    pub fn last(&self) -> Option<f64> {
        (self.count > 0).then(|| self.buffer[(self.head + self.period - 1) % self.period])
    }

    /// Forget all history; the next `period` pushes warm the average up again.
    pub fn reset(&mut self) {
        self.head = 0;
        self.count = 0;
        self.sum = 0.0;
        self.run = 0;
    }

    pub fn is_ready(&self) -> bool {
        self.count >= self.period
    }

    pub fn period(&self) -> usize {
        self.period
    }
}
