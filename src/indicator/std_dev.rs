/// Rolling sample standard deviation (n - 1 denominator) over a fixed window.
///
/// Mean and squared deviations are updated in O(1) per push and recomputed from the
/// buffer each time the ring wraps. A window of identical values reads exactly zero.
#[derive(Debug, Clone)]
pub struct RollingStd {
    period: usize,
    buffer: Vec<f64>,
    head: usize,
    count: usize,
    mean: f64,
    m2: f64,
    run: usize,
}

impl RollingStd {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "rolling std period must be > 0");
        Self {
            period,
            buffer: vec![0.0; period],
            head: 0,
            count: 0,
            mean: 0.0,
            m2: 0.0,
            run: 0,
        }
    }

    pub fn push(&mut self, value: f64) -> Option<f64> {
        let prev = (self.count > 0).then(|| self.buffer[(self.head + self.period - 1) % self.period]);
        if self.count < self.period {
            self.count += 1;
            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        } else {
            let old = self.buffer[self.head];
            let old_mean = self.mean;
            self.mean += (value - old) / self.period as f64;
            self.m2 += (value - old) * (value - self.mean + old - old_mean);
        }
        self.buffer[self.head] = value;
        self.run = if prev == Some(value) {
            (self.run + 1).min(self.period)
        } else {
            1
        };
        self.head = (self.head + 1) % self.period;
        if self.head == 0 {
            self.resync();
        }
        self.value()
    }

    fn resync(&mut self) {
        let n = self.period as f64;
        self.mean = self.buffer.iter().sum::<f64>() / n;
        self.m2 = self
            .buffer
            .iter()
            .map(|v| {
                let d = v - self.mean;
                d * d
            })
            .sum();
    }

    /// `None` until the window fills; a single-value window has no sample deviation.
    pub fn value(&self) -> Option<f64> {
        if self.period < 2 || self.count < self.period {
            return None;
        }
        if self.run >= self.period {
            return Some(0.0);
        }
        Some((self.m2.max(0.0) / (self.period - 1) as f64).sqrt())
    }

    pub fn reset(&mut self) {
        self.head = 0;
        self.count = 0;
        self.mean = 0.0;
        self.m2 = 0.0;
        self.run = 0;
    }

    pub fn period(&self) -> usize {
        self.period
    }
}
