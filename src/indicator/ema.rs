/// Exponential Moving Average seeded with the first observation.
#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    multiplier: f64,
    ema: Option<f64>,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span > 0, "EMA span must be > 0");
        Self {
            span,
            multiplier: 2.0 / (span as f64 + 1.0),
            ema: None,
        }
    }

    /// Push a new value and return the smoothed value, defined from the first push.
    pub fn push(&mut self, value: f64) -> f64 {
        let next = match self.ema {
            Some(prev) => self.multiplier * value + (1.0 - self.multiplier) * prev,
            None => value,
        };
        self.ema = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.ema
    }

    pub fn is_ready(&self) -> bool {
        self.ema.is_some()
    }

    pub fn span(&self) -> usize {
        self.span
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }
}
