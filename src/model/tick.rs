use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One minute bar of raw history as delivered by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume_base: f64,
    pub volume_quote: f64,
}

impl Tick {
    /// Create a flat tick where every price equals `price` (handy for warm-up and tests).
    pub fn from_price(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
            volume_base: 0.0,
            volume_quote: 0.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume_base.is_finite()
            && self.volume_quote.is_finite()
    }
}
