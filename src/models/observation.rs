use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A single polled price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Observation {
    /// Time the price was sampled (UTC, RFC 3339)
    #[schema(value_type = String)]
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// OHLC aggregate of observations inside one clock-aligned bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Bar {
    /// Start of the bucket (UTC, RFC 3339)
    #[schema(value_type = String)]
    pub bucket_start: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    /// Open a bar whose four prices are all `price`
    pub fn opened_at(bucket_start: DateTime<Utc>, price: f64) -> Self {
        Self {
            bucket_start,
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }

    /// Fold a later price from the same bucket into the bar
    pub fn absorb(&mut self, price: f64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
    }

    /// Absolute distance between open and close
    pub fn body_len(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// High minus low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}
