//! Exposure Core - Sponsor Exposure Scoring Engine
//!
//! This module turns per-frame sponsor-logo detections into priced exposure
//! records. Sponsors are independent; each stage owns its output and hands an
//! immutable value to the next.
//!
//! # Architecture
//!
//! ```text
//! Detection feed (JSONL) → sanitize_detections → SegmentBuilder
//!     ↓
//! FeatureAggregator (duration, coverage, confidence, frequency)
//!     ↓
//! ExposurePricer (weighted normalization → raw_score, usd_value)
//!     ↓
//! CurrencyConverter (USD → NPR, static fallback on provider failure)
//! ```

pub mod currency;
pub mod detection;
pub mod features;
pub mod pricer;
pub mod segmenter;

pub use currency::{CurrencyConverter, ExchangeRateApiClient, RateProvider, RateProviderError};
pub use detection::{sanitize_detections, BoundingBox, Detection, InputError};
pub use features::{CoverageAggregation, FeatureAggregator, SponsorFeatures};
pub use pricer::ExposurePricer;
pub use segmenter::{ExposureSegment, SegmentBuilder};
