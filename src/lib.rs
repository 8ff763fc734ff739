//! Sponsorship exposure analytics core
//!
//! Converts per-frame sponsor-logo detections produced by an external visual
//! detector into time-bounded exposure segments, scores each sponsor's media
//! exposure across four weighted factors, and converts the monetary value
//! into the target currency.
//!
//! The pipeline is a pure batch transform executed once per (video, sponsor)
//! pair:
//!
//! ```text
//! DetectionFeed → SegmentBuilder → FeatureAggregator → ExposurePricer → CurrencyConverter
//! ```
//!
//! Configuration is loaded once at process start ([`AnalyticsConfig`]) and
//! passed into each component; no component reads ambient state, so
//! independent instances with different configurations can run concurrently.

pub mod config;
pub mod exposure_core;
pub mod pipeline;

pub use config::{AnalyticsConfig, ConfigError, CurrencyConfig, PricingConfig};
pub use exposure_core::{
    sanitize_detections, BoundingBox, CoverageAggregation, CurrencyConverter, Detection,
    ExchangeRateApiClient, ExposurePricer, ExposureSegment, FeatureAggregator, InputError,
    RateProvider, RateProviderError, SegmentBuilder, SponsorFeatures,
};
pub use pipeline::{DetectionFeed, ExposureEngine, SponsorScore, VideoReport};
