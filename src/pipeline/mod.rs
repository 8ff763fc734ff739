//! Batch pipeline: detection feed loading and per-video orchestration

pub mod engine;
pub mod feed;

pub use engine::{ExposureEngine, SponsorScore, VideoReport};
pub use feed::DetectionFeed;
