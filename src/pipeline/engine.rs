//! Per-video orchestration of the exposure scoring pipeline

use crate::config::{AnalyticsConfig, ConfigError};
use crate::exposure_core::{
    sanitize_detections, CoverageAggregation, CurrencyConverter, Detection, ExposurePricer,
    FeatureAggregator, SegmentBuilder, SponsorFeatures,
};
use serde::Serialize;
use std::collections::HashMap;

/// Priced exposure for one sponsor in one video
#[derive(Debug, Clone, Serialize)]
pub struct SponsorScore {
    pub sponsor_id: String,
    pub features: SponsorFeatures,
    pub raw_score: f64,
    pub usd_value: f64,
    pub npr_value: f64,
    /// True when the static fallback rate was used after a provider failure
    pub stale_rate: bool,
}

/// One scoring run over a video's detections
///
/// Serialization of the report is left to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct VideoReport {
    pub video_id: String,
    /// Sorted by sponsor_id for deterministic output
    pub scores: Vec<SponsorScore>,
    /// Invalid detections rejected during sanitization
    pub skipped_detections: usize,
    pub generated_at: i64,
}

/// Batch engine running the four core stages per (video, sponsor) pair
///
/// Holds no cross-call state; the same engine can score any number of videos,
/// and sponsors within a video are independent.
pub struct ExposureEngine {
    segmenter: SegmentBuilder,
    aggregator: FeatureAggregator,
    pricer: ExposurePricer,
}

impl ExposureEngine {
    /// Construction fails fast on an invalid pricing configuration, before
    /// any scoring call is possible.
    pub fn new(config: &AnalyticsConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            segmenter: SegmentBuilder::new(config.gap_tolerance_sec, config.min_segment_duration_sec),
            aggregator: FeatureAggregator::with_defaults(),
            pricer: ExposurePricer::new(config.pricing.clone())?,
        })
    }

    /// Swap the coverage aggregation strategy (default: unweighted mean)
    pub fn with_coverage(mut self, coverage: CoverageAggregation) -> Self {
        self.aggregator = FeatureAggregator::new(coverage);
        self
    }

    /// Score one sponsor's (already sanitized) detections
    pub fn score_sponsor(
        &self,
        sponsor_id: &str,
        detections: Vec<Detection>,
        converter: &CurrencyConverter,
    ) -> SponsorScore {
        let segments = self.segmenter.build(sponsor_id, detections);
        let features = self.aggregator.aggregate(&segments);
        let raw_score = self.pricer.raw_score(&features);
        let usd_value = self.pricer.usd_value(raw_score);

        SponsorScore {
            sponsor_id: sponsor_id.to_string(),
            features,
            raw_score,
            usd_value,
            npr_value: converter.convert(usd_value),
            stale_rate: converter.is_stale(),
        }
    }

    /// Score every sponsor observed in a video.
    ///
    /// Invalid detections are skipped and counted; a sponsor whose detections
    /// were all rejected (or who never produced a retained segment) still
    /// appears in the report with an all-zero feature vector.
    pub fn score_video(
        &self,
        video_id: &str,
        detections_by_sponsor: HashMap<String, Vec<Detection>>,
        converter: &CurrencyConverter,
    ) -> VideoReport {
        let mut skipped_detections = 0;
        let mut scores = Vec::with_capacity(detections_by_sponsor.len());

        for (sponsor_id, raw) in detections_by_sponsor {
            let (valid, skipped) = sanitize_detections(raw);
            skipped_detections += skipped;

            let score = self.score_sponsor(&sponsor_id, valid, converter);
            log::info!(
                "Scored sponsor {}: segments={} raw={:.3} usd={:.2} npr={:.2}",
                score.sponsor_id,
                score.features.frequency_count,
                score.raw_score,
                score.usd_value,
                score.npr_value
            );
            scores.push(score);
        }

        // HashMap iteration order is arbitrary; reports are sorted
        scores.sort_by(|a, b| a.sponsor_id.cmp(&b.sponsor_id));

        if skipped_detections > 0 {
            log::warn!(
                "Video {}: {} invalid detections skipped",
                video_id,
                skipped_detections
            );
        }

        VideoReport {
            video_id: video_id.to_string(),
            scores,
            skipped_detections,
            generated_at: chrono::Utc::now().timestamp(),
        }
    }
}
