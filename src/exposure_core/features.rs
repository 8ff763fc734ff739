//! Feature aggregation over a sponsor's retained exposure segments

use super::segmenter::ExposureSegment;
use serde::Serialize;

/// Fixed feature vector, one per sponsor per video
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SponsorFeatures {
    pub total_duration_sec: f64,
    /// Frame coverage as a percentage, clamped to [0, 100]
    pub coverage_pct: f64,
    pub mean_confidence: f64,
    /// Number of retained segments (distinct appearances)
    pub frequency_count: usize,
}

impl SponsorFeatures {
    /// All-zero vector for sponsors with no retained segments
    pub fn zero() -> Self {
        Self {
            total_duration_sec: 0.0,
            coverage_pct: 0.0,
            mean_confidence: 0.0,
            frequency_count: 0,
        }
    }
}

/// How per-detection frame coverage folds into one percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageAggregation {
    /// Unweighted mean across every retained detection (default)
    MeanDetection,
    /// Per-segment mean, weighted by segment duration
    DurationWeighted,
    /// Largest single-detection coverage observed
    Peak,
}

/// Reduces retained segments into a `SponsorFeatures` vector
pub struct FeatureAggregator {
    coverage: CoverageAggregation,
}

impl FeatureAggregator {
    pub fn new(coverage: CoverageAggregation) -> Self {
        Self { coverage }
    }

    pub fn with_defaults() -> Self {
        Self::new(CoverageAggregation::MeanDetection)
    }

    /// Aggregate a sponsor's retained segments.
    ///
    /// An empty detection set yields the all-zero vector rather than dividing
    /// by zero; zero-segment sponsors still flow through the rest of the
    /// pipeline.
    pub fn aggregate(&self, segments: &[ExposureSegment]) -> SponsorFeatures {
        let detection_count: usize = segments.iter().map(|s| s.detections.len()).sum();
        if detection_count == 0 {
            return SponsorFeatures::zero();
        }

        let total_duration_sec: f64 = segments.iter().map(|s| s.duration_sec()).sum();

        let confidence_sum: f64 = segments
            .iter()
            .flat_map(|s| &s.detections)
            .map(|d| d.confidence)
            .sum();
        let mean_confidence = confidence_sum / detection_count as f64;

        let coverage_fraction = match self.coverage {
            CoverageAggregation::MeanDetection => {
                mean_area_fraction(segments, detection_count)
            }
            CoverageAggregation::DurationWeighted => {
                if total_duration_sec > 0.0 {
                    segments
                        .iter()
                        .map(|s| segment_mean_area(s) * s.duration_sec())
                        .sum::<f64>()
                        / total_duration_sec
                } else {
                    // All retained segments are zero-length (min duration 0)
                    mean_area_fraction(segments, detection_count)
                }
            }
            CoverageAggregation::Peak => segments
                .iter()
                .flat_map(|s| &s.detections)
                .map(|d| d.bbox.area_fraction())
                .fold(0.0, f64::max),
        };

        SponsorFeatures {
            total_duration_sec,
            coverage_pct: (coverage_fraction * 100.0).clamp(0.0, 100.0),
            mean_confidence,
            frequency_count: segments.len(),
        }
    }
}

fn mean_area_fraction(segments: &[ExposureSegment], detection_count: usize) -> f64 {
    segments
        .iter()
        .flat_map(|s| &s.detections)
        .map(|d| d.bbox.area_fraction())
        .sum::<f64>()
        / detection_count as f64
}

fn segment_mean_area(segment: &ExposureSegment) -> f64 {
    if segment.detections.is_empty() {
        return 0.0;
    }
    segment
        .detections
        .iter()
        .map(|d| d.bbox.area_fraction())
        .sum::<f64>()
        / segment.detections.len() as f64
}
