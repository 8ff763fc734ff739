//! Gap-tolerant merging of raw detections into exposure segments

use super::detection::Detection;
use std::cmp::Ordering;

/// A maximal interval of continuous-enough sponsor visibility
///
/// Within one sponsor's segment list, segments are time-ordered and
/// non-overlapping, and every retained segment meets the minimum duration.
#[derive(Debug, Clone)]
pub struct ExposureSegment {
    pub sponsor_id: String,
    pub start_sec: f64,
    pub end_sec: f64,
    pub detections: Vec<Detection>,
}

impl ExposureSegment {
    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }
}

/// Builds a sponsor's ordered segment list from an unordered detection list
pub struct SegmentBuilder {
    gap_tolerance_sec: f64,
    min_segment_duration_sec: f64,
}

impl SegmentBuilder {
    pub fn new(gap_tolerance_sec: f64, min_segment_duration_sec: f64) -> Self {
        Self {
            gap_tolerance_sec,
            min_segment_duration_sec,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(1.0, 0.5)
    }

    /// Merge detections into segments and drop those below the minimum duration.
    ///
    /// Arrival order is not trusted: detections are stably sorted by timestamp
    /// first, so equal timestamps keep their original order and repeated runs
    /// over the same input produce identical output.
    ///
    /// A single-detection segment has zero duration and is dropped unless the
    /// minimum duration is 0. An empty input yields an empty segment list.
    pub fn build(&self, sponsor_id: &str, mut detections: Vec<Detection>) -> Vec<ExposureSegment> {
        if detections.is_empty() {
            return Vec::new();
        }

        detections.sort_by(|a, b| {
            a.timestamp_sec
                .partial_cmp(&b.timestamp_sec)
                .unwrap_or(Ordering::Equal)
        });

        let mut segments: Vec<ExposureSegment> = Vec::new();
        let mut current: Option<ExposureSegment> = None;

        for det in detections {
            match current.as_mut() {
                // end_sec always tracks the previous detection's timestamp
                Some(segment) if det.timestamp_sec - segment.end_sec <= self.gap_tolerance_sec => {
                    segment.end_sec = det.timestamp_sec;
                    segment.detections.push(det);
                }
                _ => {
                    if let Some(segment) = current.take() {
                        segments.push(segment);
                    }
                    current = Some(ExposureSegment {
                        sponsor_id: sponsor_id.to_string(),
                        start_sec: det.timestamp_sec,
                        end_sec: det.timestamp_sec,
                        detections: vec![det],
                    });
                }
            }
        }

        if let Some(segment) = current {
            segments.push(segment);
        }

        segments.retain(|s| s.duration_sec() >= self.min_segment_duration_sec);
        segments
    }
}
