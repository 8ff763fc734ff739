//! Detection records produced by the upstream logo detector

use serde::{Deserialize, Serialize};
use std::error::Error;

/// Bounding box in fractional frame coordinates (0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Fraction of the frame covered by this box, bounded to [0, 1]
    pub fn area_fraction(&self) -> f64 {
        (self.width * self.height).clamp(0.0, 1.0)
    }
}

/// One frame-level observation of a sponsor logo
///
/// Immutable once received; the pipeline never mutates detections, only
/// groups and filters them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub timestamp_sec: f64,
    pub sponsor_id: String,
    pub bbox: BoundingBox,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    ConfidenceOutOfRange(f64),
    NegativeTimestamp(f64),
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::ConfidenceOutOfRange(c) => {
                write!(f, "confidence {} outside [0, 1]", c)
            }
            InputError::NegativeTimestamp(t) => write!(f, "negative timestamp {}s", t),
        }
    }
}

impl std::error::Error for InputError {}

impl Detection {
    /// Parse a Detection from a JSONL line
    pub fn from_jsonl(line: &str) -> Result<Self, Box<dyn Error>> {
        let detection: Detection = serde_json::from_str(line)?;
        Ok(detection)
    }

    /// Reject records the detector should never emit (NaN counts as invalid)
    pub fn validate(&self) -> Result<(), InputError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(InputError::ConfidenceOutOfRange(self.confidence));
        }
        if !self.timestamp_sec.is_finite() || self.timestamp_sec < 0.0 {
            return Err(InputError::NegativeTimestamp(self.timestamp_sec));
        }
        Ok(())
    }
}

/// Drop invalid detections, returning the survivors and the skip count.
///
/// A bad record never aborts the batch; it is logged and counted so the
/// report can surface how much input was discarded.
pub fn sanitize_detections(detections: Vec<Detection>) -> (Vec<Detection>, usize) {
    let total = detections.len();

    let valid: Vec<Detection> = detections
        .into_iter()
        .filter(|det| match det.validate() {
            Ok(()) => true,
            Err(e) => {
                log::warn!(
                    "Skipping invalid detection for sponsor {}: {}",
                    det.sponsor_id,
                    e
                );
                false
            }
        })
        .collect();

    let skipped = total - valid.len();
    (valid, skipped)
}
