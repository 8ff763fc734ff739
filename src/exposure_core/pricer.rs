//! Weighted pricing of sponsor exposure features

use super::features::SponsorFeatures;
use crate::config::{ConfigError, PricingConfig};

/// Normalizes a feature vector against the configured caps and combines it
/// into a monetary score.
///
/// The weight/cap configuration is validated once at construction and is
/// read-only afterwards, so a pricer can be shared across sponsors and videos
/// without synchronization.
pub struct ExposurePricer {
    config: PricingConfig,
}

impl ExposurePricer {
    /// Construction fails fast when the four weights do not sum to 1.0
    /// (tolerance 1e-6) or a normalization cap is non-positive. Every score
    /// produced by a successfully constructed pricer lies in [0, 1].
    pub fn new(config: PricingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Compute the exposure score (0.0-1.0) from the four normalized factors
    ///
    /// # Factors
    /// - Screen time against the duration cap
    /// - Frame coverage against the coverage cap
    /// - Detector confidence
    /// - Appearance frequency against the frequency cap
    pub fn raw_score(&self, features: &SponsorFeatures) -> f64 {
        // Component 1: screen time
        let duration_norm =
            (features.total_duration_sec / self.config.max_duration_sec).clamp(0.0, 1.0);

        // Component 2: frame coverage
        let coverage_norm = (features.coverage_pct / self.config.max_coverage_pct).clamp(0.0, 1.0);

        // Component 3: detector confidence
        let confidence_norm = features.mean_confidence.clamp(0.0, 1.0);

        // Component 4: appearance frequency
        let frequency_norm =
            (features.frequency_count as f64 / self.config.max_frequency).clamp(0.0, 1.0);

        let score = self.config.weight_duration * duration_norm
            + self.config.weight_coverage * coverage_norm
            + self.config.weight_confidence * confidence_norm
            + self.config.weight_frequency * frequency_norm;

        score.clamp(0.0, 1.0)
    }

    /// Monetary value in USD for an already-computed raw score
    pub fn usd_value(&self, raw_score: f64) -> f64 {
        self.config.base_value_usd * raw_score
    }
}
