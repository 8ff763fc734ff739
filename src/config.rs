//! Central configuration for the exposure analytics pipeline
//!
//! Loaded once at process start; every component receives its parameters from
//! here rather than reading the environment itself. Independent instances with
//! different configurations can therefore run side by side.

use std::env;

/// Tolerance for the pricing weight-sum invariant
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
    WeightSum(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
            ConfigError::WeightSum(sum) => write!(
                f,
                "Pricing weights must sum to 1.0, currently sum to {:.4}",
                sum
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Pricing weights and normalization caps
#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub weight_duration: f64,
    pub weight_coverage: f64,
    pub weight_confidence: f64,
    pub weight_frequency: f64,
    pub base_value_usd: f64,
    pub max_duration_sec: f64,
    pub max_coverage_pct: f64,
    pub max_frequency: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            weight_duration: 0.40,
            weight_coverage: 0.30,
            weight_confidence: 0.15,
            weight_frequency: 0.15,
            base_value_usd: 5000.0,
            max_duration_sec: 300.0,
            max_coverage_pct: 10.0,
            max_frequency: 600.0,
        }
    }
}

impl PricingConfig {
    pub fn weight_sum(&self) -> f64 {
        self.weight_duration + self.weight_coverage + self.weight_confidence + self.weight_frequency
    }

    /// Validate the weight-sum invariant and the normalization caps.
    ///
    /// Non-negative weights summing to 1.0 plus positive caps guarantee that
    /// every raw score stays in [0, 1].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in [
            ("WEIGHT_DURATION", self.weight_duration),
            ("WEIGHT_COVERAGE", self.weight_coverage),
            ("WEIGHT_CONFIDENCE", self.weight_confidence),
            ("WEIGHT_FREQUENCY", self.weight_frequency),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }

        let sum = self.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum(sum));
        }

        for (name, cap) in [
            ("MAX_DURATION_SEC", self.max_duration_sec),
            ("MAX_COVERAGE_PCT", self.max_coverage_pct),
            ("MAX_FREQUENCY", self.max_frequency),
        ] {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be positive, got {}",
                    name, cap
                )));
            }
        }

        if !self.base_value_usd.is_finite() || self.base_value_usd < 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "BASE_VALUE_USD must be non-negative, got {}",
                self.base_value_usd
            )));
        }

        Ok(())
    }
}

/// Currency conversion parameters
#[derive(Debug, Clone)]
pub struct CurrencyConfig {
    pub static_npr_rate: f64,
    /// When set, the live-rate provider is queried once per run
    pub api_key: Option<String>,
    pub fetch_timeout_secs: u64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            static_npr_rate: 135.0,
            api_key: None,
            fetch_timeout_secs: 10,
        }
    }
}

/// Top-level configuration for the analytics pipeline
///
/// Detection thresholds are consumed by the upstream detector, not by this
/// core; they live here so the whole configuration surface loads in one place.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub confidence_threshold: f64,
    pub iou_threshold: f64,
    pub gap_tolerance_sec: f64,
    pub min_segment_duration_sec: f64,
    pub pricing: PricingConfig,
    pub currency: CurrencyConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            gap_tolerance_sec: 1.0,
            min_segment_duration_sec: 0.5,
            pricing: PricingConfig::default(),
            currency: CurrencyConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Load `.env` (if present) and then the environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables
    ///
    /// Environment variables (all optional, defaults in parentheses):
    /// - `CONFIDENCE_THRESHOLD` (0.25), `IOU_THRESHOLD` (0.45)
    /// - `GAP_TOLERANCE_SEC` (1.0), `MIN_SEGMENT_DURATION_SEC` (0.5)
    /// - `WEIGHT_DURATION` (0.40), `WEIGHT_COVERAGE` (0.30),
    ///   `WEIGHT_CONFIDENCE` (0.15), `WEIGHT_FREQUENCY` (0.15)
    /// - `BASE_VALUE_USD` (5000), `MAX_DURATION_SEC` (300),
    ///   `MAX_COVERAGE_PCT` (10.0), `MAX_FREQUENCY` (600)
    /// - `STATIC_NPR_RATE` (135.0), `EXCHANGE_RATE_API_KEY` (unset),
    ///   `RATE_FETCH_TIMEOUT_SECS` (10)
    ///
    /// Fails fast when the pricing weights do not sum to 1.0, before any
    /// scoring call is possible.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            confidence_threshold: env_f64("CONFIDENCE_THRESHOLD", defaults.confidence_threshold),
            iou_threshold: env_f64("IOU_THRESHOLD", defaults.iou_threshold),
            gap_tolerance_sec: env_f64("GAP_TOLERANCE_SEC", defaults.gap_tolerance_sec),
            min_segment_duration_sec: env_f64(
                "MIN_SEGMENT_DURATION_SEC",
                defaults.min_segment_duration_sec,
            ),
            pricing: PricingConfig {
                weight_duration: env_f64("WEIGHT_DURATION", defaults.pricing.weight_duration),
                weight_coverage: env_f64("WEIGHT_COVERAGE", defaults.pricing.weight_coverage),
                weight_confidence: env_f64("WEIGHT_CONFIDENCE", defaults.pricing.weight_confidence),
                weight_frequency: env_f64("WEIGHT_FREQUENCY", defaults.pricing.weight_frequency),
                base_value_usd: env_f64("BASE_VALUE_USD", defaults.pricing.base_value_usd),
                max_duration_sec: env_f64("MAX_DURATION_SEC", defaults.pricing.max_duration_sec),
                max_coverage_pct: env_f64("MAX_COVERAGE_PCT", defaults.pricing.max_coverage_pct),
                max_frequency: env_f64("MAX_FREQUENCY", defaults.pricing.max_frequency),
            },
            currency: CurrencyConfig {
                static_npr_rate: env_f64("STATIC_NPR_RATE", defaults.currency.static_npr_rate),
                api_key: env::var("EXCHANGE_RATE_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                fetch_timeout_secs: env::var("RATE_FETCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.currency.fetch_timeout_secs),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Single fail-fast validation pass over the whole configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, threshold) in [
            ("CONFIDENCE_THRESHOLD", self.confidence_threshold),
            ("IOU_THRESHOLD", self.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be within [0, 1], got {}",
                    name, threshold
                )));
            }
        }

        for (name, value) in [
            ("GAP_TOLERANCE_SEC", self.gap_tolerance_sec),
            ("MIN_SEGMENT_DURATION_SEC", self.min_segment_duration_sec),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        self.pricing.validate()?;

        if !self.currency.static_npr_rate.is_finite() || self.currency.static_npr_rate <= 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "STATIC_NPR_RATE must be positive, got {}",
                self.currency.static_npr_rate
            )));
        }

        Ok(())
    }
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
