//! Engine configuration.
//!
//! [`AnalyzerConfig`] is the single source of truth for every recognized
//! option across the pipeline, resolved once at session start. Unknown
//! club names resolve to the iron tables and are recorded as
//! [`ConfigWarning`]s on the config (and on every analysis produced from
//! it), never as errors.

use crate::benchmark::BenchmarkConfig;
use crate::consistency::ConsistencyConfig;
use crate::faults::FaultConfig;
use crate::kinematics::SequenceConfig;
use crate::metrics::MetricsConfig;
use crate::phases::PhaseClassifierConfig;
use crate::power::PowerConfig;
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use swinglab_core::{ClubType, CoreError, CoreResult};

/// A non-fatal configuration problem, recorded instead of raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ConfigWarning {
    /// The requested club name was not recognized; iron thresholds are
    /// in effect
    UnknownClubType {
        /// The unrecognized name as supplied
        requested: String,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownClubType { requested } => {
                write!(f, "unknown club type '{requested}', using iron thresholds")
            }
        }
    }
}

/// Complete configuration for one analysis session.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Club resolved for threshold and benchmark lookups
    pub club: ClubType,
    /// Phase classifier options
    pub classifier: PhaseClassifierConfig,
    /// Metrics calculator options
    pub metrics: MetricsConfig,
    /// Kinematic sequence options
    pub sequence: SequenceConfig,
    /// Power estimator options
    pub power: PowerConfig,
    /// Fault detector options
    pub faults: FaultConfig,
    /// Benchmark scorer options
    pub benchmark: BenchmarkConfig,
    /// Consistency tracker options
    pub consistency: ConsistencyConfig,
    /// Session buffering options
    pub session: SessionConfig,
    /// Warnings recorded while resolving this configuration
    pub warnings: Vec<ConfigWarning>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            club: ClubType::default(),
            classifier: PhaseClassifierConfig::default(),
            metrics: MetricsConfig::default(),
            sequence: SequenceConfig::default(),
            power: PowerConfig::default(),
            faults: FaultConfig::default(),
            benchmark: BenchmarkConfig::default(),
            consistency: ConsistencyConfig::default(),
            session: SessionConfig::default(),
            warnings: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::default()
    }

    /// Validates cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when an option is outside its
    /// documented range.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.metrics.confidence_threshold) {
            return Err(CoreError::configuration(format!(
                "confidence threshold must be in [0, 1], got {}",
                self.metrics.confidence_threshold
            )));
        }
        if self.classifier.persistence == 0 {
            return Err(CoreError::configuration(
                "derivative persistence must be at least 1",
            ));
        }
        if self.session.buffer_capacity == 0 {
            return Err(CoreError::configuration(
                "session buffer capacity must be at least 1",
            ));
        }
        let weights = self.benchmark.x_factor_weight
            + self.benchmark.sequence_weight
            + self.benchmark.power_weight
            + self.benchmark.consistency_weight;
        if weights <= 0.0 {
            return Err(CoreError::configuration(
                "benchmark dimension weights must sum to a positive value",
            ));
        }
        Ok(())
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug, Default)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    /// Sets the club type directly.
    #[must_use]
    pub fn club(mut self, club: ClubType) -> Self {
        self.config.club = club;
        self
    }

    /// Resolves a club by name, falling back to iron with a recorded
    /// warning for unrecognized names.
    #[must_use]
    pub fn club_name(mut self, name: &str) -> Self {
        match ClubType::parse(name) {
            Some(club) => self.config.club = club,
            None => {
                tracing::warn!(requested = name, "unknown club type, using iron thresholds");
                self.config.club = ClubType::Iron;
                self.config.warnings.push(ConfigWarning::UnknownClubType {
                    requested: name.to_string(),
                });
            }
        }
        self
    }

    /// Sets the keypoint confidence threshold.
    #[must_use]
    pub fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.config.metrics.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Sets the minimum phase length in frames.
    #[must_use]
    pub fn min_phase_frames(mut self, frames: usize) -> Self {
        self.config.classifier.min_phase_frames = frames.max(1);
        self
    }

    /// Sets the derivative persistence gate in frames.
    #[must_use]
    pub fn persistence(mut self, frames: usize) -> Self {
        self.config.classifier.persistence = frames.max(1);
        self
    }

    /// Sets the session frame-buffer capacity.
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.session.buffer_capacity = capacity.max(1);
        self
    }

    /// Sets the streaming queue capacity.
    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.session.queue_capacity = capacity.max(1);
        self
    }

    /// Replaces the classifier configuration wholesale.
    #[must_use]
    pub fn classifier(mut self, classifier: PhaseClassifierConfig) -> Self {
        self.config.classifier = classifier;
        self
    }

    /// Replaces the fault configuration wholesale.
    #[must_use]
    pub fn faults(mut self, faults: FaultConfig) -> Self {
        self.config.faults = faults;
        self
    }

    /// Replaces the power configuration wholesale.
    #[must_use]
    pub fn power(mut self, power: PowerConfig) -> Self {
        self.config.power = power;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> AnalyzerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.club, ClubType::Iron);
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn builder_sets_options() {
        let config = AnalyzerConfig::builder()
            .club(ClubType::Driver)
            .confidence_threshold(0.6)
            .min_phase_frames(4)
            .persistence(2)
            .buffer_capacity(500)
            .queue_capacity(128)
            .build();

        assert_eq!(config.club, ClubType::Driver);
        assert!((config.metrics.confidence_threshold - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.classifier.min_phase_frames, 4);
        assert_eq!(config.classifier.persistence, 2);
        assert_eq!(config.session.buffer_capacity, 500);
        assert_eq!(config.session.queue_capacity, 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_club_name_warns_once() {
        let config = AnalyzerConfig::builder().club_name("shovel").build();
        assert_eq!(config.club, ClubType::Iron);
        assert_eq!(config.warnings.len(), 1);
        let text = config.warnings[0].to_string();
        assert!(text.contains("shovel"));
        assert!(text.contains("iron"));
    }

    #[test]
    fn known_club_name_does_not_warn() {
        let config = AnalyzerConfig::builder().club_name("Wedge").build();
        assert_eq!(config.club, ClubType::Wedge);
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn zero_persistence_rejected_by_validate() {
        let mut config = AnalyzerConfig::default();
        config.classifier.persistence = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn threshold_clamped_by_builder() {
        let config = AnalyzerConfig::builder().confidence_threshold(7.0).build();
        assert!((config.metrics.confidence_threshold - 1.0).abs() < f64::EPSILON);
    }
}
