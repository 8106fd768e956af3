//! Professional benchmark scoring.
//!
//! Each metric is compared to a per-club reference distribution for
//! professional players. A dimension scores 1.0 at the professional mean
//! and decays linearly with deviation, reaching 0.0 at the configured
//! spread multiple. The overall score is a weighted average over the
//! power-related dimensions; a dimension with no measurable input gives
//! its weight to the others rather than dragging the score to zero.

use crate::analysis::EnhancedSwingMetrics;
use crate::consistency::ConsistencyResult;
use crate::faults::MetricKind;
use serde::{Deserialize, Serialize};
use swinglab_core::ClubType;

/// Skill category derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    /// Overall score below 0.40
    Beginner,
    /// Overall score in [0.40, 0.65)
    Intermediate,
    /// Overall score in [0.65, 0.85)
    Advanced,
    /// Overall score at or above 0.85
    Professional,
}

impl SkillLevel {
    /// Classifies an overall score.
    #[must_use]
    pub fn from_score(score: f64, config: &BenchmarkConfig) -> Self {
        if score >= config.professional_threshold {
            Self::Professional
        } else if score >= config.advanced_threshold {
            Self::Advanced
        } else if score >= config.intermediate_threshold {
            Self::Intermediate
        } else {
            Self::Beginner
        }
    }

    /// Returns the level name as a string tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Professional => "professional",
        }
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Scored dimensions of the overall comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDimension {
    /// Shoulder-hip separation
    XFactor,
    /// Downswing sequencing
    KinematicSequence,
    /// Power generation
    Power,
    /// Cross-swing repeatability
    Consistency,
}

/// One scored dimension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Dimension scored
    pub dimension: ScoreDimension,
    /// Normalized score [0, 1]
    pub score: f64,
}

/// One scored metric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricScore {
    /// Metric scored
    pub metric: MetricKind,
    /// Normalized score [0, 1]
    pub score: f64,
}

/// Comparison of one swing against professional reference ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionalComparison {
    /// Weighted overall score [0, 1]
    pub overall_score: f64,
    /// Per-dimension scores, in dimension order; absent dimensions were
    /// unmeasurable
    pub dimension_scores: Vec<DimensionScore>,
    /// Per-metric scores for every available metric with a reference
    pub metric_scores: Vec<MetricScore>,
    /// Skill category for the overall score
    pub skill_level: SkillLevel,
    /// Scaled headroom: 1 − overall score
    pub improvement_potential: f64,
}

impl ProfessionalComparison {
    /// A comparison with nothing measurable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            overall_score: 0.0,
            dimension_scores: Vec::new(),
            metric_scores: Vec::new(),
            skill_level: SkillLevel::Beginner,
            improvement_potential: 1.0,
        }
    }
}

/// A professional reference distribution for one quantity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReferenceRange {
    /// Professional mean
    pub mean: f64,
    /// Spread (standard-deviation-like scale)
    pub spread: f64,
}

impl ReferenceRange {
    /// Creates a reference range.
    #[must_use]
    pub fn new(mean: f64, spread: f64) -> Self {
        Self { mean, spread }
    }

    /// Scores a value against this range: 1.0 at the mean, decaying
    /// linearly to 0.0 at `spread_multiplier` spreads away.
    #[must_use]
    pub fn score(&self, value: f64, spread_multiplier: f64) -> f64 {
        let worst = (self.spread * spread_multiplier).max(1e-9);
        (1.0 - (value - self.mean).abs() / worst).clamp(0.0, 1.0)
    }
}

/// Professional reference ranges for one club type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubReference {
    /// Club the references describe
    pub club: ClubType,
    /// Per-metric reference ranges
    pub metrics: Vec<(MetricKind, ReferenceRange)>,
}

impl ClubReference {
    /// Built-in references for a club type.
    #[must_use]
    pub fn builtin(club: ClubType) -> Self {
        use MetricKind as M;
        let r = ReferenceRange::new;

        let metrics = match club {
            ClubType::Driver => vec![
                (M::ShoulderTurn, r(95.0, 10.0)),
                (M::HipTurn, r(48.0, 8.0)),
                (M::KneeFlexion, r(20.0, 6.0)),
                (M::ArmExtension, r(168.0, 7.0)),
                (M::HeadDisplacement, r(0.08, 0.05)),
                (M::WeightDistribution, r(0.32, 0.08)),
                (M::SwingPlaneAngle, r(48.0, 6.0)),
                (M::TempoRatio, r(3.0, 0.3)),
                (M::Balance, r(0.88, 0.08)),
                (M::XFactor, r(50.0, 8.0)),
                (M::SequenceEfficiency, r(0.92, 0.08)),
                (M::PeakPower, r(3800.0, 700.0)),
                (M::GroundForceIndex, r(0.6, 0.2)),
            ],
            ClubType::Iron => vec![
                (M::ShoulderTurn, r(88.0, 9.0)),
                (M::HipTurn, r(45.0, 8.0)),
                (M::KneeFlexion, r(20.0, 6.0)),
                (M::ArmExtension, r(165.0, 7.0)),
                (M::HeadDisplacement, r(0.07, 0.04)),
                (M::WeightDistribution, r(0.35, 0.08)),
                (M::SwingPlaneAngle, r(55.0, 6.0)),
                (M::TempoRatio, r(3.0, 0.3)),
                (M::Balance, r(0.88, 0.08)),
                (M::XFactor, r(46.0, 8.0)),
                (M::SequenceEfficiency, r(0.90, 0.08)),
                (M::PeakPower, r(3200.0, 600.0)),
                (M::GroundForceIndex, r(0.5, 0.2)),
            ],
            ClubType::Wedge => vec![
                (M::ShoulderTurn, r(70.0, 9.0)),
                (M::HipTurn, r(38.0, 7.0)),
                (M::KneeFlexion, r(18.0, 6.0)),
                (M::ArmExtension, r(162.0, 7.0)),
                (M::HeadDisplacement, r(0.06, 0.04)),
                (M::WeightDistribution, r(0.38, 0.08)),
                (M::SwingPlaneAngle, r(60.0, 6.0)),
                (M::TempoRatio, r(2.7, 0.3)),
                (M::Balance, r(0.90, 0.07)),
                (M::XFactor, r(38.0, 7.0)),
                (M::SequenceEfficiency, r(0.88, 0.09)),
                (M::PeakPower, r(1800.0, 500.0)),
                (M::GroundForceIndex, r(0.35, 0.15)),
            ],
            ClubType::Putter => vec![
                (M::ShoulderTurn, r(12.0, 5.0)),
                (M::HeadDisplacement, r(0.02, 0.015)),
                (M::WeightDistribution, r(0.50, 0.05)),
                (M::TempoRatio, r(2.0, 0.25)),
                (M::Balance, r(0.95, 0.04)),
                (M::XFactor, r(8.0, 4.0)),
            ],
        };

        Self { club, metrics }
    }

    /// Reference range for one metric, if the club defines it.
    #[must_use]
    pub fn range(&self, metric: MetricKind) -> Option<ReferenceRange> {
        self.metrics
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, r)| *r)
    }
}

/// Configuration for the benchmark scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Weight of the x-factor dimension
    pub x_factor_weight: f64,
    /// Weight of the kinematic-sequence dimension
    pub sequence_weight: f64,
    /// Weight of the power dimension
    pub power_weight: f64,
    /// Weight of the consistency dimension
    pub consistency_weight: f64,
    /// Spread multiples from the mean at which a score reaches 0.0
    pub spread_multiplier: f64,
    /// Overall score for the professional category
    pub professional_threshold: f64,
    /// Overall score for the advanced category
    pub advanced_threshold: f64,
    /// Overall score for the intermediate category
    pub intermediate_threshold: f64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            x_factor_weight: 0.3,
            sequence_weight: 0.3,
            power_weight: 0.2,
            consistency_weight: 0.2,
            spread_multiplier: 3.0,
            professional_threshold: 0.85,
            advanced_threshold: 0.65,
            intermediate_threshold: 0.40,
        }
    }
}

/// Normalizes swing metrics against professional references.
#[derive(Debug, Clone)]
pub struct BenchmarkScorer {
    config: BenchmarkConfig,
}

impl BenchmarkScorer {
    /// Creates a scorer with the given configuration.
    #[must_use]
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    /// Creates a scorer with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::new(BenchmarkConfig::default())
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Reference table the scorer uses for a club.
    #[must_use]
    pub fn reference(&self, club: ClubType) -> ClubReference {
        ClubReference::builtin(club)
    }

    /// Scores a metric set against the club's professional references.
    ///
    /// `consistency` feeds the repeatability dimension when a history of
    /// prior swings exists; without one, that dimension's weight is
    /// shared by the others.
    #[must_use]
    pub fn score(
        &self,
        metrics: &EnhancedSwingMetrics,
        club: ClubType,
        consistency: Option<&ConsistencyResult>,
    ) -> ProfessionalComparison {
        let reference = self.reference(club);
        let multiplier = self.config.spread_multiplier;

        // Per-metric scores for everything measurable with a reference.
        let mut metric_scores = Vec::new();
        for (kind, range) in &reference.metrics {
            if let Some(value) = metrics.value_of(*kind).available() {
                metric_scores.push(MetricScore {
                    metric: *kind,
                    score: range.score(value, multiplier),
                });
            }
        }

        // Dimension scores.
        let mut dimensions: Vec<(ScoreDimension, f64, f64)> = Vec::new();

        if let (Some(value), Some(range)) = (
            metrics.x_factor.available(),
            reference.range(MetricKind::XFactor),
        ) {
            dimensions.push((
                ScoreDimension::XFactor,
                range.score(value, multiplier),
                self.config.x_factor_weight,
            ));
        }

        if let (Some(seq), Some(range)) = (
            metrics.kinematic_sequence.as_ref(),
            reference.range(MetricKind::SequenceEfficiency),
        ) {
            dimensions.push((
                ScoreDimension::KinematicSequence,
                range.score(seq.efficiency, multiplier),
                self.config.sequence_weight,
            ));
        }

        if let (Some(power), Some(range)) = (
            metrics.power.as_ref(),
            reference.range(MetricKind::PeakPower),
        ) {
            dimensions.push((
                ScoreDimension::Power,
                range.score(power.peak_power_w, multiplier),
                self.config.power_weight,
            ));
        }

        if let Some(result) = consistency {
            dimensions.push((
                ScoreDimension::Consistency,
                result.overall.clamp(0.0, 1.0),
                self.config.consistency_weight,
            ));
        }

        if dimensions.is_empty() {
            return ProfessionalComparison::unavailable();
        }

        let weight_sum: f64 = dimensions.iter().map(|(_, _, w)| w).sum();
        let overall_score = if weight_sum > 1e-9 {
            (dimensions.iter().map(|(_, s, w)| s * w).sum::<f64>() / weight_sum).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let skill_level = SkillLevel::from_score(overall_score, &self.config);

        ProfessionalComparison {
            overall_score,
            dimension_scores: dimensions
                .into_iter()
                .map(|(dimension, score, _)| DimensionScore { dimension, score })
                .collect(),
            metric_scores,
            skill_level,
            improvement_potential: (1.0 - overall_score).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EnhancedSwingMetrics;
    use crate::kinematics::KinematicSequence;
    use crate::metrics::SwingMetrics;
    use crate::power::{EnergyTransfer, GroundForce, PhasePower, PowerMetrics};
    use swinglab_core::MetricValue;

    /// Builds a metric set sitting exactly on the professional reference
    /// means for the given club.
    fn reference_mean_metrics(club: ClubType) -> EnhancedSwingMetrics {
        let reference = ClubReference::builtin(club);
        let at_mean = |kind: MetricKind| -> MetricValue {
            reference
                .range(kind)
                .map_or_else(MetricValue::unavailable, |r| MetricValue::valid(r.mean, 0.9))
        };

        let mut m = EnhancedSwingMetrics::unavailable();
        m.swing = SwingMetrics {
            shoulder_turn: at_mean(MetricKind::ShoulderTurn),
            hip_turn: at_mean(MetricKind::HipTurn),
            knee_flexion: at_mean(MetricKind::KneeFlexion),
            arm_extension: at_mean(MetricKind::ArmExtension),
            head_displacement: at_mean(MetricKind::HeadDisplacement),
            weight_distribution: at_mean(MetricKind::WeightDistribution),
            swing_plane_angle: at_mean(MetricKind::SwingPlaneAngle),
            tempo_ratio: at_mean(MetricKind::TempoRatio),
            balance: at_mean(MetricKind::Balance),
        };
        m.x_factor = at_mean(MetricKind::XFactor);
        m.x_factor_stretch = at_mean(MetricKind::XFactor);

        if let Some(seq_ref) = reference.range(MetricKind::SequenceEfficiency) {
            m.kinematic_sequence = Some(KinematicSequence {
                peaks: Vec::new(),
                efficiency: seq_ref.mean,
                optimal: true,
            });
        }
        if let Some(power_ref) = reference.range(MetricKind::PeakPower) {
            m.power = Some(PowerMetrics {
                total_power_w: power_ref.mean * 0.4,
                peak_power_w: power_ref.mean,
                transfer_efficiency: 0.5,
                rotational_fraction: 0.8,
                linear_fraction: 0.2,
                by_phase: Vec::<PhasePower>::new(),
            });
            m.ground_force = Some(GroundForce {
                vertical_n: 1200.0,
                horizontal_n: 300.0,
                lead_fraction: 0.65,
                trail_fraction: 0.35,
                index: 0.5,
            });
            m.energy_transfer = Some(EnergyTransfer {
                proximal_peak_j: 100.0,
                distal_peak_j: 80.0,
                chain_gain: 0.8,
                efficiency: 0.44,
            });
        }
        m
    }

    #[test]
    fn professional_reference_scores_near_one() {
        let scorer = BenchmarkScorer::default_config();
        for &club in ClubType::all() {
            let metrics = reference_mean_metrics(club);
            let comparison = scorer.score(&metrics, club, None);
            assert!(
                comparison.overall_score > 0.95,
                "{club}: reference-mean metrics should score ~1.0, got {}",
                comparison.overall_score
            );
            assert_eq!(comparison.skill_level, SkillLevel::Professional);
            assert!(comparison.improvement_potential < 0.05);
        }
    }

    #[test]
    fn all_scores_in_unit_range() {
        let scorer = BenchmarkScorer::default_config();
        let mut metrics = reference_mean_metrics(ClubType::Iron);
        metrics.swing.shoulder_turn = MetricValue::valid(500.0, 0.9);
        metrics.x_factor = MetricValue::valid(0.0, 0.9);

        let comparison = scorer.score(&metrics, ClubType::Iron, None);
        assert!((0.0..=1.0).contains(&comparison.overall_score));
        for d in &comparison.dimension_scores {
            assert!((0.0..=1.0).contains(&d.score));
        }
        for m in &comparison.metric_scores {
            assert!((0.0..=1.0).contains(&m.score));
        }
    }

    #[test]
    fn deviation_lowers_score_monotonically() {
        let scorer = BenchmarkScorer::default_config();
        let reference = scorer.reference(ClubType::Iron);
        let range = reference.range(MetricKind::XFactor).unwrap();

        let mut near = reference_mean_metrics(ClubType::Iron);
        near.x_factor = MetricValue::valid(range.mean + range.spread, 0.9);
        let mut far = reference_mean_metrics(ClubType::Iron);
        far.x_factor = MetricValue::valid(range.mean + 2.5 * range.spread, 0.9);

        let near_score = scorer.score(&near, ClubType::Iron, None);
        let far_score = scorer.score(&far, ClubType::Iron, None);
        assert!(near_score.overall_score > far_score.overall_score);
    }

    #[test]
    fn missing_dimensions_redistribute_weight() {
        let scorer = BenchmarkScorer::default_config();
        let mut metrics = reference_mean_metrics(ClubType::Iron);
        metrics.kinematic_sequence = None;
        metrics.power = None;

        let comparison = scorer.score(&metrics, ClubType::Iron, None);
        // Only the x-factor dimension remains, still at the mean.
        assert_eq!(comparison.dimension_scores.len(), 1);
        assert!(comparison.overall_score > 0.95);
    }

    #[test]
    fn nothing_measurable_is_unavailable_comparison() {
        let scorer = BenchmarkScorer::default_config();
        let metrics = EnhancedSwingMetrics::unavailable();
        let comparison = scorer.score(&metrics, ClubType::Iron, None);
        assert_eq!(comparison.overall_score, 0.0);
        assert!(comparison.dimension_scores.is_empty());
        assert_eq!(comparison.skill_level, SkillLevel::Beginner);
        assert!((comparison.improvement_potential - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn consistency_dimension_used_when_present() {
        let scorer = BenchmarkScorer::default_config();
        let metrics = reference_mean_metrics(ClubType::Iron);
        let consistency = ConsistencyResult {
            overall: 0.2,
            temporal: 0.2,
            spatial: 0.2,
            kinematic: 0.2,
            repeatability: 0.2,
            trend: crate::consistency::Trend::Stable,
            swing_count: 12,
        };

        let with = scorer.score(&metrics, ClubType::Iron, Some(&consistency));
        let without = scorer.score(&metrics, ClubType::Iron, None);
        assert!(
            with.overall_score < without.overall_score,
            "a poor consistency history must pull the score down"
        );
        assert!(with
            .dimension_scores
            .iter()
            .any(|d| d.dimension == ScoreDimension::Consistency));
    }

    #[test]
    fn skill_levels_partition_scores() {
        let config = BenchmarkConfig::default();
        assert_eq!(SkillLevel::from_score(0.9, &config), SkillLevel::Professional);
        assert_eq!(SkillLevel::from_score(0.7, &config), SkillLevel::Advanced);
        assert_eq!(SkillLevel::from_score(0.5, &config), SkillLevel::Intermediate);
        assert_eq!(SkillLevel::from_score(0.1, &config), SkillLevel::Beginner);
    }
}
