//! Fault detection against per-club threshold tables.
//!
//! Every fault is a rule: a metric, a comparison, a threshold, and a
//! base severity, resolved per club type. A metric that is unavailable
//! can never trigger a rule; when too much of the metric set is
//! unavailable the detector emits one synthetic insufficient-data fault
//! instead of partial, possibly misleading output.

use crate::analysis::EnhancedSwingMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use swinglab_core::{ClubType, PhaseLabel};

/// Metric identifiers addressable by fault rules and benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Peak shoulder turn (degrees)
    ShoulderTurn,
    /// Peak hip turn (degrees)
    HipTurn,
    /// Mean downswing knee flexion (degrees)
    KneeFlexion,
    /// Lead-arm extension at impact (degrees)
    ArmExtension,
    /// Peak normalized head drift
    HeadDisplacement,
    /// Weight position at impact (0 lead, 1 trail)
    WeightDistribution,
    /// Hand-path inclination (degrees)
    SwingPlaneAngle,
    /// Backswing-to-downswing tempo ratio
    TempoRatio,
    /// Stability score [0, 1]
    Balance,
    /// Shoulder-hip separation (degrees)
    XFactor,
    /// Kinematic sequencing efficiency [0, 1]
    SequenceEfficiency,
    /// Normalized ground-force index [0, 1]
    GroundForceIndex,
    /// Peak generated power (watts)
    PeakPower,
}

impl MetricKind {
    /// Returns the metric name as a string tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShoulderTurn => "shoulder_turn",
            Self::HipTurn => "hip_turn",
            Self::KneeFlexion => "knee_flexion",
            Self::ArmExtension => "arm_extension",
            Self::HeadDisplacement => "head_displacement",
            Self::WeightDistribution => "weight_distribution",
            Self::SwingPlaneAngle => "swing_plane_angle",
            Self::TempoRatio => "tempo_ratio",
            Self::Balance => "balance",
            Self::XFactor => "x_factor",
            Self::SequenceEfficiency => "sequence_efficiency",
            Self::GroundForceIndex => "ground_force_index",
            Self::PeakPower => "peak_power",
        }
    }
}

/// Comparison operator for a fault rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Fires when the metric exceeds the threshold
    GreaterThan,
    /// Fires when the metric falls below the threshold
    LessThan,
}

impl Comparison {
    /// Applies the comparison.
    #[must_use]
    pub fn triggered(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
        }
    }
}

/// Closed set of detectable swing faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Shoulder turn short of the club's expected range
    RestrictedShoulderTurn,
    /// Hip turn short of the club's expected range
    RestrictedHipTurn,
    /// Shoulder turn beyond control
    OverRotation,
    /// Shoulder-hip separation too small to store power
    LimitedXFactor,
    /// Shoulder-hip separation beyond anatomical efficiency
    ExcessiveXFactor,
    /// Head drifting off the ball during the backswing
    SwayOffBall,
    /// Standing up out of posture through the downswing
    LossOfPosture,
    /// Lead arm collapsing at impact
    BentLeadArm,
    /// Weight stuck on the trail side at impact
    HangingBack,
    /// Hand path too shallow for the club
    FlatSwingPlane,
    /// Hand path too steep for the club
    SteepSwingPlane,
    /// Backswing rushed relative to the downswing
    QuickTempo,
    /// Backswing dragged relative to the downswing
    SlowTempo,
    /// Unstable head/pelvis through the strike
    PoorBalance,
    /// Segments peaking out of proximal-to-distal order
    OutOfSequence,
    /// Little vertical ground-force use
    WeakGroundForce,
    /// Too few measurable metrics to judge the swing
    InsufficientData,
}

impl FaultKind {
    /// Returns the fault name as a string tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RestrictedShoulderTurn => "restricted_shoulder_turn",
            Self::RestrictedHipTurn => "restricted_hip_turn",
            Self::OverRotation => "over_rotation",
            Self::LimitedXFactor => "limited_x_factor",
            Self::ExcessiveXFactor => "excessive_x_factor",
            Self::SwayOffBall => "sway_off_ball",
            Self::LossOfPosture => "loss_of_posture",
            Self::BentLeadArm => "bent_lead_arm",
            Self::HangingBack => "hanging_back",
            Self::FlatSwingPlane => "flat_swing_plane",
            Self::SteepSwingPlane => "steep_swing_plane",
            Self::QuickTempo => "quick_tempo",
            Self::SlowTempo => "slow_tempo",
            Self::PoorBalance => "poor_balance",
            Self::OutOfSequence => "out_of_sequence",
            Self::WeakGroundForce => "weak_ground_force",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A detected fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fault {
    /// Fault category
    pub kind: FaultKind,
    /// Severity [0, 1], scaled by how far the metric exceeded its
    /// threshold
    pub severity: f64,
    /// Swing phase the fault is associated with, when one applies
    pub phase: Option<PhaseLabel>,
    /// Metric that triggered the rule, absent for synthetic faults
    pub metric: Option<MetricKind>,
    /// Observed metric value
    pub observed: Option<f64>,
    /// Threshold the rule compared against
    pub threshold: Option<f64>,
}

impl Fault {
    /// The synthetic fault emitted when the metric set is too sparse.
    #[must_use]
    pub fn insufficient_data() -> Self {
        Self {
            kind: FaultKind::InsufficientData,
            severity: 0.9,
            phase: None,
            metric: None,
            observed: None,
            threshold: None,
        }
    }
}

/// One row of a per-club threshold table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultRule {
    /// Fault raised when the rule fires
    pub kind: FaultKind,
    /// Metric compared
    pub metric: MetricKind,
    /// Comparison operator
    pub op: Comparison,
    /// Threshold value
    pub threshold: f64,
    /// Base severity [0, 1]
    pub severity: f64,
    /// Phase the fault is reported against
    pub phase: PhaseLabel,
}

/// A per-club set of fault rules.
///
/// Tables deserialize from JSON, which is the external-loading shape:
/// `{"club": "driver", "rules": [{"kind": "...", "metric": "...", ...}]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultTable {
    /// Club the table applies to
    pub club: ClubType,
    /// Rules, in no particular order
    pub rules: Vec<FaultRule>,
}

impl FaultTable {
    /// Loads a table from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns the underlying decode error for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Built-in table for a club type.
    #[must_use]
    pub fn builtin(club: ClubType) -> Self {
        let rules = match club {
            ClubType::Driver => driver_rules(),
            ClubType::Iron => iron_rules(),
            ClubType::Wedge => wedge_rules(),
            ClubType::Putter => putter_rules(),
        };
        Self { club, rules }
    }
}

/// Configuration for the fault detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultConfig {
    /// Above this fraction of unavailable metrics, the detector reports
    /// only the synthetic insufficient-data fault
    pub max_unavailable_fraction: f64,
    /// Table overrides; clubs not present fall back to the built-ins
    #[serde(default)]
    pub table_overrides: HashMap<ClubType, FaultTable>,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            max_unavailable_fraction: 0.5,
            table_overrides: HashMap::new(),
        }
    }
}

/// Compares swing metrics against per-club thresholds.
#[derive(Debug, Clone)]
pub struct FaultDetector {
    config: FaultConfig,
}

impl FaultDetector {
    /// Creates a detector with the given configuration.
    #[must_use]
    pub fn new(config: FaultConfig) -> Self {
        Self { config }
    }

    /// Creates a detector with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::new(FaultConfig::default())
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &FaultConfig {
        &self.config
    }

    /// Resolves the active rule table for a club.
    #[must_use]
    pub fn table(&self, club: ClubType) -> FaultTable {
        self.config
            .table_overrides
            .get(&club)
            .cloned()
            .unwrap_or_else(|| FaultTable::builtin(club))
    }

    /// Detects faults in a metric set, ordered by descending severity.
    ///
    /// Unavailable metrics never trigger rules; a mostly unavailable
    /// metric set collapses to the single insufficient-data fault.
    #[must_use]
    pub fn detect(&self, metrics: &EnhancedSwingMetrics, club: ClubType) -> Vec<Fault> {
        if metrics.swing.unavailable_fraction() > self.config.max_unavailable_fraction {
            tracing::debug!(
                unavailable = metrics.swing.unavailable_fraction(),
                "metric set too sparse, reporting insufficient data"
            );
            return vec![Fault::insufficient_data()];
        }

        let table = self.table(club);
        let mut faults: Vec<Fault> = table
            .rules
            .iter()
            .filter_map(|rule| self.apply_rule(rule, metrics))
            .collect();

        faults.sort_by(|a, b| b.severity.total_cmp(&a.severity));
        faults
    }

    fn apply_rule(&self, rule: &FaultRule, metrics: &EnhancedSwingMetrics) -> Option<Fault> {
        let value = metrics.value_of(rule.metric);
        let observed = value.available()?;
        if !rule.op.triggered(observed, rule.threshold) {
            return None;
        }

        // Scale severity by how far past the threshold the metric went.
        let denom = rule.threshold.abs().max(1e-6);
        let exceedance = (observed - rule.threshold).abs() / denom;
        let severity = (rule.severity * (1.0 + exceedance)).clamp(rule.severity, 1.0);

        Some(Fault {
            kind: rule.kind,
            severity,
            phase: Some(rule.phase),
            metric: Some(rule.metric),
            observed: Some(observed),
            threshold: Some(rule.threshold),
        })
    }
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

fn rule(
    kind: FaultKind,
    metric: MetricKind,
    op: Comparison,
    threshold: f64,
    severity: f64,
    phase: PhaseLabel,
) -> FaultRule {
    FaultRule {
        kind,
        metric,
        op,
        threshold,
        severity,
        phase,
    }
}

fn driver_rules() -> Vec<FaultRule> {
    use Comparison::{GreaterThan, LessThan};
    use FaultKind as F;
    use MetricKind as M;
    use PhaseLabel as P;

    vec![
        rule(F::RestrictedShoulderTurn, M::ShoulderTurn, LessThan, 80.0, 0.6, P::Backswing),
        rule(F::OverRotation, M::ShoulderTurn, GreaterThan, 115.0, 0.4, P::Backswing),
        rule(F::RestrictedHipTurn, M::HipTurn, LessThan, 35.0, 0.5, P::Backswing),
        rule(F::LimitedXFactor, M::XFactor, LessThan, 35.0, 0.7, P::Transition),
        rule(F::ExcessiveXFactor, M::XFactor, GreaterThan, 65.0, 0.5, P::Transition),
        rule(F::SwayOffBall, M::HeadDisplacement, GreaterThan, 0.20, 0.8, P::Backswing),
        rule(F::LossOfPosture, M::KneeFlexion, LessThan, 8.0, 0.5, P::Downswing),
        rule(F::BentLeadArm, M::ArmExtension, LessThan, 150.0, 0.6, P::Impact),
        rule(F::HangingBack, M::WeightDistribution, GreaterThan, 0.55, 0.7, P::Impact),
        rule(F::FlatSwingPlane, M::SwingPlaneAngle, LessThan, 38.0, 0.5, P::Downswing),
        rule(F::SteepSwingPlane, M::SwingPlaneAngle, GreaterThan, 58.0, 0.5, P::Downswing),
        rule(F::QuickTempo, M::TempoRatio, LessThan, 2.4, 0.5, P::Transition),
        rule(F::SlowTempo, M::TempoRatio, GreaterThan, 3.6, 0.4, P::Transition),
        rule(F::PoorBalance, M::Balance, LessThan, 0.5, 0.6, P::Downswing),
        rule(F::OutOfSequence, M::SequenceEfficiency, LessThan, 0.6, 0.8, P::Downswing),
        rule(F::WeakGroundForce, M::GroundForceIndex, LessThan, 0.15, 0.4, P::Downswing),
    ]
}

fn iron_rules() -> Vec<FaultRule> {
    use Comparison::{GreaterThan, LessThan};
    use FaultKind as F;
    use MetricKind as M;
    use PhaseLabel as P;

    vec![
        rule(F::RestrictedShoulderTurn, M::ShoulderTurn, LessThan, 70.0, 0.6, P::Backswing),
        rule(F::OverRotation, M::ShoulderTurn, GreaterThan, 110.0, 0.4, P::Backswing),
        rule(F::RestrictedHipTurn, M::HipTurn, LessThan, 30.0, 0.5, P::Backswing),
        rule(F::LimitedXFactor, M::XFactor, LessThan, 30.0, 0.7, P::Transition),
        rule(F::ExcessiveXFactor, M::XFactor, GreaterThan, 60.0, 0.5, P::Transition),
        rule(F::SwayOffBall, M::HeadDisplacement, GreaterThan, 0.15, 0.8, P::Backswing),
        rule(F::LossOfPosture, M::KneeFlexion, LessThan, 8.0, 0.5, P::Downswing),
        rule(F::BentLeadArm, M::ArmExtension, LessThan, 145.0, 0.6, P::Impact),
        rule(F::HangingBack, M::WeightDistribution, GreaterThan, 0.50, 0.7, P::Impact),
        rule(F::FlatSwingPlane, M::SwingPlaneAngle, LessThan, 45.0, 0.5, P::Downswing),
        rule(F::SteepSwingPlane, M::SwingPlaneAngle, GreaterThan, 66.0, 0.5, P::Downswing),
        rule(F::QuickTempo, M::TempoRatio, LessThan, 2.5, 0.5, P::Transition),
        rule(F::SlowTempo, M::TempoRatio, GreaterThan, 3.5, 0.4, P::Transition),
        rule(F::PoorBalance, M::Balance, LessThan, 0.5, 0.6, P::Downswing),
        rule(F::OutOfSequence, M::SequenceEfficiency, LessThan, 0.6, 0.8, P::Downswing),
        rule(F::WeakGroundForce, M::GroundForceIndex, LessThan, 0.12, 0.4, P::Downswing),
    ]
}

fn wedge_rules() -> Vec<FaultRule> {
    use Comparison::{GreaterThan, LessThan};
    use FaultKind as F;
    use MetricKind as M;
    use PhaseLabel as P;

    vec![
        rule(F::RestrictedShoulderTurn, M::ShoulderTurn, LessThan, 55.0, 0.5, P::Backswing),
        rule(F::OverRotation, M::ShoulderTurn, GreaterThan, 95.0, 0.5, P::Backswing),
        rule(F::LimitedXFactor, M::XFactor, LessThan, 22.0, 0.5, P::Transition),
        rule(F::SwayOffBall, M::HeadDisplacement, GreaterThan, 0.12, 0.8, P::Backswing),
        rule(F::BentLeadArm, M::ArmExtension, LessThan, 140.0, 0.5, P::Impact),
        rule(F::HangingBack, M::WeightDistribution, GreaterThan, 0.45, 0.7, P::Impact),
        rule(F::SteepSwingPlane, M::SwingPlaneAngle, GreaterThan, 70.0, 0.4, P::Downswing),
        rule(F::QuickTempo, M::TempoRatio, LessThan, 2.0, 0.5, P::Transition),
        rule(F::SlowTempo, M::TempoRatio, GreaterThan, 3.2, 0.4, P::Transition),
        rule(F::PoorBalance, M::Balance, LessThan, 0.6, 0.6, P::Downswing),
    ]
}

fn putter_rules() -> Vec<FaultRule> {
    use Comparison::{GreaterThan, LessThan};
    use FaultKind as F;
    use MetricKind as M;
    use PhaseLabel as P;

    vec![
        rule(F::SwayOffBall, M::HeadDisplacement, GreaterThan, 0.05, 0.8, P::Backswing),
        rule(F::OverRotation, M::ShoulderTurn, GreaterThan, 30.0, 0.5, P::Backswing),
        rule(F::QuickTempo, M::TempoRatio, LessThan, 1.6, 0.5, P::Transition),
        rule(F::SlowTempo, M::TempoRatio, GreaterThan, 2.6, 0.4, P::Transition),
        rule(F::PoorBalance, M::Balance, LessThan, 0.7, 0.6, P::Downswing),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EnhancedSwingMetrics;
    use crate::metrics::SwingMetrics;
    use swinglab_core::MetricValue;

    /// A metric set matching a competent iron swing; no rules fire.
    fn clean_metrics() -> EnhancedSwingMetrics {
        let mut m = EnhancedSwingMetrics::unavailable();
        m.swing = SwingMetrics {
            shoulder_turn: MetricValue::valid(88.0, 0.9),
            hip_turn: MetricValue::valid(45.0, 0.9),
            knee_flexion: MetricValue::valid(20.0, 0.9),
            arm_extension: MetricValue::valid(168.0, 0.9),
            head_displacement: MetricValue::valid(0.06, 0.9),
            weight_distribution: MetricValue::valid(0.35, 0.9),
            swing_plane_angle: MetricValue::valid(55.0, 0.9),
            tempo_ratio: MetricValue::valid(3.0, 0.9),
            balance: MetricValue::valid(0.85, 0.9),
        };
        m.x_factor = MetricValue::valid(44.0, 0.9);
        m.x_factor_stretch = MetricValue::valid(48.0, 0.9);
        m
    }

    #[test]
    fn clean_swing_no_faults() {
        let detector = FaultDetector::default_config();
        let faults = detector.detect(&clean_metrics(), ClubType::Iron);
        assert!(faults.is_empty(), "got {faults:?}");
    }

    #[test]
    fn sway_detected_and_ordered_by_severity() {
        let detector = FaultDetector::default_config();
        let mut metrics = clean_metrics();
        metrics.swing.head_displacement = MetricValue::valid(0.3, 0.9);
        metrics.swing.tempo_ratio = MetricValue::valid(3.8, 0.9);

        let faults = detector.detect(&metrics, ClubType::Iron);
        assert_eq!(faults.len(), 2);
        assert_eq!(faults[0].kind, FaultKind::SwayOffBall);
        assert_eq!(faults[1].kind, FaultKind::SlowTempo);
        assert!(faults[0].severity >= faults[1].severity);
        assert_eq!(faults[0].phase, Some(PhaseLabel::Backswing));
    }

    #[test]
    fn severity_scales_with_exceedance_and_clamps() {
        let detector = FaultDetector::default_config();

        let mut mild = clean_metrics();
        mild.swing.head_displacement = MetricValue::valid(0.16, 0.9);
        let mild_faults = detector.detect(&mild, ClubType::Iron);

        let mut severe = clean_metrics();
        severe.swing.head_displacement = MetricValue::valid(0.6, 0.9);
        let severe_faults = detector.detect(&severe, ClubType::Iron);

        assert!(severe_faults[0].severity > mild_faults[0].severity);
        assert!(severe_faults[0].severity <= 1.0);
    }

    #[test]
    fn unavailable_metric_cannot_fault() {
        let detector = FaultDetector::default_config();
        let mut metrics = clean_metrics();
        // An unavailable head metric must not read as a sway of 0.0 or
        // anything else.
        metrics.swing.head_displacement = MetricValue::unavailable();
        let faults = detector.detect(&metrics, ClubType::Iron);
        assert!(faults.iter().all(|f| f.kind != FaultKind::SwayOffBall));
    }

    #[test]
    fn sparse_metrics_collapse_to_insufficient_data() {
        let detector = FaultDetector::default_config();
        let mut metrics = EnhancedSwingMetrics::unavailable();
        // Leave a couple of alarming-looking values available; they must
        // not surface as specific faults.
        metrics.swing.head_displacement = MetricValue::valid(0.9, 0.9);
        metrics.swing.tempo_ratio = MetricValue::valid(1.0, 0.9);

        let faults = detector.detect(&metrics, ClubType::Iron);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].kind, FaultKind::InsufficientData);
    }

    #[test]
    fn putter_table_is_gentler() {
        let detector = FaultDetector::default_config();
        let mut metrics = clean_metrics();
        // A 60° shoulder turn is fine for irons but wild for a putter.
        metrics.swing.shoulder_turn = MetricValue::valid(60.0, 0.9);

        assert!(detector
            .detect(&metrics, ClubType::Iron)
            .iter()
            .all(|f| f.kind != FaultKind::OverRotation));
        assert!(detector
            .detect(&metrics, ClubType::Putter)
            .iter()
            .any(|f| f.kind == FaultKind::OverRotation));
    }

    #[test]
    fn table_override_takes_precedence() {
        let mut config = FaultConfig::default();
        config.table_overrides.insert(
            ClubType::Iron,
            FaultTable {
                club: ClubType::Iron,
                rules: vec![rule(
                    FaultKind::QuickTempo,
                    MetricKind::TempoRatio,
                    Comparison::LessThan,
                    3.5,
                    0.5,
                    PhaseLabel::Transition,
                )],
            },
        );
        let detector = FaultDetector::new(config);
        let faults = detector.detect(&clean_metrics(), ClubType::Iron);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].kind, FaultKind::QuickTempo);
    }

    #[test]
    fn fault_table_json_roundtrip() {
        let table = FaultTable::builtin(ClubType::Driver);
        let json = serde_json::to_string(&table).unwrap();
        let parsed = FaultTable::from_json(&json).unwrap();
        assert_eq!(parsed.club, ClubType::Driver);
        assert_eq!(parsed.rules.len(), table.rules.len());
    }

    #[test]
    fn external_table_shape_parses() {
        let json = r#"{
            "club": "wedge",
            "rules": [
                {
                    "kind": "quick_tempo",
                    "metric": "tempo_ratio",
                    "op": "less_than",
                    "threshold": 2.1,
                    "severity": 0.5,
                    "phase": "transition"
                }
            ]
        }"#;
        let table = FaultTable::from_json(json).unwrap();
        assert_eq!(table.club, ClubType::Wedge);
        assert_eq!(table.rules[0].metric, MetricKind::TempoRatio);
    }
}
