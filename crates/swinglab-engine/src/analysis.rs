//! The top-level analyzer and the immutable analysis record.
//!
//! [`SwingAnalyzer`] wires the pipeline together: classification,
//! metrics, kinematic sequence, power, faults, and benchmarking. It is
//! constructed once from an [`AnalyzerConfig`](crate::AnalyzerConfig)
//! resolved at session start and is stateless across calls, so analyses
//! of independent sessions can run in parallel without shared state.

use crate::benchmark::{BenchmarkScorer, ProfessionalComparison};
use crate::config::{AnalyzerConfig, ConfigWarning};
use crate::consistency::ConsistencyResult;
use crate::faults::{Fault, FaultDetector, MetricKind};
use crate::kinematics::{KinematicSequence, KinematicSequenceAnalyzer};
use crate::metrics::{MetricsCalculator, SwingMetrics};
use crate::phases::{PhaseClassifier, PhaseSet};
use crate::power::{EnergyTransfer, GroundForce, PowerEstimator, PowerMetrics};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swinglab_core::{ClubType, MetricValue, PhaseLabel, PoseFrame, SwingPhase};
use uuid::Uuid;

/// Unique identifier for a finalized analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisId(Uuid);

impl AnalysisId {
    /// Creates a new unique analysis ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an analysis ID from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Swing metrics extended with separation, sequencing, power, and
/// ground-force results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedSwingMetrics {
    /// Core biomechanical metrics
    pub swing: SwingMetrics,
    /// Peak shoulder-hip separation, degrees [0, 90]
    pub x_factor: MetricValue,
    /// Peak separation through the transition
    pub x_factor_stretch: MetricValue,
    /// Kinematic sequence result, when measurable
    pub kinematic_sequence: Option<KinematicSequence>,
    /// Power-generation estimates, when measurable
    pub power: Option<PowerMetrics>,
    /// Ground-reaction proxies, when measurable
    pub ground_force: Option<GroundForce>,
    /// Energy-transfer summary, when measurable
    pub energy_transfer: Option<EnergyTransfer>,
}

impl EnhancedSwingMetrics {
    /// Everything unavailable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            swing: SwingMetrics::unavailable(),
            x_factor: MetricValue::unavailable(),
            x_factor_stretch: MetricValue::unavailable(),
            kinematic_sequence: None,
            power: None,
            ground_force: None,
            energy_transfer: None,
        }
    }

    /// Looks up a metric by kind, as a graded value.
    #[must_use]
    pub fn value_of(&self, kind: MetricKind) -> MetricValue {
        match kind {
            MetricKind::ShoulderTurn => self.swing.shoulder_turn,
            MetricKind::HipTurn => self.swing.hip_turn,
            MetricKind::KneeFlexion => self.swing.knee_flexion,
            MetricKind::ArmExtension => self.swing.arm_extension,
            MetricKind::HeadDisplacement => self.swing.head_displacement,
            MetricKind::WeightDistribution => self.swing.weight_distribution,
            MetricKind::SwingPlaneAngle => self.swing.swing_plane_angle,
            MetricKind::TempoRatio => self.swing.tempo_ratio,
            MetricKind::Balance => self.swing.balance,
            MetricKind::XFactor => self.x_factor,
            MetricKind::SequenceEfficiency => self
                .kinematic_sequence
                .as_ref()
                .map_or_else(MetricValue::unavailable, |s| {
                    MetricValue::valid(s.efficiency, 1.0)
                }),
            MetricKind::GroundForceIndex => self
                .ground_force
                .as_ref()
                .map_or_else(MetricValue::unavailable, |g| {
                    MetricValue::valid(g.index, 1.0)
                }),
            MetricKind::PeakPower => self
                .power
                .as_ref()
                .map_or_else(MetricValue::unavailable, |p| {
                    MetricValue::valid(p.peak_power_w, 1.0)
                }),
        }
    }
}

/// The immutable result of analyzing one swing.
///
/// Finalized once and then handed to persistence/coaching/UI
/// collaborators by reference; nothing in it is recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwingAnalysis {
    /// Unique identifier
    pub id: AnalysisId,
    /// Club the swing was analyzed against
    pub club: ClubType,
    /// Finalization time
    pub created_at: DateTime<Utc>,
    /// Number of frames analyzed
    pub frame_count: usize,
    /// Classified phases, ordered by rank
    pub phases: Vec<SwingPhase>,
    /// Set when classification fell back or the sequence was very short
    pub low_confidence: bool,
    /// Full metric set
    pub metrics: EnhancedSwingMetrics,
    /// Detected faults, ordered by descending severity
    pub faults: Vec<Fault>,
    /// Benchmark comparison
    pub comparison: ProfessionalComparison,
    /// Configuration warnings recorded at session start
    pub warnings: Vec<ConfigWarning>,
}

impl SwingAnalysis {
    /// Backswing and downswing durations in milliseconds, from the
    /// classified phases.
    #[must_use]
    pub fn phase_durations(&self) -> (Option<f64>, Option<f64>) {
        let find = |label: PhaseLabel| self.phases.iter().find(|p| p.label == label);

        let backswing_start = find(PhaseLabel::Takeaway).or_else(|| find(PhaseLabel::Backswing));
        let top = find(PhaseLabel::Transition).or_else(|| find(PhaseLabel::Backswing));
        let backswing = match (backswing_start, top) {
            (Some(s), Some(t)) if t.end_ms > s.start_ms => Some(t.end_ms - s.start_ms),
            _ => None,
        };

        let down = find(PhaseLabel::Downswing);
        let downswing = down.and_then(|d| {
            let end = find(PhaseLabel::Impact).map_or(d.end_ms, |i| i.end_ms);
            (end > d.start_ms).then_some(end - d.start_ms)
        });

        (backswing, downswing)
    }

    /// The phase covering a frame index, if any.
    #[must_use]
    pub fn phase_at(&self, frame: usize) -> Option<&SwingPhase> {
        self.phases.iter().find(|p| p.contains(frame))
    }
}

/// The full analysis pipeline for one configuration.
#[derive(Debug, Clone)]
pub struct SwingAnalyzer {
    config: AnalyzerConfig,
    classifier: PhaseClassifier,
    metrics: MetricsCalculator,
    sequence: KinematicSequenceAnalyzer,
    power: PowerEstimator,
    faults: FaultDetector,
    benchmark: BenchmarkScorer,
}

impl SwingAnalyzer {
    /// Creates an analyzer from a resolved configuration.
    #[must_use]
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            classifier: PhaseClassifier::new(config.classifier.clone()),
            metrics: MetricsCalculator::new(config.metrics.clone()),
            sequence: KinematicSequenceAnalyzer::new(config.sequence.clone()),
            power: PowerEstimator::new(config.power.clone()),
            faults: FaultDetector::new(config.faults.clone()),
            benchmark: BenchmarkScorer::new(config.benchmark.clone()),
            config,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Club the analyzer resolves thresholds against.
    #[must_use]
    pub fn club(&self) -> ClubType {
        self.config.club
    }

    /// Analyzes one swing recording.
    ///
    /// Never fails: degraded input produces a best-effort analysis with
    /// explicit low-confidence and unavailable markers, and an
    /// insufficient-data fault when there is too little to judge.
    #[must_use]
    pub fn analyze(&self, frames: &[PoseFrame]) -> SwingAnalysis {
        self.analyze_with_consistency(frames, None)
    }

    /// Analyzes one swing with a consistency history feeding the
    /// benchmark's repeatability dimension.
    #[must_use]
    pub fn analyze_with_consistency(
        &self,
        frames: &[PoseFrame],
        consistency: Option<&ConsistencyResult>,
    ) -> SwingAnalysis {
        let club = self.config.club;

        let (phase_set, low_confidence) = match self.classifier.classify(frames) {
            Ok(set) => {
                let low = set.low_confidence;
                (set, low)
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    frames = frames.len(),
                    "phase classification failed, continuing with empty phases"
                );
                (PhaseSet::empty(), true)
            }
        };

        let metrics_out = self.metrics.compute(frames, &phase_set);
        let kinematic_sequence = self.sequence.analyze(&metrics_out.segments, &phase_set);
        let pelvis_path = self.metrics.pelvis_path(frames);
        let power_out = self.power.estimate(
            &metrics_out.segments,
            &phase_set,
            &pelvis_path,
            &metrics_out.metrics.weight_distribution,
        );

        let (power, ground_force, energy_transfer) = match power_out {
            Some(out) => (
                Some(out.power),
                Some(out.ground_force),
                Some(out.energy_transfer),
            ),
            None => (None, None, None),
        };

        let metrics = EnhancedSwingMetrics {
            swing: metrics_out.metrics,
            x_factor: metrics_out.x_factor,
            x_factor_stretch: metrics_out.x_factor_stretch,
            kinematic_sequence,
            power,
            ground_force,
            energy_transfer,
        };

        let faults = self.faults.detect(&metrics, club);
        let comparison = self.benchmark.score(&metrics, club, consistency);

        let analysis = SwingAnalysis {
            id: AnalysisId::new(),
            club,
            created_at: Utc::now(),
            frame_count: frames.len(),
            phases: phase_set.phases,
            low_confidence,
            metrics,
            faults,
            comparison,
            warnings: self.config.warnings.clone(),
        };

        tracing::debug!(
            analysis = %analysis.id,
            club = %club,
            phases = analysis.phases.len(),
            faults = analysis.faults.len(),
            score = analysis.comparison.overall_score,
            "swing analysis finalized"
        );

        analysis
    }
}
