//! Cross-swing consistency and trend tracking.
//!
//! The tracker holds a bounded history of finalized analyses for one
//! golfer and scores repeatability from the coefficient of variation of
//! corresponding metrics across swings: lower variation maps to a higher
//! score through the fixed monotone mapping `1 / (1 + cv)`. The trend is
//! the sign of a least-squares slope over the recent overall scores.

use crate::analysis::SwingAnalysis;
use serde::{Deserialize, Serialize};
use swinglab_signal::{coefficient_of_variation, slope_over_index};

/// Direction of recent score movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Scores rising across the recent window
    Improving,
    /// No meaningful slope
    Stable,
    /// Scores falling across the recent window
    Declining,
}

impl Trend {
    /// Returns the trend name as a string tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Declining => "declining",
        }
    }
}

/// Configuration for the consistency tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyConfig {
    /// Number of recent swings used for the trend regression
    pub trend_window: usize,
    /// Maximum number of retained analyses
    pub capacity: usize,
    /// Regression slope (score per swing) beyond which the trend is
    /// considered moving
    pub trend_slope_threshold: f64,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            trend_window: 10,
            capacity: 100,
            trend_slope_threshold: 0.005,
        }
    }
}

/// Consistency assessment across the stored swings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyResult {
    /// Combined consistency score [0, 1]
    pub overall: f64,
    /// Timing repeatability (tempo, phase durations) [0, 1]
    pub temporal: f64,
    /// Positional repeatability (turns, head drift) [0, 1]
    pub spatial: f64,
    /// Sequencing repeatability (x-factor, efficiency) [0, 1]
    pub kinematic: f64,
    /// Repeatability of the overall benchmark score [0, 1]
    pub repeatability: f64,
    /// Recent score trend
    pub trend: Trend,
    /// Number of swings the assessment covers
    pub swing_count: usize,
}

/// Per-swing sample extracted from a finalized analysis.
#[derive(Debug, Clone)]
struct SwingSample {
    tempo: Option<f64>,
    backswing_ms: Option<f64>,
    downswing_ms: Option<f64>,
    shoulder_turn: Option<f64>,
    hip_turn: Option<f64>,
    head_displacement: Option<f64>,
    x_factor: Option<f64>,
    sequence_efficiency: Option<f64>,
    overall_score: f64,
}

/// Bounded history of finalized analyses with consistency scoring.
#[derive(Debug, Clone)]
pub struct ConsistencyTracker {
    config: ConsistencyConfig,
    samples: Vec<SwingSample>,
}

impl ConsistencyTracker {
    /// Creates a tracker with the given configuration.
    #[must_use]
    pub fn new(config: ConsistencyConfig) -> Self {
        let capacity = config.capacity.min(4096);
        Self {
            config,
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Creates a tracker with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::new(ConsistencyConfig::default())
    }

    /// Records one finalized analysis.
    ///
    /// When the tracker is at capacity the oldest sample is evicted.
    pub fn push(&mut self, analysis: &SwingAnalysis) {
        if self.samples.len() >= self.config.capacity.max(1) {
            self.samples.remove(0);
        }

        let metrics = &analysis.metrics;
        let durations = analysis.phase_durations();
        self.samples.push(SwingSample {
            tempo: metrics.swing.tempo_ratio.available(),
            backswing_ms: durations.0,
            downswing_ms: durations.1,
            shoulder_turn: metrics.swing.shoulder_turn.available(),
            hip_turn: metrics.swing.hip_turn.available(),
            head_displacement: metrics.swing.head_displacement.available(),
            x_factor: metrics.x_factor.available(),
            sequence_efficiency: metrics.kinematic_sequence.as_ref().map(|s| s.efficiency),
            overall_score: analysis.comparison.overall_score,
        });
    }

    /// Number of stored swings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the tracker holds no swings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of retained swings.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Discards all stored swings.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Assesses consistency over the stored swings.
    ///
    /// Returns `None` with fewer than two swings; there is nothing to
    /// compare.
    #[must_use]
    pub fn assess(&self) -> Option<ConsistencyResult> {
        if self.samples.len() < 2 {
            return None;
        }

        let temporal = component_score(&[
            self.collect(|s| s.tempo),
            self.collect(|s| s.backswing_ms),
            self.collect(|s| s.downswing_ms),
        ]);
        let spatial = component_score(&[
            self.collect(|s| s.shoulder_turn),
            self.collect(|s| s.hip_turn),
            self.collect(|s| s.head_displacement),
        ]);
        let kinematic = component_score(&[
            self.collect(|s| s.x_factor),
            self.collect(|s| s.sequence_efficiency),
        ]);

        let scores: Vec<f64> = self.samples.iter().map(|s| s.overall_score).collect();
        let repeatability = cv_score(&scores).unwrap_or(0.0);

        let components: Vec<f64> = [temporal, spatial, kinematic]
            .into_iter()
            .flatten()
            .collect();
        let overall = if components.is_empty() {
            repeatability
        } else {
            components.iter().sum::<f64>() / components.len() as f64
        };

        let window = self.config.trend_window.max(2);
        let recent = &scores[scores.len().saturating_sub(window)..];
        let trend = match slope_over_index(recent) {
            Some(slope) if slope > self.config.trend_slope_threshold => Trend::Improving,
            Some(slope) if slope < -self.config.trend_slope_threshold => Trend::Declining,
            _ => Trend::Stable,
        };

        Some(ConsistencyResult {
            overall: overall.clamp(0.0, 1.0),
            temporal: temporal.unwrap_or(0.0),
            spatial: spatial.unwrap_or(0.0),
            kinematic: kinematic.unwrap_or(0.0),
            repeatability,
            trend,
            swing_count: self.samples.len(),
        })
    }

    fn collect(&self, f: impl Fn(&SwingSample) -> Option<f64>) -> Vec<f64> {
        self.samples.iter().filter_map(f).collect()
    }
}

/// CV-based score for one metric series; `None` when the series is too
/// short or has a degenerate mean.
fn cv_score(values: &[f64]) -> Option<f64> {
    coefficient_of_variation(values).map(|cv| (1.0 / (1.0 + cv)).clamp(0.0, 1.0))
}

/// Mean CV score over the series that could be scored.
fn component_score(series: &[Vec<f64>]) -> Option<f64> {
    let scores: Vec<f64> = series.iter().filter_map(|v| cv_score(v)).collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisId, EnhancedSwingMetrics, SwingAnalysis};
    use crate::benchmark::ProfessionalComparison;
    use chrono::Utc;
    use swinglab_core::{ClubType, MetricValue, PhaseLabel, SwingPhase};

    /// Builds a minimal finalized analysis with the given tempo, turn,
    /// and overall score.
    fn analysis(tempo: f64, shoulder_turn: f64, overall: f64) -> SwingAnalysis {
        let mut metrics = EnhancedSwingMetrics::unavailable();
        metrics.swing.tempo_ratio = MetricValue::valid(tempo, 0.9);
        metrics.swing.shoulder_turn = MetricValue::valid(shoulder_turn, 0.9);
        metrics.x_factor = MetricValue::valid(shoulder_turn / 2.0, 0.9);

        let mut comparison = ProfessionalComparison::unavailable();
        comparison.overall_score = overall;

        SwingAnalysis {
            id: AnalysisId::new(),
            club: ClubType::Iron,
            created_at: Utc::now(),
            frame_count: 90,
            phases: vec![
                SwingPhase::new(PhaseLabel::Takeaway, 0, 29, 0.0, 1000.0),
                SwingPhase::new(PhaseLabel::Transition, 30, 44, 1000.0, 1500.0),
                SwingPhase::new(PhaseLabel::Downswing, 45, 59, 1500.0, 2000.0),
                SwingPhase::new(PhaseLabel::Impact, 60, 62, 2000.0, 2100.0),
            ],
            low_confidence: false,
            metrics,
            faults: Vec::new(),
            comparison,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn too_few_swings_yield_none() {
        let mut tracker = ConsistencyTracker::default_config();
        assert!(tracker.assess().is_none());
        tracker.push(&analysis(3.0, 88.0, 0.7));
        assert!(tracker.assess().is_none());
    }

    #[test]
    fn identical_swings_score_high() {
        let mut tracker = ConsistencyTracker::default_config();
        for _ in 0..8 {
            tracker.push(&analysis(3.0, 88.0, 0.7));
        }
        let result = tracker.assess().unwrap();
        assert!(result.overall > 0.95, "overall {}", result.overall);
        assert!(result.temporal > 0.95);
        assert!(result.spatial > 0.95);
        assert!(result.repeatability > 0.95);
        assert_eq!(result.trend, Trend::Stable);
        assert_eq!(result.swing_count, 8);
    }

    #[test]
    fn scattered_swings_score_lower() {
        let mut steady = ConsistencyTracker::default_config();
        let mut scattered = ConsistencyTracker::default_config();
        for i in 0..8 {
            steady.push(&analysis(3.0, 88.0, 0.7));
            let wobble = 1.0 + 0.5 * (i % 3) as f64;
            scattered.push(&analysis(2.0 * wobble, 60.0 * wobble, 0.7));
        }

        let steady_result = steady.assess().unwrap();
        let scattered_result = scattered.assess().unwrap();
        assert!(
            steady_result.overall > scattered_result.overall,
            "steady {} vs scattered {}",
            steady_result.overall,
            scattered_result.overall
        );
    }

    #[test]
    fn rising_scores_trend_improving() {
        let mut tracker = ConsistencyTracker::default_config();
        for i in 0..10 {
            tracker.push(&analysis(3.0, 88.0, 0.3 + 0.05 * f64::from(i)));
        }
        assert_eq!(tracker.assess().unwrap().trend, Trend::Improving);
    }

    #[test]
    fn falling_scores_trend_declining() {
        let mut tracker = ConsistencyTracker::default_config();
        for i in 0..10 {
            tracker.push(&analysis(3.0, 88.0, 0.8 - 0.05 * f64::from(i)));
        }
        assert_eq!(tracker.assess().unwrap().trend, Trend::Declining);
    }

    #[test]
    fn scores_bounded() {
        let mut tracker = ConsistencyTracker::default_config();
        for i in 0..12 {
            tracker.push(&analysis(
                1.0 + f64::from(i),
                30.0 + 10.0 * f64::from(i),
                0.1 * f64::from(i % 10),
            ));
        }
        let result = tracker.assess().unwrap();
        for score in [
            result.overall,
            result.temporal,
            result.spatial,
            result.kinematic,
            result.repeatability,
        ] {
            assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
        }
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut tracker = ConsistencyTracker::new(ConsistencyConfig {
            capacity: 3,
            ..ConsistencyConfig::default()
        });
        for i in 0..5 {
            tracker.push(&analysis(3.0, 88.0, 0.1 * f64::from(i)));
        }
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn clear_empties_tracker() {
        let mut tracker = ConsistencyTracker::default_config();
        tracker.push(&analysis(3.0, 88.0, 0.7));
        tracker.push(&analysis(3.0, 88.0, 0.7));
        assert!(!tracker.is_empty());
        tracker.clear();
        assert!(tracker.is_empty());
        assert!(tracker.assess().is_none());
    }
}
