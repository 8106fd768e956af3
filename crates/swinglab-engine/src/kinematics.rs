//! Kinematic sequence analysis.
//!
//! An efficient downswing accelerates body segments proximal-to-distal:
//! pelvis first, then torso, lead arm, and finally the club. The analyzer
//! orders the four segments by the time their angular velocity peaks
//! inside the downswing window and scores how closely that order and its
//! timing gaps match the ideal chain.

use crate::metrics::SegmentSeries;
use crate::phases::PhaseSet;
use serde::{Deserialize, Serialize};
use swinglab_core::PhaseLabel;

/// Body segments analyzed for the kinematic sequence, in ideal
/// proximal-to-distal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodySegment {
    /// Pelvis (hip line)
    Pelvis,
    /// Torso (shoulder line)
    Torso,
    /// Lead arm
    LeadArm,
    /// Club proxy (hands relative to pelvis)
    Club,
}

impl BodySegment {
    /// All segments in ideal firing order.
    #[must_use]
    pub fn all() -> &'static [Self; 4] {
        &[Self::Pelvis, Self::Torso, Self::LeadArm, Self::Club]
    }

    /// Returns the segment name as a string tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pelvis => "pelvis",
            Self::Torso => "torso",
            Self::LeadArm => "lead_arm",
            Self::Club => "club",
        }
    }

    /// Position of this segment in the ideal proximal-to-distal chain.
    #[must_use]
    pub fn chain_rank(&self) -> usize {
        match self {
            Self::Pelvis => 0,
            Self::Torso => 1,
            Self::LeadArm => 2,
            Self::Club => 3,
        }
    }
}

impl std::fmt::Display for BodySegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for the kinematic sequence analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Weight of peak-order correctness in the efficiency score
    pub order_weight: f64,
    /// Weight of peak-timing compactness in the efficiency score
    pub gap_weight: f64,
    /// Time-gap scale in milliseconds; larger total gaps reduce the
    /// timing component as `1 / (1 + gap/scale)`
    pub gap_scale_ms: f64,
    /// Efficiency at or above which a correctly ordered sequence is
    /// flagged optimal
    pub optimal_threshold: f64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            order_weight: 0.7,
            gap_weight: 0.3,
            gap_scale_ms: 300.0,
            optimal_threshold: 0.8,
        }
    }
}

/// Peak angular velocity of one segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SegmentPeak {
    /// Segment the peak belongs to
    pub segment: BodySegment,
    /// Peak angular speed in degrees per second
    pub peak_velocity_dps: f64,
    /// Time of the peak in milliseconds
    pub peak_time_ms: f64,
}

/// Result of kinematic sequence analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinematicSequence {
    /// Segment peaks ordered by time of occurrence
    pub peaks: Vec<SegmentPeak>,
    /// Sequencing efficiency [0, 1]; higher for correct order and
    /// smaller gaps
    pub efficiency: f64,
    /// Set when the peaks fire in the ideal proximal-to-distal order and
    /// the efficiency clears the configured threshold
    pub optimal: bool,
}

impl KinematicSequence {
    /// Peak order as segment tags, for compact logging.
    #[must_use]
    pub fn order(&self) -> Vec<BodySegment> {
        self.peaks.iter().map(|p| p.segment).collect()
    }
}

/// Orders segment velocity peaks and scores sequencing efficiency.
#[derive(Debug, Clone)]
pub struct KinematicSequenceAnalyzer {
    config: SequenceConfig,
}

impl KinematicSequenceAnalyzer {
    /// Creates an analyzer with the given configuration.
    #[must_use]
    pub fn new(config: SequenceConfig) -> Self {
        Self { config }
    }

    /// Creates an analyzer with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::new(SequenceConfig::default())
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// Analyzes the downswing window of the segment series.
    ///
    /// Returns `None` when any segment lacks a measurable velocity peak
    /// inside the window; a partial sequence would misrepresent the
    /// chain.
    #[must_use]
    pub fn analyze(&self, segments: &SegmentSeries, phases: &PhaseSet) -> Option<KinematicSequence> {
        let window = downswing_window(segments, phases)?;
        let (start, end) = window;

        let mut peaks = Vec::with_capacity(BodySegment::all().len());
        for &segment in BodySegment::all() {
            let velocity = segments.angular_velocity(segment);
            let mut best: Option<(usize, f64)> = None;
            for i in start..=end.min(velocity.len().saturating_sub(1)) {
                if let Some(v) = velocity[i] {
                    let speed = v.abs();
                    if best.is_none_or(|(_, b)| speed > b) {
                        best = Some((i, speed));
                    }
                }
            }
            let (idx, speed) = best?;
            peaks.push(SegmentPeak {
                segment,
                peak_velocity_dps: speed,
                peak_time_ms: segments.timestamps_ms[idx],
            });
        }

        // Order correctness before sorting by time.
        let mut correct_pairs = 0usize;
        for pair in peaks.windows(2) {
            if pair[0].peak_time_ms <= pair[1].peak_time_ms {
                correct_pairs += 1;
            }
        }
        let order_fraction = correct_pairs as f64 / (peaks.len() - 1) as f64;

        peaks.sort_by(|a, b| a.peak_time_ms.total_cmp(&b.peak_time_ms));
        let total_gap_ms = peaks.last().map_or(0.0, |l| l.peak_time_ms)
            - peaks.first().map_or(0.0, |f| f.peak_time_ms);
        let gap_score = 1.0 / (1.0 + total_gap_ms.max(0.0) / self.config.gap_scale_ms);

        let efficiency = (self.config.order_weight * order_fraction
            + self.config.gap_weight * gap_score)
            .clamp(0.0, 1.0);
        let optimal =
            (order_fraction - 1.0).abs() < f64::EPSILON && efficiency >= self.config.optimal_threshold;

        Some(KinematicSequence {
            peaks,
            efficiency,
            optimal,
        })
    }
}

/// Frame window of the downswing: transition start through impact end,
/// falling back to the second half of the series when those phases are
/// absent.
fn downswing_window(segments: &SegmentSeries, phases: &PhaseSet) -> Option<(usize, usize)> {
    let n = segments.len();
    if n < 3 {
        return None;
    }

    let start = phases
        .get(PhaseLabel::Transition)
        .or_else(|| phases.get(PhaseLabel::Downswing))
        .map(|p| p.start_frame);
    let end = phases
        .get(PhaseLabel::Impact)
        .or_else(|| phases.get(PhaseLabel::Downswing))
        .map(|p| p.end_frame);

    match (start, end) {
        (Some(s), Some(e)) if s < e => Some((s, e.min(n - 1))),
        _ => Some((n / 2, n - 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a segment series whose angular velocities peak at the
    /// given frames (30 ms frame spacing, 100 frames).
    fn series_with_peaks(pelvis: usize, torso: usize, arm: usize, club: usize) -> SegmentSeries {
        let n = 100;
        // A raised-cosine bump centered on `peak` produces a clean
        // velocity maximum at the center of the rise.
        let bump = |peak: usize| -> Vec<Option<f64>> {
            (0..n)
                .map(|i| {
                    let t = (i as f64 - peak as f64) / 8.0;
                    Some(90.0 / (1.0 + t * t))
                })
                .collect()
        };

        SegmentSeries {
            timestamps_ms: (0..n).map(|i| i as f64 * 30.0).collect(),
            pelvis: bump(pelvis),
            torso: bump(torso),
            lead_arm: bump(arm),
            club: bump(club),
        }
    }

    fn full_window_phases() -> PhaseSet {
        // No classified phases: analyzer falls back to the second half.
        PhaseSet::empty()
    }

    #[test]
    fn ideal_order_scores_high() {
        let analyzer = KinematicSequenceAnalyzer::default_config();
        let series = series_with_peaks(60, 64, 68, 72);
        let seq = analyzer
            .analyze(&series, &full_window_phases())
            .expect("sequence");

        assert_eq!(
            seq.order(),
            vec![
                BodySegment::Pelvis,
                BodySegment::Torso,
                BodySegment::LeadArm,
                BodySegment::Club
            ]
        );
        assert!(seq.efficiency > 0.8, "efficiency {}", seq.efficiency);
        assert!(seq.optimal);
    }

    #[test]
    fn reversed_order_scores_low() {
        let analyzer = KinematicSequenceAnalyzer::default_config();
        let series = series_with_peaks(72, 68, 64, 60);
        let seq = analyzer
            .analyze(&series, &full_window_phases())
            .expect("sequence");

        assert!(!seq.optimal);
        assert!(seq.efficiency < 0.5, "efficiency {}", seq.efficiency);
    }

    #[test]
    fn wider_gaps_score_lower_than_tight_gaps() {
        let analyzer = KinematicSequenceAnalyzer::default_config();
        let tight = analyzer
            .analyze(&series_with_peaks(60, 62, 64, 66), &full_window_phases())
            .unwrap();
        let wide = analyzer
            .analyze(&series_with_peaks(52, 62, 72, 82), &full_window_phases())
            .unwrap();

        assert!(
            tight.efficiency > wide.efficiency,
            "tight {} vs wide {}",
            tight.efficiency,
            wide.efficiency
        );
    }

    #[test]
    fn efficiency_bounded() {
        let analyzer = KinematicSequenceAnalyzer::default_config();
        for peaks in [(60, 64, 68, 72), (72, 68, 64, 60), (60, 60, 60, 60)] {
            let seq = analyzer
                .analyze(
                    &series_with_peaks(peaks.0, peaks.1, peaks.2, peaks.3),
                    &full_window_phases(),
                )
                .unwrap();
            assert!((0.0..=1.0).contains(&seq.efficiency));
        }
    }

    #[test]
    fn missing_segment_yields_none() {
        let analyzer = KinematicSequenceAnalyzer::default_config();
        let mut series = series_with_peaks(60, 64, 68, 72);
        series.club = vec![None; series.len()];
        assert!(analyzer.analyze(&series, &full_window_phases()).is_none());
    }

    #[test]
    fn short_series_yields_none() {
        let analyzer = KinematicSequenceAnalyzer::default_config();
        let series = SegmentSeries {
            timestamps_ms: vec![0.0, 30.0],
            pelvis: vec![Some(0.0), Some(1.0)],
            torso: vec![Some(0.0), Some(1.0)],
            lead_arm: vec![Some(0.0), Some(1.0)],
            club: vec![Some(0.0), Some(1.0)],
        };
        assert!(analyzer.analyze(&series, &full_window_phases()).is_none());
    }
}
