//! Biomechanical metric computation.
//!
//! Metrics are computed per frame from confidence-gated keypoints and
//! aggregated over phase ranges (mean or extremum, metric-dependent).
//! A keypoint below the confidence threshold is excluded from that
//! frame's computation; when every frame of the aggregation window fails
//! the gate, the metric is reported as unavailable rather than as a
//! value that could be mistaken for a measurement.
//!
//! Rotational angles are measured in the transverse plane (x–z) when
//! depth is available and fall back to the image plane otherwise, in
//! which case the metric is graded degraded.

use crate::kinematics::BodySegment;
use crate::phases::PhaseSet;
use serde::{Deserialize, Serialize};
use swinglab_core::{LandmarkType, MetricValue, PhaseLabel, PoseFrame};
use swinglab_signal::{
    angle_between_deg, distance, fit_line, joint_angle_deg, midpoint, segment_angle_deg,
    unwrap_degrees, variance, Point3,
};

/// Golfer handedness; determines the lead (target-side) arm and leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    /// Right-handed golfer, left side leads
    Right,
    /// Left-handed golfer, right side leads
    Left,
}

impl Handedness {
    /// Lead-side shoulder/elbow/wrist landmarks.
    #[must_use]
    pub fn lead_arm(&self) -> (LandmarkType, LandmarkType, LandmarkType) {
        match self {
            Self::Right => (
                LandmarkType::LeftShoulder,
                LandmarkType::LeftElbow,
                LandmarkType::LeftWrist,
            ),
            Self::Left => (
                LandmarkType::RightShoulder,
                LandmarkType::RightElbow,
                LandmarkType::RightWrist,
            ),
        }
    }
}

/// Configuration for the metrics calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Keypoints below this confidence are excluded from computation
    pub confidence_threshold: f64,
    /// Golfer handedness
    pub handedness: Handedness,
    /// Sensitivity of the balance score to positional variance
    pub balance_sensitivity: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            handedness: Handedness::Right,
            balance_sensitivity: 40.0,
        }
    }
}

/// Swing-level biomechanical metrics, each a graded measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwingMetrics {
    /// Peak shoulder-line rotation away from address (degrees)
    pub shoulder_turn: MetricValue,
    /// Peak hip-line rotation away from address (degrees)
    pub hip_turn: MetricValue,
    /// Mean knee flexion through the downswing (degrees)
    pub knee_flexion: MetricValue,
    /// Lead-arm elbow angle at impact (degrees, 180 = fully extended)
    pub arm_extension: MetricValue,
    /// Peak head drift from the address baseline, normalized by torso
    /// length
    pub head_displacement: MetricValue,
    /// Lateral weight position at impact: 0 = fully lead side, 1 = fully
    /// trail side
    pub weight_distribution: MetricValue,
    /// Inclination of the hand path through backswing and downswing
    /// relative to the ground (degrees)
    pub swing_plane_angle: MetricValue,
    /// Backswing duration over downswing duration
    pub tempo_ratio: MetricValue,
    /// Stability of head and pelvis from address to impact [0, 1]
    pub balance: MetricValue,
}

impl SwingMetrics {
    /// All metrics unavailable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            shoulder_turn: MetricValue::unavailable(),
            hip_turn: MetricValue::unavailable(),
            knee_flexion: MetricValue::unavailable(),
            arm_extension: MetricValue::unavailable(),
            head_displacement: MetricValue::unavailable(),
            weight_distribution: MetricValue::unavailable(),
            swing_plane_angle: MetricValue::unavailable(),
            tempo_ratio: MetricValue::unavailable(),
            balance: MetricValue::unavailable(),
        }
    }

    /// The metric values in declaration order.
    #[must_use]
    pub fn values(&self) -> [&MetricValue; 9] {
        [
            &self.shoulder_turn,
            &self.hip_turn,
            &self.knee_flexion,
            &self.arm_extension,
            &self.head_displacement,
            &self.weight_distribution,
            &self.swing_plane_angle,
            &self.tempo_ratio,
            &self.balance,
        ]
    }

    /// Number of available metrics.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.values().iter().filter(|m| m.is_available()).count()
    }

    /// Fraction of metrics that are unavailable.
    #[must_use]
    pub fn unavailable_fraction(&self) -> f64 {
        let values = self.values();
        let unavailable = values.iter().filter(|m| !m.is_available()).count();
        unavailable as f64 / values.len() as f64
    }
}

/// Per-frame metrics for streaming consumers; baseline-free quantities
/// only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMetrics {
    /// Shoulder-line orientation (degrees)
    pub shoulder_angle: MetricValue,
    /// Hip-line orientation (degrees)
    pub hip_angle: MetricValue,
    /// Mean knee flexion (degrees)
    pub knee_flexion: MetricValue,
    /// Lead-arm elbow angle (degrees)
    pub arm_extension: MetricValue,
    /// Lateral weight position, 0 = lead, 1 = trail
    pub weight_distribution: MetricValue,
}

/// Rotation-angle time series for the four analyzed body segments.
///
/// Entries are `None` where the frame's keypoints failed the confidence
/// gate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentSeries {
    /// Frame timestamps in milliseconds
    pub timestamps_ms: Vec<f64>,
    /// Pelvis (hip line) rotation angles, degrees
    pub pelvis: Vec<Option<f64>>,
    /// Torso (shoulder line) rotation angles, degrees
    pub torso: Vec<Option<f64>>,
    /// Lead arm orientation angles, degrees
    pub lead_arm: Vec<Option<f64>>,
    /// Club proxy (pelvis-to-hands line) orientation angles, degrees
    pub club: Vec<Option<f64>>,
}

impl SegmentSeries {
    /// An empty series.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of frames covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps_ms.len()
    }

    /// Returns `true` if the series covers no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps_ms.is_empty()
    }

    /// Angle series for one segment.
    #[must_use]
    pub fn angles(&self, segment: BodySegment) -> &[Option<f64>] {
        match segment {
            BodySegment::Pelvis => &self.pelvis,
            BodySegment::Torso => &self.torso,
            BodySegment::LeadArm => &self.lead_arm,
            BodySegment::Club => &self.club,
        }
    }

    /// Angular velocity in degrees per second for one segment.
    ///
    /// Gaps are bridged for differentiation but masked back out of the
    /// output, so a velocity is only reported where the underlying angle
    /// was measured.
    #[must_use]
    pub fn angular_velocity(&self, segment: BodySegment) -> Vec<Option<f64>> {
        let angles = self.angles(segment);
        let n = angles.len();
        if n < 3 {
            return vec![None; n];
        }

        // Bridge gaps by holding the nearest known value.
        let mut filled = Vec::with_capacity(n);
        let mut last: Option<f64> = None;
        for a in angles {
            if let Some(v) = a {
                last = Some(*v);
            }
            filled.push(last);
        }
        let first_known = match filled.iter().flatten().next() {
            Some(v) => *v,
            None => return vec![None; n],
        };
        let filled: Vec<f64> = filled
            .into_iter()
            .map(|v| v.unwrap_or(first_known))
            .collect();
        let unwrapped = unwrap_degrees(&filled);

        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            if angles[i].is_none() {
                out.push(None);
                continue;
            }
            let (lo, hi) = (i.saturating_sub(1), (i + 1).min(n - 1));
            let dt_ms = self.timestamps_ms[hi] - self.timestamps_ms[lo];
            if dt_ms <= 0.0 {
                out.push(None);
                continue;
            }
            let dps = (unwrapped[hi] - unwrapped[lo]) / dt_ms * 1000.0;
            out.push(Some(dps));
        }
        out
    }
}

/// Full output of a metrics pass over one swing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsOutput {
    /// Swing-level metrics
    pub metrics: SwingMetrics,
    /// Peak shoulder–hip separation, degrees, clamped to [0, 90]
    pub x_factor: MetricValue,
    /// Peak separation during the transition into the downswing
    pub x_factor_stretch: MetricValue,
    /// Segment rotation series feeding the kinematic and power analyses
    pub segments: SegmentSeries,
}

impl MetricsOutput {
    /// Everything unavailable; used when classification produced no
    /// phases.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            metrics: SwingMetrics::unavailable(),
            x_factor: MetricValue::unavailable(),
            x_factor_stretch: MetricValue::unavailable(),
            segments: SegmentSeries::empty(),
        }
    }
}

/// Address-phase reference values against which drift is measured.
struct AddressBaseline {
    shoulder_angle: Option<f64>,
    hip_angle: Option<f64>,
    nose: Option<Point3>,
    hip_mid: Option<Point3>,
    torso_length: Option<f64>,
    stance_width: Option<f64>,
}

/// Computes [`SwingMetrics`] and segment series from classified frames.
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    config: MetricsConfig,
}

impl MetricsCalculator {
    /// Creates a calculator with the given configuration.
    #[must_use]
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Creates a calculator with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::new(MetricsConfig::default())
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Computes swing-level metrics over a classified sequence.
    pub fn compute(&self, frames: &[PoseFrame], phases: &PhaseSet) -> MetricsOutput {
        if frames.is_empty() || phases.is_empty() {
            return MetricsOutput::unavailable();
        }

        let baseline = self.address_baseline(frames, phases);
        let segments = self.segment_series(frames);

        let (shoulder_turn, hip_turn, x_factor, x_factor_stretch) =
            self.rotation_metrics(&segments, &baseline, phases);

        let metrics = SwingMetrics {
            shoulder_turn,
            hip_turn,
            knee_flexion: self.knee_flexion(frames, phases),
            arm_extension: self.arm_extension(frames, phases),
            head_displacement: self.head_displacement(frames, phases, &baseline),
            weight_distribution: self.weight_distribution(frames, phases, &baseline),
            swing_plane_angle: self.swing_plane(frames, phases),
            tempo_ratio: self.tempo(frames, phases),
            balance: self.balance(frames, phases, &baseline),
        };

        MetricsOutput {
            metrics,
            x_factor,
            x_factor_stretch,
            segments,
        }
    }

    /// Computes baseline-free metrics for a single frame.
    #[must_use]
    pub fn frame_metrics(&self, frame: &PoseFrame) -> FrameMetrics {
        let to_value = |v: Option<(f64, f64)>| match v {
            Some((value, conf)) => MetricValue::valid(value, conf),
            None => MetricValue::unavailable(),
        };

        FrameMetrics {
            shoulder_angle: to_value(self.line_angle(
                frame,
                LandmarkType::RightShoulder,
                LandmarkType::LeftShoulder,
            )),
            hip_angle: to_value(self.line_angle(
                frame,
                LandmarkType::RightHip,
                LandmarkType::LeftHip,
            )),
            knee_flexion: to_value(self.frame_knee_flexion(frame)),
            arm_extension: to_value(self.frame_arm_extension(frame)),
            weight_distribution: to_value(self.frame_weight_distribution(frame, None)),
        }
    }

    /// Hip-midpoint trajectory in normalized coordinates, `None` where
    /// the hips fail the confidence gate. Feeds the power estimator.
    #[must_use]
    pub fn pelvis_path(&self, frames: &[PoseFrame]) -> Vec<Option<Point3>> {
        frames
            .iter()
            .map(|frame| {
                self.mid_point(frame, LandmarkType::LeftHip, LandmarkType::RightHip)
                    .map(|(p, _)| p)
            })
            .collect()
    }

    // -- keypoint access ----------------------------------------------------

    fn point(&self, frame: &PoseFrame, landmark: LandmarkType) -> Option<(Point3, f64)> {
        let kp = frame.keypoint_above(landmark, self.config.confidence_threshold as f32)?;
        let z = kp.z.map_or(0.0, f64::from);
        Some((
            [f64::from(kp.x), f64::from(kp.y), z],
            f64::from(kp.confidence.value()),
        ))
    }

    fn mid_point(
        &self,
        frame: &PoseFrame,
        left: LandmarkType,
        right: LandmarkType,
    ) -> Option<(Point3, f64)> {
        let (l, cl) = self.point(frame, left)?;
        let (r, cr) = self.point(frame, right)?;
        Some((midpoint(l, r), f64::midpoint(cl, cr)))
    }

    /// Orientation of the right-to-left body line, in the transverse
    /// plane when depth is available, otherwise in the image plane.
    fn line_angle(
        &self,
        frame: &PoseFrame,
        right: LandmarkType,
        left: LandmarkType,
    ) -> Option<(f64, f64)> {
        let (r, cr) = self.point(frame, right)?;
        let (l, cl) = self.point(frame, left)?;
        let has_depth = frame.keypoint(right).is_some_and(|kp| kp.z.is_some())
            && frame.keypoint(left).is_some_and(|kp| kp.z.is_some());
        let axes = if has_depth { (0, 2) } else { (0, 1) };
        let angle = segment_angle_deg(r, l, axes)?;
        Some((angle, f64::midpoint(cr, cl)))
    }

    fn frame_knee_flexion(&self, frame: &PoseFrame) -> Option<(f64, f64)> {
        let legs = [
            (
                LandmarkType::LeftHip,
                LandmarkType::LeftKnee,
                LandmarkType::LeftAnkle,
            ),
            (
                LandmarkType::RightHip,
                LandmarkType::RightKnee,
                LandmarkType::RightAnkle,
            ),
        ];

        let mut values = Vec::new();
        let mut confs = Vec::new();
        for (hip, knee, ankle) in legs {
            let (Some((h, ch)), Some((k, ck)), Some((a, ca))) = (
                self.point(frame, hip),
                self.point(frame, knee),
                self.point(frame, ankle),
            ) else {
                continue;
            };
            if let Some(angle) = joint_angle_deg(h, k, a) {
                values.push(180.0 - angle);
                confs.push((ch + ck + ca) / 3.0);
            }
        }

        if values.is_empty() {
            return None;
        }
        let value = values.iter().sum::<f64>() / values.len() as f64;
        let conf = confs.iter().sum::<f64>() / confs.len() as f64;
        Some((value, conf))
    }

    fn frame_arm_extension(&self, frame: &PoseFrame) -> Option<(f64, f64)> {
        let (shoulder, elbow, wrist) = self.config.handedness.lead_arm();
        let (s, cs) = self.point(frame, shoulder)?;
        let (e, ce) = self.point(frame, elbow)?;
        let (w, cw) = self.point(frame, wrist)?;
        let angle = joint_angle_deg(s, e, w)?;
        Some((angle, (cs + ce + cw) / 3.0))
    }

    fn frame_weight_distribution(
        &self,
        frame: &PoseFrame,
        baseline_stance: Option<f64>,
    ) -> Option<(f64, f64)> {
        let (hip_mid, ch) = self.mid_point(frame, LandmarkType::LeftHip, LandmarkType::RightHip)?;
        let (ankle_mid, ca) =
            self.mid_point(frame, LandmarkType::LeftAnkle, LandmarkType::RightAnkle)?;

        let stance = match baseline_stance {
            Some(w) if w > 1e-6 => w,
            _ => {
                let (l, _) = self.point(frame, LandmarkType::LeftAnkle)?;
                let (r, _) = self.point(frame, LandmarkType::RightAnkle)?;
                let w = (l[0] - r[0]).abs();
                if w < 1e-6 {
                    return None;
                }
                w
            }
        };

        // Offset toward the trail side raises the value. Facing the
        // camera, a right-handed golfer's trail side is image-space -x.
        let offset = hip_mid[0] - ankle_mid[0];
        let signed = match self.config.handedness {
            Handedness::Right => -offset,
            Handedness::Left => offset,
        };
        let value = (0.5 + signed / stance).clamp(0.0, 1.0);
        Some((value, f64::midpoint(ch, ca)))
    }

    // -- baselines and series -----------------------------------------------

    fn address_baseline(&self, frames: &[PoseFrame], phases: &PhaseSet) -> AddressBaseline {
        let range = phases
            .get(PhaseLabel::Address)
            .or_else(|| phases.get(PhaseLabel::Setup))
            .map_or(0..1.min(frames.len()), |p| {
                p.start_frame..(p.end_frame + 1).min(frames.len())
            });

        let mut shoulder = Vec::new();
        let mut hip = Vec::new();
        let mut noses: Vec<Point3> = Vec::new();
        let mut hip_mids: Vec<Point3> = Vec::new();
        let mut torso = Vec::new();
        let mut stance = Vec::new();

        for frame in &frames[range] {
            if let Some((a, _)) =
                self.line_angle(frame, LandmarkType::RightShoulder, LandmarkType::LeftShoulder)
            {
                shoulder.push(a);
            }
            if let Some((a, _)) = self.line_angle(frame, LandmarkType::RightHip, LandmarkType::LeftHip)
            {
                hip.push(a);
            }
            if let Some((p, _)) = self.point(frame, LandmarkType::Nose) {
                noses.push(p);
            }
            let shoulder_mid =
                self.mid_point(frame, LandmarkType::LeftShoulder, LandmarkType::RightShoulder);
            let hip_mid = self.mid_point(frame, LandmarkType::LeftHip, LandmarkType::RightHip);
            if let (Some((s, _)), Some((h, _))) = (shoulder_mid, hip_mid) {
                torso.push(distance(s, h));
                hip_mids.push(h);
            }
            if let (Some((l, _)), Some((r, _))) = (
                self.point(frame, LandmarkType::LeftAnkle),
                self.point(frame, LandmarkType::RightAnkle),
            ) {
                let w = (l[0] - r[0]).abs();
                if w > 1e-6 {
                    stance.push(w);
                }
            }
        }

        let mean_point = |pts: &[Point3]| -> Option<Point3> {
            if pts.is_empty() {
                return None;
            }
            let n = pts.len() as f64;
            Some([
                pts.iter().map(|p| p[0]).sum::<f64>() / n,
                pts.iter().map(|p| p[1]).sum::<f64>() / n,
                pts.iter().map(|p| p[2]).sum::<f64>() / n,
            ])
        };
        let mean_of = |v: &[f64]| -> Option<f64> {
            if v.is_empty() {
                None
            } else {
                Some(v.iter().sum::<f64>() / v.len() as f64)
            }
        };

        AddressBaseline {
            shoulder_angle: mean_of(&shoulder),
            hip_angle: mean_of(&hip),
            nose: mean_point(&noses),
            hip_mid: mean_point(&hip_mids),
            torso_length: mean_of(&torso).filter(|t| *t > 1e-6),
            stance_width: mean_of(&stance),
        }
    }

    fn segment_series(&self, frames: &[PoseFrame]) -> SegmentSeries {
        let (lead_shoulder, _, lead_wrist) = self.config.handedness.lead_arm();
        let mut series = SegmentSeries {
            timestamps_ms: Vec::with_capacity(frames.len()),
            pelvis: Vec::with_capacity(frames.len()),
            torso: Vec::with_capacity(frames.len()),
            lead_arm: Vec::with_capacity(frames.len()),
            club: Vec::with_capacity(frames.len()),
        };

        for frame in frames {
            series.timestamps_ms.push(frame.timestamp_ms);
            series.pelvis.push(
                self.line_angle(frame, LandmarkType::RightHip, LandmarkType::LeftHip)
                    .map(|(a, _)| a),
            );
            series.torso.push(
                self.line_angle(frame, LandmarkType::RightShoulder, LandmarkType::LeftShoulder)
                    .map(|(a, _)| a),
            );

            let arm = match (self.point(frame, lead_shoulder), self.point(frame, lead_wrist)) {
                (Some((s, _)), Some((w, _))) => segment_angle_deg(s, w, (0, 1)),
                _ => None,
            };
            series.lead_arm.push(arm);

            let club = match (
                self.mid_point(frame, LandmarkType::LeftHip, LandmarkType::RightHip),
                self.mid_point(frame, LandmarkType::LeftWrist, LandmarkType::RightWrist),
            ) {
                (Some((h, _)), Some((w, _))) => segment_angle_deg(h, w, (0, 1)),
                _ => None,
            };
            series.club.push(club);
        }

        series
    }

    // -- swing-level metrics ------------------------------------------------

    /// Peak shoulder turn, hip turn, and their separation.
    fn rotation_metrics(
        &self,
        segments: &SegmentSeries,
        baseline: &AddressBaseline,
        phases: &PhaseSet,
    ) -> (MetricValue, MetricValue, MetricValue, MetricValue) {
        let (Some(base_shoulder), Some(base_hip)) = (baseline.shoulder_angle, baseline.hip_angle)
        else {
            return (
                MetricValue::unavailable(),
                MetricValue::unavailable(),
                MetricValue::unavailable(),
                MetricValue::unavailable(),
            );
        };

        let turn_range = phase_span(phases, PhaseLabel::Takeaway, PhaseLabel::Transition);
        let stretch_range = phase_span(phases, PhaseLabel::Transition, PhaseLabel::Downswing);

        let shoulder_turns: Vec<(usize, f64)> = indexed_turns(&segments.torso, base_shoulder);
        let hip_turns: Vec<(usize, f64)> = indexed_turns(&segments.pelvis, base_hip);

        let peak_in = |turns: &[(usize, f64)], range: &Option<(usize, usize)>| -> Option<f64> {
            let (start, end) = (*range)?;
            turns
                .iter()
                .filter(|(i, _)| *i >= start && *i <= end)
                .map(|(_, t)| *t)
                .fold(None, |acc: Option<f64>, t| {
                    Some(acc.map_or(t, |a| a.max(t)))
                })
        };

        let shoulder_turn = peak_in(&shoulder_turns, &turn_range)
            .map_or_else(MetricValue::unavailable, |v| MetricValue::valid(v, 1.0));
        let hip_turn = peak_in(&hip_turns, &turn_range)
            .map_or_else(MetricValue::unavailable, |v| MetricValue::valid(v, 1.0));

        // X-factor needs both lines in the same frame.
        let separations: Vec<(usize, f64)> = shoulder_turns
            .iter()
            .filter_map(|(i, s)| {
                hip_turns
                    .iter()
                    .find(|(j, _)| j == i)
                    .map(|(_, h)| (*i, (s - h).abs().clamp(0.0, 90.0)))
            })
            .collect();

        let x_factor = peak_in(&separations, &turn_range)
            .map_or_else(MetricValue::unavailable, |v| MetricValue::valid(v, 1.0));
        let x_factor_stretch = peak_in(&separations, &stretch_range)
            .map_or_else(MetricValue::unavailable, |v| MetricValue::valid(v, 1.0));

        (shoulder_turn, hip_turn, x_factor, x_factor_stretch)
    }

    fn knee_flexion(&self, frames: &[PoseFrame], phases: &PhaseSet) -> MetricValue {
        let range = phase_span(phases, PhaseLabel::Downswing, PhaseLabel::Downswing)
            .or_else(|| phase_span(phases, PhaseLabel::Address, PhaseLabel::Impact));
        self.mean_over(frames, range, |frame| self.frame_knee_flexion(frame))
    }

    fn arm_extension(&self, frames: &[PoseFrame], phases: &PhaseSet) -> MetricValue {
        let range = phase_span(phases, PhaseLabel::Impact, PhaseLabel::Impact);
        self.mean_over(frames, range, |frame| self.frame_arm_extension(frame))
    }

    fn head_displacement(
        &self,
        frames: &[PoseFrame],
        phases: &PhaseSet,
        baseline: &AddressBaseline,
    ) -> MetricValue {
        let (Some(base_nose), Some(torso)) = (baseline.nose, baseline.torso_length) else {
            return MetricValue::unavailable();
        };
        let Some((start, end)) = phase_span(phases, PhaseLabel::Takeaway, PhaseLabel::Impact)
        else {
            return MetricValue::unavailable();
        };

        let mut peak: Option<f64> = None;
        let mut confs = Vec::new();
        for frame in &frames[start..=end.min(frames.len() - 1)] {
            if let Some((nose, c)) = self.point(frame, LandmarkType::Nose) {
                let drift = distance(nose, base_nose) / torso;
                peak = Some(peak.map_or(drift, |p| p.max(drift)));
                confs.push(c);
            }
        }

        match peak {
            Some(v) => MetricValue::valid(v, mean_or_zero(&confs)),
            None => MetricValue::unavailable(),
        }
    }

    fn weight_distribution(
        &self,
        frames: &[PoseFrame],
        phases: &PhaseSet,
        baseline: &AddressBaseline,
    ) -> MetricValue {
        let range = phase_span(phases, PhaseLabel::Impact, PhaseLabel::Impact);
        self.mean_over(frames, range, |frame| {
            self.frame_weight_distribution(frame, baseline.stance_width)
        })
    }

    fn swing_plane(&self, frames: &[PoseFrame], phases: &PhaseSet) -> MetricValue {
        let Some((start, end)) = phase_span(phases, PhaseLabel::Backswing, PhaseLabel::Impact)
        else {
            return MetricValue::unavailable();
        };

        let mut xs = Vec::new();
        let mut heights = Vec::new();
        let mut confs = Vec::new();
        for frame in &frames[start..=end.min(frames.len() - 1)] {
            if let Some((w, c)) =
                self.mid_point(frame, LandmarkType::LeftWrist, LandmarkType::RightWrist)
            {
                xs.push(w[0]);
                heights.push(1.0 - w[1]);
                confs.push(c);
            }
        }

        match fit_line(&xs, &heights) {
            Some(fit) if xs.len() >= 4 => {
                MetricValue::valid(fit.inclination_deg(), mean_or_zero(&confs))
            }
            _ => MetricValue::unavailable(),
        }
    }

    fn tempo(&self, frames: &[PoseFrame], phases: &PhaseSet) -> MetricValue {
        let (Some(backswing), Some(downswing)) = (phases.backswing_ms(), phases.downswing_ms())
        else {
            return MetricValue::unavailable();
        };

        // Tempo is structural, but it is only as trustworthy as the pose
        // data the boundaries were derived from.
        let mean_conf = mean_or_zero(
            &frames
                .iter()
                .map(|f| f64::from(f.confidence().value()))
                .collect::<Vec<_>>(),
        );
        if mean_conf < self.config.confidence_threshold {
            return MetricValue::unavailable();
        }

        MetricValue::valid(backswing / downswing, mean_conf)
    }

    fn balance(
        &self,
        frames: &[PoseFrame],
        phases: &PhaseSet,
        baseline: &AddressBaseline,
    ) -> MetricValue {
        let (Some(base_nose), Some(base_hip), Some(torso)) =
            (baseline.nose, baseline.hip_mid, baseline.torso_length)
        else {
            return MetricValue::unavailable();
        };
        let Some((start, end)) = phase_span(phases, PhaseLabel::Address, PhaseLabel::Impact)
        else {
            return MetricValue::unavailable();
        };

        let mut head_drift = Vec::new();
        let mut hip_drift = Vec::new();
        let mut confs = Vec::new();
        for frame in &frames[start..=end.min(frames.len() - 1)] {
            if let Some((nose, c)) = self.point(frame, LandmarkType::Nose) {
                head_drift.push(distance(nose, base_nose) / torso);
                confs.push(c);
            }
            if let Some((h, c)) =
                self.mid_point(frame, LandmarkType::LeftHip, LandmarkType::RightHip)
            {
                hip_drift.push(distance(h, base_hip) / torso);
                confs.push(c);
            }
        }

        if head_drift.len() < 2 && hip_drift.len() < 2 {
            return MetricValue::unavailable();
        }

        let total_variance = variance(&head_drift) + variance(&hip_drift);
        let score = (1.0 / (1.0 + self.config.balance_sensitivity * total_variance)).clamp(0.0, 1.0);
        MetricValue::valid(score, mean_or_zero(&confs))
    }

    /// Mean of a per-frame quantity over a frame range; unavailable when
    /// no frame in the range passes the confidence gate.
    fn mean_over(
        &self,
        frames: &[PoseFrame],
        range: Option<(usize, usize)>,
        mut per_frame: impl FnMut(&PoseFrame) -> Option<(f64, f64)>,
    ) -> MetricValue {
        let Some((start, end)) = range else {
            return MetricValue::unavailable();
        };

        let mut values = Vec::new();
        let mut confs = Vec::new();
        for frame in &frames[start..=end.min(frames.len() - 1)] {
            if let Some((v, c)) = per_frame(frame) {
                values.push(v);
                confs.push(c);
            }
        }

        if values.is_empty() {
            return MetricValue::unavailable();
        }
        MetricValue::valid(mean_or_zero(&values), mean_or_zero(&confs))
    }
}

/// Frame span covered by the inclusive phase range `[from, to]`,
/// shrinking to whatever part of the range was classified.
fn phase_span(phases: &PhaseSet, from: PhaseLabel, to: PhaseLabel) -> Option<(usize, usize)> {
    let in_range: Vec<&swinglab_core::SwingPhase> = phases
        .phases
        .iter()
        .filter(|p| p.label >= from && p.label <= to)
        .collect();
    let first = in_range.first()?;
    let last = in_range.last()?;
    Some((first.start_frame, last.end_frame))
}

/// Absolute rotation away from a baseline angle, per frame.
fn indexed_turns(angles: &[Option<f64>], baseline: f64) -> Vec<(usize, f64)> {
    angles
        .iter()
        .enumerate()
        .filter_map(|(i, a)| a.map(|angle| (i, angle_between_deg(angle, baseline))))
        .collect()
}

fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
