//! Swing phase classification.
//!
//! The classifier tracks one scalar signal per frame: the height of the
//! midpoint between the wrist keypoints, converted to height-up
//! coordinates (`1 - y`). Local extrema of the smoothed signal, gated by
//! a derivative-persistence rule, are mapped onto the ordered phase
//! template: low plateau = address, sustained ascent = takeaway, global
//! maximum in the early portion = top of backswing, sustained descent =
//! downswing, return to address height = impact, the post-impact rise =
//! follow-through, and the final settling = finish.
//!
//! Classification is batch over a buffered sequence and deterministic:
//! the same input always yields the same boundaries. Streaming callers
//! re-run it over a trailing window.

use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use swinglab_core::{LandmarkType, PhaseLabel, PoseFrame, SwingPhase};
use swinglab_signal::{
    argmax_range, argmin_range, find_extrema, forward_diff, moving_average,
    sustained_sign_change, ExtremumKind,
};

/// Configuration for the phase classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseClassifierConfig {
    /// Moving-average window for the hand-height signal (frames)
    pub smoothing_window: usize,
    /// Consecutive frames a derivative sign must persist to count
    pub persistence: usize,
    /// Minimum frames per phase the classifier aims for
    pub min_phase_frames: usize,
    /// Below this many frames the result is flagged low-confidence
    pub min_viable_frames: usize,
    /// Fraction of the sequence searched for the top of backswing
    pub top_search_fraction: f64,
    /// Minimum fraction of frames with usable wrist landmarks
    pub required_landmark_fraction: f64,
    /// Height tolerance for "returned to address height", as a fraction
    /// of the swing amplitude
    pub address_height_tolerance: f64,
}

impl Default for PhaseClassifierConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            persistence: 3,
            min_phase_frames: 3,
            min_viable_frames: 8,
            top_search_fraction: 0.6,
            required_landmark_fraction: 0.5,
            address_height_tolerance: 0.12,
        }
    }
}

/// Result of classifying one frame sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSet {
    /// Classified phases, ordered by label rank, contiguous over the
    /// frame range
    pub phases: Vec<SwingPhase>,
    /// Set when the sequence was too short or a template landmark had to
    /// fall back to its canonical position
    pub low_confidence: bool,
}

impl PhaseSet {
    /// An empty phase set.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            phases: Vec::new(),
            low_confidence: false,
        }
    }

    /// Returns `true` if no phases were classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Finds the phase with the given label.
    #[must_use]
    pub fn get(&self, label: PhaseLabel) -> Option<&SwingPhase> {
        self.phases.iter().find(|p| p.label == label)
    }

    /// Finds the phase covering the given frame index.
    #[must_use]
    pub fn at_frame(&self, frame: usize) -> Option<&SwingPhase> {
        self.phases.iter().find(|p| p.contains(frame))
    }

    /// Backswing duration in milliseconds: takeaway start to top.
    #[must_use]
    pub fn backswing_ms(&self) -> Option<f64> {
        let start = self
            .get(PhaseLabel::Takeaway)
            .or_else(|| self.get(PhaseLabel::Backswing))?;
        let top = self
            .get(PhaseLabel::Transition)
            .or_else(|| self.get(PhaseLabel::Backswing))?;
        let duration = top.end_ms - start.start_ms;
        (duration > 0.0).then_some(duration)
    }

    /// Downswing duration in milliseconds.
    #[must_use]
    pub fn downswing_ms(&self) -> Option<f64> {
        let down = self.get(PhaseLabel::Downswing)?;
        let end = self.get(PhaseLabel::Impact).map_or(down.end_ms, |i| i.end_ms);
        let duration = end - down.start_ms;
        (duration > 0.0).then_some(duration)
    }

    /// Returns `true` when the terminal phase was classified.
    #[must_use]
    pub fn finish_detected(&self) -> bool {
        self.phases.last().is_some_and(|p| p.label.is_terminal())
    }
}

/// Template landmarks located on the hand-height signal.
///
/// Indices are phase START boundaries, in frame coordinates.
#[derive(Debug, Clone, Copy)]
struct Boundaries {
    address: usize,
    takeaway: usize,
    backswing: usize,
    transition: usize,
    downswing: usize,
    impact: usize,
    follow_through: usize,
    finish: usize,
    fallback_used: bool,
}

/// State machine classifying pose frames into swing phases.
#[derive(Debug, Clone)]
pub struct PhaseClassifier {
    config: PhaseClassifierConfig,
}

impl PhaseClassifier {
    /// Creates a classifier with the given configuration.
    #[must_use]
    pub fn new(config: PhaseClassifierConfig) -> Self {
        Self { config }
    }

    /// Creates a classifier with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::new(PhaseClassifierConfig::default())
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &PhaseClassifierConfig {
        &self.config
    }

    /// Classifies a frame sequence into swing phases.
    ///
    /// - Empty input returns an empty phase set, not an error.
    /// - A single frame returns one degenerate address phase.
    /// - Short sequences are classified with the low-confidence flag set.
    ///
    /// # Errors
    ///
    /// [`EngineError::MissingRequiredLandmark`] when wrist keypoints are
    /// absent in more than the configured fraction of frames; the caller
    /// is expected to surface this as an insufficient-data fault.
    pub fn classify(&self, frames: &[PoseFrame]) -> Result<PhaseSet> {
        let n = frames.len();
        if n == 0 {
            return Ok(PhaseSet::empty());
        }

        let (heights, usable_fraction) = hand_height_signal(frames);
        if usable_fraction < self.config.required_landmark_fraction {
            return Err(EngineError::MissingRequiredLandmark { usable_fraction });
        }

        if n == 1 {
            let phase = SwingPhase::new(
                PhaseLabel::Address,
                0,
                0,
                frames[0].timestamp_ms,
                frames[0].timestamp_ms,
            );
            return Ok(PhaseSet {
                phases: vec![phase],
                low_confidence: true,
            });
        }

        let smooth = moving_average(&heights, self.config.smoothing_window);
        let derivative = forward_diff(&smooth);
        let boundaries = self.locate_boundaries(&smooth, &derivative, n);

        let phases = assemble_phases(frames, &boundaries, n);
        let low_confidence = boundaries.fallback_used || n < self.config.min_viable_frames;

        if low_confidence {
            tracing::debug!(
                frames = n,
                fallback = boundaries.fallback_used,
                "phase classification flagged low-confidence"
            );
        }

        Ok(PhaseSet {
            phases,
            low_confidence,
        })
    }

    /// Locates the phase start boundaries on the smoothed signal.
    fn locate_boundaries(&self, smooth: &[f64], derivative: &[f64], n: usize) -> Boundaries {
        let k = self.config.persistence;
        let mut fallback = false;

        let min_h = smooth.iter().copied().fold(f64::MAX, f64::min);
        let max_h = smooth.iter().copied().fold(f64::MIN, f64::max);
        let amplitude = max_h - min_h;

        if amplitude < 1e-6 {
            // Flat signal: nothing to match, fall back to the canonical
            // template proportions entirely.
            return canonical_boundaries(n);
        }

        // Top of backswing: the highest persistence-gated maximum in the
        // early portion; plain argmax as a guard when gating finds none.
        let search_end = ((n as f64 * self.config.top_search_fraction).ceil() as usize).max(1);
        let extrema = find_extrema(smooth, derivative, k);
        let top = extrema
            .iter()
            .filter(|e| e.kind == ExtremumKind::Maximum && e.index < search_end)
            .max_by(|a, b| a.value.total_cmp(&b.value))
            .map(|e| e.index)
            .or_else(|| argmax_range(smooth, 0, search_end))
            .unwrap_or(n / 2);

        // Takeaway: first sustained ascent before the top.
        let takeaway = match sustained_sign_change(derivative, 0, 1, k) {
            Some(i) if i < top => i.max(1),
            _ => {
                fallback = true;
                (n * 3 / 20).max(1)
            }
        };

        // Address: the quiet run immediately preceding the takeaway.
        let quiet_eps = amplitude * 0.02;
        let mut quiet_start = takeaway;
        while quiet_start > 0 && derivative[quiet_start - 1].abs() <= quiet_eps {
            quiet_start -= 1;
        }
        let address = if quiet_start == 0 {
            // The recording opens already settled; split the quiet run
            // between setup and address.
            takeaway / 2
        } else {
            quiet_start
        };

        // Takeaway/backswing boundary: the steepest sustained ascent.
        let backswing = argmax_range(derivative, takeaway, top)
            .map_or_else(
                || {
                    fallback = true;
                    takeaway + 1
                },
                |i| i.max(takeaway + 1),
            );

        // Transition opens just before the top.
        let transition = top.saturating_sub(k).max(backswing + 1);

        // Downswing: first sustained descent at or after the top.
        let downswing = match sustained_sign_change(derivative, top, -1, k) {
            Some(i) => i.max(transition + 1),
            None => {
                fallback = true;
                (top + 1).max(transition + 1)
            }
        };

        // Impact: first return to near-address height after the descent.
        let address_height = smooth[address.min(n - 1)];
        let target = address_height + amplitude * self.config.address_height_tolerance;
        let impact = match (downswing..n).find(|&i| smooth[i] <= target) {
            Some(i) => i.max(downswing + 1),
            None => match argmin_range(smooth, downswing, n) {
                Some(i) => {
                    fallback = true;
                    i.max(downswing + 1)
                }
                None => {
                    fallback = true;
                    (n * 3 / 4).max(downswing + 1)
                }
            },
        };

        // Follow-through: the post-impact rise.
        let follow_through = match sustained_sign_change(derivative, impact, 1, k) {
            Some(i) => i.max(impact + 1),
            None => impact + self.config.min_phase_frames.max(1),
        };

        // Finish: settle after the post-impact peak.
        let post_peak = argmax_range(smooth, follow_through, n).unwrap_or(follow_through);
        let finish = ((follow_through.max(post_peak) + 1)..n)
            .find(|&i| derivative[i].abs() <= quiet_eps)
            .unwrap_or_else(|| n - (n / 10).max(1));

        Boundaries {
            address,
            takeaway,
            backswing,
            transition,
            downswing,
            impact,
            follow_through,
            finish,
            fallback_used: fallback,
        }
    }
}

/// Computes the hand-height signal and the fraction of frames that carry
/// a usable wrist landmark.
///
/// Heights are `1 - y` (height-up); frames without wrists are filled by
/// carrying the nearest neighbor so the signal stays defined everywhere.
fn hand_height_signal(frames: &[PoseFrame]) -> (Vec<f64>, f64) {
    let mut raw: Vec<Option<f64>> = Vec::with_capacity(frames.len());
    let mut usable = 0usize;

    for frame in frames {
        let left = frame.keypoint(LandmarkType::LeftWrist);
        let right = frame.keypoint(LandmarkType::RightWrist);
        let height = match (left, right) {
            (Some(l), Some(r)) => Some(1.0 - f64::midpoint(f64::from(l.y), f64::from(r.y))),
            (Some(kp), None) | (None, Some(kp)) => Some(1.0 - f64::from(kp.y)),
            (None, None) => None,
        };
        if height.is_some() {
            usable += 1;
        }
        raw.push(height);
    }

    let fraction = if frames.is_empty() {
        0.0
    } else {
        usable as f64 / frames.len() as f64
    };

    // Forward-fill, then back-fill leading gaps.
    let mut filled = Vec::with_capacity(raw.len());
    let mut last: Option<f64> = None;
    for v in &raw {
        if let Some(h) = v {
            last = Some(*h);
        }
        filled.push(last);
    }
    let first_known = filled.iter().flatten().copied().next().unwrap_or(0.0);
    let heights: Vec<f64> = filled
        .into_iter()
        .map(|v| v.unwrap_or(first_known))
        .collect();

    (heights, fraction)
}

/// Canonical fractional boundaries used when the signal carries no
/// usable structure.
fn canonical_boundaries(n: usize) -> Boundaries {
    let at = |num: usize, den: usize| (n * num / den).max(1);
    Boundaries {
        address: n / 14,
        takeaway: at(2, 14),
        backswing: at(3, 14),
        transition: at(6, 14),
        downswing: at(7, 14),
        impact: at(9, 14),
        follow_through: at(10, 14),
        finish: at(12, 14),
        fallback_used: true,
    }
}

/// Turns start boundaries into contiguous, rank-ordered phases spanning
/// `[0, n-1]`. Boundaries are clamped monotone; labels whose range comes
/// out empty are dropped.
fn assemble_phases(frames: &[PoseFrame], boundaries: &Boundaries, n: usize) -> Vec<SwingPhase> {
    let mut starts = [
        0,
        boundaries.address,
        boundaries.takeaway,
        boundaries.backswing,
        boundaries.transition,
        boundaries.downswing,
        boundaries.impact,
        boundaries.follow_through,
        boundaries.finish,
    ];

    // Monotone clamp, bounded by the sequence length.
    for i in 1..starts.len() {
        starts[i] = starts[i].max(starts[i - 1]).min(n);
    }

    let labels = PhaseLabel::all();
    let mut phases = Vec::with_capacity(labels.len());

    for (i, &label) in labels.iter().enumerate() {
        let start = starts[i];
        let end = if i + 1 < starts.len() {
            starts[i + 1]
        } else {
            n
        };
        if start >= end {
            continue;
        }
        let last = end - 1;
        phases.push(SwingPhase::new(
            label,
            start,
            last,
            frames[start].timestamp_ms,
            frames[last].timestamp_ms,
        ));
    }

    phases
}

#[cfg(test)]
mod tests {
    use super::*;
    use swinglab_core::{Confidence, Keypoint};

    /// Builds a frame with both wrists at the given image-space height
    /// (y grows downward; hand height is 1 - y).
    fn wrist_frame(index: u64, y: f32) -> PoseFrame {
        let mut frame = PoseFrame::new(index, index as f64 * 33.3);
        frame.set_keypoint(Keypoint::new(
            LandmarkType::LeftWrist,
            0.45,
            y,
            Confidence::clamped(0.9),
        ));
        frame.set_keypoint(Keypoint::new(
            LandmarkType::RightWrist,
            0.55,
            y,
            Confidence::clamped(0.9),
        ));
        frame
    }

    /// A full synthetic swing trajectory in image-space y: address
    /// plateau, ascent to the top, descent through impact, follow-through
    /// rise, finish plateau. `top_at` is the frame of minimum y.
    fn synthetic_swing(n: usize, top_at: usize) -> Vec<PoseFrame> {
        let mut frames = Vec::with_capacity(n);
        let address_y = 0.75;
        let top_y = 0.15;
        let impact_at = top_at + (n - top_at) / 3;
        let finish_hold = n - n / 8;
        let finish_y = 0.30;

        for i in 0..n {
            let y = if i < n / 10 {
                address_y
            } else if i <= top_at {
                let t = (i - n / 10) as f64 / (top_at - n / 10).max(1) as f64;
                address_y + (top_y - address_y) * t
            } else if i <= impact_at {
                let t = (i - top_at) as f64 / (impact_at - top_at).max(1) as f64;
                top_y + (address_y - top_y) * t
            } else if i < finish_hold {
                let t = (i - impact_at) as f64 / (finish_hold - impact_at).max(1) as f64;
                address_y + (finish_y - address_y) * t
            } else {
                finish_y
            };
            frames.push(wrist_frame(i as u64, y as f32));
        }
        frames
    }

    fn assert_contiguous_span(set: &PhaseSet, n: usize) {
        let phases = &set.phases;
        assert!(!phases.is_empty());
        assert_eq!(phases[0].start_frame, 0);
        assert_eq!(phases.last().unwrap().end_frame, n - 1);
        for pair in phases.windows(2) {
            assert_eq!(
                pair[1].start_frame,
                pair[0].end_frame + 1,
                "phases must be contiguous"
            );
            assert!(pair[0].label.rank() < pair[1].label.rank());
        }
        for p in phases {
            assert!(p.start_frame <= p.end_frame);
        }
    }

    #[test]
    fn empty_input_empty_phases() {
        let classifier = PhaseClassifier::default_config();
        let set = classifier.classify(&[]).unwrap();
        assert!(set.is_empty());
        assert!(!set.low_confidence);
    }

    #[test]
    fn single_frame_degenerate_phase() {
        let classifier = PhaseClassifier::default_config();
        let frames = vec![wrist_frame(0, 0.7)];
        let set = classifier.classify(&frames).unwrap();
        assert_eq!(set.phases.len(), 1);
        assert_eq!(set.phases[0].label, PhaseLabel::Address);
        assert_eq!(set.phases[0].start_frame, 0);
        assert_eq!(set.phases[0].end_frame, 0);
        assert!(set.low_confidence);
    }

    #[test]
    fn full_swing_yields_complete_phase_set() {
        let classifier = PhaseClassifier::default_config();
        let frames = synthetic_swing(100, 40);
        let set = classifier.classify(&frames).unwrap();

        assert_contiguous_span(&set, 100);
        assert_eq!(
            set.phases.len(),
            PhaseLabel::COUNT,
            "a clean full swing classifies into all phases: {:?}",
            set.phases.iter().map(|p| p.label).collect::<Vec<_>>()
        );
        assert!(set.finish_detected());
        for p in &set.phases {
            assert!(p.end_frame < 100);
        }
    }

    #[test]
    fn top_of_backswing_boundary_near_hand_height_extreme() {
        let classifier = PhaseClassifier::default_config();
        // Hands highest (image-space y minimum) at frame 33 of 100.
        let frames = synthetic_swing(100, 33);
        let set = classifier.classify(&frames).unwrap();
        let transition = set.get(PhaseLabel::Transition).expect("transition phase");
        assert!(
            transition.start_frame >= 25 && transition.start_frame <= 41,
            "transition boundary in the middle third, got {}",
            transition.start_frame
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let classifier = PhaseClassifier::default_config();
        let frames = synthetic_swing(90, 36);
        let a = classifier.classify(&frames).unwrap();
        let b = classifier.classify(&frames).unwrap();
        assert_eq!(a.phases, b.phases);
        assert_eq!(a.low_confidence, b.low_confidence);
    }

    #[test]
    fn short_sequence_low_confidence_not_error() {
        let classifier = PhaseClassifier::default_config();
        let frames = synthetic_swing(6, 3);
        let set = classifier.classify(&frames).unwrap();
        assert!(set.low_confidence);
        assert_contiguous_span(&set, 6);
    }

    #[test]
    fn missing_wrists_beyond_tolerance_errors() {
        let classifier = PhaseClassifier::default_config();
        // 10 frames, wrists only in 3 of them.
        let mut frames: Vec<PoseFrame> = (0..10)
            .map(|i| PoseFrame::new(i, i as f64 * 33.3))
            .collect();
        for (i, frame) in frames.iter_mut().enumerate().take(3) {
            *frame = wrist_frame(i as u64, 0.7);
        }
        let err = classifier.classify(&frames).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingRequiredLandmark { usable_fraction } if usable_fraction < 0.5
        ));
    }

    #[test]
    fn sparse_but_tolerable_wrists_classify() {
        let classifier = PhaseClassifier::default_config();
        let mut frames = synthetic_swing(60, 24);
        // Knock wrists out of a third of the frames.
        for i in (0..60).step_by(3) {
            frames[i] = PoseFrame::new(i as u64, i as f64 * 33.3);
        }
        let set = classifier.classify(&frames).unwrap();
        assert_contiguous_span(&set, 60);
    }

    #[test]
    fn flat_signal_falls_back_to_canonical_template() {
        let classifier = PhaseClassifier::default_config();
        let frames: Vec<PoseFrame> = (0..50).map(|i| wrist_frame(i, 0.7)).collect();
        let set = classifier.classify(&frames).unwrap();
        assert!(set.low_confidence);
        assert_contiguous_span(&set, 50);
    }

    #[test]
    fn phase_set_durations() {
        let classifier = PhaseClassifier::default_config();
        let frames = synthetic_swing(100, 40);
        let set = classifier.classify(&frames).unwrap();
        let backswing = set.backswing_ms().expect("backswing duration");
        let downswing = set.downswing_ms().expect("downswing duration");
        assert!(backswing > downswing, "backswing should take longer");
    }
}
