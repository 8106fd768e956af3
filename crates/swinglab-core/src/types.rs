//! Fundamental data structures for swing analysis.
//!
//! Input keypoints use image-normalized coordinates: `x` grows to the
//! right, `y` grows DOWNWARD, `z` (when present) grows toward the camera.
//! Consumers that need a height-up signal convert with `1.0 - y`.

use crate::error::{CoreError, CoreResult};
use crate::{DEFAULT_CONFIDENCE_THRESHOLD, MAX_LANDMARKS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Confidence
// =============================================================================

/// Confidence score in the range [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Confidence(f32);

impl Confidence {
    /// Creates a new confidence value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range [0.0, 1.0].
    pub fn new(value: f32) -> CoreResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(CoreError::InvalidConfidence { value });
        }
        Ok(Self(value))
    }

    /// Creates a confidence value, clamping into [0.0, 1.0].
    #[must_use]
    pub fn clamped(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the raw confidence value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.0
    }

    /// Returns `true` if the confidence exceeds the default threshold.
    #[must_use]
    pub fn is_high(&self) -> bool {
        self.0 >= DEFAULT_CONFIDENCE_THRESHOLD
    }

    /// Returns `true` if the confidence exceeds the given threshold.
    #[must_use]
    pub fn exceeds(&self, threshold: f32) -> bool {
        self.0 >= threshold
    }

    /// Maximum confidence (1.0).
    pub const MAX: Self = Self(1.0);

    /// Minimum confidence (0.0).
    pub const MIN: Self = Self(0.0);
}

impl Default for Confidence {
    fn default() -> Self {
        Self(0.0)
    }
}

// =============================================================================
// Landmark vocabulary
// =============================================================================

/// The fixed landmark vocabulary, following the COCO body model extended
/// with heel and forefoot landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum LandmarkType {
    /// Nose
    Nose = 0,
    /// Left eye
    LeftEye = 1,
    /// Right eye
    RightEye = 2,
    /// Left ear
    LeftEar = 3,
    /// Right ear
    RightEar = 4,
    /// Left shoulder
    LeftShoulder = 5,
    /// Right shoulder
    RightShoulder = 6,
    /// Left elbow
    LeftElbow = 7,
    /// Right elbow
    RightElbow = 8,
    /// Left wrist
    LeftWrist = 9,
    /// Right wrist
    RightWrist = 10,
    /// Left hip
    LeftHip = 11,
    /// Right hip
    RightHip = 12,
    /// Left knee
    LeftKnee = 13,
    /// Right knee
    RightKnee = 14,
    /// Left ankle
    LeftAnkle = 15,
    /// Right ankle
    RightAnkle = 16,
    /// Left heel
    LeftHeel = 17,
    /// Right heel
    RightHeel = 18,
    /// Left forefoot
    LeftFootIndex = 19,
    /// Right forefoot
    RightFootIndex = 20,
}

impl LandmarkType {
    /// Number of landmarks in the vocabulary.
    pub const COUNT: usize = MAX_LANDMARKS;

    /// Returns all landmark types in index order.
    #[must_use]
    pub fn all() -> &'static [Self; MAX_LANDMARKS] {
        &[
            Self::Nose,
            Self::LeftEye,
            Self::RightEye,
            Self::LeftEar,
            Self::RightEar,
            Self::LeftShoulder,
            Self::RightShoulder,
            Self::LeftElbow,
            Self::RightElbow,
            Self::LeftWrist,
            Self::RightWrist,
            Self::LeftHip,
            Self::RightHip,
            Self::LeftKnee,
            Self::RightKnee,
            Self::LeftAnkle,
            Self::RightAnkle,
            Self::LeftHeel,
            Self::RightHeel,
            Self::LeftFootIndex,
            Self::RightFootIndex,
        ]
    }

    /// Returns the landmark name as a string.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }

    /// Returns `true` if this is a face landmark.
    #[must_use]
    pub fn is_face(&self) -> bool {
        matches!(
            self,
            Self::Nose | Self::LeftEye | Self::RightEye | Self::LeftEar | Self::RightEar
        )
    }

    /// Returns `true` if this is an upper body landmark.
    #[must_use]
    pub fn is_upper_body(&self) -> bool {
        matches!(
            self,
            Self::LeftShoulder
                | Self::RightShoulder
                | Self::LeftElbow
                | Self::RightElbow
                | Self::LeftWrist
                | Self::RightWrist
        )
    }

    /// Returns `true` if this is a lower body landmark.
    #[must_use]
    pub fn is_lower_body(&self) -> bool {
        matches!(
            self,
            Self::LeftHip
                | Self::RightHip
                | Self::LeftKnee
                | Self::RightKnee
                | Self::LeftAnkle
                | Self::RightAnkle
                | Self::LeftHeel
                | Self::RightHeel
                | Self::LeftFootIndex
                | Self::RightFootIndex
        )
    }

    /// Returns `true` if this is a foot landmark.
    #[must_use]
    pub fn is_foot(&self) -> bool {
        matches!(
            self,
            Self::LeftHeel | Self::RightHeel | Self::LeftFootIndex | Self::RightFootIndex
        )
    }
}

impl TryFrom<u8> for LandmarkType {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::all()
            .get(value as usize)
            .copied()
            .ok_or_else(|| CoreError::validation(format!("Invalid landmark index: {value}")))
    }
}

impl std::fmt::Display for LandmarkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Keypoints and frames
// =============================================================================

/// A single body keypoint with position and confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keypoint {
    /// Landmark this keypoint measures
    pub landmark: LandmarkType,
    /// X coordinate, normalized to the frame (0.0-1.0)
    pub x: f32,
    /// Y coordinate, normalized to the frame (0.0-1.0, downward)
    pub y: f32,
    /// Z coordinate (depth, if available)
    pub z: Option<f32>,
    /// Detection confidence
    pub confidence: Confidence,
}

impl Keypoint {
    /// Creates a new 2D keypoint.
    #[must_use]
    pub fn new(landmark: LandmarkType, x: f32, y: f32, confidence: Confidence) -> Self {
        Self {
            landmark,
            x,
            y,
            z: None,
            confidence,
        }
    }

    /// Creates a new 3D keypoint.
    #[must_use]
    pub fn new_3d(landmark: LandmarkType, x: f32, y: f32, z: f32, confidence: Confidence) -> Self {
        Self {
            landmark,
            x,
            y,
            z: Some(z),
            confidence,
        }
    }

    /// Returns `true` if this keypoint should be considered visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.confidence.is_high()
    }

    /// Returns the 2D position as a tuple.
    #[must_use]
    pub fn position_2d(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Returns the 3D position as a tuple, if depth is available.
    #[must_use]
    pub fn position_3d(&self) -> Option<(f32, f32, f32)> {
        self.z.map(|z| (self.x, self.y, z))
    }
}

/// A single pose sample: one frame of detected keypoints.
///
/// Frames are created by the ingest path, immutable once buffered, and
/// owned exclusively by their session. Missing joints are represented as
/// absent slots, never as zeroed coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseFrame {
    /// Frame index, strictly increasing within a session
    pub index: u64,
    /// Capture timestamp in milliseconds
    pub timestamp_ms: f64,
    /// Keypoint slots, indexed by landmark
    keypoints: [Option<Keypoint>; MAX_LANDMARKS],
    /// Aggregate confidence over present keypoints
    confidence: Confidence,
}

impl PoseFrame {
    /// Creates an empty pose frame.
    #[must_use]
    pub fn new(index: u64, timestamp_ms: f64) -> Self {
        Self {
            index,
            timestamp_ms,
            keypoints: [None; MAX_LANDMARKS],
            confidence: Confidence::MIN,
        }
    }

    /// Creates a frame pre-populated with the given keypoints.
    #[must_use]
    pub fn with_keypoints(
        index: u64,
        timestamp_ms: f64,
        keypoints: impl IntoIterator<Item = Keypoint>,
    ) -> Self {
        let mut frame = Self::new(index, timestamp_ms);
        for kp in keypoints {
            frame.set_keypoint(kp);
        }
        frame
    }

    /// Sets a keypoint in its landmark slot and refreshes the aggregate
    /// confidence.
    pub fn set_keypoint(&mut self, keypoint: Keypoint) {
        self.keypoints[keypoint.landmark as usize] = Some(keypoint);
        self.refresh_confidence();
    }

    /// Gets the keypoint for a landmark, if present.
    #[must_use]
    pub fn keypoint(&self, landmark: LandmarkType) -> Option<&Keypoint> {
        self.keypoints[landmark as usize].as_ref()
    }

    /// Gets the keypoint for a landmark if present and at or above the
    /// given confidence threshold.
    #[must_use]
    pub fn keypoint_above(&self, landmark: LandmarkType, threshold: f32) -> Option<&Keypoint> {
        self.keypoint(landmark)
            .filter(|kp| kp.confidence.exceeds(threshold))
    }

    /// Number of present keypoints.
    #[must_use]
    pub fn keypoint_count(&self) -> usize {
        self.keypoints.iter().filter(|kp| kp.is_some()).count()
    }

    /// Number of visible keypoints (above the default threshold).
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.keypoints
            .iter()
            .filter(|kp| kp.as_ref().is_some_and(Keypoint::is_visible))
            .count()
    }

    /// Aggregate per-frame confidence (mean over present keypoints).
    #[must_use]
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    fn refresh_confidence(&mut self) {
        let present: Vec<f32> = self
            .keypoints
            .iter()
            .flatten()
            .map(|kp| kp.confidence.value())
            .collect();
        self.confidence = if present.is_empty() {
            Confidence::MIN
        } else {
            Confidence::clamped(present.iter().sum::<f32>() / present.len() as f32)
        };
    }
}

// =============================================================================
// Swing phases
// =============================================================================

/// Ordered swing phase tags, from setup to finish.
///
/// The P-system positions each tag corresponds to are exposed by
/// [`PhaseLabel::p_position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum PhaseLabel {
    /// Pre-shot setup, before the golfer settles
    Setup = 0,
    /// Stationary address position over the ball
    Address = 1,
    /// Initial one-piece move away from the ball
    Takeaway = 2,
    /// Main ascent of the hands to the top
    Backswing = 3,
    /// Top of backswing and direction change
    Transition = 4,
    /// Descent toward the ball
    Downswing = 5,
    /// Ball contact
    Impact = 6,
    /// Post-impact release and rise
    FollowThrough = 7,
    /// Final deceleration to a balanced hold
    Finish = 8,
}

impl PhaseLabel {
    /// Number of phase tags.
    pub const COUNT: usize = 9;

    /// Returns all phase labels in swing order.
    #[must_use]
    pub fn all() -> &'static [Self; Self::COUNT] {
        &[
            Self::Setup,
            Self::Address,
            Self::Takeaway,
            Self::Backswing,
            Self::Transition,
            Self::Downswing,
            Self::Impact,
            Self::FollowThrough,
            Self::Finish,
        ]
    }

    /// Ordinal rank of this phase within a swing.
    #[must_use]
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Returns the phase name as a string tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Address => "address",
            Self::Takeaway => "takeaway",
            Self::Backswing => "backswing",
            Self::Transition => "transition",
            Self::Downswing => "downswing",
            Self::Impact => "impact",
            Self::FollowThrough => "follow_through",
            Self::Finish => "finish",
        }
    }

    /// P-system position(s) covered by this phase, if any.
    ///
    /// Setup precedes P1 and has no position.
    #[must_use]
    pub fn p_position(&self) -> Option<&'static str> {
        match self {
            Self::Setup => None,
            Self::Address => Some("P1"),
            Self::Takeaway => Some("P2"),
            Self::Backswing => Some("P3"),
            Self::Transition => Some("P4"),
            Self::Downswing => Some("P5-P6"),
            Self::Impact => Some("P7"),
            Self::FollowThrough => Some("P8-P9"),
            Self::Finish => Some("P10"),
        }
    }

    /// Returns `true` for the terminal phase of a swing.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finish)
    }
}

impl std::fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified swing phase: a label over a contiguous frame range.
///
/// For a classified sequence, phases are contiguous, non-overlapping,
/// ordered by label rank, and collectively span `[0, N-1]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwingPhase {
    /// Phase tag
    pub label: PhaseLabel,
    /// First frame of the phase (inclusive)
    pub start_frame: usize,
    /// Last frame of the phase (inclusive)
    pub end_frame: usize,
    /// Timestamp of the first frame in milliseconds
    pub start_ms: f64,
    /// Timestamp of the last frame in milliseconds
    pub end_ms: f64,
}

impl SwingPhase {
    /// Creates a new phase spanning `[start_frame, end_frame]`.
    #[must_use]
    pub fn new(
        label: PhaseLabel,
        start_frame: usize,
        end_frame: usize,
        start_ms: f64,
        end_ms: f64,
    ) -> Self {
        Self {
            label,
            start_frame,
            end_frame,
            start_ms,
            end_ms,
        }
    }

    /// Number of frames covered by this phase.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.end_frame - self.start_frame + 1
    }

    /// Duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        (self.end_ms - self.start_ms).max(0.0)
    }

    /// Returns `true` if the frame index falls inside this phase.
    #[must_use]
    pub fn contains(&self, frame: usize) -> bool {
        frame >= self.start_frame && frame <= self.end_frame
    }
}

// =============================================================================
// Clubs
// =============================================================================

/// Club category used to select thresholds and benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ClubType {
    /// Driver / long woods
    Driver,
    /// Irons and hybrids
    Iron,
    /// Wedges
    Wedge,
    /// Putter
    Putter,
}

impl ClubType {
    /// Returns all club types.
    #[must_use]
    pub fn all() -> &'static [Self; 4] {
        &[Self::Driver, Self::Iron, Self::Wedge, Self::Putter]
    }

    /// Returns the club name as a string tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::Iron => "iron",
            Self::Wedge => "wedge",
            Self::Putter => "putter",
        }
    }

    /// Parses a club name, case-insensitively.
    ///
    /// Returns `None` for unrecognized names; callers decide the fallback
    /// policy (the engine falls back to [`ClubType::Iron`] with a
    /// configuration warning).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "driver" | "wood" | "1w" => Some(Self::Driver),
            "iron" | "hybrid" => Some(Self::Iron),
            "wedge" => Some(Self::Wedge),
            "putter" => Some(Self::Putter),
            _ => None,
        }
    }
}

impl Default for ClubType {
    fn default() -> Self {
        Self::Iron
    }
}

impl std::fmt::Display for ClubType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Metric values
// =============================================================================

/// Status of a computed metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MetricStatus {
    /// Measurement computed from keypoints above the confidence threshold.
    Valid,
    /// Measurement present but from partially degraded keypoints.
    Degraded,
    /// No measurement possible; the value field is meaningless.
    Unavailable,
}

/// A single graded metric measurement.
///
/// An unavailable metric never substitutes a default that could be read
/// as a real measurement; consumers must check [`MetricValue::is_available`]
/// before using the value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricValue {
    /// Measured value (unit depends on the metric)
    pub value: f64,
    /// Confidence in the measurement [0.0, 1.0]
    pub confidence: f64,
    /// Measurement status
    pub status: MetricStatus,
}

impl MetricValue {
    /// Creates a valid measurement.
    #[must_use]
    pub fn valid(value: f64, confidence: f64) -> Self {
        Self {
            value,
            confidence: confidence.clamp(0.0, 1.0),
            status: MetricStatus::Valid,
        }
    }

    /// Creates a degraded measurement.
    #[must_use]
    pub fn degraded(value: f64, confidence: f64) -> Self {
        Self {
            value,
            confidence: confidence.clamp(0.0, 1.0),
            status: MetricStatus::Degraded,
        }
    }

    /// Creates an unavailable measurement (no value could be computed).
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            value: 0.0,
            confidence: 0.0,
            status: MetricStatus::Unavailable,
        }
    }

    /// Returns `true` if a value was actually measured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status != MetricStatus::Unavailable
    }

    /// Returns the value if available.
    #[must_use]
    pub fn available(&self) -> Option<f64> {
        self.is_available().then_some(self.value)
    }
}
