//! # SwingLab Engine
//!
//! Phase segmentation and biomechanical scoring for golf swings.
//!
//! The engine consumes a stream of pose frames (named 3D keypoints with
//! confidence, produced by an external pose detector) and turns one
//! recorded swing into an immutable [`SwingAnalysis`]: classified swing
//! phases, biomechanical metrics, kinematic-sequence and power estimates,
//! detected faults, and a professional benchmark comparison.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       swinglab-engine                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │ PoseFrame ─▶ SwingSession ─▶ PhaseClassifier                │
//! │                  │               │                          │
//! │                  │               ▼                          │
//! │                  │         MetricsCalculator                │
//! │                  │          │      │      │                 │
//! │                  │          ▼      ▼      ▼                 │
//! │                  │   KinematicSeq  Power  FaultDetector     │
//! │                  │          └──────┴──────┘                 │
//! │                  │                 ▼                        │
//! │                  └──────▶  BenchmarkScorer ─▶ SwingAnalysis │
//! │                                                             │
//! │ ConsistencyTracker ◀── finalized analyses across swings     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is pure and stateless between calls: every component is
//! parameterized by explicit configuration resolved at session start, no
//! global state, no I/O. All error conditions are recoverable; degraded
//! input becomes flags and synthetic faults inside the result rather than
//! exceptions, so a live capture session can never be crashed from here.
//!
//! ## Example
//!
//! ```
//! use swinglab_engine::{AnalyzerConfig, SwingAnalyzer};
//! use swinglab_core::PoseFrame;
//!
//! let analyzer = SwingAnalyzer::new(AnalyzerConfig::default());
//!
//! // An empty recording classifies to an empty phase list, not an error.
//! let frames: Vec<PoseFrame> = Vec::new();
//! let analysis = analyzer.analyze(&frames);
//! assert!(analysis.phases.is_empty());
//! ```

pub mod analysis;
pub mod benchmark;
pub mod config;
pub mod consistency;
pub mod faults;
pub mod kinematics;
pub mod metrics;
pub mod phases;
pub mod power;
pub mod session;
pub mod streaming;

pub use analysis::{AnalysisId, EnhancedSwingMetrics, SwingAnalysis, SwingAnalyzer};
pub use benchmark::{
    BenchmarkConfig, BenchmarkScorer, ClubReference, DimensionScore, MetricScore,
    ProfessionalComparison, ReferenceRange, ScoreDimension, SkillLevel,
};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, ConfigWarning};
pub use consistency::{ConsistencyConfig, ConsistencyResult, ConsistencyTracker, Trend};
pub use faults::{
    Comparison, Fault, FaultConfig, FaultDetector, FaultKind, FaultRule, FaultTable, MetricKind,
};
pub use kinematics::{
    BodySegment, KinematicSequence, KinematicSequenceAnalyzer, SegmentPeak, SequenceConfig,
};
pub use metrics::{
    FrameMetrics, Handedness, MetricsCalculator, MetricsConfig, MetricsOutput, SegmentSeries,
    SwingMetrics,
};
pub use phases::{PhaseClassifier, PhaseClassifierConfig, PhaseSet};
pub use power::{
    EnergyTransfer, GroundForce, MassFractions, PhasePower, PowerConfig, PowerEstimator,
    PowerMetrics, PowerOutput,
};
pub use session::{SessionConfig, SessionId, SessionState, SwingSession};
pub use streaming::StreamingSession;

use swinglab_core::CoreError;
use thiserror::Error;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by the analysis engine.
///
/// Every variant aborts only the call that produced it; sessions stay
/// usable and nothing at this layer is fatal.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    /// Frame index did not increase within a session
    #[error("Out-of-order frame: last index {last}, received {received}")]
    OutOfOrderFrame {
        /// Highest index accepted so far
        last: u64,
        /// Index of the rejected frame
        received: u64,
    },

    /// Landmarks required for the hand-height signal are missing in too
    /// many frames
    #[error(
        "Missing required landmarks: wrist keypoints usable in only \
         {usable_fraction:.2} of frames"
    )]
    MissingRequiredLandmark {
        /// Fraction of frames with usable wrist landmarks [0.0, 1.0]
        usable_fraction: f64,
    },

    /// Finalize called on a session with no frames
    #[error("Session has no frames to finalize")]
    EmptySession,

    /// Push or finalize called on an already finalized session
    #[error("Session is already finalized")]
    SessionFinalized,

    /// Core data type error
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl EngineError {
    /// Returns `true` if this error is recoverable.
    ///
    /// All engine errors are; the engine never crashes a capture session.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Core(e) => e.is_recoverable(),
            Self::OutOfOrderFrame { .. }
            | Self::MissingRequiredLandmark { .. }
            | Self::EmptySession
            | Self::SessionFinalized => true,
        }
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        AnalyzerConfig, ConsistencyTracker, EngineError, FaultDetector, PhaseClassifier,
        ProfessionalComparison, StreamingSession, SwingAnalysis, SwingAnalyzer, SwingSession,
    };
    pub use swinglab_core::{
        ClubType, Confidence, Keypoint, LandmarkType, MetricStatus, MetricValue, PhaseLabel,
        PoseFrame, SwingPhase,
    };
}
