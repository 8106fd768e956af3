//! Core data types for the SwingLab analysis engine.
//!
//! This crate defines the fundamental data structures shared by the
//! SwingLab ecosystem for representing pose keypoints, swing phases,
//! and graded metric values.
//!
//! # Type Categories
//!
//! - **Pose Types**: [`PoseFrame`], [`Keypoint`], [`LandmarkType`]
//! - **Swing Types**: [`SwingPhase`], [`PhaseLabel`], [`ClubType`]
//! - **Measurement Types**: [`Confidence`], [`MetricValue`], [`MetricStatus`]
//!
//! # Example
//!
//! ```
//! use swinglab_core::{Confidence, Keypoint, LandmarkType, PoseFrame};
//!
//! let mut frame = PoseFrame::new(0, 0.0);
//! frame.set_keypoint(Keypoint::new(
//!     LandmarkType::LeftWrist,
//!     0.4,
//!     0.7,
//!     Confidence::clamped(0.9),
//! ));
//!
//! assert!(frame.keypoint(LandmarkType::LeftWrist).is_some());
//! assert!(frame.keypoint(LandmarkType::RightWrist).is_none());
//! ```

pub mod error;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use types::{
    ClubType, Confidence, Keypoint, LandmarkType, MetricStatus, MetricValue, PhaseLabel,
    PoseFrame, SwingPhase,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of landmarks in the fixed vocabulary.
pub const MAX_LANDMARKS: usize = 21;

/// Default keypoint confidence threshold for metric computation.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
