//! Scalar time-series and geometry utilities for swing analysis.
//!
//! Everything in this crate operates on plain `Vec<f64>` / `&[f64]`
//! series sampled at frame rate. Functions are total: insufficient input
//! yields `None` or an empty result, never a panic.
//!
//! # Modules
//!
//! - [`smoothing`]: moving-average and exponential smoothing
//! - [`derivative`]: discrete differentiation
//! - [`extrema`]: persistence-gated extremum detection
//! - [`fit`]: least-squares line fitting
//! - [`stats`]: running and batch statistics
//! - [`angles`]: joint and segment angle geometry

pub mod angles;
pub mod derivative;
pub mod extrema;
pub mod fit;
pub mod smoothing;
pub mod stats;

pub use angles::{
    angle_between_deg, distance, joint_angle_deg, midpoint, segment_angle_deg, unwrap_degrees,
    Point3,
};
pub use derivative::{central_diff, forward_diff};
pub use extrema::{
    argmax_range, argmin_range, find_extrema, sustained_sign_change, Extremum, ExtremumKind,
};
pub use fit::{fit_line, slope_over_index, LineFit};
pub use smoothing::{exponential_smooth, moving_average};
pub use stats::{coefficient_of_variation, mean, variance, RunningStats};
