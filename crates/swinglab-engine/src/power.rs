//! Power generation and ground-force estimation.
//!
//! These are physics-informed proxies, not force-plate measurements.
//! Segment rotational kinetic energy is ½·m·(r·ω)² with fixed
//! anthropometric mass fractions and gyration radii; power is its
//! positive rate of change. Ground-reaction proxies come from pelvis
//! acceleration scaled to body dimensions. The estimator guarantees
//! internal consistency (non-negative energies and forces, left/right
//! weight split summing to one) and monotone response to the underlying
//! kinematics, nothing more.

use crate::kinematics::BodySegment;
use crate::metrics::SegmentSeries;
use crate::phases::PhaseSet;
use serde::{Deserialize, Serialize};
use swinglab_core::{MetricValue, PhaseLabel};

const GRAVITY_MPS2: f64 = 9.81;

/// Anthropometric segment mass fractions of total body mass
/// (Dempster's body-segment proportions; the club proxy folds the hands
/// and club head together).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MassFractions {
    /// Pelvis fraction
    pub pelvis: f64,
    /// Torso fraction
    pub torso: f64,
    /// Lead arm fraction
    pub lead_arm: f64,
    /// Hands-plus-club fraction
    pub club: f64,
}

impl Default for MassFractions {
    fn default() -> Self {
        Self {
            pelvis: 0.142,
            torso: 0.355,
            lead_arm: 0.050,
            club: 0.025,
        }
    }
}

impl MassFractions {
    fn for_segment(&self, segment: BodySegment) -> f64 {
        match segment {
            BodySegment::Pelvis => self.pelvis,
            BodySegment::Torso => self.torso,
            BodySegment::LeadArm => self.lead_arm,
            BodySegment::Club => self.club,
        }
    }
}

/// Configuration for the power and ground-force estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerConfig {
    /// Assumed body mass in kilograms
    pub body_mass_kg: f64,
    /// Assumed body height in meters; scales normalized coordinates to
    /// world units
    pub height_m: f64,
    /// Segment mass fractions
    pub mass_fractions: MassFractions,
    /// Effective rotation radii per segment, meters
    pub gyration_radii_m: [f64; 4],
    /// Vertical-force overshoot mapped to a ground-force index of 1.0,
    /// as a multiple of body weight
    pub force_index_scale: f64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            body_mass_kg: 75.0,
            height_m: 1.75,
            mass_fractions: MassFractions::default(),
            // pelvis, torso, lead arm, club lever
            gyration_radii_m: [0.15, 0.25, 0.35, 1.1],
            force_index_scale: 1.5,
        }
    }
}

/// Mean positive power generated during one phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhasePower {
    /// Phase the sample covers
    pub label: PhaseLabel,
    /// Mean generated power in watts
    pub mean_power_w: f64,
}

/// Power-generation estimates for one swing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerMetrics {
    /// Mean generated power through takeaway-to-impact, watts
    pub total_power_w: f64,
    /// Peak instantaneous power, watts
    pub peak_power_w: f64,
    /// Fraction of total peak kinetic energy reaching the club proxy
    /// [0, 1]
    pub transfer_efficiency: f64,
    /// Share of peak energy that is rotational [0, 1]
    pub rotational_fraction: f64,
    /// Share of peak energy that is linear [0, 1]
    pub linear_fraction: f64,
    /// Discretized power-by-phase timeline
    pub by_phase: Vec<PhasePower>,
}

/// Ground-reaction proxies for one swing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundForce {
    /// Peak vertical force estimate, newtons
    pub vertical_n: f64,
    /// Peak horizontal force estimate, newtons
    pub horizontal_n: f64,
    /// Weight on the lead foot [0, 1]
    pub lead_fraction: f64,
    /// Weight on the trail foot [0, 1]; sums with `lead_fraction` to 1
    pub trail_fraction: f64,
    /// Normalized ground-force index [0, 1]
    pub index: f64,
}

/// Proximal-to-distal energy transfer summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyTransfer {
    /// Peak combined kinetic energy of pelvis and torso, joules
    pub proximal_peak_j: f64,
    /// Peak combined kinetic energy of arm and club proxy, joules
    pub distal_peak_j: f64,
    /// Distal over proximal peak energy (unbounded above, non-negative)
    pub chain_gain: f64,
    /// Bounded transfer efficiency [0, 1], monotone in the chain gain
    pub efficiency: f64,
}

/// Combined output of the estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerOutput {
    /// Power-generation estimates
    pub power: PowerMetrics,
    /// Ground-reaction proxies
    pub ground_force: GroundForce,
    /// Energy-transfer summary
    pub energy_transfer: EnergyTransfer,
}

/// Derives power and ground-force proxies from segment kinematics.
#[derive(Debug, Clone)]
pub struct PowerEstimator {
    config: PowerConfig,
}

impl PowerEstimator {
    /// Creates an estimator with the given configuration.
    #[must_use]
    pub fn new(config: PowerConfig) -> Self {
        Self { config }
    }

    /// Creates an estimator with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::new(PowerConfig::default())
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &PowerConfig {
        &self.config
    }

    /// Estimates power and ground-force proxies for one swing.
    ///
    /// `pelvis_path` is the hip-midpoint trajectory in normalized
    /// coordinates (`[x, y, z]` per frame, `None` where ungated);
    /// `weight_distribution` is the impact-phase weight metric used for
    /// the left/right split. Returns `None` when the kinematics are too
    /// sparse to estimate from.
    #[must_use]
    pub fn estimate(
        &self,
        segments: &SegmentSeries,
        phases: &PhaseSet,
        pelvis_path: &[Option<[f64; 3]>],
        weight_distribution: &MetricValue,
    ) -> Option<PowerOutput> {
        let n = segments.len();
        if n < 5 {
            return None;
        }

        // Per-frame rotational kinetic energy, summed over segments.
        let mut rotational_ke = vec![0.0f64; n];
        let mut any_segment = false;
        let mut segment_peak_ke = [0.0f64; 4];

        for (si, &segment) in BodySegment::all().iter().enumerate() {
            let velocity = segments.angular_velocity(segment);
            let mass = self.config.body_mass_kg * self.config.mass_fractions.for_segment(segment);
            let radius = self.config.gyration_radii_m[si];
            let mut seen = false;

            for i in 0..n {
                if let Some(dps) = velocity[i] {
                    let omega = dps.to_radians();
                    let ke = 0.5 * mass * (radius * omega).powi(2);
                    rotational_ke[i] += ke;
                    segment_peak_ke[si] = segment_peak_ke[si].max(ke);
                    seen = true;
                }
            }
            any_segment = any_segment || seen;
        }
        if !any_segment {
            return None;
        }

        // Linear kinetic energy from pelvis translation.
        let linear_ke = self.linear_kinetic_energy(pelvis_path, &segments.timestamps_ms);
        let total_ke: Vec<f64> = rotational_ke
            .iter()
            .zip(&linear_ke)
            .map(|(r, l)| r + l)
            .collect();

        // Generated power: positive rate of change of kinetic energy.
        let mut power = vec![0.0f64; n];
        for i in 1..n {
            let dt = (segments.timestamps_ms[i] - segments.timestamps_ms[i - 1]) / 1000.0;
            if dt > 0.0 {
                power[i] = ((total_ke[i] - total_ke[i - 1]) / dt).max(0.0);
            }
        }

        let window = active_window(phases, n);
        let active_power = &power[window.0..=window.1];
        let total_power_w = mean(active_power);
        let peak_power_w = active_power.iter().copied().fold(0.0f64, f64::max);

        let rot_peak = rotational_ke.iter().copied().fold(0.0f64, f64::max);
        let lin_peak = linear_ke.iter().copied().fold(0.0f64, f64::max);
        let energy_total = rot_peak + lin_peak;
        let (rotational_fraction, linear_fraction) = if energy_total > 1e-9 {
            (rot_peak / energy_total, lin_peak / energy_total)
        } else {
            (0.0, 0.0)
        };

        let segment_total: f64 = segment_peak_ke.iter().sum();
        let transfer_efficiency = if segment_total > 1e-9 {
            (segment_peak_ke[3] / segment_total).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let by_phase = phases
            .phases
            .iter()
            .map(|p| {
                let lo = p.start_frame.min(n - 1);
                let hi = p.end_frame.min(n - 1);
                PhasePower {
                    label: p.label,
                    mean_power_w: mean(&power[lo..=hi]),
                }
            })
            .collect();

        let power_metrics = PowerMetrics {
            total_power_w,
            peak_power_w,
            transfer_efficiency,
            rotational_fraction,
            linear_fraction,
            by_phase,
        };

        let ground_force = self.ground_force(pelvis_path, &segments.timestamps_ms, weight_distribution);
        let energy_transfer = energy_transfer(&segment_peak_ke);

        Some(PowerOutput {
            power: power_metrics,
            ground_force,
            energy_transfer,
        })
    }

    /// Linear kinetic energy of the body from pelvis translation, per
    /// frame; zero where the path is unknown.
    fn linear_kinetic_energy(&self, path: &[Option<[f64; 3]>], timestamps_ms: &[f64]) -> Vec<f64> {
        let n = path.len().min(timestamps_ms.len());
        let mut ke = vec![0.0f64; n];

        for i in 1..n {
            let (Some(a), Some(b)) = (path[i - 1], path[i]) else {
                continue;
            };
            let dt = (timestamps_ms[i] - timestamps_ms[i - 1]) / 1000.0;
            if dt <= 0.0 {
                continue;
            }
            let scale = self.config.height_m;
            let dx = (b[0] - a[0]) * scale;
            let dy = (b[1] - a[1]) * scale;
            let dz = (b[2] - a[2]) * scale;
            let speed = (dx * dx + dy * dy + dz * dz).sqrt() / dt;
            ke[i] = 0.5 * self.config.body_mass_kg * speed * speed;
        }

        ke
    }

    /// Ground-reaction proxies from pelvis acceleration.
    fn ground_force(
        &self,
        path: &[Option<[f64; 3]>],
        timestamps_ms: &[f64],
        weight_distribution: &MetricValue,
    ) -> GroundForce {
        let mass = self.config.body_mass_kg;
        let body_weight = mass * GRAVITY_MPS2;
        let n = path.len().min(timestamps_ms.len());

        // Height-up vertical position and lateral position in meters.
        let vertical: Vec<Option<f64>> = path
            .iter()
            .take(n)
            .map(|p| p.map(|q| (1.0 - q[1]) * self.config.height_m))
            .collect();
        let lateral: Vec<Option<f64>> = path
            .iter()
            .take(n)
            .map(|p| p.map(|q| q[0] * self.config.height_m))
            .collect();

        let peak_accel = |series: &[Option<f64>]| -> f64 {
            let mut peak = 0.0f64;
            for i in 2..series.len() {
                let (Some(a), Some(b), Some(c)) = (series[i - 2], series[i - 1], series[i]) else {
                    continue;
                };
                let dt1 = (timestamps_ms[i - 1] - timestamps_ms[i - 2]) / 1000.0;
                let dt2 = (timestamps_ms[i] - timestamps_ms[i - 1]) / 1000.0;
                if dt1 <= 0.0 || dt2 <= 0.0 {
                    continue;
                }
                let v1 = (b - a) / dt1;
                let v2 = (c - b) / dt2;
                let accel = (v2 - v1) / f64::midpoint(dt1, dt2);
                peak = peak.max(accel.abs());
            }
            peak
        };

        let vertical_accel = peak_accel(&vertical);
        let horizontal_accel = peak_accel(&lateral);

        let vertical_n = (mass * (GRAVITY_MPS2 + vertical_accel)).max(0.0);
        let horizontal_n = mass * horizontal_accel;

        // Weight split: 0 = all lead, 1 = all trail in the metric's
        // convention. Sums to 1 by construction.
        let trail = weight_distribution.available().unwrap_or(0.5).clamp(0.0, 1.0);
        let lead = 1.0 - trail;

        let overshoot = (vertical_n / body_weight - 1.0).max(0.0);
        let index = (overshoot / self.config.force_index_scale).clamp(0.0, 1.0);

        GroundForce {
            vertical_n,
            horizontal_n,
            lead_fraction: lead,
            trail_fraction: trail,
            index,
        }
    }
}

/// Frame window from takeaway through impact, defaulting to the whole
/// series.
fn active_window(phases: &PhaseSet, n: usize) -> (usize, usize) {
    let start = phases
        .get(PhaseLabel::Takeaway)
        .or_else(|| phases.get(PhaseLabel::Backswing))
        .map_or(0, |p| p.start_frame.min(n - 1));
    let end = phases
        .get(PhaseLabel::Impact)
        .or_else(|| phases.get(PhaseLabel::Downswing))
        .map_or(n - 1, |p| p.end_frame.min(n - 1));
    if start < end {
        (start, end)
    } else {
        (0, n - 1)
    }
}

fn energy_transfer(segment_peak_ke: &[f64; 4]) -> EnergyTransfer {
    let proximal = segment_peak_ke[0] + segment_peak_ke[1];
    let distal = segment_peak_ke[2] + segment_peak_ke[3];
    let chain_gain = if proximal > 1e-9 { distal / proximal } else { 0.0 };
    EnergyTransfer {
        proximal_peak_j: proximal,
        distal_peak_j: distal,
        chain_gain,
        efficiency: (chain_gain / (1.0 + chain_gain)).clamp(0.0, 1.0),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
