//! Persistence-gated extremum detection.
//!
//! A derivative sign change only counts as an extremum when both the
//! outgoing and incoming sign runs persist for a minimum number of
//! consecutive samples. Single-frame detector jitter produces one-sample
//! runs and is rejected without a heavier filter.

use serde::{Deserialize, Serialize};

/// Kind of a detected extremum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtremumKind {
    /// Local maximum
    Maximum,
    /// Local minimum
    Minimum,
}

/// A detected local extremum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    /// Sample index of the extremum
    pub index: usize,
    /// Maximum or minimum
    pub kind: ExtremumKind,
    /// Signal value at the extremum
    pub value: f64,
}

/// A maximal run of same-signed derivative samples.
#[derive(Debug, Clone, Copy)]
struct SignRun {
    sign: i8,
    start: usize,
    len: usize,
}

/// Finds local extrema of `signal` from its `derivative`.
///
/// An extremum is reported at the first sample of each incoming sign run
/// whose outgoing and incoming runs both span at least `persistence`
/// samples. Zero-derivative plateaus between runs shift the reported
/// index to the plateau midpoint. A `persistence` of 0 is treated as 1.
#[must_use]
pub fn find_extrema(signal: &[f64], derivative: &[f64], persistence: usize) -> Vec<Extremum> {
    let n = signal.len().min(derivative.len());
    if n < 3 {
        return Vec::new();
    }
    let persistence = persistence.max(1);

    let runs = sign_runs(&derivative[..n]);
    let mut extrema = Vec::new();

    for pair in runs.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev.sign == next.sign || prev.len < persistence || next.len < persistence {
            continue;
        }

        let prev_end = prev.start + prev.len - 1;
        let index = usize::midpoint(prev_end + 1, next.start).min(n - 1);
        let kind = if next.sign < 0 {
            ExtremumKind::Maximum
        } else {
            ExtremumKind::Minimum
        };
        extrema.push(Extremum {
            index,
            kind,
            value: signal[index],
        });
    }

    extrema
}

/// Finds the first index at or after `from` where the derivative takes
/// the requested sign and holds it for `persistence` consecutive samples.
///
/// `sign` must be `1` (ascending) or `-1` (descending). A run truncated
/// by the end of the signal is accepted if it reaches the end unbroken.
#[must_use]
pub fn sustained_sign_change(
    derivative: &[f64],
    from: usize,
    sign: i8,
    persistence: usize,
) -> Option<usize> {
    let persistence = persistence.max(1);
    let n = derivative.len();

    (from..n).find(|&i| {
        if sign_of(derivative[i]) != sign {
            return false;
        }
        let end = (i + persistence).min(n);
        (i..end).all(|j| sign_of(derivative[j]) == sign)
    })
}

/// Index of the maximum value within `[start, end)`, clamped to the signal.
#[must_use]
pub fn argmax_range(signal: &[f64], start: usize, end: usize) -> Option<usize> {
    let end = end.min(signal.len());
    if start >= end {
        return None;
    }
    let mut best = start;
    for i in start..end {
        if signal[i] > signal[best] {
            best = i;
        }
    }
    Some(best)
}

/// Index of the minimum value within `[start, end)`, clamped to the signal.
#[must_use]
pub fn argmin_range(signal: &[f64], start: usize, end: usize) -> Option<usize> {
    let end = end.min(signal.len());
    if start >= end {
        return None;
    }
    let mut best = start;
    for i in start..end {
        if signal[i] < signal[best] {
            best = i;
        }
    }
    Some(best)
}

fn sign_of(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Collapses the derivative into maximal nonzero sign runs.
fn sign_runs(derivative: &[f64]) -> Vec<SignRun> {
    let mut runs: Vec<SignRun> = Vec::new();

    for (i, &d) in derivative.iter().enumerate() {
        let sign = sign_of(d);
        if sign == 0 {
            continue;
        }
        match runs.last_mut() {
            Some(run) if run.sign == sign && run.start + run.len == i => run.len += 1,
            Some(run) if run.sign == sign && all_zero(&derivative[run.start + run.len..i]) => {
                // A zero plateau inside a same-signed run does not split it.
                run.len = i - run.start + 1;
            }
            _ => runs.push(SignRun { sign, start: i, len: 1 }),
        }
    }

    runs
}

fn all_zero(slice: &[f64]) -> bool {
    slice.iter().all(|&v| sign_of(v) == 0)
}
