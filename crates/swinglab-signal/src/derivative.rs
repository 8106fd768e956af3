//! Discrete differentiation of frame-sampled series.

/// Forward difference: `d[i] = x[i+1] - x[i]`, with the last element
/// repeated so the output length matches the input.
#[must_use]
pub fn forward_diff(signal: &[f64]) -> Vec<f64> {
    if signal.len() < 2 {
        return vec![0.0; signal.len()];
    }
    let mut out: Vec<f64> = signal.windows(2).map(|w| w[1] - w[0]).collect();
    let last = *out.last().unwrap_or(&0.0);
    out.push(last);
    out
}

/// Central difference: `d[i] = (x[i+1] - x[i-1]) / 2`, one-sided at the
/// endpoints. Output length matches the input.
#[must_use]
pub fn central_diff(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let mut out = Vec::with_capacity(n);
    out.push(signal[1] - signal[0]);
    for i in 1..n - 1 {
        out.push((signal[i + 1] - signal[i - 1]) / 2.0);
    }
    out.push(signal[n - 1] - signal[n - 2]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_diff_linear_ramp() {
        let signal = vec![0.0, 1.0, 2.0, 3.0];
        let d = forward_diff(&signal);
        assert_eq!(d.len(), 4);
        for v in &d {
            assert!((v - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn central_diff_linear_ramp() {
        let signal = vec![0.0, 2.0, 4.0, 6.0];
        let d = central_diff(&signal);
        assert_eq!(d.len(), 4);
        for v in &d {
            assert!((v - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn short_inputs_yield_zeros() {
        assert_eq!(forward_diff(&[]), Vec::<f64>::new());
        assert_eq!(forward_diff(&[1.0]), vec![0.0]);
        assert_eq!(central_diff(&[1.0]), vec![0.0]);
    }

    #[test]
    fn central_diff_parabola_sign_change() {
        // x^2 centered at index 5: derivative negative before, positive after
        let signal: Vec<f64> = (0..11).map(|i| ((i as f64) - 5.0).powi(2)).collect();
        let d = central_diff(&signal);
        assert!(d[2] < 0.0);
        assert!(d[8] > 0.0);
        assert!(d[5].abs() < 1e-12);
    }
}
