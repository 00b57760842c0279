//! Descriptive statistics of session volumes.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 divisor); 0 for a single value.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Summarize `values`; `None` when there is nothing to summarize.
pub fn describe(values: &[u64]) -> Option<VolumeStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n as f64 - 1.0)).sqrt()
    } else {
        0.0
    };

    Some(VolumeStats {
        count: n,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

/// Linear interpolation between order statistics of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_matches_hand_computation() {
        let s = describe(&[40, 10, 30, 20]).unwrap();
        assert_eq!(s.count, 4);
        assert!((s.mean - 25.0).abs() < 1e-12);
        // sum of squares = 225 + 25 + 25 + 225 = 500; 500 / 3
        assert!((s.std - (500.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(s.min, 10.0);
        assert!((s.q25 - 17.5).abs() < 1e-12);
        assert!((s.median - 25.0).abs() < 1e-12);
        assert!((s.q75 - 32.5).abs() < 1e-12);
        assert_eq!(s.max, 40.0);
    }

    #[test]
    fn single_value_has_zero_spread() {
        let s = describe(&[7]).unwrap();
        assert_eq!(s.std, 0.0);
        assert_eq!(s.median, 7.0);
    }

    #[test]
    fn empty_has_no_stats() {
        assert!(describe(&[]).is_none());
    }
}
