//! Cardinality estimation kernel shared by the dense estimators.
//!
//! The raw estimate is the harmonic-mean formula `alpha(m) * m^2 / sum
//! 2^-reg[i]`. In the small range it overestimates; `estimate_bias`
//! interpolates the empirical correction tables and `cardinality` decides
//! between the corrected estimate and linear counting.

use crate::tables::{BIAS_DATA, RAW_ESTIMATE_DATA, THRESHOLD};

/// Highest precision covered by the linear-counting threshold vector.
pub(crate) const MAX_THRESHOLD_PRECISION: u8 = 18;

/// Normalization constant for the harmonic mean.
#[inline]
pub(crate) fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (m as f64)),
    }
}

/// Raw HyperLogLog estimate over a register file.
pub(crate) fn raw_estimate(reg: &[u8]) -> f64 {
    let sum: f64 = reg.iter().map(|&r| 1.0 / (1u64 << r) as f64).sum();
    let m = reg.len() as f64;
    alpha(reg.len()) * m * m / sum
}

/// Number of registers still at zero.
pub(crate) fn count_zeros(reg: &[u8]) -> u32 {
    reg.iter().filter(|&&r| r == 0).count() as u32
}

/// Linear-counting estimate for `m` registers of which `v` are zero.
#[inline]
pub(crate) fn linear_counting(m: f64, v: f64) -> f64 {
    m * (m / v).ln()
}

/// Interpolated empirical bias for a raw estimate at the given precision.
///
/// Below the first grid point the first bias is returned, above the last
/// grid point the last bias; in between, linear interpolation between the
/// two neighboring grid points.
pub(crate) fn estimate_bias(p: u8, est: f64) -> f64 {
    let estimates = RAW_ESTIMATE_DATA[(p - 4) as usize];
    let biases = BIAS_DATA[(p - 4) as usize];

    if est <= estimates[0] {
        return biases[0];
    }
    if est >= estimates[estimates.len() - 1] {
        return biases[biases.len() - 1];
    }

    // First grid point at or above the estimate; the bounds checks above
    // guarantee it exists and has a strictly smaller left neighbor.
    let i = estimates.partition_point(|&e| e < est);
    let (e1, e2) = (estimates[i - 1], estimates[i]);
    let (b1, b2) = (biases[i - 1], biases[i]);
    let c = (est - e1) / (e2 - e1);
    b1 * (1.0 - c) + b2 * c
}

/// Full dense count policy: bias-corrected raw estimate with a
/// linear-counting override in the small range.
pub(crate) fn cardinality(p: u8, reg: &[u8]) -> u64 {
    let m = reg.len() as f64;
    let mut est = raw_estimate(reg);
    if est <= 5.0 * m {
        est -= estimate_bias(p, est);
    }

    let v = count_zeros(reg);
    if v != 0 {
        let lc = linear_counting(m, f64::from(v));
        // The threshold vector ends at precision 18; past it the small-range
        // regime is bounded by 5 * m.
        let limit = if p <= MAX_THRESHOLD_PRECISION {
            THRESHOLD[(p - 4) as usize]
        } else {
            5.0 * m
        };
        if lc <= limit {
            return lc as u64;
        }
    }
    est as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(16 => 0.673)]
    #[test_case(32 => 0.697)]
    #[test_case(64 => 0.709)]
    fn test_alpha_small(m: usize) -> f64 {
        alpha(m)
    }

    #[test]
    fn test_alpha_large() {
        let a = alpha(1 << 14);
        assert!((a - 0.7213 / (1.0 + 1.079 / 16384.0)).abs() < 1e-12);
    }

    #[test]
    fn test_linear_counting_laws() {
        for p in [4u8, 10, 16] {
            let m = (1u32 << p) as f64;
            assert_eq!(linear_counting(m, m), 0.0);
            assert!(linear_counting(m, m - 1.0) > 0.0);
            assert!(linear_counting(m, 1.0) > linear_counting(m, m / 2.0));
        }
    }

    #[test]
    fn test_raw_estimate_empty_registers() {
        let reg = vec![0u8; 16];
        // All-zero registers sum to m, so the estimate is alpha * m.
        assert!((raw_estimate(&reg) - 0.673 * 16.0).abs() < 1e-9);
        assert_eq!(count_zeros(&reg), 16);
    }

    #[test]
    fn test_estimate_bias_clamps_at_row_ends() {
        let estimates = RAW_ESTIMATE_DATA[0];
        let biases = BIAS_DATA[0];
        assert_eq!(estimate_bias(4, estimates[0] - 5.0), biases[0]);
        assert_eq!(estimate_bias(4, estimates[estimates.len() - 1] + 5.0), biases[biases.len() - 1]);
    }

    #[test]
    fn test_estimate_bias_interpolates_between_grid_points() {
        let estimates = RAW_ESTIMATE_DATA[0];
        let biases = BIAS_DATA[0];
        let mid = (estimates[0] + estimates[1]) / 2.0;
        let expected = (biases[0] + biases[1]) / 2.0;
        assert!((estimate_bias(4, mid) - expected).abs() < 1e-9);
        // Exact grid points return the tabulated bias.
        assert!((estimate_bias(4, estimates[3]) - biases[3]).abs() < 1e-9);
    }

    #[test]
    fn test_cardinality_empty_is_zero() {
        for p in [4u8, 12, 20, 26] {
            let reg = vec![0u8; 1 << p];
            assert_eq!(cardinality(p, &reg), 0);
        }
    }

    #[test]
    fn test_tables_are_consistent() {
        assert_eq!(RAW_ESTIMATE_DATA.len(), BIAS_DATA.len());
        for (row_e, row_b) in RAW_ESTIMATE_DATA.iter().zip(BIAS_DATA.iter()) {
            assert_eq!(row_e.len(), row_b.len());
            assert!(row_e.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
