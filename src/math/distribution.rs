//! Student's t tail probabilities.
//!
//! The CDF itself comes from `statrs`; this module only pins down how
//! degenerate inputs are reported.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Two-sided p-value `2·(1 − F(|t|))` for a t statistic with `df` degrees of freedom.
///
/// Returns `None` when `df` is not a positive finite number or `t` is NaN.
/// An infinite `t` (exact fit) gives a p-value of zero.
pub fn two_sided_p_value(t: f64, df: f64) -> Option<f64> {
    if !(df.is_finite() && df > 0.0) || t.is_nan() {
        return None;
    }
    if t.is_infinite() {
        return Some(0.0);
    }

    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p = 2.0 * (1.0 - dist.cdf(t.abs()));
    Some(p.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_statistic_has_unit_p_value() {
        let p = two_sided_p_value(0.0, 10.0).unwrap();
        assert!((p - 1.0).abs() < 1e-12);
    }

    #[test]
    fn p_value_is_symmetric_in_t() {
        let a = two_sided_p_value(2.1, 7.0).unwrap();
        let b = two_sided_p_value(-2.1, 7.0).unwrap();
        assert!((a - b).abs() < 1e-15);
    }

    #[test]
    fn matches_known_critical_value() {
        // t_{0.975, 10} = 2.228139 -> two-sided p = 0.05
        let p = two_sided_p_value(2.228_138_851_986_274, 10.0).unwrap();
        assert!((p - 0.05).abs() < 1e-6, "p={p}");
    }

    #[test]
    fn degenerate_inputs_are_undefined() {
        assert!(two_sided_p_value(1.0, 0.0).is_none());
        assert!(two_sided_p_value(1.0, -3.0).is_none());
        assert!(two_sided_p_value(f64::NAN, 5.0).is_none());
        assert_eq!(two_sided_p_value(f64::INFINITY, 5.0), Some(0.0));
    }
}
