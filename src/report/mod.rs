//! Reporting utilities: outlier detection stats and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized

pub mod format;

pub use format::*;

/// How well the consensus set separates the generated outliers.
///
/// A row is *flagged* when it is left out of the consensus set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub n_rows: usize,
    pub true_outliers: usize,
    pub flagged: usize,
    pub true_positive: usize,
}

impl Detection {
    /// Share of flagged rows that are real outliers.
    pub fn precision(&self) -> Option<f64> {
        (self.flagged > 0).then(|| self.true_positive as f64 / self.flagged as f64)
    }

    /// Share of real outliers that were flagged.
    pub fn recall(&self) -> Option<f64> {
        (self.true_outliers > 0).then(|| self.true_positive as f64 / self.true_outliers as f64)
    }
}

/// Compare ground-truth outlier flags against a consensus set of row indices.
pub fn compute_detection(outlier: &[bool], consensus: &[usize]) -> Detection {
    let mut in_consensus = vec![false; outlier.len()];
    for &row in consensus {
        if let Some(slot) = in_consensus.get_mut(row) {
            *slot = true;
        }
    }

    let mut flagged = 0;
    let mut true_positive = 0;
    for (&is_outlier, &kept) in outlier.iter().zip(in_consensus.iter()) {
        if !kept {
            flagged += 1;
            if is_outlier {
                true_positive += 1;
            }
        }
    }

    Detection {
        n_rows: outlier.len(),
        true_outliers: outlier.iter().filter(|&&o| o).count(),
        flagged,
        true_positive,
    }
}
