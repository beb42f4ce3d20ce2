//! Numeric helpers shared by the estimators.

/// Numerically stable `ln(sum(exp(x)))`.
///
/// Returns negative infinity for an empty slice.
pub fn log_sum_exp(scores: &[f64]) -> f64 {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = scores.iter().map(|&s| (s - max).exp()).sum();
    max + sum.ln()
}

/// Softmax of `scores`, computed against the log-normalizer of all of them.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let norm = log_sum_exp(scores);
    scores.iter().map(|&s| (s - norm).exp()).collect()
}

/// Inverse document frequency, `log2(N / df)`.
#[derive(Debug, Clone, Copy)]
pub struct Idf {
    doc_count: f64,
}

impl Idf {
    /// Create an estimator for a collection of `doc_count` documents.
    pub fn new(doc_count: u64) -> Self {
        Idf {
            doc_count: doc_count as f64,
        }
    }

    /// Idf of a term with document frequency `doc_freq` (clamped to 1).
    pub fn idf(&self, doc_freq: u64) -> f64 {
        (self.doc_count / doc_freq.max(1) as f64).log2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_sum_exp_matches_naive() {
        let scores = [1.0, 2.0, 3.0];
        let naive = scores.iter().map(|s: &f64| s.exp()).sum::<f64>().ln();
        assert!((log_sum_exp(&scores) - naive).abs() < 1e-12);
    }

    #[test]
    fn test_log_sum_exp_is_stable_for_large_scores() {
        let value = log_sum_exp(&[1000.0, 1000.0]);
        assert!((value - (1000.0 + 2f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn test_log_sum_exp_empty() {
        assert_eq!(log_sum_exp(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probabilities = softmax(&[-3.2, 7.5, 0.0, 12.25]);
        let total: f64 = probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(probabilities[3] > probabilities[1]);
    }

    #[test]
    fn test_idf_decreases_with_df() {
        let idf = Idf::new(100);
        assert!(idf.idf(1) > idf.idf(10));
        assert_eq!(idf.idf(100), 0.0);
        assert_eq!(idf.idf(0), idf.idf(1));
    }

    #[test]
    fn test_idf_is_base_two() {
        let idf = Idf::new(64);
        assert_eq!(idf.idf(1), 6.0);
        assert_eq!(idf.idf(16), 2.0);
    }
}
