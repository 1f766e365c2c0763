use super::{ClassificationResult, Label};

/// Outcome of `pos / neg`, keeping the zero-denominator case distinct.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbsorbanceRatio {
    Quotient(f64),
    /// `neg == 0`. Reported as a ratio of exactly 0 rather than infinity,
    /// which always classifies NEGATIVE for a non-negative threshold.
    ZeroDenominator,
}

impl AbsorbanceRatio {
    pub fn compute(pos: f64, neg: f64) -> Self {
        if neg == 0.0 {
            AbsorbanceRatio::ZeroDenominator
        } else {
            AbsorbanceRatio::Quotient(pos / neg)
        }
    }

    /// The number shown to the operator and compared with the threshold.
    pub fn value(self) -> f64 {
        match self {
            AbsorbanceRatio::Quotient(r) => r,
            AbsorbanceRatio::ZeroDenominator => 0.0,
        }
    }
}

/// `A_pos / A_neg` against `threshold`; POSITIVE only when strictly above.
pub fn classify_ratio(pos: f64, neg: f64, threshold: f64) -> ClassificationResult {
    let ratio = AbsorbanceRatio::compute(pos, neg);
    if ratio == AbsorbanceRatio::ZeroDenominator {
        log::warn!("absorbance at the negative wavelength is 0; reporting ratio 0");
    }
    let metric = ratio.value();
    let label = if metric > threshold {
        Label::Positive
    } else {
        Label::Negative
    };
    ClassificationResult {
        metric,
        label,
        threshold_used: threshold,
    }
}
