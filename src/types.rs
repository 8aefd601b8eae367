//! Shared protocol types: layer shapes, claims, timing records, failures.

use std::fmt;
use std::ops::AddAssign;

// ============================================================
//                    LAYER SHAPE
// ============================================================

/// Binary logarithms of one layer's shape: a batch of 2^e rows, input
/// width 2^d, output width 2^f.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerDims {
    /// e: log2 batch size.
    pub batch_bits: usize,
    /// d: log2 input width (the matmul inner axis).
    pub in_bits: usize,
    /// f: log2 output width.
    pub out_bits: usize,
}

impl LayerDims {
    /// Width in bits of the layer's output table, the variable count for
    /// the bias and activation reducers.
    pub fn width_bits(&self) -> usize {
        self.batch_bits + self.out_bits
    }
}

// ============================================================
//                    CLAIMS
// ============================================================

/// A (point, value) pair: the MLE of some table is claimed to evaluate to
/// `value` at `point`. Produced when a reducer finishes, consumed when the
/// next one starts. The value may be loose.
#[derive(Clone, Debug)]
pub struct Claim {
    pub point: Vec<u64>,
    pub value: u64,
}

// ============================================================
//                    FAILURES
// ============================================================

/// Which reducer a diagnostic belongs to. The display names are matched
/// verbatim by tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    MatMul,
    Bias,
    SquareActivation,
}

impl LayerKind {
    /// Short tag for trace lines.
    pub fn tag(&self) -> &'static str {
        match self {
            LayerKind::MatMul => "matmul",
            LayerKind::Bias => "bias",
            LayerKind::SquareActivation => "square",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::MatMul => write!(f, "matrix-matrix mult layer"),
            LayerKind::Bias => write!(f, "bias layer"),
            LayerKind::SquareActivation => write!(f, "square activation layer"),
        }
    }
}

/// A failed verifier check. No local recovery: the driver stops at the
/// first failure and the binary exits nonzero after one diagnostic line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyFailure {
    /// Round 0 of the sum-check disagreed with the upstream claim.
    FirstCheck { kind: LayerKind },
    /// Round `round` disagreed with the previous round's polynomial
    /// evaluated at its challenge.
    RoundCheck { kind: LayerKind, round: usize },
    /// The closing MLE re-derivation disagreed with the last round.
    FinalCheck { kind: LayerKind },
}

impl fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyFailure::FirstCheck { kind } => write!(f, "{kind} first check failed"),
            VerifyFailure::RoundCheck { kind, round } => {
                write!(f, "{kind} round {round} check failed")
            }
            VerifyFailure::FinalCheck { kind } => write!(f, "{kind} last check failed"),
        }
    }
}

impl std::error::Error for VerifyFailure {}

// ============================================================
//                    TIMING
// ============================================================

/// Three-way runtime split for one reducer run, in seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuntimeSplit {
    /// Plain evaluation of the layer, outside the proof.
    pub unverifiable: f64,
    /// Prover-side work: round polynomials, folds, forwarded assertions.
    pub prover: f64,
    /// Verifier-side work: round checks and boundary MLE evaluations.
    pub verifier: f64,
}

impl AddAssign for RuntimeSplit {
    fn add_assign(&mut self, rhs: Self) {
        self.unverifiable += rhs.unverifiable;
        self.prover += rhs.prover;
        self.verifier += rhs.verifier;
    }
}

/// One reducer's contribution to the run report.
#[derive(Clone, Debug)]
pub struct ReducerRecord {
    /// 1-based layer index, counted from the input side.
    pub layer: usize,
    pub kind: LayerKind,
    pub time: RuntimeSplit,
}
