//! Shared sum-check plumbing.
//!
//! Each reducer sends one univariate polynomial per round as its values at
//! 0, 1, 2 (degree-2 rounds) or 0, 1, 2, 3 (degree-3 rounds). The verifier
//! walks that table: the first two samples of round i must sum to the
//! previous round's polynomial evaluated at its challenge, with round 0
//! checked against the upstream claim. Every comparison goes through
//! canonical equality, which absorbs the loose representation.

use crate::m61_field::{m61_add_mod, m61_canon, m61_eq_mod, m61_mod, M61_MODULUS};
use crate::mle::lagrange_extrap;
use crate::types::{LayerKind, VerifyFailure};

/// Value at 2 of the line through (lo at 0, hi at 1): 2*hi - lo.
#[inline]
pub fn line_at_2(lo: u64, hi: u64) -> u64 {
    m61_mod(2 * hi + (M61_MODULUS - m61_canon(lo)))
}

/// Value at 3 of the same line: 3*hi - 2*lo.
#[inline]
pub fn line_at_3(lo: u64, hi: u64) -> u64 {
    m61_mod(3 * hi + 2 * (M61_MODULUS - m61_canon(lo)))
}

/// Walk the round polynomials against the upstream claim. `challenge_of`
/// maps a round index to the coin its fold consumed; the returned value is
/// the last round's polynomial at its challenge (the upstream claim itself
/// when there are no rounds), which the caller's final check must match.
pub fn check_rounds<const K: usize>(
    kind: LayerKind,
    claim: u64,
    polys: &[[u64; K]],
    challenge_of: impl Fn(usize) -> u64,
) -> Result<u64, VerifyFailure> {
    let mut expected = claim;
    for (i, poly) in polys.iter().enumerate() {
        let sum = m61_add_mod(m61_mod(poly[0]), m61_mod(poly[1]));
        if !m61_eq_mod(sum, expected) {
            if i == 0 {
                return Err(VerifyFailure::FirstCheck { kind });
            }
            return Err(VerifyFailure::RoundCheck { kind, round: i });
        }
        expected = lagrange_extrap(poly, challenge_of(i));
    }
    Ok(expected)
}

/// Closing check: the summand value re-derived from boundary MLE
/// evaluations against the last round's extrapolation.
pub fn check_final(kind: LayerKind, derived: u64, expected: u64) -> Result<(), VerifyFailure> {
    if m61_eq_mod(derived, expected) {
        Ok(())
    } else {
        Err(VerifyFailure::FinalCheck { kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_extrapolation() {
        // Line through (5, 9): value 13 at 2, 17 at 3.
        assert!(m61_eq_mod(line_at_2(5, 9), 13));
        assert!(m61_eq_mod(line_at_3(5, 9), 17));
        // Descending line through (9, 5): 1 at 2, -3 at 3.
        assert!(m61_eq_mod(line_at_2(9, 5), 1));
        assert!(m61_eq_mod(line_at_3(9, 5), M61_MODULUS - 3));
    }

    #[test]
    fn test_line_accepts_loose_inputs() {
        assert!(m61_eq_mod(line_at_2(M61_MODULUS + 5, 9), 13));
        assert!(m61_eq_mod(line_at_3(5, M61_MODULUS + 9), 17));
    }

    #[test]
    fn test_check_rounds_empty_passes_claim_through() {
        let polys: [[u64; 3]; 0] = [];
        let out = check_rounds(LayerKind::Bias, 42, &polys, |_| 0).unwrap();
        assert_eq!(out, 42);
    }

    #[test]
    fn test_check_rounds_flags_first_round() {
        let polys = [[1u64, 2, 3]];
        let err = check_rounds(LayerKind::Bias, 42, &polys, |_| 0).unwrap_err();
        assert_eq!(
            err,
            VerifyFailure::FirstCheck {
                kind: LayerKind::Bias
            }
        );
    }

    #[test]
    fn test_check_rounds_tolerates_extra_p() {
        // A raw claim offset by exactly p is the same residue.
        let polys = [[1u64, 2, 3]];
        assert!(check_rounds(LayerKind::Bias, 3 + M61_MODULUS, &polys, |_| 0).is_ok());
    }

    #[test]
    fn test_check_rounds_chains_extrapolations() {
        // Round 0: line 4x + 2 sampled at 0,1,2; challenge 3 gives 14.
        // Round 1 must open with samples summing to 14.
        let polys = [[2u64, 6, 10], [6u64, 8, 11]];
        let challenges = [3u64, 1];
        assert!(check_rounds(LayerKind::MatMul, 8, &polys, |i| challenges[i]).is_ok());

        let bad = [[2u64, 6, 10], [7u64, 8, 11]];
        let err = check_rounds(LayerKind::MatMul, 8, &bad, |i| challenges[i]).unwrap_err();
        assert_eq!(
            err,
            VerifyFailure::RoundCheck {
                kind: LayerKind::MatMul,
                round: 1
            }
        );
    }
}
