//! Square-activation reducer.
//!
//! The layer computes A = V * V elementwise; the claim on A's MLE at q is
//! rewritten as the hypercube sum of I(q, x) * V(x)^2. The squared factor
//! makes each round polynomial degree 3, so four samples travel per round.
//! Unlike the other two reducers this one retires the *low* variable each
//! round and consumes challenges in draw order (round i folds by r[i]);
//! the final evaluation order matches, so the conventions never mix.

use std::time::Instant;

use crate::coins::CoinSource;
use crate::m61_field::{m61_canon, m61_mod, m61_mul_mod, M61_MODULUS};
use crate::mle::{eval_identity, eval_mle, seed_identity};
use crate::sumcheck::{check_final, check_rounds, line_at_2, line_at_3};
use crate::types::{Claim, LayerKind, RuntimeSplit, VerifyFailure};

/// Prover messages for one activation-layer run.
#[derive(Clone, Debug)]
pub struct SquareTranscript {
    /// Round polynomials, four samples per round.
    pub polys: Vec<[u64; 4]>,
    /// Prover's assertion: the pre-activation table's MLE at the challenge
    /// vector. Becomes the downstream claim for the bias reducer.
    pub s_eval: u64,
}

/// Prover side: per round, read each even/odd pair, extend it linearly to
/// the sample points 0..4, accumulate I * V * V, then fold both running
/// tables pairwise by this round's challenge.
pub fn square_prover(q: &[u64], r: &[u64], s: &[u64]) -> SquareTranscript {
    let w = q.len();
    debug_assert_eq!(r.len(), w);
    debug_assert_eq!(s.len(), 1usize << w);

    let mut i_t = seed_identity(q);
    let mut v_t = s.to_vec();

    let mut polys = Vec::with_capacity(w);
    let mut half = s.len();
    for round in 0..w {
        half >>= 1;
        let rho = r[round];
        let one_minus = 1 + M61_MODULUS - m61_canon(rho);
        let mut poly = [0u64; 4];
        for k in 0..half {
            let j = 2 * k;
            let (v0, v1) = (v_t[j], v_t[j + 1]);
            let (i0, i1) = (i_t[j], i_t[j + 1]);

            let pv = [v0, v1, line_at_2(v0, v1), line_at_3(v0, v1)];
            let pi = [i0, i1, line_at_2(i0, i1), line_at_3(i0, i1)];
            for m in 0..4 {
                poly[m] = m61_mod(poly[m] + m61_mul_mod(m61_mul_mod(pv[m], pv[m]), pi[m]));
            }

            v_t[k] = m61_mod(m61_mul_mod(v0, one_minus) + m61_mul_mod(v1, rho));
            i_t[k] = m61_mod(m61_mul_mod(i0, one_minus) + m61_mul_mod(i1, rho));
        }
        polys.push(poly);
    }

    SquareTranscript {
        polys,
        s_eval: eval_mle(s, r),
    }
}

/// Verifier side: round checks in draw order, then the closing
/// V(r)^2 * I(q, r) re-derivation using the prover's forwarded assertion.
pub fn square_verify(
    claim: &Claim,
    r: &[u64],
    transcript: &SquareTranscript,
) -> Result<Claim, VerifyFailure> {
    let kind = LayerKind::SquareActivation;
    let expected = check_rounds(kind, claim.value, &transcript.polys, |i| r[i])?;

    let i_eval = eval_identity(&claim.point, r);
    let s_eval = m61_mod(transcript.s_eval);
    let derived = m61_mul_mod(m61_mul_mod(s_eval, s_eval), i_eval);
    check_final(kind, derived, expected)?;

    Ok(Claim {
        point: r.to_vec(),
        value: transcript.s_eval,
    })
}

/// Run one activation layer end to end, reducing a claim on A = V * V to a
/// claim on V.
pub fn check_square_layer(
    claim: &Claim,
    s: &[u64],
    coins: &mut dyn CoinSource,
) -> Result<(Claim, RuntimeSplit), VerifyFailure> {
    let r = coins.coins(claim.point.len());

    let t = Instant::now();
    let transcript = square_prover(&claim.point, &r, s);
    let prover = t.elapsed().as_secs_f64();

    let t = Instant::now();
    let out = square_verify(claim, &r, &transcript)?;
    let verifier = t.elapsed().as_secs_f64();

    Ok((
        out,
        RuntimeSplit {
            unverifiable: 0.0,
            prover,
            verifier,
        },
    ))
}
