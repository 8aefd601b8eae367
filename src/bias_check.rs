//! Bias-addition reducer.
//!
//! The layer computes S = V + B elementwise over 2^w entries; the claim
//! "S's MLE evaluates to a at q" is rewritten as the hypercube sum of
//! I(q, x) * (V(x) + B(x)) and reduced over w degree-2 rounds. Challenges
//! are consumed from the high end: round i folds by r[w - 1 - i].

use std::time::Instant;

use crate::coins::CoinSource;
use crate::m61_field::{m61_add_mod, m61_mod, m61_mul_mod};
use crate::mle::{eval_identity, eval_mle, fold_top, seed_identity};
use crate::sumcheck::{check_final, check_rounds, line_at_2};
use crate::types::{Claim, LayerKind, RuntimeSplit, VerifyFailure};

/// Prover messages for one bias-layer run.
#[derive(Clone, Debug)]
pub struct BiasTranscript {
    /// Round polynomials, three samples per round.
    pub polys: Vec<[u64; 3]>,
    /// Prover's assertion: the matmul output V's MLE at the challenge
    /// vector. Becomes the downstream claim for the matmul reducer.
    pub v_eval: u64,
}

/// Prover side: accumulate the round polynomials for sum_x I(q,x)(V+B)(x),
/// folding the identity table and the running sum table in lockstep.
pub fn bias_prover(q: &[u64], r: &[u64], v: &[u64], b: &[u64]) -> BiasTranscript {
    let w = q.len();
    debug_assert_eq!(r.len(), w);
    debug_assert_eq!(v.len(), 1usize << w);
    debug_assert_eq!(b.len(), 1usize << w);

    let mut ident = seed_identity(q);
    let mut s: Vec<u64> = v.iter().zip(b).map(|(&vi, &bi)| m61_add_mod(vi, bi)).collect();

    let mut polys = Vec::with_capacity(w);
    let mut half = s.len();
    for i in 0..w {
        half >>= 1;
        let mut poly = [0u64; 3];
        for k in 0..half {
            let t0 = m61_mul_mod(ident[k], s[k]);
            let t1 = m61_mul_mod(ident[k + half], s[k + half]);
            let cross = m61_mul_mod(
                line_at_2(ident[k], ident[k + half]),
                line_at_2(s[k], s[k + half]),
            );
            poly[0] = m61_mod(poly[0] + t0);
            poly[1] = m61_mod(poly[1] + t1);
            poly[2] = m61_mod(poly[2] + cross);
        }
        let rho = r[w - 1 - i];
        fold_top(&mut ident, half, rho);
        fold_top(&mut s, half, rho);
        polys.push(poly);
    }

    BiasTranscript {
        polys,
        v_eval: eval_mle(v, r),
    }
}

/// Verifier side. The bias table is a model parameter the verifier holds
/// and evaluates itself; V's value at r is taken from the prover's
/// assertion and handed back as the claim the matmul reducer must
/// discharge.
pub fn bias_verify(
    claim: &Claim,
    r: &[u64],
    b: &[u64],
    transcript: &BiasTranscript,
) -> Result<Claim, VerifyFailure> {
    let kind = LayerKind::Bias;
    let w = claim.point.len();
    let expected = check_rounds(kind, claim.value, &transcript.polys, |i| r[w - 1 - i])?;

    let b_eval = eval_mle(b, r);
    let i_eval = eval_identity(&claim.point, r);
    let derived = m61_mul_mod(m61_mod(m61_mod(transcript.v_eval) + b_eval), i_eval);
    check_final(kind, derived, expected)?;

    Ok(Claim {
        point: r.to_vec(),
        value: transcript.v_eval,
    })
}

/// Run one bias layer end to end, reducing a claim on S = V + B to a claim
/// on V.
pub fn check_bias_layer(
    claim: &Claim,
    v: &[u64],
    b: &[u64],
    coins: &mut dyn CoinSource,
) -> Result<(Claim, RuntimeSplit), VerifyFailure> {
    let r = coins.coins(claim.point.len());

    let t = Instant::now();
    let transcript = bias_prover(&claim.point, &r, v, b);
    let prover = t.elapsed().as_secs_f64();

    let t = Instant::now();
    let out = bias_verify(claim, &r, b, &transcript)?;
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
