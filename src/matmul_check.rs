//! Matrix-multiplication reducer, after Thaler's interactive proof for
//! C = A x W with the inner axis contiguous in both operands (W stored
//! transposed): C[i, j] = sum_k A[i, k] * W[j, k].
//!
//! The combined evaluation point r has length d + e + f, laid out
//! [0..d) fresh inner-axis coins, [d..d+f) the incoming point's
//! column coordinates, [d+f..d+e+f) its row coordinates. The prover first
//! binds both operands' row axes to the incoming point, leaving two
//! length-2^d tables over the shared inner axis, then runs d degree-2
//! rounds consuming the fresh coins high to low.

use std::time::Instant;

use crate::coins::CoinSource;
use crate::m61_field::{m61_mod, m61_mul_mod};
use crate::mle::{eval_mle, fold_top};
use crate::sumcheck::{check_final, check_rounds, line_at_2};
use crate::types::{Claim, LayerDims, LayerKind, RuntimeSplit, VerifyFailure};

/// Prover messages for one matmul-layer run.
#[derive(Clone, Debug)]
pub struct MatMulTranscript {
    /// Round polynomials, three samples per round, d rounds.
    pub polys: Vec<[u64; 3]>,
    /// Prover's assertion: the A-side operand's MLE at its slice of the
    /// combined point. Ignored at the network input, where the verifier
    /// evaluates the true input itself.
    pub a_eval: u64,
}

/// Slice of the combined point that addresses the A operand: inner-axis
/// coins, then the incoming point's row coordinates.
pub fn a_point(dims: LayerDims, r: &[u64]) -> Vec<u64> {
    let (e, d, f) = (dims.batch_bits, dims.in_bits, dims.out_bits);
    let mut point = Vec::with_capacity(d + e);
    point.extend_from_slice(&r[..d]);
    point.extend_from_slice(&r[d + f..d + f + e]);
    point
}

/// Slice of the combined point that addresses the W operand: inner-axis
/// coins, then the incoming point's column coordinates.
pub fn b_point(dims: LayerDims, r: &[u64]) -> Vec<u64> {
    let (d, f) = (dims.in_bits, dims.out_bits);
    r[..d + f].to_vec()
}

/// Prover side. `a` is the layer input (2^(e+d), inner axis low) and `w`
/// the transposed weights (2^(d+f), inner axis low); both are copied, the
/// row axes bound to the incoming point's coordinates high to low, and the
/// inner axis summed out over d rounds.
pub fn matmul_prover(dims: LayerDims, r: &[u64], a: &[u64], w: &[u64]) -> MatMulTranscript {
    let (e, d, f) = (dims.batch_bits, dims.in_bits, dims.out_bits);
    debug_assert_eq!(r.len(), d + e + f);
    debug_assert_eq!(a.len(), 1usize << (e + d));
    debug_assert_eq!(w.len(), 1usize << (d + f));

    let mut v0 = a.to_vec();
    let mut v1 = w.to_vec();

    let mut len = v0.len();
    for round in 0..e {
        len >>= 1;
        fold_top(&mut v0, len, r[f + d + e - 1 - round]);
    }
    let mut len = v1.len();
    for round in e..e + f {
        len >>= 1;
        fold_top(&mut v1, len, r[f + d + e - 1 - round]);
    }

    let mut polys = Vec::with_capacity(d);
    let mut half = 1usize << d;
    for round in 0..d {
        half >>= 1;
        let mut poly = [0u64; 3];
        for k in 0..half {
            let t0 = m61_mul_mod(v0[k], v1[k]);
            let t1 = m61_mul_mod(v0[k + half], v1[k + half]);
            let cross = m61_mul_mod(
                line_at_2(v0[k], v0[k + half]),
                line_at_2(v1[k], v1[k + half]),
            );
            poly[0] = m61_mod(poly[0] + t0);
            poly[1] = m61_mod(poly[1] + t1);
            poly[2] = m61_mod(poly[2] + cross);
        }
        let rho = r[d - 1 - round];
        fold_top(&mut v0, half, rho);
        fold_top(&mut v1, half, rho);
        polys.push(poly);
    }

    MatMulTranscript {
        polys,
        a_eval: eval_mle(a, &a_point(dims, r)),
    }
}

/// Verifier side. The weights are a model parameter the verifier holds and
/// evaluates itself. At the network input (`network_input` present) the
/// verifier also evaluates the A side from the true input table (the one
/// step it cannot delegate) and the chain terminates with no downstream
/// claim. Everywhere else the prover's assertion becomes the claim handed
/// to the next layer.
pub fn matmul_verify(
    claim: &Claim,
    dims: LayerDims,
    r: &[u64],
    w: &[u64],
    network_input: Option<&[u64]>,
    transcript: &MatMulTranscript,
) -> Result<Option<Claim>, VerifyFailure> {
    let kind = LayerKind::MatMul;
    let d = dims.in_bits;
    let expected = check_rounds(kind, claim.value, &transcript.polys, |i| r[d - 1 - i])?;

    let b_eval = eval_mle(w, &b_point(dims, r));
    let a_eval = match network_input {
        Some(input) => eval_mle(input, &a_point(dims, r)),
        None => m61_mod(transcript.a_eval),
    };
    check_final(kind, m61_mul_mod(a_eval, b_eval), expected)?;

    Ok(match network_input {
        Some(_) => None,
        None => Some(Claim {
            point: a_point(dims, r),
            value: transcript.a_eval,
        }),
    })
}

/// Run one matmul layer end to end, reducing a claim on the product table
/// to a claim on the layer input (or to nothing at the network input).
pub fn check_matmul_layer(
    claim: &Claim,
    dims: LayerDims,
    a: &[u64],
    w: &[u64],
    network_input: Option<&[u64]>,
    coins: &mut dyn CoinSource,
) -> Result<(Option<Claim>, RuntimeSplit), VerifyFailure> {
    debug_assert_eq!(claim.point.len(), dims.batch_bits + dims.out_bits);
    let mut r = coins.coins(dims.in_bits);
    r.extend_from_slice(&claim.point);

    let t = Instant::now();
    let transcript = matmul_prover(dims, &r, a, w);
    let prover = t.elapsed().as_secs_f64();

    let t = Instant::now();
    let out = matmul_verify(claim, dims, &r, w, network_input, &transcript)?;
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
