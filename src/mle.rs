//! Multilinear-extension toolkit over M61.
//!
//! A table of length 2^k is read as a function on the Boolean hypercube
//! {0,1}^k, with bit i of the index bound to coordinate i of an evaluation
//! point. Everything the three reducers share lives here: the Lagrange
//! basis chi, naive boundary evaluation, the identity MLE, the in-place
//! top-variable fold, and univariate extrapolation of round polynomials.

use crate::m61_field::{m61_add_mod, m61_canon, m61_inv_mod, m61_mod, m61_mul_mod, M61_MODULUS};

/// chi_v(r): the v-th multilinear Lagrange basis on {0,1}^n, i.e.
/// prod_i (r_i if bit i of v else 1 - r_i).
pub fn chi(v: u64, r: &[u64]) -> u64 {
    let mut x = v;
    let mut c: u64 = 1;
    for &ri in r {
        if x & 1 == 1 {
            c = m61_mul_mod(c, ri);
        } else {
            c = m61_mul_mod(c, 1 + M61_MODULUS - m61_canon(ri));
        }
        x >>= 1;
    }
    c
}

/// Evaluate the MLE of `table` (length 2^m) at r in F^m:
/// sum_k table[k] * chi_k(r). Naive Theta(m * 2^m); used only at reducer
/// boundaries where the cost belongs to the verifier or is already paid.
pub fn eval_mle(table: &[u64], r: &[u64]) -> u64 {
    debug_assert_eq!(table.len(), 1usize << r.len());
    let mut acc: u64 = 0;
    for (k, &v) in table.iter().enumerate() {
        acc = m61_add_mod(acc, m61_mul_mod(v, chi(k as u64, r)));
    }
    acc
}

/// MLE of the hypercube identity at (q, r):
/// prod_i (q_i r_i + (1 - q_i)(1 - r_i)). O(d).
pub fn eval_identity(q: &[u64], r: &[u64]) -> u64 {
    debug_assert_eq!(q.len(), r.len());
    let mut acc: u64 = 1;
    for (&qi, &ri) in q.iter().zip(r) {
        let term = m61_mod(
            m61_mul_mod(qi, ri)
                + m61_mul_mod(
                    1 + M61_MODULUS - m61_canon(qi),
                    1 + M61_MODULUS - m61_canon(ri),
                ),
        );
        acc = m61_mul_mod(acc, term);
    }
    acc
}

/// Substitute rho for the highest-indexed Boolean variable of the table:
/// table[k] <- table[k] * (1 - rho) + table[k + len] * rho for k < len.
/// The caller's live window shrinks from 2*len to len; this is the only
/// operation that retires a variable from a book-kept table.
pub fn fold_top(table: &mut [u64], len: usize, rho: u64) {
    debug_assert!(table.len() >= 2 * len);
    let one_minus = 1 + M61_MODULUS - m61_canon(rho);
    for k in 0..len {
        table[k] = m61_mod(m61_mul_mod(table[k], one_minus) + m61_mul_mod(table[k + len], rho));
    }
}

/// Expand a point q into the table of its Lagrange basis values:
/// table[v] = chi_v(q) for v in {0, 1}^|q|. This is the tensor product the
/// bias and activation reducers pre-seed their identity tables from.
pub fn seed_identity(q: &[u64]) -> Vec<u64> {
    let mut table = vec![0u64; 1 << q.len()];
    table[0] = 1;
    let mut steps = 1usize;
    for &qi in q {
        let one_minus = 1 + M61_MODULUS - m61_canon(qi);
        for k in 0..steps {
            let t = table[k];
            table[k] = m61_mul_mod(t, one_minus);
            table[k + steps] = m61_mul_mod(t, qi);
        }
        steps <<= 1;
    }
    table
}

/// Lagrange extrapolation: `samples` holds the values of a degree < n
/// polynomial at 0, 1, ..., n-1; returns its value at r.
pub fn lagrange_extrap(samples: &[u64], r: u64) -> u64 {
    let n = samples.len() as u64;
    let mut result: u64 = 0;
    for i in 0..n {
        let mut mult: u64 = 1;
        for j in 0..n {
            if i > j {
                mult = m61_mul_mod(
                    m61_mul_mod(mult, m61_mod(r + M61_MODULUS - j)),
                    m61_inv_mod(i - j),
                );
            }
            if i < j {
                mult = m61_mul_mod(
                    m61_mul_mod(mult, m61_mod(r + M61_MODULUS - j)),
                    m61_inv_mod(m61_mod(i + M61_MODULUS - j)),
                );
            }
        }
        result = m61_add_mod(result, m61_mul_mod(mult, samples[i as usize]));
    }
    result
}
