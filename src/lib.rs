//! Interactive verification of fully-connected network inference over the
//! Mersenne prime field 2^61 - 1.
//!
//! A batch of inputs is pushed through a layered arithmetic circuit
//! (matrix multiplication, bias addition, square activation) by an
//! untrusted prover; the verifier walks the layers from the output back to
//! the input with one sum-check reduction per layer operation, threading a
//! (point, value) claim between consecutive reducers. The verifier touches
//! the full input and output tables once each and otherwise reads only the
//! per-round polynomials.
//!
//! Module map:
//! - [`m61_field`]: loose-representation arithmetic mod 2^61 - 1
//! - [`mle`]: multilinear-extension toolkit shared by the reducers
//! - [`coins`]: injectable verifier challenge source
//! - [`sumcheck`]: round-polynomial plumbing common to all reducers
//! - [`matmul_check`], [`bias_check`], [`square_check`]: the three reducers
//! - [`network`]: architecture files, tensor fill, forward evaluation
//! - [`driver`]: the output-to-input layer walk

pub mod bias_check;
pub mod coins;
pub mod driver;
pub mod m61_field;
pub mod matmul_check;
pub mod mle;
pub mod network;
pub mod square_check;
pub mod sumcheck;
pub mod types;
