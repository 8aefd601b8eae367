//! Network instances: architecture files, tensor fill, forward evaluation.
//!
//! The architecture file is plain text: batch size on the first line,
//! input dimension on the second, then one output dimension per layer.
//! Every value is rounded up to a power of two via ceiling log2, matching
//! the hypercube indexing the protocol needs. Tensors are filled with
//! small pseudorandom integers embedded directly into the field.

use std::fmt;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::m61_field::{m61_add_mod, m61_mod, m61_mul_mod};
use crate::types::LayerDims;

/// Below this output size the forward matmul stays sequential.
const PAR_THRESHOLD: usize = 1 << 12;

/// Architecture-file problems, fatal at startup.
#[derive(Debug)]
pub struct ArchError {
    pub message: String,
}

impl fmt::Display for ArchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "architecture file: {}", self.message)
    }
}

impl std::error::Error for ArchError {}

fn ceil_log2(v: u64) -> usize {
    64 - (v - 1).leading_zeros() as usize
}

/// Parse architecture text into per-layer dimension triples.
pub fn parse_architecture(text: &str) -> Result<Vec<LayerDims>, ArchError> {
    let mut values = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let v: u64 = line.parse().map_err(|_| ArchError {
            message: format!("line {}: not a number: {:?}", idx + 1, line),
        })?;
        if v == 0 {
            return Err(ArchError {
                message: format!("line {}: dimension must be positive", idx + 1),
            });
        }
        values.push(v);
    }
    if values.len() < 3 {
        return Err(ArchError {
            message: "need a batch size, an input width and at least one layer".to_string(),
        });
    }

    let batch_bits = ceil_log2(values[0]);
    let mut prev_bits = ceil_log2(values[1]);
    let mut layers = Vec::with_capacity(values.len() - 2);
    for &v in &values[2..] {
        let curr_bits = ceil_log2(v);
        layers.push(LayerDims {
            batch_bits,
            in_bits: prev_bits,
            out_bits: curr_bits,
        });
        prev_bits = curr_bits;
    }
    Ok(layers)
}

/// Read and parse an architecture file.
pub fn read_architecture(path: &Path) -> Result<Vec<LayerDims>, ArchError> {
    let text = fs::read_to_string(path).map_err(|e| ArchError {
        message: format!("cannot read {}: {}", path.display(), e),
    })?;
    parse_architecture(&text)
}

/// One network instance with all tensors already embedded in the field.
/// Weights are stored transposed (the inner axis low) so both matmul
/// operands share the contiguous k-axis.
#[derive(Clone, Debug)]
pub struct Network {
    pub layers: Vec<LayerDims>,
    /// Input batch, 2^(e + d_1) entries, row-major with the d_1 axis low.
    pub input: Vec<u64>,
    /// Per-layer transposed weights, 2^(d + f) entries each.
    pub weights: Vec<Vec<u64>>,
    /// Per-layer bias tables, 2^(e + f) entries each.
    pub biases: Vec<Vec<u64>>,
}

impl Network {
    /// Pseudorandom benchmark instance with small entries, the usual
    /// quantized-inference embedding.
    pub fn random(layers: Vec<LayerDims>, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut fill =
            |bits: usize| -> Vec<u64> { (0..1usize << bits).map(|_| rng.gen_range(0..100)).collect() };

        let first = layers[0];
        let input = fill(first.batch_bits + first.in_bits);
        let mut weights = Vec::with_capacity(layers.len());
        let mut biases = Vec::with_capacity(layers.len());
        for dims in &layers {
            weights.push(fill(dims.in_bits + dims.out_bits));
            biases.push(fill(dims.width_bits()));
        }
        Self {
            layers,
            input,
            weights,
            biases,
        }
    }
}

/// C[i * 2^f + j] = sum_k A[i * 2^d + k] * W[j * 2^d + k]. Rows of the
/// output are independent, so large batches fan out over rayon.
pub fn matmul_forward(dims: LayerDims, a: &[u64], w: &[u64]) -> Vec<u64> {
    let rows = 1usize << dims.batch_bits;
    let inner = 1usize << dims.in_bits;
    let cols = 1usize << dims.out_bits;
    debug_assert_eq!(a.len(), rows * inner);
    debug_assert_eq!(w.len(), cols * inner);

    let cell = |i: usize, j: usize| -> u64 {
        let mut acc = 0u64;
        for k in 0..inner {
            acc = m61_mod(acc + m61_mul_mod(a[i * inner + k], w[j * inner + k]));
        }
        acc
    };

    let mut c = vec![0u64; rows * cols];
    if rows * cols >= PAR_THRESHOLD {
        c.par_chunks_mut(cols).enumerate().for_each(|(i, row)| {
            for (j, slot) in row.iter_mut().enumerate() {
                *slot = cell(i, j);
            }
        });
    } else {
        for i in 0..rows {
            for j in 0..cols {
                c[i * cols + j] = cell(i, j);
            }
        }
    }
    c
}

/// S = M + B elementwise.
pub fn bias_forward(m: &[u64], b: &[u64]) -> Vec<u64> {
    debug_assert_eq!(m.len(), b.len());
    m.iter().zip(b).map(|(&x, &y)| m61_add_mod(x, y)).collect()
}

/// A = S * S elementwise.
pub fn square_forward(s: &[u64]) -> Vec<u64> {
    s.iter().map(|&x| m61_mul_mod(x, x)).collect()
}
