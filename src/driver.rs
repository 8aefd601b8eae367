//! Layer driver: the output-to-input walk.
//!
//! The prover first evaluates the network outright (the unverifiable
//! work). The verifier then opens the true output at one random point and
//! walks the layers backward, square activation (skipped at the output
//! layer) then bias then matrix multiplication, threading each reducer's
//! downstream claim into the next. The chain bottoms out at the network
//! input, whose MLE the verifier evaluates itself.

use std::time::Instant;

use crate::bias_check::check_bias_layer;
use crate::coins::CoinSource;
use crate::matmul_check::check_matmul_layer;
use crate::mle::eval_mle;
use crate::network::{bias_forward, matmul_forward, square_forward, Network};
use crate::square_check::check_square_layer;
use crate::types::{Claim, LayerKind, ReducerRecord, RuntimeSplit, VerifyFailure};

/// Outcome of a full verification run: one record per reducer, in
/// verification order (output layer first), plus the summed split.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub records: Vec<ReducerRecord>,
    pub total: RuntimeSplit,
}

struct ForwardPass {
    /// Input table of each layer: X_{l-1}, indexed by layer.
    layer_inputs: Vec<Vec<u64>>,
    /// Matmul outputs M_l.
    products: Vec<Vec<u64>>,
    /// Bias sums S_l = M_l + B_l.
    sums: Vec<Vec<u64>>,
    /// Final network output (S_L: the last layer has no activation).
    output: Vec<u64>,
    matmul_secs: Vec<f64>,
    bias_secs: Vec<f64>,
    square_secs: Vec<f64>,
}

fn forward(net: &Network) -> ForwardPass {
    let l = net.layers.len();
    let mut layer_inputs = Vec::with_capacity(l);
    let mut products = Vec::with_capacity(l);
    let mut sums = Vec::with_capacity(l);
    let mut matmul_secs = Vec::with_capacity(l);
    let mut bias_secs = Vec::with_capacity(l);
    let mut square_secs = Vec::with_capacity(l);

    let mut current = net.input.clone();
    for (idx, dims) in net.layers.iter().enumerate() {
        let t = Instant::now();
        let m = matmul_forward(*dims, &current, &net.weights[idx]);
        matmul_secs.push(t.elapsed().as_secs_f64());

        let t = Instant::now();
        let s = bias_forward(&m, &net.biases[idx]);
        bias_secs.push(t.elapsed().as_secs_f64());

        let next = if idx == l - 1 {
            square_secs.push(0.0);
            s.clone()
        } else {
            let t = Instant::now();
            let a = square_forward(&s);
            square_secs.push(t.elapsed().as_secs_f64());
            a
        };

        layer_inputs.push(std::mem::replace(&mut current, next));
        products.push(m);
        sums.push(s);
    }

    ForwardPass {
        layer_inputs,
        products,
        sums,
        output: current,
        matmul_secs,
        bias_secs,
        square_secs,
    }
}

/// Verify one network instance end to end. Aborts at the first failed
/// check; on success every reducer in every layer has passed its round
/// checks and its final check.
pub fn verify_network(
    net: &Network,
    coins: &mut dyn CoinSource,
) -> Result<RunReport, VerifyFailure> {
    let l = net.layers.len();
    let pass = forward(net);

    // The verifier's one look at the true output seeds the claim chain.
    let q0 = coins.coins(net.layers[l - 1].width_bits());
    let t = Instant::now();
    let a0 = eval_mle(&pass.output, &q0);
    let output_eval_secs = t.elapsed().as_secs_f64();

    let mut claim = Claim {
        point: q0,
        value: a0,
    };

    let mut records = Vec::with_capacity(3 * l - 1);
    for idx in (0..l).rev() {
        let dims = net.layers[idx];

        if idx != l - 1 {
            let (next, mut time) = check_square_layer(&claim, &pass.sums[idx], coins)?;
            time.unverifiable = pass.square_secs[idx];
            records.push(ReducerRecord {
                layer: idx + 1,
                kind: LayerKind::SquareActivation,
                time,
            });
            claim = next;
        }

        let (next, mut time) =
            check_bias_layer(&claim, &pass.products[idx], &net.biases[idx], coins)?;
        time.unverifiable = pass.bias_secs[idx];
        if idx == l - 1 {
            time.verifier += output_eval_secs;
        }
        records.push(ReducerRecord {
            layer: idx + 1,
            kind: LayerKind::Bias,
            time,
        });
        claim = next;

        let network_input = (idx == 0).then(|| pass.layer_inputs[0].as_slice());
        let (next, mut time) = check_matmul_layer(
            &claim,
            dims,
            &pass.layer_inputs[idx],
            &net.weights[idx],
            network_input,
            coins,
        )?;
        time.unverifiable = pass.matmul_secs[idx];
        records.push(ReducerRecord {
            layer: idx + 1,
            kind: LayerKind::MatMul,
            time,
        });
        if let Some(next) = next {
            claim = next;
        }
    }

    let mut total = RuntimeSplit::default();
    for rec in &records {
        total += rec.time;
    }
    Ok(RunReport { records, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coins::SeededCoins;
    use crate::network::parse_architecture;

    #[test]
    fn test_single_layer_network_verifies() {
        let layers = parse_architecture("1\n1\n1\n").unwrap();
        let net = Network::random(layers, 1);
        let mut coins = SeededCoins::from_seed(2);
        let report = verify_network(&net, &mut coins).unwrap();
        // One layer: bias + matmul, no activation.
        assert_eq!(report.records.len(), 2);
    }

    #[test]
    fn test_two_layer_network_verifies() {
        let layers = parse_architecture("2\n4\n4\n4\n").unwrap();
        let net = Network::random(layers, 1);
        let mut coins = SeededCoins::from_seed(3);
        let report = verify_network(&net, &mut coins).unwrap();
        assert_eq!(report.records.len(), 5);
    }

    #[test]
    fn test_record_order_walks_from_output() {
        let layers = parse_architecture("2\n4\n4\n4\n").unwrap();
        let net = Network::random(layers, 9);
        let mut coins = SeededCoins::from_seed(10);
        let report = verify_network(&net, &mut coins).unwrap();
        let kinds: Vec<(usize, LayerKind)> = report
            .records
            .iter()
            .map(|rec| (rec.layer, rec.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (2, LayerKind::Bias),
                (2, LayerKind::MatMul),
                (1, LayerKind::SquareActivation),
                (1, LayerKind::Bias),
                (1, LayerKind::MatMul),
            ]
        );
    }

    #[test]
    fn test_deep_mixed_width_network_verifies() {
        let layers = parse_architecture("4\n8\n16\n4\n8\n2\n").unwrap();
        let net = Network::random(layers, 77);
        let mut coins = SeededCoins::from_seed(78);
        let report = verify_network(&net, &mut coins).unwrap();
        assert_eq!(report.records.len(), 11);
    }

    #[test]
    fn test_runs_are_deterministic_per_seed() {
        let layers = parse_architecture("2\n4\n4\n4\n").unwrap();
        let net = Network::random(layers, 5);
        let mut coins_a = SeededCoins::from_seed(6);
        let mut coins_b = SeededCoins::from_seed(6);
        let a = verify_network(&net, &mut coins_a).unwrap();
        let b = verify_network(&net, &mut coins_b).unwrap();
        assert_eq!(a.records.len(), b.records.len());
    }
}
