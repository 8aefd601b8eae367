//! End-to-end verification scenarios.

use argus::bias_check::{bias_prover, bias_verify};
use argus::coins::{CoinSource, SeededCoins};
use argus::driver::verify_network;
use argus::m61_field::{m61_eq_mod, M61_MODULUS};
use argus::mle::eval_mle;
use argus::network::{bias_forward, matmul_forward, parse_architecture, square_forward, Network};
use argus::types::{Claim, LayerDims, LayerKind, VerifyFailure};

#[test]
fn single_layer_all_ones_passes() {
    // 1x1 matmul, unit weight, zero bias, no activation.
    let layers = vec![LayerDims {
        batch_bits: 0,
        in_bits: 0,
        out_bits: 0,
    }];
    let net = Network {
        layers,
        input: vec![1],
        weights: vec![vec![1]],
        biases: vec![vec![0]],
    };
    let mut coins = SeededCoins::from_seed(1);
    let report = verify_network(&net, &mut coins).unwrap();
    assert_eq!(report.records.len(), 2);
}

#[test]
fn two_layer_batch_two_passes() {
    let layers = parse_architecture("2\n4\n4\n4\n").unwrap();
    let net = Network::random(layers, 1);
    let mut coins = SeededCoins::from_seed(1);
    let report = verify_network(&net, &mut coins).unwrap();
    // Three reducers per layer, with the output layer's activation
    // skipped.
    assert_eq!(report.records.len(), 5);
}

#[test]
fn degenerate_widths_pass() {
    let layers = parse_architecture("1\n1\n2\n1\n").unwrap();
    let net = Network::random(layers, 1);
    let mut coins = SeededCoins::from_seed(1);
    assert!(verify_network(&net, &mut coins).is_ok());
}

/// Build the output layer's bias-reducer inputs for a seed-1 two-layer
/// network: the matmul output table, the bias table, the upstream claim
/// from the verifier's look at the true output, and the drawn challenges.
fn output_layer_bias_setup() -> (Vec<u64>, Vec<u64>, Claim, Vec<u64>) {
    let layers = parse_architecture("2\n4\n4\n4\n").unwrap();
    let net = Network::random(layers.clone(), 1);

    // Forward pass up to the network output (no activation on layer 2).
    let m1 = matmul_forward(layers[0], &net.input, &net.weights[0]);
    let s1 = bias_forward(&m1, &net.biases[0]);
    let x1 = square_forward(&s1);
    let m2 = matmul_forward(layers[1], &x1, &net.weights[1]);
    let s2 = bias_forward(&m2, &net.biases[1]);

    let mut coins = SeededCoins::from_seed(1);
    let w = layers[1].width_bits();
    let q0 = coins.coins(w);
    let claim = Claim {
        value: eval_mle(&s2, &q0),
        point: q0,
    };
    let r = coins.coins(w);
    (m2, net.biases[1].clone(), claim, r)
}

#[test]
fn flipped_sample_fails_first_bias_check() {
    let (m2, b2, claim, r) = output_layer_bias_setup();
    let mut transcript = bias_prover(&claim.point, &r, &m2, &b2);
    // Flip a single bit of F[0][0] before the verifier looks at it.
    transcript.polys[0][0] ^= 1;

    let err = bias_verify(&claim, &r, &b2, &transcript).unwrap_err();
    assert_eq!(
        err,
        VerifyFailure::FirstCheck {
            kind: LayerKind::Bias
        }
    );
    assert!(err.to_string().contains("bias layer first check failed"));
}

#[test]
fn claim_congruent_mod_p_passes() {
    // An upstream claim offset by exactly p in its raw 64-bit value is
    // the same residue and must verify.
    let (m2, b2, claim, r) = output_layer_bias_setup();
    let transcript = bias_prover(&claim.point, &r, &m2, &b2);

    let sum = argus::m61_field::m61_mod(
        argus::m61_field::m61_mod(transcript.polys[0][0])
            + argus::m61_field::m61_mod(transcript.polys[0][1]),
    );
    assert!(m61_eq_mod(claim.value, sum));

    let offset = Claim {
        point: claim.point.clone(),
        value: argus::m61_field::m61_canon(claim.value) + M61_MODULUS,
    };
    assert_ne!(offset.value, argus::m61_field::m61_canon(claim.value));
    assert!(bias_verify(&offset, &r, &b2, &transcript).is_ok());
}

#[test]
fn every_sample_flip_is_caught_somewhere() {
    // R2: +1 on any single round-polynomial sample of the output layer's
    // bias reducer trips a later check.
    let (m2, b2, claim, r) = output_layer_bias_setup();
    let honest = bias_prover(&claim.point, &r, &m2, &b2);
    let rounds = honest.polys.len();
    for round in 0..rounds {
        for sample in 0..3 {
            let mut forged = honest.clone();
            forged.polys[round][sample] =
                argus::m61_field::m61_mod(forged.polys[round][sample] + 1);
            assert!(
                bias_verify(&claim, &r, &b2, &forged).is_err(),
                "flip at round {round} sample {sample} went unnoticed"
            );
        }
    }
}

#[test]
fn wider_batch_and_ragged_widths_pass() {
    for (arch, seed) in [
        ("8\n16\n16\n16\n16\n", 2u64),
        ("3\n5\n9\n2\n", 3),
        ("1\n1\n1\n1\n1\n", 4),
    ] {
        let layers = parse_architecture(arch).unwrap();
        let net = Network::random(layers, seed);
        let mut coins = SeededCoins::from_seed(seed + 100);
        assert!(
            verify_network(&net, &mut coins).is_ok(),
            "architecture {arch:?} failed"
        );
    }
}
