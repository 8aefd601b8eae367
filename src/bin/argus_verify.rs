//! Verify a pseudorandom network instance described by an architecture
//! file. One positional argument, no flags; exit 0 when every layer's
//! checks pass, exit 1 with one diagnostic line on stderr otherwise.

use std::env;
use std::path::Path;
use std::process;

use argus::coins::SeededCoins;
use argus::driver::verify_network;
use argus::network::{read_architecture, Network};

/// Fixed process-wide seeds so benchmark runs are reproducible.
const FILL_SEED: u64 = 1;
const COIN_SEED: u64 = 0x5afe_7e75;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        die("usage: argus_verify <architecture-file>");
    }

    let layers = read_architecture(Path::new(&args[1])).unwrap_or_else(|e| die(&e.to_string()));
    let net = Network::random(layers, FILL_SEED);
    let mut coins = SeededCoins::from_seed(COIN_SEED);

    println!("verifying the network layer by layer");
    let report = verify_network(&net, &mut coins).unwrap_or_else(|e| die(&e.to_string()));

    for rec in &report.records {
        println!(
            "layer {} {}: unverifiable {:.6}s prover {:.6}s verifier {:.6}s",
            rec.layer,
            rec.kind.tag(),
            rec.time.unverifiable,
            rec.time.prover,
            rec.time.verifier
        );
    }
    println!("total unverifiable time = {:.6}s", report.total.unverifiable);
    println!("total additional prover time = {:.6}s", report.total.prover);
    println!("total verifier time = {:.6}s", report.total.verifier);
}

fn die(msg: &str) -> ! {
    eprintln!("error: {}", msg);
    process::exit(1);
}
