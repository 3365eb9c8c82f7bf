//! Runs a batch of simulated transmissions and prints outcome statistics.

use noisy_link::config::{
    DEFAULT_FLIP_PROBABILITY, DEFAULT_LOSS_PROBABILITY, DEFAULT_SEGMENT_BITS,
};
use noisy_link::{bits, simulate_trials, CodeParameters, HammingCode, PipelineConfig};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::process::ExitCode;

const DEFAULT_TRIALS: usize = 1000;

#[derive(Debug)]
struct Args {
    config: PipelineConfig,
    trials: usize,
    seed: u64,
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn parse_args(args: &[String]) -> Result<Option<Args>, String> {
    let mut code = CodeParameters::default();
    let mut explicit_r = None;
    let mut segment_bits = DEFAULT_SEGMENT_BITS;
    let mut flip_probability = DEFAULT_FLIP_PROBABILITY;
    let mut loss_probability = DEFAULT_LOSS_PROBABILITY;
    let mut trials = DEFAULT_TRIALS;
    let mut seed = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--k" => {
                i += 1;
                code.data_bits = value(args, i, flag)?
                    .parse()
                    .map_err(|_| "invalid --k")?;
            }
            "--r" => {
                i += 1;
                explicit_r = Some(
                    value(args, i, flag)?
                        .parse()
                        .map_err(|_| "invalid --r")?,
                );
            }
            "--secded" => code.secded = true,
            "--flip" => {
                i += 1;
                flip_probability = value(args, i, flag)?
                    .parse()
                    .map_err(|_| "invalid --flip")?;
            }
            "--loss" => {
                i += 1;
                loss_probability = value(args, i, flag)?
                    .parse()
                    .map_err(|_| "invalid --loss")?;
            }
            "--segment-bits" => {
                i += 1;
                segment_bits = value(args, i, flag)?
                    .parse()
                    .map_err(|_| "invalid --segment-bits")?;
            }
            "--trials" => {
                i += 1;
                trials = value(args, i, flag)?
                    .parse()
                    .map_err(|_| "invalid --trials")?;
            }
            "--seed" => {
                i += 1;
                seed = Some(
                    value(args, i, flag)?
                        .parse()
                        .map_err(|_| "invalid --seed")?,
                );
            }
            "--help" | "-h" => {
                print_help();
                return Ok(None);
            }
            _ => return Err(format!("unknown argument: {}", flag)),
        }
        i += 1;
    }

    // Without --r, pick the fewest parity bits that protect k data bits
    code.parity_bits = match explicit_r {
        Some(r) => r,
        None => HammingCode::with_minimum_redundancy(code.data_bits, code.secded)
            .map_err(|e| e.to_string())?
            .parity_bits(),
    };

    let config = PipelineConfig {
        code,
        segment_bits,
        flip_probability,
        loss_probability,
    };
    config.validate().map_err(|e| e.to_string())?;

    Ok(Some(Args {
        config,
        trials,
        seed: seed.unwrap_or_else(rand::random),
    }))
}

fn print_help() {
    println!("link_sim: Hamming-coded frames over a noisy channel");
    println!();
    println!("USAGE:");
    println!("    link_sim [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --k <N>               Data bits per block (default: 4)");
    println!("    --r <N>               Parity bits per block (default: minimum for k)");
    println!("    --secded              Add an overall parity bit (double-error detection)");
    println!(
        "    --flip <P>            Per-bit flip probability (default: {})",
        DEFAULT_FLIP_PROBABILITY
    );
    println!(
        "    --loss <P>            Frame loss probability (default: {})",
        DEFAULT_LOSS_PROBABILITY
    );
    println!(
        "    --segment-bits <N>    Segment length in bits (default: {})",
        DEFAULT_SEGMENT_BITS
    );
    println!(
        "    --trials <N>          Number of transmissions (default: {})",
        DEFAULT_TRIALS
    );
    println!("    --seed <N>            Seed for the segment and the channel (default: random)");
    println!("    --help, -h            Print this help");
}

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    let config = &args.config;
    let mut rng = ChaCha20Rng::seed_from_u64(args.seed);
    let mut bytes = vec![0u8; config.segment_bits.div_ceil(8)];
    rng.fill_bytes(&mut bytes);
    let mut segment = bits::from_bytes(&bytes);
    segment.truncate(config.segment_bits);

    println!("=== Configuration ===");
    println!(
        "Code: Hamming({},{}){}",
        config.code.block_bits(),
        config.code.data_bits,
        if config.code.secded { " SECDED" } else { "" }
    );
    println!(
        "Segment: {} bits, frame: {} bits",
        config.segment_bits,
        config.frame_bits()
    );
    println!("Flip probability: {}", config.flip_probability);
    println!("Loss probability: {}", config.loss_probability);
    println!("Trials: {}", args.trials);
    println!("Seed: {}", args.seed);
    println!();

    match simulate_trials(&segment, config, args.trials, args.seed) {
        Ok(stats) => {
            println!("=== Statistics ===");
            println!("{}", stats);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
