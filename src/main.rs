//! Vanity Address Miner CLI
//!
//! Usage:
//!   vanity_miner -p dead             # Find address starting with "dead"
//!   vanity_miner -s beef             # Find address ending with "beef"
//!   vanity_miner -p 0xcafe -s 00 -w 4
//!   vanity_miner -p DeaD -c          # Match the EIP-55 checksum form

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use vanity_miner::{Config, Coordinator, CoordinatorOptions, MinerEvent, MiningResult};

/// How often the main loop wakes up to check for Ctrl-C.
const INTERRUPT_CHECK: Duration = Duration::from_millis(200);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    let request = config.to_request();
    let pattern = request.pattern();

    println!("Vanity Address Miner");
    println!("====================");
    println!("Prefix:     {}", display_part(pattern.prefix()));
    println!("Suffix:     {}", display_part(pattern.suffix()));
    println!("Checksum:   {}", pattern.is_case_sensitive());
    println!("Difficulty: {}", pattern.difficulty_description());
    println!("Workers:    {}", request.worker_count);
    println!();

    let interrupted = Arc::new(AtomicBool::new(false));
    ctrlc_handler(interrupted.clone());

    let mut coordinator = Coordinator::with_entropy(
        vanity_miner::crypto::OsEntropy,
        CoordinatorOptions {
            report_interval: config.report_interval(),
        },
    );

    if let Err(e) = coordinator.start(request) {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    println!("Searching... (Press Ctrl+C to stop)\n");

    let started = Instant::now();
    let mut last_print = Instant::now();
    let mut total_attempts = 0;
    let mut throughput = 0;

    let outcome = loop {
        if interrupted.load(Ordering::Relaxed) {
            coordinator.stop();
            println!("\nStopped by user.");
            break None;
        }

        match coordinator.next_event(INTERRUPT_CHECK) {
            Some(MinerEvent::Progress {
                total_attempts: total,
                throughput: rate,
            }) => {
                total_attempts = total;
                throughput = rate;
                if last_print.elapsed() >= config.report_interval() {
                    print_progress(started.elapsed(), total_attempts, throughput);
                    last_print = Instant::now();
                }
            }
            Some(MinerEvent::Result(result)) => break Some(Ok(result)),
            Some(MinerEvent::Error { message }) => break Some(Err(message)),
            None => {}
        }
    };

    println!("\n--- Final Statistics ---");
    println!("Total keys generated: {}", format_number(total_attempts));
    println!("Time elapsed:         {:.2}s", started.elapsed().as_secs_f64());
    println!("Average speed:        {}/s", format_number(throughput));

    match outcome {
        Some(Ok(result)) => print_result(&result),
        Some(Err(message)) => {
            error!(%message, "search failed");
            process::exit(1);
        }
        None => {}
    }
}

fn display_part(part: &str) -> &str {
    if part.is_empty() {
        "(any)"
    } else {
        part
    }
}

fn print_result(result: &MiningResult) {
    println!("\n=== Match ===");
    println!("Address:     {}", result.address);
    println!("Private Key: {}", result.private_key);
    println!("Worker:      {}", result.worker_id);
}

fn print_progress(elapsed: Duration, keys: u64, rate: u64) {
    println!(
        "[{:>4}s] Generated {} keys ({}/s)",
        elapsed.as_secs(),
        format_number(keys),
        format_number(rate)
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(interrupted: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        interrupted.store(true, Ordering::Relaxed);
    }) {
        error!(%e, "could not install Ctrl-C handler");
    }
}
