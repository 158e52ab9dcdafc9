//! `ogoa-harness` – OGOA serial link tester
//!
//! Opens a serial port to an OGOA device and, for a fixed duration:
//!
//! 1. Polls the device with `STATUS_REQUEST` frames.
//! 2. Streams simulated lidar sweeps of a robot patrolling a hallway.
//! 3. ACKs everything the device sends and answers its status requests.
//!
//! Settings come from defaults, an optional `--config` TOML file, `OGOA_*`
//! environment variables and flags, in increasing order of precedence.

mod args;
mod config;

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use colored::Colorize;
use ogoa_runtime::{
    Harness, LinkStats, MonotonicClock, RunSummary, SerialTransport, init_tracing,
};
use ogoa_sim::NoiseGenerator;
use ogoa_types::OgoaError;
use tracing::info;

use crate::args::Args;
use crate::config::{Config, RunSettings};

fn main() -> ExitCode {
    let args = Args::parse();
    let _guard = init_tracing("ogoa-harness");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), OgoaError> {
    let cfg = resolve_config(args)?;

    if let Some(path) = &args.save_config {
        config::save_to(&cfg, path)?;
        println!("  Config written to {}", path.display().to_string().bold());
        return Ok(());
    }

    let settings = cfg.normalized()?;
    let run_id = uuid::Uuid::new_v4();

    print_banner();
    print_settings(&settings, run_id);

    let transport = SerialTransport::open(&settings.serial)?;
    let started_at = chrono::Utc::now();
    let t0 = Instant::now();
    info!(run_id = %run_id, seed = settings.seed, "run started");

    let mut harness = Harness::new(
        settings.harness.clone(),
        transport,
        NoiseGenerator::new(settings.seed),
    );
    let stats = harness.run(&MonotonicClock::new());

    let summary = RunSummary::new(
        run_id,
        settings.serial.path.as_str(),
        started_at,
        t0.elapsed().as_secs_f64(),
        stats,
    );
    summary.log();

    if args.summary_json {
        println!("{}", summary.to_json()?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Defaults → config file → environment → flags.
fn resolve_config(args: &Args) -> Result<Config, OgoaError> {
    let mut cfg = match &args.config {
        Some(path) => config::load_from(path)?,
        None => Config::default(),
    };
    config::apply_env_overrides(&mut cfg);
    args.apply_to(&mut cfg);
    Ok(cfg)
}

// ─────────────────────────────────────────────────────────────────────────────
// Console output
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ____  _____  ____   ___ "#.bold().cyan());
    println!("{}", r#"  / __ \/ ___/ / __ \ / _ |"#.bold().cyan());
    println!("{}", r#" / /_/ / (_ / / /_/ // __ |"#.bold().cyan());
    println!("{}", r#" \____/\___/  \____//_/ |_|"#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "ogoa-harness".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Serial link tester with simulated lidar");
    println!();
}

fn print_settings(s: &RunSettings, run_id: uuid::Uuid) {
    let h = &s.harness;
    println!("  {:<16}{}", "Run", run_id.to_string().dimmed());
    println!(
        "  {:<16}{} @ {} baud",
        "Port",
        s.serial.path.bold(),
        s.serial.baud_rate
    );
    println!("  {:<16}{:.1} s", "Duration", h.duration.as_secs_f64());
    println!("  {:<16}{:.2} s", "Status every", h.status_interval.as_secs_f64());
    match h.lidar_interval {
        Some(d) => println!(
            "  {:<16}{:.2} s, step {}..{}",
            "Lidar every",
            d.as_secs_f64(),
            h.min_step,
            h.max_step
        ),
        None => println!("  {:<16}{}", "Lidar", "disabled".yellow()),
    }
    println!(
        "  {:<16}alpha {:.2}, dropout {:.2}, seed {}",
        "Sampler",
        h.sampler.smoothing_alpha(),
        h.sampler.dropout_prob(),
        if s.seed == 0 {
            "random".to_string()
        } else {
            s.seed.to_string()
        }
    );
    println!();
}

fn print_summary(summary: &RunSummary) {
    let s: &LinkStats = &summary.stats;
    println!();
    println!("{}", "  Done.".green().bold());
    println!("  {:<16}{:.1} s", "Elapsed", summary.elapsed_secs);
    println!(
        "  {:<16}{} ({} status, {} lidar, {} ack, {} response)",
        "Sent",
        s.frames_sent,
        s.status_requests_sent,
        s.lidar_frames_sent,
        s.acks_sent,
        s.status_responses_sent
    );
    println!("  {:<16}{}", "Received", s.frames_received);
    println!("  {:<16}{}", "Sweeps", s.sweeps);

    let acked = match summary.ack_ratio() {
        Some(r) => format!(
            "{} / {} ({:.0}%)",
            s.acknowledged,
            s.acknowledged + s.unacknowledged,
            r * 100.0
        ),
        None => "-".to_string(),
    };
    println!("  {:<16}{}", "Acknowledged", acked);

    let problems = s.checksum_errors + s.duplicates + s.transport_errors + s.encode_errors;
    let line = format!(
        "{} checksum, {} duplicate, {} transport, {} dropped bytes",
        s.checksum_errors, s.duplicates, s.transport_errors, s.discarded_bytes
    );
    if problems == 0 {
        println!("  {:<16}{}", "Errors", line.green());
    } else {
        println!("  {:<16}{}", "Errors", line.yellow());
    }
    println!();
}
