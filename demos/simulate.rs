//! Monte Carlo balance check over the built-in tables.
//!
//! Runs synthetic respondents through the full pipeline and prints how often
//! each scheme was recommended and how often each weighting profile was used.
//!
//! Run:
//! `cargo run --example simulate`
//!
//! Knobs (env):
//! - `DKI_TRIALS` (default 1000)
//! - `DKI_SEED` (default: fresh entropy; the seed used is printed)
//! - `DKI_CONTEXT_P` probability of "yes" per context fact (default 0.5)
//! - `DKI_JSON=1` prints the report as JSON instead of tables
//! - `RUST_LOG` for the tracing filter (e.g. `RUST_LOG=dki_mcda=debug` for progress)

use dki_mcda::{ConfigTables, MonteCarlo, MonteCarloConfig, DEFAULT_TRIALS};
use tracing_subscriber::EnvFilter;

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok())
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(default)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let tables = ConfigTables::builtin()?;
    let mut cfg = MonteCarloConfig::default()
        .with_trials(env_u64("DKI_TRIALS").unwrap_or(DEFAULT_TRIALS))
        .with_context_yes_probability(env_f64("DKI_CONTEXT_P", 0.5));
    if let Some(seed) = env_u64("DKI_SEED") {
        cfg = cfg.with_seed(seed);
    }

    let report = MonteCarlo::new(&tables, cfg)?.run();

    if std::env::var("DKI_JSON").is_ok_and(|v| v == "1") {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "seed={} trials={}/{}",
        report.seed, report.completed_trials, report.requested_trials
    );
    println!();
    println!("{:<28} {:>7} {:>8}", "scheme", "wins", "share");
    for c in &report.scheme_counts {
        println!("{:<28} {:>7} {:>7.1}%", c.name, c.count, 100.0 * c.share);
    }

    println!();
    println!(
        "{:<12} {:>7} {:>9} {:>9} {:>19}",
        "profile", "uses", "observed", "expected", "95% wilson"
    );
    for p in &report.profile_usage {
        let mark = if p.expected_within_interval() { "" } else { "  !" };
        println!(
            "{:<12} {:>7} {:>8.1}% {:>8.1}% [{:>6.1}%, {:>6.1}%]{mark}",
            p.profile,
            p.count,
            100.0 * p.observed,
            100.0 * p.expected,
            100.0 * p.wilson_lo,
            100.0 * p.wilson_hi,
        );
    }

    println!();
    if report.all_schemes_selected {
        println!("every scheme was recommended at least once");
    } else {
        println!("never recommended: {}", report.never_selected.join(", "));
    }
    Ok(())
}
