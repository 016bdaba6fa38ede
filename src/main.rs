//! Benchmark CLI entry point

use std::path::PathBuf;

use clap::Parser;

use mssql_bench::config::BenchConfig;
use mssql_bench::connection::ConnectionDescriptor;
use mssql_bench::environment::SessionInfo;
use mssql_bench::runner::BenchmarkRunner;
use mssql_bench::{query, report, runner};

#[derive(Parser, Debug)]
#[command(name = "mssql-bench", about = "Systematic SQL Server data-access benchmark")]
struct Cli {
    /// Path to the benchmark configuration file.
    #[arg(long, default_value = "benchmark_config.yaml")]
    config: PathBuf,

    /// Run each configured method once against a 10-row query and report
    /// connectivity instead of benchmarking.
    #[arg(long)]
    check: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("\nBenchmark failed: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // .env is optional; real environment variables win either way.
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = BenchConfig::load(&cli.config)?;
    let descriptor = ConnectionDescriptor::from_env()?;

    if cli.check {
        return run_check(&config, &descriptor);
    }

    println!("Systematic SQL Server performance benchmark");
    println!("Output file: {}", config.output.csv_file.display());

    let session = SessionInfo::collect(&descriptor);
    let methods = runner::bind(&config.methods);
    let records = BenchmarkRunner::new(&config, &descriptor, &session).run(&methods);

    if report::write_csv(&records, &config.output.csv_file)? {
        report::write_run_metadata(&config.output.csv_file, &session)?;
        println!("\nResults written to {}", config.output.csv_file.display());
        println!("Total test runs: {}", records.len());
        report::print_summary(&records);
    }

    println!("\nBenchmark complete!");
    Ok(())
}

/// Connectivity check: every configured method fetches a 10-row window
/// once. No CSV is written; a non-zero exit signals at least one failure.
fn run_check(config: &BenchConfig, descriptor: &ConnectionDescriptor) -> anyhow::Result<()> {
    println!(
        "Checking {} method(s) against {}...",
        config.methods.len(),
        config.database.table_name
    );
    let sql = query::paginated_select(&config.database.table_name, 10, 0);

    let mut failures = 0usize;
    for bound in runner::bind(&config.methods) {
        match bound.method.fetch(&sql, descriptor) {
            Ok(rows) => println!("  OK   {} ({rows} rows)", bound.name),
            Err(e) => {
                failures += 1;
                println!("  FAIL {}: {e}", bound.name);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} method check(s) failed");
    }
    println!("All methods reachable.");
    Ok(())
}
