use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the ride dashboard workspace",
    long_about = "A unified CLI for running the driver and rider demos, tests,\n\
                  benchmarks, and CI checks in the ride dashboard workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted walk-through
    Demo {
        #[arg(value_enum, default_value_t = Demo::DriverShift)]
        which: Demo,
        /// Log filter passed to the demo as RUST_LOG
        #[arg(long, env = "RUST_LOG", default_value = "info")]
        log: String,
    },
    /// Run the ride_core test suite
    Test,
    /// Run Criterion benchmarks
    Bench {
        /// Compare against a saved `main` baseline instead of running plainly
        #[arg(long)]
        compare: bool,
    },
    /// Run CI checks (fmt, clippy, tests, demos, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Demo {
    /// Driver goes online, takes one ride and completes it
    DriverShift,
    /// Rider picks locations, compares ride types and books
    BookRide,
}

impl Demo {
    fn example_name(self) -> &'static str {
        match self {
            Self::DriverShift => "driver_shift",
            Self::BookRide => "book_ride",
        }
    }
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run both demos
    Demos,
    /// Run benchmarks
    Bench,
    /// Run check + demos + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str], envs: &[(&str, &str)]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .envs(envs.iter().copied())
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    run_cargo_with_env(args, &[]);
}

fn run_cargo_with_env(args: &[&str], envs: &[(&str, &str)]) {
    let status = cargo(args, envs);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_demo(demo: Demo, log: &str) {
    run_cargo_with_env(
        &["run", "-p", "ride_core", "--example", demo.example_name()],
        &[("RUST_LOG", log)],
    );
}

fn bench(extra: &[&str]) {
    let mut args = vec!["bench", "--package", "ride_core", "--bench", "performance"];
    if !extra.is_empty() {
        args.push("--");
        args.extend_from_slice(extra);
    }
    run_cargo(&args);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test ride_core");
    run_cargo(&["test", "-p", "ride_core"]);
}

fn ci_demos() {
    for demo in [Demo::DriverShift, Demo::BookRide] {
        step(&format!("Run {}", demo.example_name()));
        run_demo(demo, "warn");
    }
}

fn ci_bench() {
    step("Run benchmarks");
    bench(&[]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { which, log } => run_demo(which, &log),
        Commands::Test => run_cargo(&["test", "-p", "ride_core"]),
        Commands::Bench { compare } => {
            if !compare {
                bench(&[]);
                return;
            }
            if !Path::new("target/criterion/driver_shift").exists() {
                step("No baseline found, saving one as `main`");
                bench(&["--save-baseline", "main"]);
                return;
            }
            step("Comparing against baseline `main`");
            bench(&["--baseline", "main"]);
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Demos => ci_demos(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_demos();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
