use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "halo-kcore workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark the decomposition under every rebuild policy
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
}

/// Rebuild policies, each saved as a criterion baseline of the same name.
const POLICIES: &[&str] = &["never", "once", "repeated"];

/// Baseline every other column is compared against.
const REFERENCE_POLICY: &str = "never";

/// Directories criterion writes next to named baselines.
const CRITERION_INTERNAL: &[&str] = &["report", "new", "base", "change"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Running k-core benchmarks...");

    // Build first to avoid measuring build time
    println!("Compiling benchmarks...");
    let status = Command::new("cargo")
        .args(["build", "--bench", "kcore_benchmark", "--release"])
        .status()?;
    if !status.success() {
        anyhow::bail!("Failed to compile benchmarks");
    }

    for policy in POLICIES {
        println!("\n>>> Benchmarking rebuild policy: {policy}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0")
            .env("KCORE_BENCH_POLICY", policy);

        cmd.args(["bench", "--bench", "kcore_benchmark"]);

        // Args for the test runner (Criterion) go after --
        cmd.arg("--");
        cmd.arg("--save-baseline").arg(policy);

        if quick {
            cmd.arg("--measurement-time").arg("0.5");
            cmd.arg("--noplot");
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run bench for policy {policy}"))?;

        if status.success() {
            println!("Finished {policy} in {:.2?}", start.elapsed());
        } else {
            eprintln!("Warning: Benchmark failed for policy {policy}");
        }
    }

    Ok(())
}

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");
    let mut results: BTreeMap<String, HashMap<String, f64>> = BTreeMap::new();

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    collect_results(criterion_dir, criterion_dir, &mut results)?;

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }

    use std::io::Write;
    let mut file = fs::File::create(report_path)
        .with_context(|| format!("Failed to create {}", report_path.display()))?;

    writeln!(file, "# k-core Benchmark Report")?;
    writeln!(file)?;
    writeln!(
        file,
        "Throughput in adjacency entries per second; ratios are relative to `{REFERENCE_POLICY}`."
    )?;
    writeln!(file)?;

    write!(file, "| Workload |")?;
    for policy in POLICIES {
        write!(file, " {policy} (Elem/s) | vs {REFERENCE_POLICY} |")?;
    }
    writeln!(file)?;

    write!(file, "|---|")?;
    for _ in POLICIES {
        write!(file, "---|---|")?;
    }
    writeln!(file)?;

    for (workload, by_policy) in &results {
        write!(file, "| {workload} |")?;

        let reference = by_policy.get(REFERENCE_POLICY).copied().unwrap_or(0.0);

        for policy in POLICIES {
            if let Some(&rate) = by_policy.get(*policy) {
                let rel = if reference > 0.0 { rate / reference } else { 0.0 };
                write!(file, " {} | **{rel:.2}x** |", format_rate(rate))?;
            } else {
                write!(file, " N/A | - |")?;
            }
        }
        writeln!(file)?;
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_rate(rate: f64) -> String {
    if rate > 1_000_000.0 {
        format!("{:.2}M", rate / 1_000_000.0)
    } else if rate > 1_000.0 {
        format!("{:.2}K", rate / 1_000.0)
    } else {
        format!("{rate:.0}")
    }
}

/// Walks criterion's output tree.
///
/// Layout: `<root>/<group>/<function>[/<parameter>]/<baseline>/estimates.json`,
/// with `benchmark.json` next to the baseline directories.
fn collect_results(
    root: &Path,
    dir: &Path,
    results: &mut BTreeMap<String, HashMap<String, f64>>,
) -> Result<()> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(());
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(root, &path, results)?;
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("estimates.json") {
            continue;
        }

        let Some(baseline_dir) = path.parent() else { continue };
        let Some(workload_dir) = baseline_dir.parent() else { continue };
        let baseline = baseline_dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        if CRITERION_INTERNAL.contains(&baseline.as_str()) {
            continue;
        }
        let workload = workload_dir
            .strip_prefix(root)
            .unwrap_or(workload_dir)
            .to_string_lossy()
            .replace('\\', "/");
        if workload.split('/').any(|part| part == "report") {
            continue;
        }

        // Elements per iteration, when the group declared a throughput.
        let elements = fs::read_to_string(workload_dir.join("benchmark.json"))
            .ok()
            .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
            .and_then(|json| json.get("throughput")?.get("Elements")?.as_f64())
            .unwrap_or(1.0);

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let json: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Malformed estimates in {}", path.display()))?;
        let time_ns = json
            .get("mean")
            .and_then(|m| m.get("point_estimate"))
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0);

        if time_ns > 0.0 {
            results
                .entry(workload)
                .or_default()
                .insert(baseline, elements * 1e9 / time_ns);
        }
    }

    Ok(())
}
