use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use strata_bench::report;
use strata_bench::runner::BenchmarkRunner;
use strata_bench::scenes;

/// Value following a flag, or exit with a usage error.
fn flag_value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|s| s.parse()) {
        Some(Ok(value)) => value,
        _ => {
            eprintln!("Missing or invalid value for {flag}");
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut regression_threshold = 10.0f64;
    let mut tick_count = 120u32;
    let mut scene_filter: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--baseline" => {
                i += 1;
                baseline_path = Some(flag_value(&args, i, "--baseline"));
            }
            "--output" => {
                i += 1;
                output_path = Some(flag_value(&args, i, "--output"));
            }
            "--regression-threshold" => {
                i += 1;
                regression_threshold = flag_value(&args, i, "--regression-threshold");
            }
            "--ticks" => {
                i += 1;
                tick_count = flag_value(&args, i, "--ticks");
            }
            "--scene" => {
                i += 1;
                scene_filter = Some(flag_value(&args, i, "--scene"));
            }
            "--help" | "-h" => {
                eprintln!("Usage: bench-runner [OPTIONS]");
                eprintln!("  --baseline <path>              Load baseline JSON for comparison");
                eprintln!("  --output <path>                Save current results as JSON baseline");
                eprintln!(
                    "  --regression-threshold <pct>   Regression threshold percentage (default: 10)"
                );
                eprintln!("  --ticks <n>                    Ticks per scene (default: 120)");
                eprintln!("  --scene <name>                 Run only the named scene");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let runner = BenchmarkRunner::new(tick_count);

    let scene_configs: Vec<_> = scenes::standard_scenes()
        .into_iter()
        .filter(|s| scene_filter.as_deref().is_none_or(|name| s.name == name))
        .collect();
    if scene_configs.is_empty() {
        log::error!("No scene matches {:?}", scene_filter);
        process::exit(1);
    }

    let mut results = Vec::new();
    for config in &scene_configs {
        match runner.run_scene(config) {
            Ok(result) => results.push(result),
            Err(e) => {
                log::error!("Scene '{}' failed: {e}", config.name);
                process::exit(1);
            }
        }
    }

    // Print markdown summary
    println!("\n## Benchmark Results\n");
    println!("{}", report::format_markdown(&results));

    // Save output baseline
    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            timestamp: run_timestamp(),
            results: results.clone(),
        };
        if let Err(e) = report::save_baseline(path, &baseline) {
            log::error!("Failed to save baseline to {}: {e}", path.display());
            process::exit(1);
        }
        log::info!("Saved baseline to {}", path.display());
    }

    // Compare against baseline
    if let Some(ref path) = baseline_path {
        if let Some(baseline) = report::load_baseline(path) {
            let regressions = report::compare(&results, &baseline, regression_threshold);
            println!(
                "{}",
                report::format_comparison(&regressions, regression_threshold)
            );
            if !regressions.is_empty() {
                eprintln!(
                    "ERROR: {} regressions detected, exiting with code 1",
                    regressions.len()
                );
                process::exit(1);
            }
        } else {
            log::warn!("Baseline file not found: {}", path.display());
        }
    }

    log::info!("Benchmark complete.");
}

/// Seconds since the Unix epoch, tagged for the baseline file.
fn run_timestamp() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("bench-{secs}")
}
