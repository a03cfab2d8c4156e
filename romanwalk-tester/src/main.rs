mod report;
mod scenario;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use report::{generate_console_report, generate_json_report};
use scenario::{ScenarioCtx, ScenarioResult, all_scenarios, find_scenario};

#[derive(Debug, Parser)]
#[command(name = "romanwalk-tester", version = "0.1.0")]
#[command(about = "Automated QA testing for the Romanwalk core - pure logic scenarios")]
struct Args {
    /// Scenarios to run (comma-separated)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds for randomized scenarios (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Moves per randomized walk
    #[arg(long, default_value_t = 400)]
    moves: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_scenarios {
        println!("{}", "Available scenarios:".bright_cyan().bold());
        for scenario in all_scenarios() {
            println!("  {} - {}", scenario.name.bold(), scenario.description);
        }
        return Ok(());
    }

    let seeds = split_csv(&args.seeds)
        .iter()
        .map(|s| {
            s.parse::<u64>()
                .with_context(|| format!("invalid seed '{s}'"))
        })
        .collect::<Result<Vec<u64>>>()?;
    anyhow::ensure!(!seeds.is_empty(), "at least one seed is required");

    let started = Instant::now();
    let mut results: Vec<ScenarioResult> = Vec::new();
    for name in split_csv(&args.scenarios) {
        let scenario =
            find_scenario(&name).with_context(|| format!("unknown scenario '{name}'"))?;
        for &seed in &seeds {
            log::info!("running scenario '{}' with seed {seed}", scenario.name);
            let run_started = Instant::now();
            let outcome = (scenario.run)(&ScenarioCtx {
                seed,
                moves: args.moves,
                verbose: args.verbose,
            });
            if let Err(err) = &outcome {
                log::error!("scenario '{}' seed {seed} failed: {err:#}", scenario.name);
            }
            results.push(ScenarioResult {
                scenario_name: scenario.name.to_string(),
                seed,
                duration: run_started.elapsed(),
                failure: outcome.err().map(|e| format!("{e:#}")),
            });
        }
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(stdout()),
    };
    match args.report.as_str() {
        "json" => writeln!(out, "{}", generate_json_report(&results)?)?,
        _ => generate_console_report(&mut out, &results, started.elapsed())?,
    }
    out.flush()?;

    let failed = results.iter().filter(|r| !r.passed()).count();
    anyhow::ensure!(failed == 0, "{failed} scenario run(s) failed");
    Ok(())
}
