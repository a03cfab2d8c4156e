//! Report rendering for scenario runs.

use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use crate::scenario::ScenarioResult;

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Scenario Results".bright_cyan().bold())?;
    writeln!(out, "{}", "================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed()).count();
    let failed = total - passed;

    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", failed.to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed() {
            "PASS".green()
        } else {
            "FAIL".red()
        };
        writeln!(
            out,
            "{status} {} (seed {}) in {:?}",
            result.scenario_name.bold(),
            result.seed,
            result.duration
        )?;
        if let Some(failure) = &result.failure {
            writeln!(out, "     {}", failure.red())?;
        }
    }
    Ok(())
}

pub fn generate_json_report(results: &[ScenarioResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}
