// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `credvault check` command implementation.
//!
//! Probes both backends with a throwaway value, then sweeps the active backend
//! through the self-healing read paths.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use credvault_core::VaultError;
use credvault_vault::{AvailabilityReport, VaultManager};

/// Status of a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

/// Run the `credvault check` command.
pub fn run_check(vault: &VaultManager, plain: bool) -> Result<(), VaultError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let mut results = availability_results(&vault.check_availability());
    results.push(check_integrity(vault));

    println!();
    println!("  credvault check (mode: {})", vault.current_mode());
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", format_line(result, use_color));
    }
    println!();

    if issues > 0 {
        let word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();
    Ok(())
}

/// One row per backend. An unavailable inactive backend is only a warning.
fn availability_results(report: &AvailabilityReport) -> Vec<CheckResult> {
    report
        .checks
        .iter()
        .map(|check| {
            let status = match (check.available, check.backend == report.current) {
                (true, _) => CheckStatus::Pass,
                (false, true) => CheckStatus::Fail,
                (false, false) => CheckStatus::Warn,
            };
            let message = match &check.error {
                Some(error) => error.clone(),
                None => format!("{} reachable", check.store),
            };
            CheckResult {
                name: format!("{} backend", check.backend),
                status,
                message,
                duration: check.duration,
            }
        })
        .collect()
}

fn check_integrity(vault: &VaultManager) -> CheckResult {
    let start = Instant::now();
    let (status, message) = match vault.validate_integrity() {
        Ok(report) => {
            let history: usize = report.history_counts.values().sum();
            let credential = if report.has_credentials { "remembered login" } else { "no remembered login" };
            (CheckStatus::Pass, format!("{credential}, {history} history entries"))
        }
        Err(e) => (CheckStatus::Fail, e.to_string()),
    };
    CheckResult {
        name: "integrity".to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal().to_string()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow().to_string()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red().to_string()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!("    {tag} {:<20} {} ({duration_ms}ms)", result.name, result.message)
    }
}
