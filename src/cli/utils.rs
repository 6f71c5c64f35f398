use serde::Serialize;

use crate::cli::OutputFormat;
use crate::diagnostic::env_audit::ConfigCheck;
use crate::diagnostic::{CheckOutcome, DiagnosticReport, EnvAudit, Outcome, Summary, VarStatus};

/// Print `value` as pretty JSON, or run the text renderer
pub fn emit<T, F>(output_format: OutputFormat, value: &T, text: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(),
{
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(),
    }
    Ok(())
}

/// One human-readable pass/fail line
pub fn outcome_line(outcome: &CheckOutcome) -> String {
    let result = &outcome.result;
    let status = result.status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
    let error = result.error.as_deref().unwrap_or("");

    match (outcome.passed, result.success) {
        (true, true) => match result.payload().and_then(|p| p.as_array()) {
            Some(records) => format!(
                "✅ {} - {}ms ({} records)",
                outcome.name,
                result.response_time_ms.unwrap_or(0),
                records.len()
            ),
            None => format!("✅ {} - {}ms", outcome.name, result.response_time_ms.unwrap_or(0)),
        },
        (true, false) => format!("✅ {} - rejected as expected (status {}: {})", outcome.name, status, error),
        (false, _) if result.outcome.is_transport_fault() || result.outcome == Outcome::Skipped => {
            format!("❌ {} - Error: {}", outcome.name, error)
        }
        (false, true) => format!("❌ {} - accepted but a rejection was expected", outcome.name),
        (false, false) => format!("❌ {} - Status: {} ({})", outcome.name, status, error),
    }
}

pub fn print_outcome(outcome: &CheckOutcome) {
    println!("{}", outcome_line(outcome));
}

pub fn print_outcomes(outcomes: &[CheckOutcome]) {
    for outcome in outcomes {
        print_outcome(outcome);
    }
    print_summary(&Summary::tally(outcomes));
}

pub fn print_summary(summary: &Summary) {
    println!();
    println!("📊 Summary:");
    println!("✅ Successful tests: {}", summary.successful);
    println!("❌ Failed tests: {}", summary.failed);
    println!("🎯 Expectations met: {}/{}", summary.passed, summary.total);
}

pub fn print_config_checks(checks: &[ConfigCheck]) {
    println!("🔧 Verifying Client Configuration...");
    for check in checks {
        let icon = if check.valid { "✅" } else { "❌" };
        println!("{} {}: {}", icon, check.description, check.value);
    }
}

pub fn print_report(report: &DiagnosticReport) {
    print_config_checks(&report.config);
    println!();

    let mut current_group = None;
    for outcome in &report.checks {
        if current_group != Some(outcome.group) {
            current_group = Some(outcome.group);
            println!("\n▶ {:?}", outcome.group);
        }
        print_outcome(outcome);
    }

    print_summary(&report.summary);
    println!("⏱️  Total time: {}ms", report.total_time_ms);

    println!();
    if report.troubleshooting.is_empty() {
        println!("✅ No major issues detected! API appears to be working correctly.");
    } else {
        println!("🔧 Troubleshooting Steps:");
        for (index, issue) in report.troubleshooting.iter().enumerate() {
            println!("\n❌ Issue {}: {}", index + 1, issue.issue);
            for (n, step) in issue.steps.iter().enumerate() {
                println!("   {}. {}", n + 1, step);
            }
        }
    }
}

pub fn print_audit(audit: &EnvAudit, template: &[String]) {
    println!("📋 Checking Environment Variables...");
    for var in &audit.variables {
        let icon = match var.status {
            VarStatus::Success => "✅",
            VarStatus::Warning => "⚠️",
            VarStatus::Error => "❌",
        };
        if var.issues.is_empty() {
            println!("{} {}: {}", icon, var.name, var.value);
        } else {
            println!("{} {}: {} ({})", icon, var.name, var.value, var.issues.join(", "));
        }
    }

    if let Some(connectivity) = &audit.connectivity {
        println!("\n🌐 Testing API Connectivity...");
        if connectivity.success {
            println!("✅ API connectivity test passed");
        } else {
            println!(
                "❌ API connectivity test failed: {}",
                connectivity.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    println!("\n📊 Summary:");
    println!("✅ Success: {}", audit.success_count);
    println!("⚠️  Warnings: {}", audit.warning_count);
    println!("❌ Errors: {}", audit.error_count);

    if !audit.recommendations.is_empty() {
        println!("\n🔧 Recommendations:");
        for (index, rec) in audit.recommendations.iter().enumerate() {
            println!("\n{}. {} - {}", index + 1, rec.variable, rec.description);
            println!("   Issue: {}", rec.issue);
            println!("   Solution: {}", rec.solution);
        }
    }

    println!("\n   Required format for .env file:");
    for line in template {
        println!("   {}", line);
    }
}
