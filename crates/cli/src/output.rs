//! Terminal and file output for scan results

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use std::path::Path;
use std::time::Duration;

use subtake_common::{HttpResponse, ScanResult, ScanStats, ScanStatus};

const PATTERN_DISPLAY_LIMIT: usize = 50;
const ERROR_DISPLAY_LIMIT: usize = 30;
const BODY_DISPLAY_LIMIT: usize = 500;

fn status_label(status: ScanStatus) -> ColoredString {
    let label = format!("[{}]", status.as_str().to_uppercase());
    match status {
        ScanStatus::Vulnerable => label.green(),
        ScanStatus::NotVulnerable => label.red(),
        ScanStatus::Error => label.yellow(),
    }
}

/// Cut `text` to `limit` chars, replacing the tail with `...` when it is longer.
fn shorten(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let kept: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Short, human-facing form of a probe error.
pub fn simplify_error(message: &str) -> String {
    if message.contains("request failed after") {
        "request failed".to_string()
    } else if message.contains("no such host") {
        "invalid domain".to_string()
    } else if message.contains("timeout") {
        "timeout".to_string()
    } else {
        shorten(message, ERROR_DISPLAY_LIMIT)
    }
}

/// One live line per finished probe.
pub fn format_result_line(result: &ScanResult) -> String {
    let mut line = format!("{} {}", status_label(result.status), result.subdomain);

    if result.vulnerable {
        if let Some(first) = result.evidence.first() {
            line.push_str(&format!(" - {}", first.service));
            if !first.pattern.is_empty() {
                line.push_str(&format!(" (\"{}\")", shorten(&first.pattern, PATTERN_DISPLAY_LIMIT)));
            }
            if result.evidence.len() > 1 {
                line.push_str(&format!(" (+{} more)", result.evidence.len() - 1));
            }
        }
    }

    if result.status == ScanStatus::Error {
        if let Some(error) = result.error.as_deref().filter(|e| !e.is_empty()) {
            line.push_str(&format!(" - {}", simplify_error(error)));
        }
    }

    line
}

pub fn print_result(result: &ScanResult) {
    println!("{}", format_result_line(result));
}

pub fn print_summary(stats: &ScanStats, scan_duration: Duration) {
    eprintln!("\n--- Scan Summary ---");
    eprintln!("Total subdomains: {}", stats.total_targets);
    eprintln!("{}", format!("Vulnerable: {}", stats.vulnerable).green());
    eprintln!("{}", format!("Not vulnerable: {}", stats.not_vulnerable).red());
    eprintln!("{}", format!("Errors: {}", stats.errors).yellow());
    eprintln!("Scan duration: {}", format_duration(scan_duration));
}

pub fn print_json(results: &[ScanResult]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}

pub fn print_detailed(result: &ScanResult) {
    println!("\n--- Detailed Results for {} ---", result.subdomain);
    println!("Status: {}", result.status);
    println!("Vulnerable: {}", result.vulnerable);
    println!("Scan Time: {}", result.scan_time.format("%Y-%m-%d %H:%M:%S"));

    if let Some(error) = &result.error {
        println!("Error: {}", error);
    }

    if !result.evidence.is_empty() {
        println!("\nEvidence:");
        for (i, evidence) in result.evidence.iter().enumerate() {
            println!("  {}. Service: {}", i + 1, evidence.service);
            println!("     Pattern: {}", evidence.pattern);
            println!("     Notes: {}", evidence.notes);
            println!("     Snippet: {}", evidence.snippet);
        }
    }

    if let Some(response) = &result.https_response {
        println!("\nHTTPS Response:");
        print!("{}", format_response(response));
    }
    if let Some(response) = &result.http_response {
        println!("\nHTTP Response:");
        print!("{}", format_response(response));
    }
}

fn format_response(response: &HttpResponse) -> String {
    let mut out = format!(
        "  URL: {}\n  Status Code: {}\n",
        response.url, response.status_code
    );

    if let Some(error) = &response.error {
        out.push_str(&format!("  Error: {}\n", error));
        return out;
    }

    out.push_str("  Headers:\n");
    for (name, value) in &response.headers {
        out.push_str(&format!("    {}: {}\n", name, value));
    }

    let body = if response.body.chars().count() > BODY_DISPLAY_LIMIT {
        let head: String = response.body.chars().take(BODY_DISPLAY_LIMIT).collect();
        format!("{}... [truncated]", head)
    } else {
        response.body.clone()
    };
    out.push_str(&format!("  Body: {}\n", body));
    out
}

/// Write only the vulnerable results, pretty-printed. Returns how many were written.
pub async fn write_vulnerable(results: &[ScanResult], path: &Path) -> Result<usize> {
    let vulnerable: Vec<&ScanResult> = results
        .iter()
        .filter(|r| r.vulnerable && r.status == ScanStatus::Vulnerable)
        .collect();

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let json = serde_json::to_string_pretty(&vulnerable)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(vulnerable.len())
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs == 0 {
        format!("{}ms", millis)
    } else if total_secs < 60 {
        if millis > 0 {
            format!("{}.{:03}s", total_secs, millis)
        } else {
            format!("{}s", total_secs)
        }
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m {}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    }
}
