//! `dig` verification of previously reported takeovers

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use subtake_common::{ScanResult, ScanStatus};

use crate::args::DigArgs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigResult {
    pub subdomain: String,
    pub command: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub success: bool,
}

pub async fn run_dig(args: DigArgs) -> Result<()> {
    let results = load_scan_results(&args.input).await?;
    let targets = vulnerable_subdomains(&results);

    if targets.is_empty() {
        println!("No vulnerable subdomains found in the input file.");
        return Ok(());
    }

    println!("Found {} vulnerable subdomains to verify:", targets.len());
    for subdomain in &targets {
        println!("- {}", subdomain);
    }
    println!();

    let mut dig_results = Vec::with_capacity(targets.len());
    for subdomain in &targets {
        println!("Running dig on {}...", subdomain);
        let result = dig_subdomain(subdomain).await;
        print_dig_result(&result);
        dig_results.push(result);
    }

    if let Some(path) = &args.output {
        save_dig_results(&dig_results, path).await?;
        println!("\nResults saved to: {}", path.display());
    }

    Ok(())
}

pub async fn load_scan_results(path: &Path) -> Result<Vec<ScanResult>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse scan results in {}", path.display()))
}

pub fn vulnerable_subdomains(results: &[ScanResult]) -> Vec<String> {
    results
        .iter()
        .filter(|r| r.vulnerable && r.status == ScanStatus::Vulnerable)
        .map(|r| r.subdomain.clone())
        .collect()
}

pub async fn dig_subdomain(subdomain: &str) -> DigResult {
    query_with("dig", subdomain).await
}

/// Runs `<program> <subdomain> ANY +noall +answer`, capturing stdout and stderr together.
async fn query_with(program: &str, subdomain: &str) -> DigResult {
    let command = format!("{} {} ANY +noall +answer", program, subdomain);
    debug!("running {}", command);

    let outcome = Command::new(program)
        .args([subdomain, "ANY", "+noall", "+answer"])
        .output()
        .await;

    match outcome {
        Ok(out) => {
            let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
            output.push_str(&String::from_utf8_lossy(&out.stderr));
            let success = out.status.success();
            DigResult {
                subdomain: subdomain.to_string(),
                command,
                output,
                error: (!success).then(|| out.status.to_string()),
                success,
            }
        }
        Err(e) => DigResult {
            subdomain: subdomain.to_string(),
            command,
            output: String::new(),
            error: Some(e.to_string()),
            success: false,
        },
    }
}

fn print_dig_result(result: &DigResult) {
    println!("\n--- Dig Results for {} ---", result.subdomain);
    println!("Command: {}", result.command);

    if result.success {
        println!("Status: SUCCESS");
    } else {
        println!("Status: ERROR");
        println!("Error: {}", result.error.as_deref().unwrap_or("unknown"));
    }

    if !result.output.is_empty() {
        println!("Output:\n{}", result.output);
    }
    println!();
}

async fn save_dig_results(results: &[DigResult], path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    tokio::fs::write(path, serde_json::to_string_pretty(results)?)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("saved {} dig results to {}", results.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use subtake_common::{Evidence, Fingerprint};

    #[test]
    fn test_only_vulnerable_subdomains_selected() {
        let hit = ScanResult::classified(
            "a.example.com",
            vec![Evidence::new(&Fingerprint::literal("Heroku", "No such app"), String::new())],
        );
        let results = vec![
            hit,
            ScanResult::classified("b.example.com", Vec::new()),
            ScanResult::failed("c.example.com", "boom"),
        ];
        assert_eq!(vulnerable_subdomains(&results), vec!["a.example.com"]);
    }

    #[tokio::test]
    async fn test_missing_program_reports_error() {
        let result = query_with("subtake-no-such-dig-binary", "a.example.com").await;
        assert!(!result.success);
        assert!(result.error.is_some());
        assert_eq!(
            result.command,
            "subtake-no-such-dig-binary a.example.com ANY +noall +answer"
        );
    }

    #[test]
    fn test_error_omitted_on_success() {
        let ok = DigResult {
            subdomain: "a.example.com".into(),
            command: "dig a.example.com ANY +noall +answer".into(),
            output: "a.example.com. 300 IN CNAME x.herokuapp.com.\n".into(),
            error: None,
            success: true,
        };
        let json = serde_json::to_value(&ok).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_load_and_save_roundtrip_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scan.json");
        let results = vec![ScanResult::classified("b.example.com", Vec::new())];
        std::fs::write(&input, serde_json::to_string(&results).unwrap()).unwrap();

        let loaded = load_scan_results(&input).await.unwrap();
        assert_eq!(loaded, results);

        let out = dir.path().join("dig/out.json");
        let digs = vec![query_with("subtake-no-such-dig-binary", "b.example.com").await];
        save_dig_results(&digs, &out).await.unwrap();
        let saved: Vec<DigResult> =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(saved, digs);

        assert!(load_scan_results(&dir.path().join("missing.json")).await.is_err());
    }
}
