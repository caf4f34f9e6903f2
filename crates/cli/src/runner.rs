// runner.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use subtake_common::{ResultSink, ScanOptions};
use subtake_fingerprint::load_catalog;
use subtake_orchestrator::Orchestrator;
use subtake_scanner_http::HttpScanner;
use subtake_target_resolver::TargetResolver;

use crate::args::ScanArgs;
use crate::output::{print_detailed, print_json, print_result, print_summary, write_vulnerable};

pub async fn run_scan(args: ScanArgs, verbose: bool) -> Result<()> {
    let options = build_options(&args, verbose);
    options.validate().context("invalid scan options")?;

    let catalog = load_catalog(args.fingerprints.as_deref())
        .await
        .context("failed to load fingerprints")?;
    if let Err(e) = catalog.validate() {
        warn!("{}; subdomains matched against it will report an error", e);
    }

    let subdomains = TargetResolver::resolve(args.subdomain.as_deref(), args.list.as_deref())
        .await
        .context("failed to load subdomains")?;

    info!("Loaded {} subdomains to scan", subdomains.len());
    info!("Loaded {} fingerprints", catalog.len());
    match options.pacing_interval() {
        Some(interval) => info!("Rate limit: {}/s ({:?} between probes)", options.rate, interval),
        None => info!("Workers: {}", options.workers),
    }

    let scanner = HttpScanner::new(&options, Arc::new(catalog))?;
    let orchestrator = Orchestrator::new(Arc::new(scanner), &options);

    let live: &dyn ResultSink = &print_result;
    let sink = (!args.json).then_some(live);

    let scan_start = Instant::now();
    let results = orchestrator.scan(subdomains, sink).await;
    let scan_duration = scan_start.elapsed();

    if args.json {
        print_json(&results)?;
    }
    if args.detailed {
        for result in &results {
            print_detailed(result);
        }
    }
    print_summary(&orchestrator.stats().await, scan_duration);

    if let Some(path) = &args.output {
        let written = write_vulnerable(&results, path).await?;
        info!("Results written to {} ({} vulnerable subdomains)", path.display(), written);
    }

    Ok(())
}

/// Preset first, then any numeric flag the user set explicitly.
fn build_options(args: &ScanArgs, verbose: bool) -> ScanOptions {
    let mut options = match args.preset.as_str() {
        "fast" => ScanOptions::fast(),
        "stealth" => ScanOptions::stealth(),
        _ => ScanOptions::default(),
    };

    options.user_agent = args.user_agent.clone();
    options.verbose = verbose;
    options.skip_http_on_https_success |= args.skip_http_on_https_success;

    options = options.with_insecure(args.insecure);
    if let Some(rate) = args.rate {
        options = options.with_rate(rate);
    }
    if let Some(retries) = args.timeout_retries {
        options = options.with_timeout_retries(retries);
    }
    if let Some(secs) = args.timeout {
        options = options.with_timeout(Duration::from_secs(secs));
    }
    if let Some(workers) = args.workers {
        options = options.with_workers(workers);
    }

    options
}
