use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use subtake_common::DEFAULT_USER_AGENT;

#[derive(Parser)]
#[command(name = "subtake")]
#[command(version)]
#[command(about = "Subdomain takeover scanner", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan subdomain(s) for takeover vulnerabilities
    Scan(ScanArgs),
    /// Verify vulnerable subdomains from a results file with `dig`
    Dig(DigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Single subdomain to scan
    pub subdomain: Option<String>,

    /// File containing subdomains (one per line)
    #[arg(short, long)]
    pub list: Option<PathBuf>,

    /// Write vulnerable results to this file (JSON)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Custom fingerprints file (JSON/YAML), appended to the built-ins
    #[arg(long)]
    pub fingerprints: Option<PathBuf>,

    /// User agent string for requests
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Skip TLS certificate validation
    #[arg(long)]
    pub insecure: bool,

    /// Preset: default, fast, stealth. Explicit flags override it.
    #[arg(long, default_value = "default", value_parser = ["default", "fast", "stealth"])]
    pub preset: String,

    /// Requests per second, 0 = no limit [default: 0]
    #[arg(long)]
    pub rate: Option<u32>,

    /// Extra attempts after a failed request [default: 1]
    #[arg(long)]
    pub timeout_retries: Option<u32>,

    /// Request timeout in seconds [default: 10]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Concurrent workers when no rate is set [default: 20]
    #[arg(long)]
    pub workers: Option<usize>,

    /// Skip the HTTP request when HTTPS already answered
    #[arg(long)]
    pub skip_http_on_https_success: bool,

    /// Print the full result array as JSON instead of live lines
    #[arg(long)]
    pub json: bool,

    /// Print evidence and both responses for every result
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DigArgs {
    /// JSON file with scan results
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file for dig results (default: stdout only)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_defaults() {
        let cli = Cli::try_parse_from(["subtake", "scan", "shop.example.com"]).unwrap();
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.subdomain.as_deref(), Some("shop.example.com"));
        assert_eq!(args.user_agent, "SubTake/1.0");
        assert_eq!(args.preset, "default");
        assert!(args.rate.is_none());
        assert!(!args.insecure);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn scan_flags_and_global_verbose() {
        let cli = Cli::try_parse_from([
            "subtake", "scan", "-l", "subs.txt", "-o", "out/vuln.json", "--rate", "5",
            "--timeout", "3", "--workers", "8", "--insecure", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.list, Some(PathBuf::from("subs.txt")));
        assert_eq!(args.output, Some(PathBuf::from("out/vuln.json")));
        assert_eq!(args.rate, Some(5));
        assert_eq!(args.timeout, Some(3));
        assert_eq!(args.workers, Some(8));
        assert!(args.insecure);
    }

    #[test]
    fn dig_requires_input() {
        assert!(Cli::try_parse_from(["subtake", "dig"]).is_err());
        let cli = Cli::try_parse_from(["subtake", "dig", "-i", "results.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Dig(ref a) if a.output.is_none()));
    }

    #[test]
    fn unknown_preset_rejected() {
        assert!(Cli::try_parse_from(["subtake", "scan", "x.example.com", "--preset", "turbo"]).is_err());
    }
}
