//! Core data types for the subtake scan engine
//!
//! Results are built once through the constructors on [`ScanResult`] and are
//! not mutated after they leave the prober, so the
//! `vulnerable == (status == Vulnerable) == !evidence.is_empty()` invariant
//! holds by construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{SubtakeError, SubtakeResult};

/// Service-specific "this name was abandoned" signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub service: String,
    pub pattern: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub regex: bool,
}

impl Fingerprint {
    /// Literal (case-insensitive substring) fingerprint.
    #[inline]
    #[must_use]
    pub fn literal<S: Into<String>, P: Into<String>>(service: S, pattern: P) -> Self {
        Self {
            service: service.into(),
            pattern: pattern.into(),
            notes: String::new(),
            regex: false,
        }
    }

    /// Regex fingerprint, tested against the raw body.
    #[inline]
    #[must_use]
    pub fn regex<S: Into<String>, P: Into<String>>(service: S, pattern: P) -> Self {
        Self {
            service: service.into(),
            pattern: pattern.into(),
            notes: String::new(),
            regex: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_notes<N: Into<String>>(mut self, notes: N) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Outcome of fetching one URL (after retries).
///
/// `status_code` is 0 and `error` is set when no response was obtained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub url: String,
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HttpResponse {
    #[inline]
    #[must_use]
    pub fn failed<U: Into<String>, E: Into<String>>(url: U, error: E) -> Self {
        Self {
            url: url.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A matching fingerprint plus the body context around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub service: String,
    pub pattern: String,
    pub notes: String,
    pub snippet: String,
}

impl Evidence {
    #[must_use]
    pub fn new(fingerprint: &Fingerprint, snippet: String) -> Self {
        Self {
            service: fingerprint.service.clone(),
            pattern: fingerprint.pattern.clone(),
            notes: fingerprint.notes.clone(),
            snippet,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Vulnerable,
    NotVulnerable,
    Error,
}

impl ScanStatus {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Vulnerable => "vulnerable",
            ScanStatus::NotVulnerable => "not vulnerable",
            ScanStatus::Error => "error",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final verdict for one subdomain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub subdomain: String,
    pub vulnerable: bool,
    pub status: ScanStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_response: Option<HttpResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_response: Option<HttpResponse>,
    pub scan_time: DateTime<Utc>,
}

impl ScanResult {
    /// Classify by evidence: any evidence means vulnerable.
    #[must_use]
    pub fn classified<S: Into<String>>(subdomain: S, evidence: Vec<Evidence>) -> Self {
        let vulnerable = !evidence.is_empty();
        Self {
            subdomain: subdomain.into(),
            vulnerable,
            status: if vulnerable {
                ScanStatus::Vulnerable
            } else {
                ScanStatus::NotVulnerable
            },
            evidence,
            error: None,
            http_response: None,
            https_response: None,
            scan_time: Utc::now(),
        }
    }

    #[must_use]
    pub fn failed<S: Into<String>, E: Into<String>>(subdomain: S, message: E) -> Self {
        Self {
            subdomain: subdomain.into(),
            vulnerable: false,
            status: ScanStatus::Error,
            evidence: Vec::new(),
            error: Some(message.into()),
            http_response: None,
            https_response: None,
            scan_time: Utc::now(),
        }
    }

    /// Builder: attach the raw per-protocol responses.
    #[inline]
    #[must_use]
    pub fn with_responses(
        mut self,
        https: Option<HttpResponse>,
        http: Option<HttpResponse>,
    ) -> Self {
        self.https_response = https;
        self.http_response = http;
        self
    }

    /// Builder: stamp the time the probe started.
    #[inline]
    #[must_use]
    pub fn with_scan_time(mut self, scan_time: DateTime<Utc>) -> Self {
        self.scan_time = scan_time;
        self
    }

    #[inline]
    #[must_use]
    pub const fn is_vulnerable(&self) -> bool {
        self.vulnerable && matches!(self.status, ScanStatus::Vulnerable)
    }

    #[inline]
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.status, ScanStatus::Error)
    }
}

/// A batch of subdomains submitted to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanJob {
    pub id: Uuid,
    pub subdomains: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ScanJob {
    #[inline]
    #[must_use]
    pub fn new(subdomains: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            subdomains,
            created_at: Utc::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.subdomains.len()
    }
}

pub const DEFAULT_USER_AGENT: &str = "SubTake/1.0";
pub const DEFAULT_WORKERS: usize = 20;
/// Highest rate whose pacing interval is still at least one nanosecond.
pub const MAX_RATE: u32 = 1_000_000_000;

/// Scan behaviour, resolved once by the caller and passed down by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    pub user_agent: String,
    /// Skip TLS certificate validation.
    pub insecure: bool,
    /// Probes per second; 0 selects worker-pool mode.
    pub rate: u32,
    pub timeout_retries: u32,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    pub verbose: bool,
    /// Worker-pool width.
    pub workers: usize,
    /// Skip the HTTP fetch when HTTPS already produced a usable response.
    pub skip_http_on_https_success: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            insecure: false,
            rate: 0,
            timeout_retries: 1,
            timeout: Duration::from_secs(10),
            verbose: false,
            workers: DEFAULT_WORKERS,
            skip_http_on_https_success: false,
        }
    }
}

impl ScanOptions {
    /// Fast preset: short timeout, no retries, wide pool, HTTPS short-circuit.
    #[inline]
    #[must_use]
    pub fn fast() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            timeout_retries: 0,
            workers: 50,
            skip_http_on_https_success: true,
            ..Self::default()
        }
    }

    /// Stealth preset: sequential probes at a low fixed rate.
    #[inline]
    #[must_use]
    pub fn stealth() -> Self {
        Self {
            rate: 2,
            timeout_retries: 2,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_rate(mut self, rate: u32) -> Self {
        self.rate = rate;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_timeout_retries(mut self, retries: u32) -> Self {
        self.timeout_retries = retries;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Total attempts per fetch.
    #[inline]
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.timeout_retries.saturating_add(1)
    }

    /// Interval between probes in rate-limited mode, `None` in pool mode.
    #[inline]
    #[must_use]
    pub fn pacing_interval(&self) -> Option<Duration> {
        (self.rate > 0).then(|| (Duration::from_secs(1) / self.rate).max(Duration::from_nanos(1)))
    }

    pub fn validate(&self) -> SubtakeResult<()> {
        if self.workers == 0 {
            return Err(SubtakeError::Config("workers must be at least 1".into()));
        }
        if self.timeout.is_zero() {
            return Err(SubtakeError::Config("timeout must be non-zero".into()));
        }
        if self.rate > MAX_RATE {
            return Err(SubtakeError::Config(format!(
                "rate must be at most {} per second",
                MAX_RATE
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(SubtakeError::Config("user agent must not be empty".into()));
        }
        Ok(())
    }
}

/// Running totals for a scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub total_targets: usize,
    pub scanned: usize,
    pub vulnerable: usize,
    pub not_vulnerable: usize,
    pub errors: usize,
    pub elapsed: Duration,
}

impl ScanStats {
    #[inline]
    #[must_use]
    pub fn new(total_targets: usize) -> Self {
        Self {
            total_targets,
            ..Default::default()
        }
    }

    /// Progress percentage in [0.0, 100.0].
    #[inline]
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.total_targets == 0 {
            0.0
        } else {
            (self.scanned as f32 / self.total_targets as f32) * 100.0
        }
    }

    /// Subdomains per second.
    #[inline]
    #[must_use]
    pub fn rate(&self) -> f32 {
        if self.elapsed.as_secs_f32() == 0.0 {
            0.0
        } else {
            self.scanned as f32 / self.elapsed.as_secs_f32()
        }
    }

    pub fn update(&mut self, result: &ScanResult) {
        self.scanned = self.scanned.saturating_add(1);
        match result.status {
            ScanStatus::Vulnerable => self.vulnerable = self.vulnerable.saturating_add(1),
            ScanStatus::NotVulnerable => {
                self.not_vulnerable = self.not_vulnerable.saturating_add(1)
            }
            ScanStatus::Error => self.errors = self.errors.saturating_add(1),
        }
    }
}
