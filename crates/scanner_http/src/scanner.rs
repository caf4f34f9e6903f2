// crates/scanner_http/src/scanner.rs
//! Per-subdomain takeover prober

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use subtake_common::{Fetcher, HttpResponse, ScanOptions, ScanResult, Scanner, SubtakeResult};
use subtake_fingerprint::FingerprintCatalog;

use crate::fetcher::HttpFetcher;

pub const BOTH_PROTOCOLS_FAILED: &str = "both HTTPS and HTTP requests failed";

const BODY_PREVIEW_CHARS: usize = 1000;

/// Fetches `https://<sub>` and `http://<sub>`, then matches the first usable
/// response (HTTPS preferred) against the catalog.
pub struct HttpScanner {
    fetcher: Arc<dyn Fetcher>,
    catalog: Arc<FingerprintCatalog>,
    verbose: bool,
    skip_http_on_https_success: bool,
}

impl HttpScanner {
    /// Scanner backed by a real [`HttpFetcher`].
    pub fn new(options: &ScanOptions, catalog: Arc<FingerprintCatalog>) -> SubtakeResult<Self> {
        let fetcher = HttpFetcher::new(options)?;
        Ok(Self::with_fetcher(Arc::new(fetcher), catalog, options))
    }

    pub fn with_fetcher(
        fetcher: Arc<dyn Fetcher>,
        catalog: Arc<FingerprintCatalog>,
        options: &ScanOptions,
    ) -> Self {
        Self {
            fetcher,
            catalog,
            verbose: options.verbose,
            skip_http_on_https_success: options.skip_http_on_https_success,
        }
    }

    async fn fetch_both(&self, subdomain: &str) -> (HttpResponse, Option<HttpResponse>) {
        let https_url = format!("https://{}", subdomain);
        let http_url = format!("http://{}", subdomain);

        if self.skip_http_on_https_success {
            let https = self.fetcher.fetch(&https_url).await;
            if https.is_success() {
                return (https, None);
            }
            let http = self.fetcher.fetch(&http_url).await;
            return (https, Some(http));
        }

        let (https, http) = tokio::join!(
            self.fetcher.fetch(&https_url),
            self.fetcher.fetch(&http_url)
        );
        (https, Some(http))
    }

    /// Match one successful response and build the verdict.
    fn classify(&self, subdomain: &str, response: &HttpResponse) -> ScanResult {
        if self.verbose {
            let preview: String = response.body.chars().take(BODY_PREVIEW_CHARS).collect();
            info!(
                "Checking {} - Status: {}, Body length: {}",
                subdomain,
                response.status_code,
                response.body.len()
            );
            info!("Body content: {:?}", preview);
        }

        match self.catalog.evidence(&response.body, &response.headers) {
            Ok(evidence) => {
                if self.verbose {
                    if evidence.is_empty() {
                        info!("No matches found for {}", subdomain);
                    } else {
                        info!("Found {} matches for {}", evidence.len(), subdomain);
                    }
                }
                ScanResult::classified(subdomain, evidence)
            }
            Err(e) => ScanResult::failed(subdomain, format!("fingerprint matching error: {}", e)),
        }
    }
}

#[async_trait]
impl Scanner for HttpScanner {
    #[instrument(skip(self))]
    async fn scan(&self, subdomain: &str) -> ScanResult {
        let started = Utc::now();
        let (https, http) = self.fetch_both(subdomain).await;

        let result = if https.is_success() {
            self.classify(subdomain, &https)
        } else if let Some(http_ok) = http.as_ref().filter(|r| r.is_success()) {
            self.classify(subdomain, http_ok)
        } else {
            let message = https
                .error
                .clone()
                .or_else(|| http.as_ref().and_then(|r| r.error.clone()))
                .unwrap_or_else(|| BOTH_PROTOCOLS_FAILED.to_string());
            ScanResult::failed(subdomain, message)
        };

        result
            .with_responses(Some(https), http)
            .with_scan_time(started)
    }

    fn name(&self) -> &str {
        "HTTP Takeover Scanner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use subtake_common::{Fingerprint, ScanStatus};

    /// Serves canned responses keyed by URL and records every call.
    #[derive(Default)]
    struct FakeFetcher {
        responses: HashMap<String, HttpResponse>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn ok(mut self, url: &str, body: &str) -> Self {
            self.responses.insert(
                url.to_string(),
                HttpResponse {
                    url: url.to_string(),
                    status_code: 200,
                    body: body.to_string(),
                    ..Default::default()
                },
            );
            self
        }

        fn fail(mut self, url: &str, error: &str) -> Self {
            self.responses
                .insert(url.to_string(), HttpResponse::failed(url, error));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> HttpResponse {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| HttpResponse::failed(url, "unexpected url"))
        }
    }

    fn scanner(fetcher: Arc<FakeFetcher>, options: &ScanOptions) -> HttpScanner {
        HttpScanner::with_fetcher(fetcher, Arc::new(FingerprintCatalog::builtin()), options)
    }

    const GH: &str = "There isn't a GitHub Pages site here.";

    #[tokio::test]
    async fn https_success_wins_and_both_are_kept() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .ok("https://x.example.com", GH)
                .ok("http://x.example.com", "Welcome"),
        );
        let result = scanner(fetcher.clone(), &ScanOptions::default())
            .scan("x.example.com")
            .await;

        assert_eq!(result.status, ScanStatus::Vulnerable);
        assert_eq!(result.evidence[0].service, "GitHub Pages");
        assert_eq!(result.https_response.as_ref().unwrap().body, GH);
        assert_eq!(result.http_response.as_ref().unwrap().body, "Welcome");
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn falls_back_to_http_when_https_fails() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .fail("https://y.example.com", "tls handshake failed")
                .ok("http://y.example.com", GH),
        );
        let result = scanner(fetcher, &ScanOptions::default())
            .scan("y.example.com")
            .await;

        assert!(result.is_vulnerable());
        assert!(result.error.is_none());
        assert!(!result.https_response.unwrap().is_success());
    }

    #[tokio::test]
    async fn not_vulnerable_when_nothing_matches() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .ok("https://z.example.com", "Welcome")
                .ok("http://z.example.com", "Welcome"),
        );
        let result = scanner(fetcher, &ScanOptions::default())
            .scan("z.example.com")
            .await;

        assert_eq!(result.status, ScanStatus::NotVulnerable);
        assert!(!result.vulnerable);
        assert!(result.evidence.is_empty());
    }

    #[tokio::test]
    async fn error_prefers_https_message() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .fail("https://e.example.com", "https broke")
                .fail("http://e.example.com", "http broke"),
        );
        let result = scanner(fetcher, &ScanOptions::default())
            .scan("e.example.com")
            .await;

        assert_eq!(result.status, ScanStatus::Error);
        assert_eq!(result.error.as_deref(), Some("https broke"));
        assert!(result.evidence.is_empty());
    }

    #[tokio::test]
    async fn matcher_failure_is_error_status() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .ok("https://m.example.com", GH)
                .ok("http://m.example.com", GH),
        );
        let catalog = FingerprintCatalog::builtin_with(vec![Fingerprint::regex("Broken", "(")]);
        let scanner =
            HttpScanner::with_fetcher(fetcher, Arc::new(catalog), &ScanOptions::default());
        let result = scanner.scan("m.example.com").await;

        assert_eq!(result.status, ScanStatus::Error);
        assert!(!result.vulnerable);
        assert!(result.evidence.is_empty());
        assert!(result
            .error
            .unwrap()
            .starts_with("fingerprint matching error: invalid regex pattern ("));
    }

    #[tokio::test]
    async fn short_circuit_skips_http_after_https_success() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .ok("https://s.example.com", "Welcome")
                .ok("http://s.example.com", GH),
        );
        let options = ScanOptions {
            skip_http_on_https_success: true,
            ..ScanOptions::default()
        };
        let result = scanner(fetcher.clone(), &options).scan("s.example.com").await;

        assert_eq!(result.status, ScanStatus::NotVulnerable);
        assert!(result.http_response.is_none());
        assert_eq!(fetcher.calls(), vec!["https://s.example.com".to_string()]);
    }

    #[tokio::test]
    async fn short_circuit_still_tries_http_after_https_failure() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .fail("https://t.example.com", "refused")
                .ok("http://t.example.com", GH),
        );
        let options = ScanOptions {
            skip_http_on_https_success: true,
            ..ScanOptions::default()
        };
        let result = scanner(fetcher.clone(), &options).scan("t.example.com").await;

        assert!(result.is_vulnerable());
        assert_eq!(fetcher.calls().len(), 2);
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    async fn logged_scan(verbose: bool) -> String {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let fetcher = Arc::new(
            FakeFetcher::default()
                .ok("https://v.example.com", GH)
                .ok("http://v.example.com", "Welcome"),
        );
        let options = ScanOptions {
            verbose,
            ..ScanOptions::default()
        };
        scanner(fetcher, &options).scan("v.example.com").await;

        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[tokio::test]
    async fn verbose_logs_response_details_at_info() {
        let output = logged_scan(true).await;
        assert!(output.contains("Checking v.example.com - Status: 200"), "{}", output);
        assert!(output.contains("Body content"), "{}", output);
        assert!(output.contains("matches for v.example.com"), "{}", output);
    }

    #[tokio::test]
    async fn quiet_scan_logs_no_response_details() {
        let output = logged_scan(false).await;
        assert!(!output.contains("Checking"), "{}", output);
        assert!(!output.contains("Body content"), "{}", output);
    }
}
