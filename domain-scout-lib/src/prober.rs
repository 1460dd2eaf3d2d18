//! Main domain probing implementation.
//!
//! This module provides the primary `DomainProber` struct that orchestrates
//! availability checks, parallel suffix probes, and metadata resolution over
//! the WHOIS protocol.

use std::time::Instant;

use futures::future::join_all;

use crate::error::DomainScoutError;
use crate::protocols::parser::is_rate_limited;
use crate::protocols::{classify_availability, extract_metadata, WhoisClient};
use crate::types::{AvailabilityOutcome, DomainCheck, DomainMetadata, ProbeConfig, ProbeReport};
use crate::utils::{
    extract_domain_parts, is_valid_base_name, normalize_input, qualify_domain, validate_domain,
};

/// Main prober that coordinates domain scouting operations.
///
/// The `DomainProber` handles all aspects of scouting including:
/// - Input normalization and validation
/// - Parallel lookups across a suffix set
/// - Per-lookup timeouts and optional retries
/// - Metadata resolution for registered domains
///
/// # Example
///
/// ```rust,no_run
/// use domain_scout_lib::DomainProber;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let prober = DomainProber::new();
///     let check = prober.check_domain("example.com").await?;
///     println!("{}: {}", check.domain, check.outcome);
///     Ok(())
/// }
/// ```
pub struct DomainProber {
    /// Configuration settings for this prober instance
    config: ProbeConfig,
    /// WHOIS client shared by all lookups
    client: WhoisClient,
}

impl DomainProber {
    /// Create a new prober with default configuration.
    ///
    /// Default settings:
    /// - Suffix set: com, net, org, info, io
    /// - Default suffix: com
    /// - Timeout: 5 seconds per lookup
    /// - Retry of failed lookups: disabled
    pub fn new() -> Self {
        Self::with_config(ProbeConfig::default())
    }

    /// Create a new prober with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domain_scout_lib::{DomainProber, ProbeConfig};
    /// use std::time::Duration;
    ///
    /// let config = ProbeConfig::default()
    ///     .with_timeout(Duration::from_secs(10))
    ///     .with_retry_failed(true);
    ///
    /// let prober = DomainProber::with_config(config);
    /// ```
    pub fn with_config(config: ProbeConfig) -> Self {
        let client = WhoisClient::from_config(&config);
        Self { config, client }
    }

    /// Check availability of a single domain.
    ///
    /// Bare names are qualified with the configured default suffix first,
    /// so `"example"` and `"example.com"` check the same domain under the
    /// default configuration.
    ///
    /// # Arguments
    ///
    /// * `raw` - The domain name to check, with or without a suffix
    ///
    /// # Returns
    ///
    /// A `DomainCheck` carrying the outcome and the time the lookup took.
    /// Lookup problems are recorded in the outcome rather than returned as
    /// errors, so a well-formed name always yields a check entry.
    ///
    /// # Errors
    ///
    /// Returns `DomainScoutError::InvalidDomain` if the name is not a
    /// well-formed domain after qualification.
    pub async fn check_domain(&self, raw: &str) -> Result<DomainCheck, DomainScoutError> {
        let domain = qualify_domain(raw, &self.config.default_suffix);
        validate_domain(&domain)?;

        let started = Instant::now();
        let outcome = self.client.lookup(&domain).await;
        Ok(DomainCheck::new(domain, outcome).with_duration(started.elapsed()))
    }

    /// Probe one base name across the configured suffix set.
    ///
    /// Builds one candidate per configured suffix and looks them all up in
    /// parallel, one task per candidate. The report always contains exactly
    /// one entry per candidate in configuration order: lookups that fail
    /// appear as `LookupFailed` entries instead of being dropped.
    ///
    /// Input that already carries a suffix is reduced to its base name, so
    /// `"example.com"` probes the same candidates as `"example"`.
    ///
    /// # Arguments
    ///
    /// * `raw` - The base name to probe (e.g., "example")
    ///
    /// # Errors
    ///
    /// Returns `DomainScoutError::InvalidDomain` if the base name contains
    /// characters that cannot appear in a domain label.
    pub async fn probe_suffixes(&self, raw: &str) -> Result<ProbeReport, DomainScoutError> {
        let normalized = normalize_input(raw);
        let (base, _) = extract_domain_parts(&normalized);

        if !is_valid_base_name(&base) {
            return Err(DomainScoutError::invalid_domain(
                base,
                "Base name must be alphanumeric with optional inner hyphens",
            ));
        }

        let candidates: Vec<String> = self
            .config
            .suffixes
            .iter()
            .map(|suffix| format!("{}.{}", base, suffix))
            .collect();

        tracing::debug!(
            base = %base,
            candidates = candidates.len(),
            "probing suffix set"
        );

        let mut tasks = Vec::with_capacity(candidates.len());
        for domain in &candidates {
            let client = self.client.clone();
            let domain = domain.clone();
            let retry = self.config.retry_failed;

            tasks.push(tokio::spawn(async move {
                let started = Instant::now();
                let mut outcome = client.lookup(&domain).await;
                if retry && outcome.is_failed() {
                    tracing::debug!(domain = %domain, "retrying failed lookup");
                    outcome = client.lookup(&domain).await;
                }
                DomainCheck::new(domain, outcome).with_duration(started.elapsed())
            }));
        }

        let mut checks = Vec::with_capacity(candidates.len());
        for (joined, domain) in join_all(tasks).await.into_iter().zip(candidates) {
            let check = match joined {
                Ok(check) => check,
                Err(err) => DomainCheck::new(
                    domain,
                    AvailabilityOutcome::failed(format!("lookup task failed: {}", err)),
                ),
            };
            checks.push(check);
        }

        Ok(ProbeReport {
            base_name: base,
            checks,
        })
    }

    /// Resolve registration metadata for a single domain.
    ///
    /// Fetches the raw WHOIS record and extracts registrar, registrant,
    /// lifecycle dates, status, name servers, and contact emails. Fields the
    /// registry did not return are filled with the `N/A` marker.
    ///
    /// Resolution is all-or-nothing: either a complete metadata set comes
    /// back, or an error explains why nothing could be resolved.
    ///
    /// # Errors
    ///
    /// Returns `DomainScoutError::InvalidDomain` for malformed names, and
    /// `DomainScoutError::ResolutionFailed` when the domain has no
    /// registration record, the server is rate limiting, or the response
    /// cannot be interpreted.
    pub async fn resolve_domain(&self, raw: &str) -> Result<DomainMetadata, DomainScoutError> {
        let domain = qualify_domain(raw, &self.config.default_suffix);
        validate_domain(&domain)?;

        let (_, suffix) = extract_domain_parts(&domain);
        let suffix = suffix.ok_or_else(|| {
            DomainScoutError::invalid_domain(&domain, "Domain has no suffix to route the query by")
        })?;

        let response = match self.client.fetch_raw(&domain).await {
            Ok(response) => response,
            Err(err) => return Err(DomainScoutError::resolution(&domain, err.to_string())),
        };

        if is_rate_limited(&response) {
            return Err(DomainScoutError::resolution(
                &domain,
                "WHOIS server is rate limiting requests",
            ));
        }

        let classified = classify_availability(&response);
        if matches!(classified, Ok(true)) {
            return Err(DomainScoutError::resolution(
                &domain,
                "No registration record was found",
            ));
        }

        if let Some(metadata) = extract_metadata(&domain, &suffix, &response) {
            tracing::debug!(domain = %domain, "resolved registration metadata");
            return Ok(metadata);
        }

        match classified {
            // Registered, but the record carried no recognizable fields.
            Ok(_) => Ok(DomainMetadata::empty(domain, suffix)),
            Err(err) => Err(DomainScoutError::resolution(&domain, err.to_string())),
        }
    }

    /// Get the current configuration for this prober.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }
}

impl Default for DomainProber {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one WHOIS response on a loopback port, returning "host:port".
    async fn mock_whois(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut query = [0u8; 256];
                let _ = stream.read(&mut query).await;
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });

        addr.to_string()
    }

    fn probe_config(suffix: &str, server: String) -> ProbeConfig {
        ProbeConfig::default()
            .with_suffixes(vec![suffix.to_string()])
            .with_default_suffix(suffix)
            .with_timeout(Duration::from_secs(2))
            .with_server_override(suffix, server)
    }

    #[tokio::test]
    async fn check_domain_rejects_empty_input() {
        let prober = DomainProber::new();
        let result = prober.check_domain("").await;
        assert!(matches!(
            result,
            Err(DomainScoutError::InvalidDomain { .. })
        ));
    }

    #[tokio::test]
    async fn check_domain_qualifies_bare_names() {
        let addr = mock_whois("No match for domain \"EXAMPLE.NET\".\n").await;
        let prober = DomainProber::with_config(probe_config("net", addr));

        let check = prober.check_domain("example").await.unwrap();
        assert_eq!(check.domain, "example.net");
        assert!(check.outcome.is_available());
        assert!(check.check_duration.is_some());
    }

    #[tokio::test]
    async fn probe_rejects_invalid_base_names() {
        let prober = DomainProber::new();
        let result = prober.probe_suffixes("bad!name").await;
        assert!(matches!(
            result,
            Err(DomainScoutError::InvalidDomain { .. })
        ));
    }

    #[tokio::test]
    async fn probe_report_covers_every_candidate() {
        // Nothing listens on these ports, so every lookup fails. The report
        // must still carry one entry per suffix in configuration order.
        let config = ProbeConfig::default()
            .with_suffixes(vec!["com".to_string(), "net".to_string()])
            .with_timeout(Duration::from_millis(500))
            .with_server_override("com", "127.0.0.1:1")
            .with_server_override("net", "127.0.0.1:1");
        let prober = DomainProber::with_config(config);

        let report = prober.probe_suffixes("example").await.unwrap();
        assert_eq!(report.base_name, "example");
        assert_eq!(report.len(), 2);
        assert_eq!(report.checks[0].domain, "example.com");
        assert_eq!(report.checks[1].domain, "example.net");
        assert_eq!(report.failed_count(), 2);
    }

    #[tokio::test]
    async fn probe_strips_suffix_from_qualified_input() {
        let addr = mock_whois("No match for \"example.com\"\n").await;
        let prober = DomainProber::with_config(probe_config("com", addr));

        let report = prober.probe_suffixes("example.org").await.unwrap();
        assert_eq!(report.base_name, "example");
        assert_eq!(report.checks[0].domain, "example.com");
    }

    #[tokio::test]
    async fn resolve_domain_reports_missing_record() {
        let addr = mock_whois("No match for domain \"EXAMPLE.COM\".\n").await;
        let prober = DomainProber::with_config(probe_config("com", addr));

        let result = prober.resolve_domain("example.com").await;
        assert!(matches!(
            result,
            Err(DomainScoutError::ResolutionFailed { .. })
        ));
    }

    #[tokio::test]
    async fn resolve_domain_extracts_metadata() {
        let addr = mock_whois(
            "Domain Name: EXAMPLE.COM\n\
             Registrar: Example Registrar, Inc.\n\
             Creation Date: 1995-08-14T04:00:00Z\n\
             Registry Expiry Date: 2026-08-13T04:00:00Z\n\
             Domain Status: clientTransferProhibited\n\
             Name Server: NS1.EXAMPLE.COM\n",
        )
        .await;
        let prober = DomainProber::with_config(probe_config("com", addr));

        let metadata = prober.resolve_domain("example.com").await.unwrap();
        assert_eq!(metadata.domain, "example.com");
        assert_eq!(metadata.suffix, "com");
        assert_eq!(metadata.registrar, "Example Registrar, Inc.");
        assert_eq!(metadata.creation_date, "1995-08-14T04:00:00Z");
        assert_eq!(metadata.name_servers, vec!["ns1.example.com"]);
    }

    #[tokio::test]
    async fn resolve_domain_reports_rate_limiting() {
        let addr = mock_whois("Your connection limit exceeded. Please slow down.\n").await;
        let prober = DomainProber::with_config(probe_config("com", addr));

        let result = prober.resolve_domain("example.com").await;
        assert!(matches!(
            result,
            Err(DomainScoutError::ResolutionFailed { .. })
        ));
    }
}
