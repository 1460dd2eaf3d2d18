// domain-scout-lib/tests/integration.rs

//! Integration tests for domain-scout-lib exports and core probing behavior.
//!
//! Every test runs against in-process mock WHOIS servers on loopback ports,
//! so the suite is deterministic and never touches the network.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_test::assert_ok;

use domain_scout_lib::{
    known_server_for, DomainProber, DomainScoutError, ExportDocument, ProbeConfig,
    DEFAULT_SUFFIXES,
};

const TAKEN_RECORD: &str = "Domain Name: SCOUTED-NAME.COM\n\
    Registry Domain ID: 1234567_DOMAIN_COM-VRSN\n\
    Registrar: Example Registrar, Inc.\n\
    Creation Date: 2020-01-15T09:30:00Z\n\
    Registry Expiry Date: 2027-01-15T09:30:00Z\n\
    Domain Status: clientTransferProhibited\n\
    Name Server: NS1.EXAMPLE-HOST.NET\n\
    Name Server: NS2.EXAMPLE-HOST.NET\n";

const NO_MATCH: &str = "No match for domain \"SCOUTED-NAME.COM\".\n>>> Last update of whois database: 2026-08-22T00:00:00Z <<<\n";

const RATE_LIMITED: &str = "Rate limit exceeded. Try again later.\n";

/// Serve one canned response per incoming connection, in order. The last
/// response repeats for any further connections.
async fn mock_whois_server(responses: Vec<&'static str>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut served = 0usize;
        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };

            let response = responses[served.min(responses.len() - 1)];
            served += 1;

            let mut query = [0u8; 256];
            let _ = stream.read(&mut query).await;
            let _ = stream.write_all(response.as_bytes()).await;
        }
    });

    addr.to_string()
}

// ============================================================
// Public API surface
// ============================================================

#[test]
fn test_library_exports_work() {
    // Built-in server table is reachable through the public API
    assert_eq!(known_server_for("com"), Some("whois.verisign-grs.com"));
    assert!(known_server_for("co.uk").is_some());

    // Default configuration matches the documented defaults
    let config = ProbeConfig::default();
    assert_eq!(config.suffixes, DEFAULT_SUFFIXES);
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert!(!config.retry_failed);
}

// ============================================================
// Multi-suffix probing
// ============================================================

/// One probe, three suffixes, three different outcomes. The report must
/// carry every candidate in configuration order regardless of outcome.
#[tokio::test]
async fn test_probe_reports_mixed_outcomes_in_order() {
    let taken = mock_whois_server(vec![TAKEN_RECORD]).await;
    let free = mock_whois_server(vec![NO_MATCH]).await;

    let config = ProbeConfig::default()
        .with_suffixes(vec!["com".into(), "net".into(), "org".into()])
        .with_timeout(Duration::from_secs(2))
        .with_server_override("com", taken)
        .with_server_override("net", free)
        .with_server_override("org", "127.0.0.1:1");
    let prober = DomainProber::with_config(config);

    let report = tokio_test::assert_ok!(prober.probe_suffixes("scouted-name").await);

    assert_eq!(report.base_name, "scouted-name");
    assert_eq!(report.len(), 3);
    assert_eq!(report.checks[0].domain, "scouted-name.com");
    assert_eq!(report.checks[1].domain, "scouted-name.net");
    assert_eq!(report.checks[2].domain, "scouted-name.org");

    assert!(report.checks[0].outcome.is_unavailable());
    assert!(report.checks[1].outcome.is_available());
    assert!(report.checks[2].outcome.is_failed());

    assert_eq!(report.available_count(), 1);
    assert_eq!(report.unavailable_count(), 1);
    assert_eq!(report.failed_count(), 1);
}

/// Even when every lookup fails, the report still has one entry per
/// candidate with a failure reason attached.
#[tokio::test]
async fn test_probe_with_all_failures_keeps_every_candidate() {
    let config = ProbeConfig::default()
        .with_suffixes(vec!["com".into(), "net".into()])
        .with_timeout(Duration::from_millis(500))
        .with_server_override("com", "127.0.0.1:1")
        .with_server_override("net", "127.0.0.1:1");
    let prober = DomainProber::with_config(config);

    let report = prober.probe_suffixes("scouted-name").await.unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(report.failed_count(), 2);
    for check in &report.checks {
        assert!(check.outcome.failure_reason().is_some());
    }
}

/// With retry enabled, a failed first lookup is retried once. The mock
/// serves a rate-limit notice first and a definitive answer second.
#[tokio::test]
async fn test_retry_recovers_from_transient_failure() {
    let flaky = mock_whois_server(vec![RATE_LIMITED, NO_MATCH]).await;

    let config = ProbeConfig::default()
        .with_suffixes(vec!["com".into()])
        .with_timeout(Duration::from_secs(2))
        .with_retry_failed(true)
        .with_server_override("com", flaky);
    let prober = DomainProber::with_config(config);

    let report = prober.probe_suffixes("scouted-name").await.unwrap();
    assert!(report.checks[0].outcome.is_available());
}

/// Without retry, the transient failure is what the report shows.
#[tokio::test]
async fn test_no_retry_keeps_first_failure() {
    let flaky = mock_whois_server(vec![RATE_LIMITED, NO_MATCH]).await;

    let config = ProbeConfig::default()
        .with_suffixes(vec!["com".into()])
        .with_timeout(Duration::from_secs(2))
        .with_server_override("com", flaky);
    let prober = DomainProber::with_config(config);

    let report = prober.probe_suffixes("scouted-name").await.unwrap();
    assert!(report.checks[0].outcome.is_failed());
}

/// A server that accepts the connection but never answers trips the
/// per-lookup timeout instead of hanging the probe.
#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        // Hold connections open without responding
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let config = ProbeConfig::default()
        .with_suffixes(vec!["com".into()])
        .with_timeout(Duration::from_millis(300))
        .with_server_override("com", addr);
    let prober = DomainProber::with_config(config);

    let report = prober.probe_suffixes("scouted-name").await.unwrap();
    assert!(report.checks[0].outcome.is_failed());
    let reason = report.checks[0].outcome.failure_reason().unwrap();
    assert!(reason.contains("Timeout"), "unexpected reason: {}", reason);
}

// ============================================================
// Single checks and metadata resolution
// ============================================================

#[tokio::test]
async fn test_check_domain_with_explicit_suffix() {
    let taken = mock_whois_server(vec![TAKEN_RECORD]).await;

    let config = ProbeConfig::default().with_server_override("com", taken);
    let prober = DomainProber::with_config(config);

    let check = prober.check_domain("scouted-name.com").await.unwrap();
    assert_eq!(check.domain, "scouted-name.com");
    assert!(check.outcome.is_unavailable());
}

#[tokio::test]
async fn test_resolve_domain_returns_full_metadata() {
    let taken = mock_whois_server(vec![TAKEN_RECORD]).await;

    let config = ProbeConfig::default().with_server_override("com", taken);
    let prober = DomainProber::with_config(config);

    let metadata = tokio_test::assert_ok!(prober.resolve_domain("scouted-name.com").await);
    assert_eq!(metadata.domain, "scouted-name.com");
    assert_eq!(metadata.suffix, "com");
    assert_eq!(metadata.registrar, "Example Registrar, Inc.");
    assert_eq!(metadata.creation_date, "2020-01-15T09:30:00Z");
    assert_eq!(metadata.expiration_date, "2027-01-15T09:30:00Z");
    assert_eq!(metadata.status, vec!["clientTransferProhibited"]);
    assert_eq!(
        metadata.name_servers,
        vec!["ns1.example-host.net", "ns2.example-host.net"]
    );
    // Fields the registry did not return still carry the marker
    assert_eq!(metadata.registrant, "N/A");
    assert_eq!(metadata.emails, vec!["N/A"]);
}

#[tokio::test]
async fn test_resolve_unregistered_domain_fails() {
    let free = mock_whois_server(vec![NO_MATCH]).await;

    let config = ProbeConfig::default().with_server_override("com", free);
    let prober = DomainProber::with_config(config);

    let result = prober.resolve_domain("scouted-name.com").await;
    assert!(matches!(
        result,
        Err(DomainScoutError::ResolutionFailed { .. })
    ));
}

// ============================================================
// Export round trip
// ============================================================

/// Probe results survive the export → save → load → decode path intact.
#[tokio::test]
async fn test_probe_report_export_round_trip() {
    let taken = mock_whois_server(vec![TAKEN_RECORD]).await;
    let free = mock_whois_server(vec![NO_MATCH]).await;

    let config = ProbeConfig::default()
        .with_suffixes(vec!["com".into(), "net".into()])
        .with_timeout(Duration::from_secs(2))
        .with_server_override("com", taken)
        .with_server_override("net", free);
    let prober = DomainProber::with_config(config);

    let report = prober.probe_suffixes("scouted-name").await.unwrap();
    let document = ExportDocument::from_report(&report);

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    document.save(&path).unwrap();

    let loaded = ExportDocument::load(&path).unwrap();
    assert_eq!(loaded, document);
    assert_eq!(loaded.query, "scouted-name");
    assert_eq!(loaded.checks.len(), 2);
    assert!(loaded.checks[0].outcome.is_unavailable());
    assert!(loaded.checks[1].outcome.is_available());
}
