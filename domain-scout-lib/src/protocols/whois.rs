//! WHOIS wire protocol client.
//!
//! This module speaks the WHOIS protocol directly (RFC 3912): open a TCP
//! connection to the registry's port 43, send the domain name followed by
//! CRLF, and read the free-text response to EOF. Responses are classified
//! by the parser module; server selection comes from the servers module.

use crate::error::DomainScoutError;
use crate::protocols::parser;
use crate::protocols::servers::ServerRegistry;
use crate::types::{AvailabilityOutcome, ProbeConfig};
use crate::utils::extract_domain_parts;
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Port registered for the WHOIS protocol.
pub(crate) const WHOIS_PORT: u16 = 43;

/// WHOIS client for checking domain availability over TCP.
///
/// The client is a cheap handle: cloning shares the server registry's
/// discovery cache, so a prober can hand one clone to each spawned task.
#[derive(Clone)]
pub struct WhoisClient {
    /// Deadline for one full connect/send/read exchange
    timeout: Duration,

    /// Suffix -> server resolution with referral discovery
    registry: ServerRegistry,

    /// Per-process server overrides, keyed by suffix
    server_overrides: HashMap<String, String>,
}

impl WhoisClient {
    /// Create a new WHOIS client with default settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            registry: ServerRegistry::new(),
            server_overrides: HashMap::new(),
        }
    }

    /// Create a new WHOIS client with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::new()
        }
    }

    /// Create a client configured from probe settings.
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self {
            timeout: config.timeout,
            registry: ServerRegistry::new(),
            server_overrides: config.server_overrides.clone(),
        }
    }

    /// Look up availability for a fully-qualified domain name.
    ///
    /// This call is total: every failure mode (server resolution, connect or
    /// read errors, timeout, rate limiting, unparseable responses) comes back
    /// as `LookupFailed` rather than an error, so batch callers can always
    /// record an outcome per candidate.
    pub async fn lookup(&self, domain: &str) -> AvailabilityOutcome {
        let response = match self.exchange(domain).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(domain = %domain, error = %err, "WHOIS lookup failed");
                return AvailabilityOutcome::failed(err.to_string());
            }
        };

        if parser::is_rate_limited(&response) {
            tracing::debug!(domain = %domain, "WHOIS server reported rate limiting");
            return AvailabilityOutcome::failed("WHOIS server is rate limiting requests");
        }

        let outcome = match parser::classify_availability(&response) {
            Ok(true) => AvailabilityOutcome::Available,
            Ok(false) => AvailabilityOutcome::Unavailable,
            Err(err) => AvailabilityOutcome::failed(err.to_string()),
        };

        tracing::debug!(domain = %domain, outcome = %outcome, "WHOIS availability lookup completed");
        outcome
    }

    /// Fetch the raw WHOIS record for a domain.
    ///
    /// Same server resolution, transport, and deadline as `lookup`, but the
    /// unparsed response text is handed back for metadata extraction.
    pub async fn fetch_raw(&self, domain: &str) -> Result<String, DomainScoutError> {
        self.exchange(domain).await
    }

    /// Resolve the server for the domain's suffix and run one exchange.
    async fn exchange(&self, domain: &str) -> Result<String, DomainScoutError> {
        let (_, suffix) = extract_domain_parts(domain);
        let suffix = suffix.ok_or_else(|| {
            DomainScoutError::invalid_domain(domain, "Domain has no suffix to route the query by")
        })?;

        let server = self
            .registry
            .server_for(&suffix, &self.server_overrides)
            .await?;

        query_server(&server, domain, self.timeout).await
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one WHOIS exchange against a specific server.
///
/// The whole connect/send/read conversation runs under a single deadline.
/// The server string may carry an explicit port ("host:4343"); otherwise
/// port 43 is used.
pub(crate) async fn query_server(
    server: &str,
    query: &str,
    timeout: Duration,
) -> Result<String, DomainScoutError> {
    let (host, port) = host_and_port(server);

    let exchange = async {
        let mut stream = TcpStream::connect((host.as_str(), port)).await?;
        stream.write_all(format!("{}\r\n", query).as_bytes()).await?;

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await?;
        Ok::<_, std::io::Error>(raw)
    };

    match tokio::time::timeout(timeout, exchange).await {
        // Registries occasionally emit non-UTF-8 bytes in contact fields
        Ok(Ok(raw)) => Ok(String::from_utf8_lossy(&raw).into_owned()),
        Ok(Err(e)) => Err(DomainScoutError::network_with_source(
            format!("WHOIS exchange with {} failed", server),
            e.to_string(),
        )),
        Err(_) => Err(DomainScoutError::timeout(
            format!("WHOIS query to {}", server),
            timeout,
        )),
    }
}

/// Split an optional explicit port off a server string.
fn host_and_port(server: &str) -> (String, u16) {
    if let Some((host, port)) = server.rsplit_once(':') {
        if let Ok(port) = port.parse::<u16>() {
            return (host.to_string(), port);
        }
    }

    (server.to_string(), WHOIS_PORT)
}
