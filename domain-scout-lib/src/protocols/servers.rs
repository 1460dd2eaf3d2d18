//! WHOIS server resolution for domain suffixes.
//!
//! This module maps a domain suffix to the WHOIS server that should be
//! queried: a built-in table covers common suffixes, per-process overrides
//! take precedence over everything, and unknown suffixes are discovered via
//! an IANA referral query with positive/negative caching.

use crate::error::DomainScoutError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Host queried for referral discovery of unknown suffixes.
pub(crate) const IANA_WHOIS: &str = "whois.iana.org";

/// Deadline for one referral discovery exchange.
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

lazy_static::lazy_static! {
    /// Built-in suffix -> WHOIS server mappings.
    ///
    /// These cover the suffixes the CLI probes by default plus other common
    /// endings, so typical runs never need a referral query.
    static ref KNOWN_SERVERS: HashMap<&'static str, &'static str> = HashMap::from([
        // Verisign operated
        ("com", "whois.verisign-grs.com"),
        ("net", "whois.verisign-grs.com"),
        ("cc", "ccwhois.verisign-grs.com"),
        ("tv", "whois.nic.tv"),
        // Popular gTLDs
        ("org", "whois.pir.org"),
        ("info", "whois.nic.info"),
        ("biz", "whois.nic.biz"),
        ("xyz", "whois.nic.xyz"),
        ("tech", "whois.nic.tech"),
        ("online", "whois.nic.online"),
        ("site", "whois.nic.site"),
        ("cloud", "whois.nic.cloud"),
        ("shop", "whois.nic.shop"),
        ("blog", "whois.nic.blog"),
        // Google TLDs
        ("app", "whois.nic.google"),
        ("dev", "whois.nic.google"),
        ("page", "whois.nic.google"),
        // Country codes popular for product names
        ("io", "whois.nic.io"),
        ("ai", "whois.nic.ai"),
        ("co", "whois.nic.co"),
        ("me", "whois.nic.me"),
        // Country code TLDs
        ("us", "whois.nic.us"),
        ("uk", "whois.nic.uk"),
        ("co.uk", "whois.nic.uk"),
        ("de", "whois.denic.de"),
        ("fr", "whois.nic.fr"),
        ("nl", "whois.domain-registry.nl"),
        ("ca", "whois.cira.ca"),
        ("au", "whois.auda.org.au"),
        ("br", "whois.registro.br"),
        ("in", "whois.registry.in"),
        ("eu", "whois.eu"),
        ("it", "whois.nic.it"),
        ("jp", "whois.jprs.jp"),
        ("es", "whois.nic.es"),
        ("ru", "whois.tcinet.ru"),
    ]);
}

/// Look up a suffix in the built-in server table.
///
/// Multi-level suffixes fall back to their final label, so "co.uk" resolves
/// even when only "uk" is listed.
pub fn known_server_for(suffix: &str) -> Option<&'static str> {
    let suffix_lower = suffix.to_lowercase();

    if let Some(server) = KNOWN_SERVERS.get(suffix_lower.as_str()) {
        return Some(server);
    }

    suffix_lower
        .rsplit('.')
        .next()
        .and_then(|label| KNOWN_SERVERS.get(label))
        .copied()
}

/// Suffix -> WHOIS server resolver with referral discovery.
///
/// The discovery cache is owned by this value and shared between clones, so
/// every task spawned from one prober reuses the same discoveries without any
/// process-wide state. An empty cached string records a failed discovery and
/// suppresses repeat queries for that suffix.
#[derive(Clone, Default)]
pub struct ServerRegistry {
    discovered: Arc<Mutex<HashMap<String, String>>>,
}

impl ServerRegistry {
    /// Create a registry with an empty discovery cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the WHOIS server to query for a suffix.
    ///
    /// Resolution order: per-process overrides, the built-in table, the
    /// discovery cache, then one IANA referral query. The cache lock is never
    /// held across the discovery await.
    pub async fn server_for(
        &self,
        suffix: &str,
        overrides: &HashMap<String, String>,
    ) -> Result<String, DomainScoutError> {
        let suffix_lower = suffix.to_lowercase();

        if let Some(server) = lookup_with_label_fallback(overrides, &suffix_lower) {
            return Ok(server);
        }

        if let Some(server) = known_server_for(&suffix_lower) {
            return Ok(server.to_string());
        }

        // Check the discovery cache, including negative entries
        {
            let cache = self.discovered.lock().map_err(|_| {
                DomainScoutError::internal("Failed to acquire server cache lock")
            })?;

            if let Some(server) = cache.get(&suffix_lower) {
                if server.is_empty() {
                    return Err(DomainScoutError::server_discovery(
                        &suffix_lower,
                        "No WHOIS server known (cached referral miss)",
                    ));
                }
                return Ok(server.clone());
            }
        }

        // IANA lists referrals per top-level label only
        let label = suffix_lower.rsplit('.').next().unwrap_or(&suffix_lower);
        let discovered = discover_server(label).await;

        let mut cache = self
            .discovered
            .lock()
            .map_err(|_| DomainScoutError::internal("Failed to acquire server cache lock"))?;

        match discovered {
            Some(server) => {
                tracing::debug!(suffix = %suffix_lower, server = %server, "Discovered WHOIS server via IANA referral");
                cache.insert(suffix_lower, server.clone());
                Ok(server)
            }
            None => {
                tracing::warn!(suffix = %suffix_lower, "IANA referral returned no WHOIS server");
                cache.insert(suffix_lower.clone(), String::new());
                Err(DomainScoutError::server_discovery(
                    &suffix_lower,
                    "No WHOIS server found via IANA referral",
                ))
            }
        }
    }

    /// Seed a cache entry directly; an empty server records a negative result.
    #[cfg(test)]
    fn store(&self, suffix: &str, server: &str) {
        if let Ok(mut cache) = self.discovered.lock() {
            cache.insert(suffix.to_lowercase(), server.to_string());
        }
    }
}

fn lookup_with_label_fallback(map: &HashMap<String, String>, suffix: &str) -> Option<String> {
    if let Some(server) = map.get(suffix) {
        return Some(server.clone());
    }

    suffix
        .rsplit('.')
        .next()
        .and_then(|label| map.get(label))
        .cloned()
}

/// Ask IANA for the authoritative WHOIS server of a top-level label.
async fn discover_server(label: &str) -> Option<String> {
    match super::whois::query_server(IANA_WHOIS, label, DISCOVERY_TIMEOUT).await {
        Ok(response) => parse_iana_refer_response(&response),
        Err(err) => {
            tracing::warn!(label = %label, error = %err, "IANA referral query failed");
            None
        }
    }
}

/// Parse an IANA WHOIS response for the authoritative WHOIS server.
///
/// The IANA WHOIS response may use either `refer:` or `whois:` to indicate
/// the authoritative WHOIS server for a suffix. We check both fields,
/// preferring `refer:` when present.
///
/// ```text
/// whois:        whois.verisign-grs.com
/// refer:        whois.verisign-grs.com
/// ```
fn parse_iana_refer_response(response: &str) -> Option<String> {
    let mut whois_server = None;

    for line in response.lines() {
        let line_trimmed = line.trim();
        if let Some(server) = line_trimmed.strip_prefix("refer:") {
            let server = server.trim();
            if !server.is_empty() {
                // `refer:` is the canonical field, return immediately
                return Some(server.to_string());
            }
        } else if let Some(server) = line_trimmed.strip_prefix("whois:") {
            let server = server.trim();
            if !server.is_empty() {
                whois_server = Some(server.to_string());
            }
        }
    }

    whois_server
}
