//! WHOIS response parsing.
//!
//! WHOIS responses are registry-dependent free text. This module turns them
//! into structured values: an availability verdict for the prober and a
//! metadata record for the resolver.

use crate::error::DomainScoutError;
use crate::types::{DomainMetadata, NA_MARKER};

/// Classify a WHOIS response as available (`Ok(true)`) or taken (`Ok(false)`).
///
/// Responses vary significantly between registries, so this uses a
/// comprehensive set of text patterns. Ambiguous responses return an error
/// instead of guessing; the caller decides how to surface that.
pub fn classify_availability(response: &str) -> Result<bool, DomainScoutError> {
    let output_lower = response.to_lowercase();

    // First check for unknown-suffix or server errors
    let invalid_suffix_patterns = [
        "no whois server is known",
        "no whois server",
        "invalid tld",
        "unknown tld",
        "tld not found",
        "no such tld",
        "bad tld",
        "invalid domain extension",
    ];

    for pattern in &invalid_suffix_patterns {
        if output_lower.contains(pattern) {
            return Err(DomainScoutError::server_discovery(
                "unknown",
                "Suffix not supported by WHOIS lookup",
            ));
        }
    }

    // Patterns that typically indicate domain availability
    let available_patterns = [
        "no match",
        "not found",
        "no data found",
        "no entries found",
        "domain not found",
        "domain available",
        "status: available",
        "status: free",
        "no information available",
        "not registered",
        "no matching record",
        "domain status: no object found",
        "the queried object does not exist",
        "object does not exist",
        "no matching entry",
        "domain name not found",
        "this domain name has not been registered",
        "no found",
    ];

    // Patterns that indicate the domain is definitely taken
    let taken_patterns = [
        "domain status:",
        "registrar:",
        "creation date:",
        "created:",
        "registry domain id:",
        "registrant:",
        "admin contact:",
        "tech contact:",
        "name server:",
        "nameservers:",
        "expiry date:",
        "expires:",
        "updated:",
        "last updated:",
    ];

    // Check for availability patterns first (more specific)
    for pattern in &available_patterns {
        if output_lower.contains(pattern) {
            return Ok(true);
        }
    }

    // Check for taken patterns
    let taken_pattern_count = taken_patterns
        .iter()
        .filter(|pattern| output_lower.contains(*pattern))
        .count();

    // Multiple "taken" indicators mean a registration record came back
    if taken_pattern_count >= 2 {
        return Ok(false);
    }

    // A very short response where a record would otherwise appear
    // indicates availability
    if output_lower.trim().len() < 50 {
        return Ok(true);
    }

    // For truly ambiguous cases, return an error instead of guessing
    Err(DomainScoutError::ParseError {
        message: "Unable to determine domain status from WHOIS response".to_string(),
        content: None,
    })
}

/// Check if a WHOIS response indicates rate limiting.
pub(crate) fn is_rate_limited(response: &str) -> bool {
    let output_lower = response.to_lowercase();
    let rate_limit_patterns = [
        "rate limit exceeded",
        "too many requests",
        "try again later",
        "quota exceeded",
        "limit exceeded",
        "throttled",
        "rate-limited",
        "number of allowed queries exceeded",
    ];

    rate_limit_patterns
        .iter()
        .any(|pattern| output_lower.contains(pattern))
}

/// Working set for field extraction; finalized into [`DomainMetadata`].
#[derive(Debug, Default)]
struct RawRecord {
    registrar: Option<String>,
    registrant: Option<String>,
    registrant_country: Option<String>,
    creation_date: Option<String>,
    expiration_date: Option<String>,
    updated_date: Option<String>,
    status: Vec<String>,
    dnssec: Option<String>,
    name_servers: Vec<String>,
    emails: Vec<String>,
}

impl RawRecord {
    fn is_empty(&self) -> bool {
        self.registrar.is_none()
            && self.registrant.is_none()
            && self.registrant_country.is_none()
            && self.creation_date.is_none()
            && self.expiration_date.is_none()
            && self.updated_date.is_none()
            && self.status.is_empty()
            && self.dnssec.is_none()
            && self.name_servers.is_empty()
            && self.emails.is_empty()
    }

    fn finalize(self, domain: &str, suffix: &str) -> DomainMetadata {
        let or_marker = |value: Option<String>| value.unwrap_or_else(|| NA_MARKER.to_string());
        let or_marker_list = |values: Vec<String>| {
            if values.is_empty() {
                vec![NA_MARKER.to_string()]
            } else {
                values
            }
        };

        DomainMetadata {
            domain: domain.to_string(),
            suffix: suffix.to_string(),
            registrar: or_marker(self.registrar),
            registrant: or_marker(self.registrant),
            registrant_country: or_marker(self.registrant_country),
            creation_date: or_marker(self.creation_date),
            expiration_date: or_marker(self.expiration_date),
            updated_date: or_marker(self.updated_date),
            status: or_marker_list(self.status),
            dnssec: or_marker(self.dnssec),
            name_servers: or_marker_list(self.name_servers),
            emails: or_marker_list(self.emails),
        }
    }
}

/// Extract registration metadata fields from a WHOIS record.
///
/// Key matching is case-insensitive; values keep their original case. For
/// single-valued fields the first occurrence wins, which matters for thin
/// registry responses that repeat registrar blocks. Returns `None` when no
/// field at all could be extracted, leaving the verdict to the caller.
pub fn extract_metadata(domain: &str, suffix: &str, response: &str) -> Option<DomainMetadata> {
    let mut record = RawRecord::default();

    for line in response.lines() {
        let trimmed = line.trim();

        // Skip empty lines, comments, and the ICANN terms trailer
        if trimmed.is_empty()
            || trimmed.starts_with('%')
            || trimmed.starts_with('#')
            || trimmed.starts_with(">>>")
        {
            continue;
        }

        let lower = trimmed.to_lowercase();

        if lower.starts_with("registrar:") && record.registrar.is_none() {
            set_if_value(&mut record.registrar, trimmed);
        } else if (lower.starts_with("registrant organization:")
            || lower.starts_with("registrant name:")
            || lower.starts_with("registrant:"))
            && record.registrant.is_none()
        {
            set_if_value(&mut record.registrant, trimmed);
        } else if (lower.starts_with("registrant country:") || lower.starts_with("country:"))
            && record.registrant_country.is_none()
        {
            set_if_value(&mut record.registrant_country, trimmed);
        } else if (lower.starts_with("creation date:")
            || lower.starts_with("created:")
            || lower.starts_with("registered on:")
            || lower.starts_with("registered:"))
            && record.creation_date.is_none()
        {
            set_if_value(&mut record.creation_date, trimmed);
        } else if (lower.starts_with("registry expiry date:")
            || lower.starts_with("expiration date:")
            || lower.starts_with("expiry date:")
            || lower.starts_with("expires on:")
            || lower.starts_with("expires:"))
            && record.expiration_date.is_none()
        {
            set_if_value(&mut record.expiration_date, trimmed);
        } else if (lower.starts_with("updated date:")
            || lower.starts_with("last updated:")
            || lower.starts_with("changed:"))
            && record.updated_date.is_none()
        {
            set_if_value(&mut record.updated_date, trimmed);
        } else if lower.starts_with("domain status:") || lower.starts_with("status:") {
            let value = field_value(trimmed);
            if !value.is_empty() && !record.status.contains(&value) {
                record.status.push(value);
            }
        } else if lower.starts_with("dnssec:") && record.dnssec.is_none() {
            set_if_value(&mut record.dnssec, trimmed);
        } else if lower.starts_with("name server:")
            || lower.starts_with("nameserver:")
            || lower.starts_with("nameservers:")
            || lower.starts_with("nserver:")
        {
            // Value may carry a glue address after the hostname
            if let Some(host) = field_value(trimmed).split_whitespace().next() {
                let host = host.trim_end_matches('.').to_lowercase();
                if !host.is_empty() && !record.name_servers.contains(&host) {
                    record.name_servers.push(host);
                }
            }
        }

        if trimmed.contains('@') {
            collect_emails(trimmed, &mut record.emails);
        }
    }

    if record.is_empty() {
        None
    } else {
        Some(record.finalize(domain, suffix))
    }
}

/// Everything after the first colon, trimmed. Later colons are kept so
/// timestamp values survive intact.
fn field_value(line: &str) -> String {
    line.split(':')
        .skip(1)
        .collect::<Vec<_>>()
        .join(":")
        .trim()
        .to_string()
}

fn set_if_value(slot: &mut Option<String>, line: &str) {
    let value = field_value(line);
    if !value.is_empty() {
        *slot = Some(value);
    }
}

/// Pull anything e-mail-shaped out of a line, deduplicated and lowercased.
fn collect_emails(line: &str, emails: &mut Vec<String>) {
    for token in line.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '<' | '>' | '(' | ')')) {
        let candidate = token
            .trim_matches(|c: char| matches!(c, '.' | ':' | '"' | '\''))
            .to_lowercase();

        if let Some((local, host)) = candidate.split_once('@') {
            let plausible = !local.is_empty()
                && !host.contains('@')
                && host.contains('.')
                && !host.ends_with('.');
            if plausible && !emails.contains(&candidate) {
                emails.push(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_availability_patterns() {
        let available_text = "No matching record found for example-not-registered.com";
        assert!(classify_availability(available_text).unwrap());

        let available_text2 = "Domain not found";
        assert!(classify_availability(available_text2).unwrap());

        let taken_text = "Domain Status: clientTransferProhibited\nRegistrar: Example Registrar\nCreation Date: 2020-01-01";
        assert!(!classify_availability(taken_text).unwrap());
    }

    #[test]
    fn test_classify_short_response_means_available() {
        assert!(classify_availability("").unwrap());
        assert!(classify_availability("   \n").unwrap());
    }

    #[test]
    fn test_classify_ambiguous_response() {
        let ambiguous = "The registry service is undergoing maintenance right now, \
                         please consult the status page for more information about the outage.";
        assert!(classify_availability(ambiguous).is_err());
    }

    #[test]
    fn test_classify_unknown_suffix_notice() {
        let result = classify_availability("No whois server is known for this kind of object.");
        assert!(matches!(
            result,
            Err(DomainScoutError::ServerDiscovery { .. })
        ));
    }

    #[test]
    fn test_rate_limit_detection() {
        assert!(is_rate_limited("Rate limit exceeded. Try again later."));
        assert!(is_rate_limited("Too many requests from your IP."));
        assert!(is_rate_limited("Number of allowed queries exceeded."));
        assert!(!is_rate_limited("Normal whois response"));
    }

    #[test]
    fn test_extract_metadata_full_record() {
        let response = "\
% Terms of use notice
   Domain Name: EXAMPLE.COM
   Registry Domain ID: 2336799_DOMAIN_COM-VRSN
   Registrar: Example Registrar, Inc.
   Registrant Organization: Example Holdings
   Registrant Country: US
   Creation Date: 1995-08-14T04:00:00Z
   Registry Expiry Date: 2026-08-13T04:00:00Z
   Updated Date: 2025-08-14T07:01:44Z
   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited
   Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited
   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited
   Name Server: A.IANA-SERVERS.NET
   Name Server: B.IANA-SERVERS.NET
   Name Server: a.iana-servers.net
   DNSSEC: signedDelegation
   Registrar Abuse Contact Email: abuse@example-registrar.com
>>> Last update of whois database: 2026-08-22T10:00:00Z <<<
";

        let meta = extract_metadata("example.com", "com", response).unwrap();
        assert_eq!(meta.domain, "example.com");
        assert_eq!(meta.suffix, "com");
        assert_eq!(meta.registrar, "Example Registrar, Inc.");
        assert_eq!(meta.registrant, "Example Holdings");
        assert_eq!(meta.registrant_country, "US");
        assert_eq!(meta.creation_date, "1995-08-14T04:00:00Z");
        assert_eq!(meta.expiration_date, "2026-08-13T04:00:00Z");
        assert_eq!(meta.updated_date, "2025-08-14T07:01:44Z");
        assert_eq!(meta.status.len(), 2); // duplicate status line collapsed
        assert_eq!(meta.dnssec, "signedDelegation");
        assert_eq!(
            meta.name_servers,
            vec!["a.iana-servers.net", "b.iana-servers.net"]
        );
        assert_eq!(meta.emails, vec!["abuse@example-registrar.com"]);
    }

    #[test]
    fn test_extract_metadata_first_value_wins() {
        let response = "\
Registrar: First Registrar
Registrar: Second Registrar
Created: 2001-01-01
Created: 2002-02-02
";
        let meta = extract_metadata("example.com", "com", response).unwrap();
        assert_eq!(meta.registrar, "First Registrar");
        assert_eq!(meta.creation_date, "2001-01-01");
    }

    #[test]
    fn test_extract_metadata_sparse_record_fills_markers() {
        let response = "Registrar: Lone Registrar\n";
        let meta = extract_metadata("example.com", "com", response).unwrap();

        assert_eq!(meta.registrar, "Lone Registrar");
        assert_eq!(meta.registrant, NA_MARKER);
        assert_eq!(meta.creation_date, NA_MARKER);
        assert_eq!(meta.status, vec![NA_MARKER.to_string()]);
        assert_eq!(meta.name_servers, vec![NA_MARKER.to_string()]);
        assert_eq!(meta.emails, vec![NA_MARKER.to_string()]);
    }

    #[test]
    fn test_extract_metadata_nothing_extractable() {
        assert!(extract_metadata("example.com", "com", "").is_none());
        assert!(extract_metadata("example.com", "com", "% comment only\n# noise\n").is_none());
    }

    #[test]
    fn test_extract_metadata_nserver_variant() {
        let response = "\
nserver: ns1.example.ru. 192.0.2.1
nserver: NS2.EXAMPLE.RU.
";
        let meta = extract_metadata("example.ru", "ru", response).unwrap();
        assert_eq!(meta.name_servers, vec!["ns1.example.ru", "ns2.example.ru"]);
    }
}
