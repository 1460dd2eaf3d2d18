//! Core data types for domain scouting.
//!
//! This module defines all the main data structures used throughout the library,
//! including lookup outcomes, probe reports, registration metadata, and
//! configuration options.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Marker substituted for any metadata field the registry did not return.
///
/// Consumers can rely on every [`DomainMetadata`] field being present; absent
/// values carry this marker instead of an omitted key.
pub const NA_MARKER: &str = "N/A";

/// Suffixes probed when the user supplies a bare name with no suffix.
pub const DEFAULT_SUFFIXES: &[&str] = &["com", "net", "org", "info", "io"];

/// Suffix appended to input that contains no dot at all.
pub const DEFAULT_SUFFIX: &str = "com";

/// Outcome of a single WHOIS availability lookup.
///
/// This is deliberately not a boolean: a lookup that failed on the wire must
/// stay distinguishable from a domain that is confirmed registered. The
/// internal `status` tag keeps the three-way distinction in serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AvailabilityOutcome {
    /// The registry reported no record for the name
    Available,

    /// A registration record exists for the name
    Unavailable,

    /// The lookup could not produce a verdict (network, timeout, rate limit,
    /// ambiguous response). Never collapsed into either of the other two.
    LookupFailed {
        /// Human-readable description of what went wrong
        reason: String,
    },
}

impl AvailabilityOutcome {
    /// Create a failed outcome from any displayable reason.
    pub fn failed<R: Into<String>>(reason: R) -> Self {
        Self::LookupFailed {
            reason: reason.into(),
        }
    }

    /// True if the lookup confirmed the name is unregistered.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// True if the lookup confirmed an existing registration.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// True if the lookup produced no verdict.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::LookupFailed { .. })
    }

    /// The failure description, when there is one.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::LookupFailed { reason } => Some(reason),
            _ => None,
        }
    }
}

impl std::fmt::Display for AvailabilityOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Unavailable => write!(f, "taken"),
            Self::LookupFailed { reason } => write!(f, "lookup failed: {}", reason),
        }
    }
}

/// Result of checking one fully-qualified domain name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainCheck {
    /// The domain name that was checked (e.g., "example.com")
    pub domain: String,

    /// Three-way availability verdict
    pub outcome: AvailabilityOutcome,

    /// How long the lookup took to complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_duration: Option<Duration>,
}

impl DomainCheck {
    /// Create a check result without timing information.
    pub fn new<D: Into<String>>(domain: D, outcome: AvailabilityOutcome) -> Self {
        Self {
            domain: domain.into(),
            outcome,
            check_duration: None,
        }
    }

    /// Attach the measured lookup duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.check_duration = Some(duration);
        self
    }
}

/// Complete result of probing one base name across a suffix set.
///
/// Holds exactly one entry per candidate suffix attempted, in candidate
/// order. Individual lookup failures appear as `LookupFailed` entries; a
/// candidate is never dropped from the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    /// The base name the candidates were built from (e.g., "example")
    pub base_name: String,

    /// One check per candidate, in the order the suffixes were configured
    pub checks: Vec<DomainCheck>,
}

impl ProbeReport {
    /// Create an empty report for a base name.
    pub fn new<B: Into<String>>(base_name: B) -> Self {
        Self {
            base_name: base_name.into(),
            checks: Vec::new(),
        }
    }

    /// Look up the outcome recorded for a fully-qualified candidate.
    pub fn outcome_for(&self, domain: &str) -> Option<&AvailabilityOutcome> {
        self.checks
            .iter()
            .find(|check| check.domain == domain)
            .map(|check| &check.outcome)
    }

    /// Number of candidates in the report.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// True when no candidates were probed.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Count of candidates confirmed available.
    pub fn available_count(&self) -> usize {
        self.checks.iter().filter(|c| c.outcome.is_available()).count()
    }

    /// Count of candidates confirmed registered.
    pub fn unavailable_count(&self) -> usize {
        self.checks.iter().filter(|c| c.outcome.is_unavailable()).count()
    }

    /// Count of candidates whose lookup produced no verdict.
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.outcome.is_failed()).count()
    }
}

/// Registration metadata for one resolved domain.
///
/// Every field is always present: anything the registry did not return is
/// filled with [`NA_MARKER`] (list fields carry a single marker element), so
/// consumers see a fixed key set in JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainMetadata {
    /// The fully-qualified name that was resolved
    pub domain: String,

    /// Suffix portion of the name (e.g., "com")
    pub suffix: String,

    /// The registrar managing this registration
    pub registrar: String,

    /// Registrant organisation or name
    pub registrant: String,

    /// Registrant country
    pub registrant_country: String,

    /// When the domain was first registered
    pub creation_date: String,

    /// When the registration expires
    pub expiration_date: String,

    /// Last update date of the record
    pub updated_date: String,

    /// Domain status codes (e.g., "clientTransferProhibited")
    pub status: Vec<String>,

    /// DNSSEC signing state
    pub dnssec: String,

    /// Nameservers associated with the domain
    pub name_servers: Vec<String>,

    /// Contact e-mail addresses present in the record
    pub emails: Vec<String>,
}

impl DomainMetadata {
    /// Create a metadata value with every field set to the absent marker.
    ///
    /// Used when a registry confirms a registration but returns none of the
    /// descriptive fields we extract.
    pub fn empty<D: Into<String>, S: Into<String>>(domain: D, suffix: S) -> Self {
        Self {
            domain: domain.into(),
            suffix: suffix.into(),
            registrar: NA_MARKER.to_string(),
            registrant: NA_MARKER.to_string(),
            registrant_country: NA_MARKER.to_string(),
            creation_date: NA_MARKER.to_string(),
            expiration_date: NA_MARKER.to_string(),
            updated_date: NA_MARKER.to_string(),
            status: vec![NA_MARKER.to_string()],
            dnssec: NA_MARKER.to_string(),
            name_servers: vec![NA_MARKER.to_string()],
            emails: vec![NA_MARKER.to_string()],
        }
    }
}

/// Configuration options for probe and resolve operations.
///
/// This struct allows fine-tuning of lookup behavior, including the candidate
/// suffix set, timeouts, and retry policy.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Suffixes paired with the base name during a multi-suffix probe.
    /// Stored lowercased without a leading dot; order is display order.
    pub suffixes: Vec<String>,

    /// Suffix appended to input that has no dot
    /// Default: "com"
    pub default_suffix: String,

    /// Deadline for one full WHOIS exchange (connect, send, read)
    /// Default: 5 seconds
    pub timeout: Duration,

    /// Whether a failed candidate lookup is retried once inside its task
    /// Default: false
    pub retry_failed: bool,

    /// Per-process WHOIS server overrides, keyed by suffix.
    /// Checked before the built-in table and IANA referral discovery.
    pub server_overrides: HashMap<String, String>,
}

impl Default for ProbeConfig {
    /// Create a sensible default configuration.
    ///
    /// The defaults mirror the suffix set and timing the CLI ships with.
    fn default() -> Self {
        Self {
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            default_suffix: DEFAULT_SUFFIX.to_string(),
            timeout: Duration::from_secs(5),
            retry_failed: false,
            server_overrides: HashMap::new(),
        }
    }
}

impl ProbeConfig {
    /// Replace the candidate suffix set.
    ///
    /// Entries are lowercased and stripped of any leading dot; empty entries
    /// are dropped. An empty result falls back to the default set.
    pub fn with_suffixes(mut self, suffixes: Vec<String>) -> Self {
        let cleaned: Vec<String> = suffixes
            .into_iter()
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !cleaned.is_empty() {
            self.suffixes = cleaned;
        }
        self
    }

    /// Set the suffix applied to dotless input.
    pub fn with_default_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        let cleaned = suffix.into().trim().trim_start_matches('.').to_lowercase();
        if !cleaned.is_empty() {
            self.default_suffix = cleaned;
        }
        self
    }

    /// Set the per-lookup timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the single retry of failed candidates.
    pub fn with_retry_failed(mut self, enabled: bool) -> Self {
        self.retry_failed = enabled;
        self
    }

    /// Add one WHOIS server override for a suffix.
    pub fn with_server_override<S: Into<String>, H: Into<String>>(
        mut self,
        suffix: S,
        server: H,
    ) -> Self {
        self.server_overrides.insert(
            suffix.into().trim_start_matches('.').to_lowercase(),
            server.into(),
        );
        self
    }

    /// Merge a map of WHOIS server overrides, keyed by suffix.
    pub fn with_server_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        for (suffix, server) in overrides {
            self.server_overrides
                .insert(suffix.trim_start_matches('.').to_lowercase(), server);
        }
        self
    }
}
