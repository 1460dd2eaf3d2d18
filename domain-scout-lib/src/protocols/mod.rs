//! Protocol implementations for domain scouting.
//!
//! This module contains the WHOIS wire client, response parsing for
//! availability verdicts and registration metadata, and suffix-to-server
//! resolution with IANA referral discovery.

/// WHOIS wire protocol client (TCP port 43)
pub mod whois;

/// WHOIS response classification and metadata extraction
pub mod parser;

/// Suffix to WHOIS server resolution
pub mod servers;

// Re-export commonly used functions and types
pub use parser::{classify_availability, extract_metadata};
pub use servers::{known_server_for, ServerRegistry};
pub use whois::WhoisClient;
