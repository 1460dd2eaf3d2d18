//! # Domain Scout Library
//!
//! A library for scouting domain availability over WHOIS, resolving
//! registration metadata, and keeping buy/sell listings.
//!
//! The prober fans one base name out across a configurable suffix set, looks
//! every candidate up in parallel, and reports a three-way outcome per
//! candidate: available, taken, or lookup failed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_scout_lib::DomainProber;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let prober = DomainProber::new();
//!     let report = prober.probe_suffixes("example").await?;
//!
//!     for check in &report.checks {
//!         println!("{}: {}", check.domain, check.outcome);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **WHOIS Lookups**: Plain TCP port 43 queries with per-lookup timeouts
//! - **Parallel Probes**: One task per candidate suffix, joined into one report
//! - **Server Discovery**: Built-in registry table with IANA referral fallback
//! - **Metadata Resolution**: Registrar, dates, status, name servers, contacts
//! - **Listings Store**: SQLite-backed buy/sell listings
//! - **Typed Export**: Versioned JSON report documents

// Re-export main public API types and functions
// This makes them available as domain_scout_lib::TypeName
pub use config::{
    load_env_config, parse_timeout_string, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
    ListingsConfig, OutputConfig,
};
pub use error::DomainScoutError;
pub use export::{ExportDocument, FORMAT_VERSION};
pub use listings::{Listing, ListingKind, ListingStore, PaymentPeriod};
pub use prober::DomainProber;
pub use protocols::{
    classify_availability, extract_metadata, known_server_for, ServerRegistry, WhoisClient,
};
pub use types::{
    AvailabilityOutcome, DomainCheck, DomainMetadata, ProbeConfig, ProbeReport, DEFAULT_SUFFIX,
    DEFAULT_SUFFIXES, NA_MARKER,
};
pub use utils::{extract_domain_parts, normalize_input, qualify_domain, validate_domain};

// Internal modules - these are not part of the public API
mod config;
mod error;
mod export;
mod listings;
mod prober;
mod protocols;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainScoutError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
