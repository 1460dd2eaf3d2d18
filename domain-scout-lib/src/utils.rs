//! Utility functions for domain processing and validation.
//!
//! This module contains helper functions for normalizing raw user input,
//! validating domain names, and splitting names into base and suffix parts.

use crate::error::DomainScoutError;

/// Normalize raw user input into a comparable domain string.
///
/// Strips every whitespace character (including embedded ones) and lowercases
/// the result. Pasted input like `"My Domain .COM"` becomes `"mydomain.com"`.
pub fn normalize_input(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Normalize input and qualify it with the default suffix when needed.
///
/// Input containing no dot gets `.{default_suffix}` appended; input that
/// already carries a suffix is left as-is. Empty input stays empty so
/// validation can report it rather than inventing a bare suffix.
///
/// # Arguments
///
/// * `raw` - Raw user-entered domain string
/// * `default_suffix` - Suffix (without leading dot) applied to dotless input
pub fn qualify_domain(raw: &str, default_suffix: &str) -> String {
    let normalized = normalize_input(raw);

    if normalized.is_empty() || normalized.contains('.') {
        return normalized;
    }

    format!("{}.{}", normalized, default_suffix)
}

/// Validate a domain name format.
///
/// Accepts either a bare base name or a fully-qualified name. This is a
/// syntax check only; whether the name exists is a lookup concern.
///
/// # Arguments
///
/// * `domain` - The domain name to validate
///
/// # Returns
///
/// `Ok(())` if valid, `Err(DomainScoutError::InvalidDomain)` if not.
pub fn validate_domain(domain: &str) -> Result<(), DomainScoutError> {
    let domain = domain.trim();

    if domain.is_empty() {
        return Err(DomainScoutError::invalid_domain(
            domain,
            "Domain name cannot be empty",
        ));
    }

    if domain.contains('.') {
        if !is_valid_fqdn(domain) {
            return Err(DomainScoutError::invalid_domain(
                domain,
                "Not a valid fully-qualified domain name",
            ));
        }
    } else if !is_valid_base_name(domain) {
        return Err(DomainScoutError::invalid_domain(
            domain,
            "Not a valid base domain name",
        ));
    }

    Ok(())
}

/// Extract the base name and suffix from a domain.
///
/// Handles multi-level suffixes properly (e.g., "example.co.uk" -> ("example", "co.uk")).
///
/// # Arguments
///
/// * `domain` - The domain to parse
///
/// # Returns
///
/// A tuple of (base_name, suffix) where suffix is None if no dot is found.
pub fn extract_domain_parts(domain: &str) -> (String, Option<String>) {
    let parts: Vec<&str> = domain.split('.').collect();

    if parts.len() >= 2 {
        let base_name = parts[0].to_string();
        let suffix = parts[1..].join(".");
        (base_name, Some(suffix))
    } else {
        (domain.to_string(), None)
    }
}

/// Validate that a base domain name (without suffix) is acceptable.
pub(crate) fn is_valid_base_name(domain: &str) -> bool {
    // Minimum length check
    if domain.len() < 2 {
        return false;
    }

    // Cannot start or end with hyphen
    if domain.starts_with('-') || domain.ends_with('-') {
        return false;
    }

    // Only allow alphanumeric and hyphens
    domain.chars().all(|c| c.is_alphanumeric() || c == '-')
}

/// Validate that an FQDN has basic valid structure.
pub(crate) fn is_valid_fqdn(domain: &str) -> bool {
    // Length bounds from the DNS label rules
    if domain.len() < 4 || domain.len() > 253 {
        return false;
    }

    // Must contain at least one dot
    if !domain.contains('.') {
        return false;
    }

    // Cannot start or end with dot or hyphen
    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return false;
    }

    // Check each label
    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    for part in parts {
        if part.is_empty() || part.len() > 63 {
            return false;
        }

        // Cannot start or end with hyphen
        if part.starts_with('-') || part.ends_with('-') {
            return false;
        }

        // Only alphanumeric and hyphens
        if !part.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return false;
        }
    }

    true
}
