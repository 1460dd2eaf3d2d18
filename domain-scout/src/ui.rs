//! Pretty-mode display logic for the domain-scout CLI.
//!
//! This module handles all human-readable output: colored verdict lines,
//! grouped probe sections, spinner animation, metadata cards, listing
//! tables, and summaries. Uses only the `console` crate (already a dependency).

use console::{pad_str, style, Alignment, Term};
use domain_scout_lib::{
    AvailabilityOutcome, DomainCheck, DomainMetadata, ExportDocument, Listing, ProbeReport,
    NA_MARKER,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr so stdout stays clean.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a new spinner with the given message (e.g. "Probing 5 suffixes...").
    pub fn start(message: String) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let term = Term::stderr();
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a pretty probe run.
pub fn print_header(base_name: &str, candidate_count: usize, timeout: Duration) {
    println!(
        "{} {} {}",
        style("domain-scout").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "— Probing \"{}\" across {} suffix{}",
            base_name,
            candidate_count,
            if candidate_count == 1 { "" } else { "es" }
        ))
        .dim(),
    );
    println!(
        "{}",
        style(format!("Timeout: {:?} per lookup", timeout)).dim()
    );
    println!();
}

// ── Single check line ────────────────────────────────────────────────────────

/// Format and print a single availability check with colors and alignment.
///
/// If `counter` is Some((current, total)), a progress prefix like `[3/5]` is shown.
pub fn print_check(check: &DomainCheck, counter: Option<(usize, usize)>, debug: bool) {
    let domain_width = 30;
    let padded_domain = pad_str(&check.domain, domain_width, Alignment::Left, Some(".."));

    let prefix = match counter {
        Some((cur, total)) => {
            format!("{} ", style(format!("[{}/{}]", cur, total)).dim())
        }
        None => String::new(),
    };

    match &check.outcome {
        AvailabilityOutcome::Available => {
            println!(
                "  {}{}  {}",
                prefix,
                style(&padded_domain).white(),
                style("AVAILABLE").green().bold(),
            );
        }
        AvailabilityOutcome::Unavailable => {
            println!(
                "  {}{}  {}",
                prefix,
                style(&padded_domain).white(),
                style("TAKEN").red().bold(),
            );
        }
        AvailabilityOutcome::LookupFailed { reason } => {
            println!(
                "  {}{}  {}  {}",
                prefix,
                style(&padded_domain).white(),
                style("FAILED").yellow(),
                style(brief_failure(reason)).dim(),
            );
        }
    }

    if debug {
        if let Some(duration) = check.check_duration {
            println!(
                "    {} Looked up in {}ms",
                style("└─").dim(),
                duration.as_millis(),
            );
        }
    }
}

// ── Grouped probe output ─────────────────────────────────────────────────────

/// Print probe results grouped by verdict: Available, Taken, Failed.
/// Empty sections are omitted entirely.
pub fn print_report(report: &ProbeReport, debug: bool) {
    let mut available: Vec<&DomainCheck> = Vec::new();
    let mut taken: Vec<&DomainCheck> = Vec::new();
    let mut failed: Vec<&DomainCheck> = Vec::new();

    for check in &report.checks {
        match &check.outcome {
            AvailabilityOutcome::Available => available.push(check),
            AvailabilityOutcome::Unavailable => taken.push(check),
            AvailabilityOutcome::LookupFailed { .. } => failed.push(check),
        }
    }

    if !available.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Available ({}) ", available.len()))
                .green()
                .bold(),
            style("─".repeat(40)).green().dim(),
        );
        for check in &available {
            print_grouped_line(check, debug);
        }
        println!();
    }

    if !taken.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Taken ({}) ", taken.len())).red().bold(),
            style("─".repeat(44)).red().dim(),
        );
        for check in &taken {
            print_grouped_line(check, debug);
        }
        println!();
    }

    if !failed.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Failed ({}) ", failed.len()))
                .yellow()
                .bold(),
            style("─".repeat(42)).yellow().dim(),
        );
        for check in &failed {
            print_grouped_line(check, debug);
        }
        println!();
    }
}

/// Print a single line inside a grouped section.
fn print_grouped_line(check: &DomainCheck, debug: bool) {
    let padded = pad_str(&check.domain, 30, Alignment::Left, Some(".."));

    match check.outcome.failure_reason() {
        Some(reason) => {
            println!(
                "    {}  {}",
                style(&padded).white(),
                style(brief_failure(reason)).dim()
            );
        }
        None => {
            println!("    {}", style(&padded).white());
        }
    }

    if debug {
        if let Some(duration) = check.check_duration {
            println!(
                "      {} Looked up in {}ms",
                style("└─").dim(),
                duration.as_millis(),
            );
        }
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(report: &ProbeReport, duration: Duration) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} candidate{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(report.len()).bold(),
        if report.len() == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", report.available_count())).green(),
        style("|").dim(),
        style(format!("{} taken", report.unavailable_count())).red(),
        style("|").dim(),
        style(format!("{} failed", report.failed_count())).yellow(),
    );
}

// ── Failure summary ──────────────────────────────────────────────────────────

/// Print a categorized summary of failed lookups using colors.
pub fn print_failure_summary(checks: &[DomainCheck]) {
    let mut timeouts: Vec<&str> = Vec::new();
    let mut rate_limited: Vec<&str> = Vec::new();
    let mut network: Vec<&str> = Vec::new();
    let mut other: Vec<&str> = Vec::new();

    for check in checks {
        if let Some(reason) = check.outcome.failure_reason() {
            match brief_failure(reason) {
                "(timeout)" => timeouts.push(&check.domain),
                "(rate limited)" => rate_limited.push(&check.domain),
                "(network error)" => network.push(&check.domain),
                _ => other.push(&check.domain),
            }
        }
    }

    if timeouts.is_empty() && rate_limited.is_empty() && network.is_empty() && other.is_empty() {
        return;
    }

    println!(
        "  {}",
        style("Some candidates could not be checked:").yellow()
    );

    let print_bucket = |label: &str, domains: &[&str]| {
        if domains.is_empty() {
            return;
        }
        let listed = if domains.len() <= 5 {
            domains.join(", ")
        } else {
            let shown = &domains[..5];
            format!("{}, ... and {} more", shown.join(", "), domains.len() - 5)
        };
        println!(
            "  {} {} {}{}: {}",
            style("•").dim(),
            domains.len(),
            label,
            if domains.len() == 1 { "" } else { "s" },
            listed,
        );
    };

    print_bucket("timeout", &timeouts);
    print_bucket("rate limit refusal", &rate_limited);
    print_bucket("network error", &network);
    print_bucket("other error", &other);
}

// ── Metadata card ────────────────────────────────────────────────────────────

/// Print the full registration record for one resolved domain.
pub fn print_metadata(meta: &DomainMetadata) {
    println!(
        "{} {}",
        style(&meta.domain).bold(),
        style(format!("(.{})", meta.suffix)).dim(),
    );
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );

    print_field("Registrar", &meta.registrar);
    print_field("Registrant", &meta.registrant);
    print_field("Country", &meta.registrant_country);
    print_field("Created", &meta.creation_date);
    print_field("Expires", &meta.expiration_date);
    print_field("Updated", &meta.updated_date);
    print_field("Status", &meta.status.join(", "));
    print_field("DNSSEC", &meta.dnssec);
    print_field("Name servers", &meta.name_servers.join(", "));
    print_field("Emails", &meta.emails.join(", "));
}

/// Print one aligned label/value pair, dimming absent values.
fn print_field(label: &str, value: &str) {
    let padded_label = pad_str(label, 14, Alignment::Left, None);
    if value == NA_MARKER {
        println!("  {} {}", style(padded_label).dim(), style(value).dim());
    } else {
        println!("  {} {}", style(padded_label).dim(), value);
    }
}

// ── Listings table ───────────────────────────────────────────────────────────

/// Print stored listings as an aligned table, newest first.
pub fn print_listings(listings: &[Listing]) {
    if listings.is_empty() {
        println!("{}", style("No listings stored yet.").dim());
        return;
    }

    println!(
        "  {} {} {} {} {}",
        style(pad_str("DOMAIN", 30, Alignment::Left, None)).bold(),
        style(pad_str("PRICE", 12, Alignment::Right, None)).bold(),
        style(pad_str("PERIOD", 8, Alignment::Left, None)).bold(),
        style(pad_str("KIND", 5, Alignment::Left, None)).bold(),
        style("CREATED").bold(),
    );

    for listing in listings {
        let price = format_price(listing.price);
        let period = listing.payment_period.to_string();
        let kind = listing.kind.to_string();
        println!(
            "  {} {} {} {} {}",
            pad_str(&listing.domain_name, 30, Alignment::Left, Some("..")),
            pad_str(&price, 12, Alignment::Right, None),
            pad_str(&period, 8, Alignment::Left, None),
            pad_str(&kind, 5, Alignment::Left, None),
            style(listing.created_at.format("%Y-%m-%d %H:%M").to_string()).dim(),
        );
    }

    println!();
    println!(
        "  {}",
        style(format!(
            "{} listing{}",
            listings.len(),
            if listings.len() == 1 { "" } else { "s" }
        ))
        .dim()
    );
}

// ── Saved report view ────────────────────────────────────────────────────────

/// Print a previously exported scouting report.
pub fn print_document(doc: &ExportDocument, debug: bool) {
    println!(
        "{} {} {}",
        style("domain-scout").bold(),
        style(format!("— Report for \"{}\"", doc.query)).dim(),
        style(format!(
            "(generated {})",
            doc.generated_at.format("%Y-%m-%d %H:%M UTC")
        ))
        .dim(),
    );
    println!();

    let total = doc.checks.len();
    for (idx, check) in doc.checks.iter().enumerate() {
        let counter = if total > 1 { Some((idx + 1, total)) } else { None };
        print_check(check, counter, debug);
    }

    if let Some(meta) = &doc.metadata {
        println!();
        print_metadata(meta);
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Format a listing price with two decimal places.
pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Collapse a lookup failure reason into a short parenthesized category.
fn brief_failure(reason: &str) -> &'static str {
    let r = reason.to_lowercase();
    if r.contains("timeout") || r.contains("timed out") {
        "(timeout)"
    } else if r.contains("rate limit") || r.contains("throttl") {
        "(rate limited)"
    } else if r.contains("server discovery") || r.contains("referral") {
        "(no server)"
    } else if r.contains("network") || r.contains("connect") || r.contains("refused") {
        "(network error)"
    } else if r.contains("parse") || r.contains("ambiguous") {
        "(parse error)"
    } else {
        "(error)"
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
