//! Domain Scout CLI Application
//!
//! A command-line interface for scouting domain availability over the WHOIS
//! wire protocol, resolving registration records, managing buy/sell listings,
//! and exporting results as JSON documents.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};
use domain_scout_lib::{
    load_env_config, parse_timeout_string, ConfigManager, DomainProber, DomainScoutError,
    ExportDocument, ListingKind, ListingStore, PaymentPeriod, ProbeConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Listings database used when no config, environment, or flag names one.
const DEFAULT_DATABASE: &str = "domain-scout.db";

/// CLI arguments for domain-scout
#[derive(Parser, Debug)]
#[command(name = "domain-scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scout domain availability over WHOIS and manage buy/sell listings")]
#[command(
    long_about = "Scout domain availability over the WHOIS wire protocol.\n\nBare names are probed across a configurable suffix set in parallel; fully qualified names are checked directly. Registered names resolve into their full registration record, results can be saved as JSON documents, and interesting names stored as buy or sell listings."
)]
#[command(styles = STYLES)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "FILE", help_heading = "Configuration")]
    config: Option<PathBuf>,

    /// Show configuration sources and progress details
    #[arg(short, long, global = true, help_heading = "Output")]
    verbose: bool,

    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true, help_heading = "Output")]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true, help_heading = "Output")]
    pretty: bool,

    /// Show per-lookup timing details
    #[arg(short, long, global = true, help_heading = "Output")]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check name availability (bare names probe the suffix set)
    Check(CheckArgs),

    /// Resolve the full registration record for one domain
    Info(InfoArgs),

    /// Manage stored buy/sell listings
    Listings {
        /// SQLite database file for listings
        #[arg(long, global = true, value_name = "FILE", help_heading = "Storage")]
        database: Option<PathBuf>,

        #[command(subcommand)]
        action: ListingsAction,
    },

    /// Run a check and save the results as a JSON document
    Export(ExportArgs),

    /// Display a previously exported JSON document
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Domain or bare name (a name without a dot probes the suffix set)
    #[arg(value_name = "NAME")]
    name: String,

    #[command(flatten)]
    lookup: LookupArgs,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Domain to resolve (dotless names get the default suffix)
    #[arg(value_name = "DOMAIN")]
    domain: String,

    #[command(flatten)]
    lookup: LookupArgs,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Domain or bare name to check before saving
    #[arg(value_name = "NAME")]
    name: String,

    /// Destination file for the JSON document
    #[arg(short = 'o', long, value_name = "FILE")]
    output: PathBuf,

    #[command(flatten)]
    lookup: LookupArgs,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Path to a document produced by the export command
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum ListingsAction {
    /// Store a new listing
    Add(AddListingArgs),

    /// Show stored listings, newest first
    List(ListListingsArgs),

    /// Delete a listing by domain name
    Remove(RemoveListingArgs),
}

#[derive(Args, Debug)]
struct AddListingArgs {
    /// Domain name the listing is for
    #[arg(value_name = "DOMAIN")]
    domain: String,

    /// Asking or offering price
    #[arg(value_name = "PRICE")]
    price: f64,

    /// Payment period: monthly or yearly
    #[arg(long, value_name = "PERIOD", default_value = "monthly")]
    period: PaymentPeriod,

    /// Listing kind: buy or sell
    #[arg(long, value_name = "KIND", default_value = "sell")]
    kind: ListingKind,
}

#[derive(Args, Debug)]
struct ListListingsArgs {
    /// Only show listings of this kind: buy or sell
    #[arg(long, value_name = "KIND")]
    kind: Option<ListingKind>,
}

#[derive(Args, Debug)]
struct RemoveListingArgs {
    /// Domain name whose listing should be deleted
    #[arg(value_name = "DOMAIN")]
    domain: String,
}

/// Lookup tuning flags shared by the check, info, and export commands.
#[derive(Args, Debug, Clone)]
struct LookupArgs {
    /// Suffixes to probe for bare names (comma separated)
    #[arg(
        short = 's',
        long,
        value_name = "SUFFIXES",
        value_delimiter = ',',
        help_heading = "Lookup"
    )]
    suffixes: Option<Vec<String>>,

    /// Suffix appended when a dotless name needs qualifying
    #[arg(long, value_name = "SUFFIX", help_heading = "Lookup")]
    default_suffix: Option<String>,

    /// Per-lookup timeout, e.g. "5s", "500ms", "2m"
    #[arg(short = 't', long, value_name = "DURATION", help_heading = "Lookup")]
    timeout: Option<String>,

    /// Retry failed lookups once
    #[arg(long, help_heading = "Lookup")]
    retry: bool,

    /// Override the WHOIS server for a suffix (repeatable)
    #[arg(long = "server", value_name = "SUFFIX=HOST", help_heading = "Lookup")]
    servers: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(message) = validate_args(&cli) {
        eprintln!("Error: {}", message);
        process::exit(1);
    }

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

/// Route RUST_LOG-filtered diagnostics to stderr so stdout stays parseable.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Validate command arguments beyond what clap enforces.
fn validate_args(cli: &Cli) -> Result<(), String> {
    match &cli.command {
        Command::Check(args) if args.name.trim().is_empty() => {
            Err("Domain name cannot be empty".to_string())
        }
        Command::Info(args) if args.domain.trim().is_empty() => {
            Err("Domain name cannot be empty".to_string())
        }
        Command::Export(args) if args.name.trim().is_empty() => {
            Err("Domain name cannot be empty".to_string())
        }
        Command::Export(args) if args.output.as_os_str().is_empty() => {
            Err("Output path cannot be empty".to_string())
        }
        Command::Listings {
            action: ListingsAction::Add(args),
            ..
        } if !args.price.is_finite() || args.price < 0.0 => {
            Err("Price must be a non-negative number".to_string())
        }
        _ => Ok(()),
    }
}

async fn run(cli: Cli) -> Result<(), DomainScoutError> {
    let settings = build_settings(&cli)?;

    if cli.verbose
        && matches!(
            cli.command,
            Command::Check(_) | Command::Info(_) | Command::Export(_)
        )
    {
        println!("domain-scout v{}", env!("CARGO_PKG_VERSION"));
        println!(
            "Suffixes: {} | Timeout: {:?} | Retry: {}",
            settings.probe.suffixes.join(","),
            settings.probe.timeout,
            settings.probe.retry_failed
        );
        println!();
    }

    match &cli.command {
        Command::Check(args) => run_check(args, &cli, &settings).await,
        Command::Info(args) => run_info(args, &settings).await,
        Command::Listings { action, .. } => run_listings(action, &settings).await,
        Command::Export(args) => run_export(args, &settings).await,
        Command::Render(args) => run_render(args, &cli, &settings).await,
    }
}

/// Fully resolved runtime settings after merging every configuration layer.
#[derive(Debug, Clone)]
struct Settings {
    probe: ProbeConfig,
    database: PathBuf,
    json: bool,
    pretty: bool,
}

/// Resolve settings from defaults, config files, DS_* variables, and flags.
///
/// Later layers win: built-in defaults, then discovered configuration
/// files, then the environment, then command-line arguments.
fn build_settings(cli: &Cli) -> Result<Settings, DomainScoutError> {
    let manager = ConfigManager::new(cli.verbose);
    let env_config = load_env_config(cli.verbose);

    // Explicit --config beats DS_CONFIG, which beats discovery.
    let file_config = if let Some(path) = &cli.config {
        manager.load_file(path)?
    } else if let Some(path) = &env_config.config {
        manager.load_file(path)?
    } else {
        manager.discover_and_load()?
    };

    let mut probe = ProbeConfig::default();
    let mut database = PathBuf::from(DEFAULT_DATABASE);
    let mut json = false;
    let mut pretty = false;

    // File layer
    if let Some(defaults) = &file_config.defaults {
        if let Some(suffixes) = &defaults.suffixes {
            probe = probe.with_suffixes(suffixes.clone());
        }
        if let Some(suffix) = &defaults.default_suffix {
            probe = probe.with_default_suffix(suffix.clone());
        }
        if let Some(timeout_str) = &defaults.timeout {
            // Validated at load time, so the parse cannot fail here
            if let Some(timeout) = parse_timeout_string(timeout_str) {
                probe = probe.with_timeout(timeout);
            }
        }
        if let Some(retry) = defaults.retry {
            probe = probe.with_retry_failed(retry);
        }
    }
    if let Some(servers) = &file_config.servers {
        probe = probe.with_server_overrides(servers.clone());
    }
    if let Some(listings) = &file_config.listings {
        if let Some(db) = &listings.database {
            database = PathBuf::from(db);
        }
    }
    if let Some(output) = &file_config.output {
        if let Some(value) = output.json {
            json = value;
        }
        if let Some(value) = output.pretty {
            pretty = value;
        }
    }

    // Environment layer
    if let Some(suffixes) = &env_config.suffixes {
        probe = probe.with_suffixes(suffixes.clone());
    }
    if let Some(suffix) = &env_config.default_suffix {
        probe = probe.with_default_suffix(suffix.clone());
    }
    if let Some(timeout_str) = &env_config.timeout {
        if let Some(timeout) = parse_timeout_string(timeout_str) {
            probe = probe.with_timeout(timeout);
        }
    }
    if let Some(retry) = env_config.retry {
        probe = probe.with_retry_failed(retry);
    }
    if let Some(db) = &env_config.database {
        database = PathBuf::from(db);
    }
    if let Some(value) = env_config.json {
        json = value;
    }
    if let Some(value) = env_config.pretty {
        pretty = value;
    }

    // Command-line layer
    if let Some(lookup) = lookup_args_for(&cli.command) {
        probe = apply_lookup_args(probe, lookup)?;
    }
    if let Command::Listings {
        database: Some(db), ..
    } = &cli.command
    {
        database = db.clone();
    }

    // Boolean output flags only push in their explicit direction; a false
    // here is the flag being absent and must not clobber config or env.
    if cli.json {
        json = true;
    }
    if cli.pretty {
        pretty = true;
    }

    Ok(Settings {
        probe,
        database,
        json,
        pretty,
    })
}

/// Lookup tuning flags carried by the current subcommand, if any.
fn lookup_args_for(command: &Command) -> Option<&LookupArgs> {
    match command {
        Command::Check(args) => Some(&args.lookup),
        Command::Info(args) => Some(&args.lookup),
        Command::Export(args) => Some(&args.lookup),
        _ => None,
    }
}

/// Apply lookup flags on top of a probe configuration.
fn apply_lookup_args(
    mut probe: ProbeConfig,
    lookup: &LookupArgs,
) -> Result<ProbeConfig, DomainScoutError> {
    if let Some(suffixes) = &lookup.suffixes {
        probe = probe.with_suffixes(suffixes.clone());
    }
    if let Some(suffix) = &lookup.default_suffix {
        probe = probe.with_default_suffix(suffix.clone());
    }
    if let Some(timeout_str) = &lookup.timeout {
        let timeout = parse_timeout_string(timeout_str).ok_or_else(|| {
            DomainScoutError::ConfigError {
                message: format!(
                    "Invalid timeout '{}'. Use a format like '5s', '500ms', '2m'",
                    timeout_str
                ),
            }
        })?;
        probe = probe.with_timeout(timeout);
    }
    // --retry only enables; a false here is the flag being absent and must
    // not clobber a config or environment value.
    if lookup.retry {
        probe = probe.with_retry_failed(true);
    }
    for entry in &lookup.servers {
        match entry.split_once('=') {
            Some((suffix, server)) if !suffix.trim().is_empty() && !server.trim().is_empty() => {
                probe = probe.with_server_override(suffix.trim(), server.trim());
            }
            _ => {
                return Err(DomainScoutError::ConfigError {
                    message: format!("Invalid --server value '{}'. Use SUFFIX=HOST", entry),
                });
            }
        }
    }

    Ok(probe)
}

/// Check a single domain or probe a bare name across the suffix set.
async fn run_check(args: &CheckArgs, cli: &Cli, settings: &Settings) -> Result<(), DomainScoutError> {
    let prober = DomainProber::with_config(settings.probe.clone());

    // Dot presence picks the mode: qualified names check directly,
    // bare names fan out across the configured suffixes.
    if args.name.contains('.') {
        let check = prober.check_domain(&args.name).await?;
        if settings.json {
            print_json(&check, settings.pretty)?;
        } else {
            ui::print_check(&check, None, cli.debug);
        }
        return Ok(());
    }

    let candidate_count = settings.probe.suffixes.len();
    let spinner = if settings.json {
        None
    } else {
        ui::print_header(&args.name, candidate_count, settings.probe.timeout);
        Some(ui::Spinner::start(format!(
            "Checking {} candidate{}...",
            candidate_count,
            if candidate_count == 1 { "" } else { "s" }
        )))
    };

    let started = Instant::now();
    let result = prober.probe_suffixes(&args.name).await;
    let elapsed = started.elapsed();

    if let Some(spinner) = spinner {
        spinner.stop().await;
    }

    let report = result?;

    if settings.json {
        print_json(&report, settings.pretty)?;
    } else {
        ui::print_report(&report, cli.debug);
        ui::print_summary(&report, elapsed);
        ui::print_failure_summary(&report.checks);
    }

    Ok(())
}

/// Resolve and display the registration record for one domain.
async fn run_info(args: &InfoArgs, settings: &Settings) -> Result<(), DomainScoutError> {
    let prober = DomainProber::with_config(settings.probe.clone());

    let spinner = if settings.json {
        None
    } else {
        Some(ui::Spinner::start(format!("Resolving {}...", args.domain)))
    };

    let result = prober.resolve_domain(&args.domain).await;

    if let Some(spinner) = spinner {
        spinner.stop().await;
    }

    let metadata = result?;

    if settings.json {
        print_json(&metadata, settings.pretty)?;
    } else {
        ui::print_metadata(&metadata);
    }

    Ok(())
}

/// Add, list, or remove stored listings.
async fn run_listings(action: &ListingsAction, settings: &Settings) -> Result<(), DomainScoutError> {
    let store = ListingStore::open(&settings.database).await?;

    match action {
        ListingsAction::Add(args) => {
            let listing = store
                .add(&args.domain, args.price, args.period, args.kind)
                .await?;
            if settings.json {
                print_json(&listing, settings.pretty)?;
            } else {
                println!(
                    "Stored {} listing for {} at {}/{}",
                    listing.kind,
                    listing.domain_name,
                    ui::format_price(listing.price),
                    listing.payment_period
                );
            }
        }
        ListingsAction::List(args) => {
            let mut listings = store.list().await?;
            if let Some(kind) = args.kind {
                listings.retain(|listing| listing.kind == kind);
            }
            if settings.json {
                print_json(&listings, settings.pretty)?;
            } else {
                ui::print_listings(&listings);
            }
        }
        ListingsAction::Remove(args) => {
            let removed = store.remove(&args.domain).await?;
            if !removed {
                return Err(DomainScoutError::store(format!(
                    "No listing found for '{}'",
                    args.domain
                )));
            }
            if settings.json {
                print_json(&serde_json::json!({ "removed": args.domain }), settings.pretty)?;
            } else {
                println!("Removed listing for {}", args.domain);
            }
        }
    }

    Ok(())
}

/// Check a name and save the outcome as a JSON document.
async fn run_export(args: &ExportArgs, settings: &Settings) -> Result<(), DomainScoutError> {
    let prober = DomainProber::with_config(settings.probe.clone());

    let document = if args.name.contains('.') {
        let check = prober.check_domain(&args.name).await?;
        let mut document = ExportDocument::from_check(&check);
        if check.outcome.is_unavailable() {
            // Attach the registration record when the name resolves
            match prober.resolve_domain(&args.name).await {
                Ok(metadata) => document = document.with_metadata(metadata),
                Err(err) => {
                    tracing::debug!(domain = %args.name, error = %err, "metadata left out of export");
                }
            }
        }
        document
    } else {
        let report = prober.probe_suffixes(&args.name).await?;
        ExportDocument::from_report(&report)
    };

    document.save(&args.output)?;

    if settings.json {
        print_json(&document, settings.pretty)?;
    } else {
        println!(
            "Saved {} check{} to {}",
            document.checks.len(),
            if document.checks.len() == 1 { "" } else { "s" },
            args.output.display()
        );
    }

    Ok(())
}

/// Load and display a previously exported document.
async fn run_render(
    args: &RenderArgs,
    cli: &Cli,
    settings: &Settings,
) -> Result<(), DomainScoutError> {
    let document = ExportDocument::load(&args.file)?;

    if settings.json {
        print_json(&document, settings.pretty)?;
    } else {
        ui::print_document(&document, cli.debug);
    }

    Ok(())
}

/// Serialize a value to stdout in the selected JSON flavor.
fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), DomainScoutError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn empty_lookup_args() -> LookupArgs {
        LookupArgs {
            suffixes: None,
            default_suffix: None,
            timeout: None,
            retry: false,
            servers: Vec::new(),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let result = Cli::try_parse_from(["domain-scout"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_check_with_suffix_list() {
        let cli = Cli::try_parse_from(["domain-scout", "check", "mysite", "-s", "com,net,io"])
            .unwrap();

        match cli.command {
            Command::Check(args) => {
                assert_eq!(args.name, "mysite");
                assert_eq!(
                    args.lookup.suffixes,
                    Some(vec![
                        "com".to_string(),
                        "net".to_string(),
                        "io".to_string()
                    ])
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["domain-scout", "check", "mysite.com", "--json"]).unwrap();
        assert!(cli.json);
        assert!(!cli.pretty);
    }

    #[test]
    fn test_parse_listings_add_with_typed_values() {
        let cli = Cli::try_parse_from([
            "domain-scout",
            "listings",
            "add",
            "cool.com",
            "250",
            "--kind",
            "buy",
            "--period",
            "yearly",
        ])
        .unwrap();

        match cli.command {
            Command::Listings {
                action: ListingsAction::Add(args),
                ..
            } => {
                assert_eq!(args.domain, "cool.com");
                assert_eq!(args.price, 250.0);
                assert_eq!(args.kind, ListingKind::Buy);
                assert_eq!(args.period, PaymentPeriod::Yearly);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_listings_database_flag_after_action() {
        let cli = Cli::try_parse_from([
            "domain-scout",
            "listings",
            "list",
            "--database",
            "/tmp/scout.db",
        ])
        .unwrap();

        match cli.command {
            Command::Listings { database, .. } => {
                assert_eq!(database, Some(PathBuf::from("/tmp/scout.db")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let cli = Cli::try_parse_from(["domain-scout", "check", ""]).unwrap();
        let result = validate_args(&cli);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("empty"));
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let cli = Cli {
            command: Command::Listings {
                database: None,
                action: ListingsAction::Add(AddListingArgs {
                    domain: "cool.com".to_string(),
                    price: -5.0,
                    period: PaymentPeriod::Monthly,
                    kind: ListingKind::Sell,
                }),
            },
            config: None,
            verbose: false,
            json: false,
            pretty: false,
            debug: false,
        };

        let result = validate_args(&cli);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("non-negative"));
    }

    #[test]
    fn test_apply_lookup_args_overrides() {
        let lookup = LookupArgs {
            suffixes: Some(vec!["dev".to_string(), "app".to_string()]),
            default_suffix: Some("dev".to_string()),
            timeout: Some("250ms".to_string()),
            retry: true,
            servers: vec!["com=127.0.0.1:4343".to_string()],
        };

        let probe = apply_lookup_args(ProbeConfig::default(), &lookup).unwrap();

        assert_eq!(probe.suffixes, vec!["dev".to_string(), "app".to_string()]);
        assert_eq!(probe.default_suffix, "dev");
        assert_eq!(probe.timeout, Duration::from_millis(250));
        assert!(probe.retry_failed);
        assert_eq!(
            probe.server_overrides.get("com"),
            Some(&"127.0.0.1:4343".to_string())
        );
    }

    #[test]
    fn test_apply_lookup_args_rejects_bad_timeout() {
        let lookup = LookupArgs {
            timeout: Some("fast".to_string()),
            ..empty_lookup_args()
        };

        let result = apply_lookup_args(ProbeConfig::default(), &lookup);
        assert!(matches!(
            result,
            Err(DomainScoutError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_apply_lookup_args_rejects_malformed_server_override() {
        let lookup = LookupArgs {
            servers: vec!["just-a-host".to_string()],
            ..empty_lookup_args()
        };

        let result = apply_lookup_args(ProbeConfig::default(), &lookup);
        assert!(matches!(
            result,
            Err(DomainScoutError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_retry_flag_only_enables() {
        // retry=false is the flag being absent; a config-enabled retry
        // must survive it.
        let probe = ProbeConfig::default().with_retry_failed(true);
        let probe = apply_lookup_args(probe, &empty_lookup_args()).unwrap();
        assert!(probe.retry_failed);
    }
}
