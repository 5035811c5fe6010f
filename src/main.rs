//! Emoji Domain - convert emoji domains to punycode and check availability

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use emoji_domain::{
    domain::DomainChecker,
    idna::{bulk_convert, normalize_input, suggest_domains, ConversionReport, Direction},
    logging::init_logging,
    types::{Availability, BatchResult, CheckConfig},
    EmojiDomainError,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::process;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "emoji-domain", version, about = "Convert emoji domains to punycode and check availability")]
struct Cli {
    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a Unicode/emoji domain to its xn-- form
    Encode { domain: String },
    /// Convert an xn-- domain back to Unicode
    Decode { domain: String },
    /// Check whether domains are registered
    Check(CheckArgs),
    /// Convert many domains at once
    Bulk {
        /// to-ascii or to-unicode
        #[arg(short, long, default_value = "to-ascii")]
        direction: String,
        inputs: Vec<String>,
    },
    /// Suggest emoji domain variations
    Suggest {
        emoji: String,
        /// TLDs to combine with (repeatable)
        #[arg(long = "tld")]
        tlds: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Domains to check; names without a dot get --tld appended
    domains: Vec<String>,

    #[arg(long, default_value = "com")]
    tld: String,

    /// Per-probe timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[arg(long)]
    concurrency: Option<usize>,

    /// Extra attempts for failed checks
    #[arg(long)]
    retries: Option<usize>,

    /// Query this WHOIS server (host or host:port)
    #[arg(long)]
    whois_server: Option<String>,

    #[arg(long)]
    no_dns: bool,

    #[arg(long)]
    no_whois: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    if let Err(e) = emoji_domain::init() {
        eprintln!("❌ Failed to initialize: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<EmojiDomainError>() {
            Some(err) => eprintln!("{}", err.user_message()),
            None => eprintln!("❌ Error: {:#}", e),
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Encode { domain } => {
            let report = ConversionReport::emoji_to_ascii(&normalize_input(&domain))?;
            if cli.json {
                print_json(&report)?;
            } else {
                println!("{}", report.output);
                for issue in &report.validation.issues {
                    eprintln!("⚠️  {}", issue);
                }
            }
        }
        Command::Decode { domain } => {
            let report = ConversionReport::ascii_to_emoji(&normalize_input(&domain).to_lowercase());
            if cli.json {
                print_json(&report)?;
            } else {
                println!("{}", report.output);
            }
        }
        Command::Bulk { direction, inputs } => {
            let direction: Direction = direction.parse()?;
            let bulk = bulk_convert(&inputs, direction)?;
            if cli.json {
                print_json(&bulk)?;
            } else {
                for item in &bulk.results {
                    match (&item.output, &item.error) {
                        (Some(output), _) => println!("✅ {} → {}", item.input, output),
                        (None, error) => println!("❌ {} ({})", item.input, error.as_deref().unwrap_or("failed")),
                    }
                }
                println!(
                    "📊 {} converted, {} failed, {} total",
                    bulk.summary.successful, bulk.summary.failed, bulk.summary.total
                );
            }
        }
        Command::Suggest { emoji, tlds } => {
            let suggestions = suggest_domains(&emoji, &tlds)?;
            if cli.json {
                print_json(&suggestions)?;
            } else {
                for s in &suggestions {
                    println!("{:<16} {}", s.domain, s.ascii_domain);
                }
            }
        }
        Command::Check(args) => check(args, cli.json).await?,
    }
    Ok(())
}

async fn check(args: CheckArgs, json: bool) -> anyhow::Result<()> {
    let mut config = CheckConfig::from_env().context("loading configuration")?;
    if let Some(secs) = args.timeout {
        config.probe_timeout = Duration::from_secs(secs.max(1));
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrent_checks = concurrency.max(1);
    }
    if let Some(retries) = args.retries {
        config.retry_attempts = retries;
    }
    if args.whois_server.is_some() {
        config.whois_server = args.whois_server;
    }
    config.enable_dns = !args.no_dns;
    config.enable_whois = !args.no_whois;

    let tld = args.tld.trim_start_matches('.');
    let domains: Vec<String> = args
        .domains
        .iter()
        .map(|d| normalize_input(d))
        .map(|d| if d.contains('.') { d } else { format!("{}.{}", d, tld) })
        .collect();

    let checker = DomainChecker::with_config(config);

    let spinner = if json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
        pb.set_message(format!("Checking {} domain(s)...", domains.len()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };

    let batch = checker.resolve_many(&domains).await;
    spinner.finish_and_clear();
    let batch = batch?;

    if json {
        print_json(&batch)?;
    } else {
        display_batch(&batch);
    }
    Ok(())
}

fn display_batch(batch: &BatchResult) {
    for result in &batch.per_domain {
        let shown = if result.ascii_domain != result.domain {
            format!("{} ({})", result.domain, result.ascii_domain)
        } else {
            result.domain.clone()
        };
        match result.availability {
            Availability::Available => println!("✅ {} - AVAILABLE [{}]", shown, result.method),
            Availability::Taken => {
                print!("❌ {} - TAKEN [{}]", shown, result.method);
                if let Some(registrar) = result.registrar() {
                    print!(" ({})", registrar);
                }
                println!();
            }
            Availability::Unknown => {
                let reason = result
                    .evidence
                    .error
                    .as_deref()
                    .or(result.evidence.whois_summary.as_deref())
                    .unwrap_or("no conclusive signal");
                println!("⚠️  {} - UNKNOWN [{}] {}", shown, result.method, reason);
            }
        }
    }

    println!();
    println!("📈 Summary:");
    println!("   ✅ Available: {}", batch.counts.available);
    println!("   ❌ Taken: {}", batch.counts.taken);
    println!("   ⚠️  Unknown: {}", batch.counts.unknown);
    println!("   📊 Total checked: {}", batch.counts.total);
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
