//! godaddy-ddns - one-shot dynamic DNS updater for GoDaddy.

use chrono::Utc;
use clap::{Parser, Subcommand};
use godaddy_ddns::config::{Config, DEFAULT_TTL};
use godaddy_ddns::godaddy::GoDaddyClient;
use godaddy_ddns::interval::min_update_interval;
use godaddy_ddns::reconciler::{Outcome, Reconciler};
use godaddy_ddns::resolver::PublicIpResolver;
use godaddy_ddns::state::LastIpFile;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "godaddy-ddns")]
#[command(about = "Keep GoDaddy DNS records pointed at this machine's public IP")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Update DNS records if the public IP changed (the default)
    Run,

    /// Show the current IP, provider records, and saved state
    Status,

    /// Validate configuration and API credentials
    Validate,
}

fn get_config_path(cli_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }

    // Default locations
    let candidates = [
        dirs::config_dir().map(|p| p.join("godaddy-ddns/config.toml")),
        Some(PathBuf::from("/etc/godaddy-ddns/config.toml")),
        Some(PathBuf::from("config.toml")),
    ];

    for candidate in candidates.into_iter().flatten() {
        if candidate.exists() {
            return candidate;
        }
    }

    // Return default even if it doesn't exist
    dirs::config_dir()
        .map(|p| p.join("godaddy-ddns/config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout stays reserved for command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = get_config_path(cli.config);

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cmd_run(&config_path).await,
        Commands::Status => cmd_status(&config_path).await,
        Commands::Validate => cmd_validate(&config_path).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[{}] {}", Utc::now().format("%Y-%m-%d %H:%M:%S"), e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_run(config_path: &Path) -> anyhow::Result<ExitCode> {
    let config = Config::load_from(config_path)?;
    let reconciler = Reconciler::new(config)?;

    // A skipped run prints nothing; cron output stays empty until
    // something actually changes.
    if let Outcome::Updated { ip, .. } = reconciler.run().await? {
        println!(
            "[{}] Successfully updated DNS records to ip {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            ip
        );
    }

    Ok(ExitCode::SUCCESS)
}

async fn cmd_status(config_path: &Path) -> anyhow::Result<ExitCode> {
    let config = Config::load_from(config_path)?;
    config.validate()?;

    println!("godaddy-ddns Status");
    println!("===================\n");

    let resolver = match &config.ip_service {
        Some(url) => PublicIpResolver::with_url(url.clone()),
        None => PublicIpResolver::new(),
    };

    match resolver.resolve().await {
        Ok(ip) => println!("Current Public IP: {}", ip),
        Err(e) => println!("Failed to resolve IP: {}", e),
    }

    let store = LastIpFile::new(config.last_ip_path());
    match store.load() {
        Ok(Some(last)) => println!(
            "Last Applied:      {} at {}",
            last.ip,
            last.timestamp.format("%Y-%m-%d %H:%M:%S")
        ),
        Ok(None) => println!("Last Applied:      (never)"),
        Err(e) => println!("Last Applied:      error: {}", e),
    }

    println!("\nRecords ({}):", config.domain);
    println!("--------");

    let client = GoDaddyClient::new(
        config.domain.clone(),
        config.api_key.clone(),
        config.secret.clone(),
    );

    for record in config.records.iter() {
        print!("  {} ({}): ", record.name(), record.record_type());

        match client
            .fetch_record_data(record.record_type(), record.name())
            .await
        {
            Ok(Some(data)) => println!("{}", data),
            Ok(None) => println!("(no record)"),
            Err(e) => println!("error: {}", e),
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn cmd_validate(config_path: &Path) -> anyhow::Result<ExitCode> {
    println!("Validating configuration...\n");

    let config = Config::load_from(config_path)?;
    config.validate()?;

    println!("  domain:  {}", config.domain);
    println!("  records: {}", config.records.len());

    for record in config.records.iter() {
        if record.ttl() < DEFAULT_TTL {
            println!(
                "  warning: record '{}' ttl {} is below the GoDaddy minimum of {}",
                record.name(),
                record.ttl(),
                DEFAULT_TTL
            );
        }
    }

    if let Some(spec) = &config.min_update_interval {
        if min_update_interval(Some(spec.as_str())).is_zero() {
            println!(
                "  warning: min_update_interval {:?} is ignored (unparsable or zero)",
                spec
            );
        }
    }

    let client = GoDaddyClient::new(
        config.domain.clone(),
        config.api_key.clone(),
        config.secret.clone(),
    );

    let mut all_valid = true;

    if let Some(record) = config.records.iter().next() {
        print!("  credentials: ");

        match client
            .fetch_record_data(record.record_type(), record.name())
            .await
        {
            Ok(_) => println!("OK"),
            Err(e) => {
                println!("FAILED - {}", e);
                all_valid = false;
            }
        }
    }

    println!();

    if all_valid {
        println!("Configuration validated successfully.");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Validation failed.");
        Ok(ExitCode::FAILURE)
    }
}
