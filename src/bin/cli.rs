use clap::{Parser, Subcommand};
use gatehouse::{
    models::Addressing,
    registry::{discover, discover_with_report, HealthProber, ServiceRegistry},
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "gatehouse-cli")]
#[command(about = "Inspect and validate gateway service descriptors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every descriptor and report all failures
    Validate {
        /// Services directory
        #[arg(default_value = "services")]
        dir: PathBuf,
    },

    /// List discovered services
    List {
        /// Services directory
        #[arg(default_value = "services")]
        dir: PathBuf,
    },

    /// Print the routing table as JSON
    Routes {
        /// Services directory
        #[arg(default_value = "services")]
        dir: PathBuf,

        /// Address every backend at this host instead of its service name
        #[arg(long)]
        host: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { dir } => {
            let report = discover_with_report(&dir)?;

            for manifest in &report.manifests {
                println!("✅ {} ({})", manifest.name, manifest.source.display());
            }
            for path in &report.skipped {
                println!("ℹ️  skipped {}", path.display());
            }
            for failure in &report.failures {
                eprintln!("❌ {}", failure);
            }

            println!(
                "{} valid, {} invalid, {} skipped",
                report.manifests.len(),
                report.failures.len(),
                report.skipped.len()
            );

            if !report.failures.is_empty() {
                std::process::exit(1);
            }
        }

        Commands::List { dir } => {
            let manifests = discover(&dir)?;
            if manifests.is_empty() {
                println!("No services found.");
            } else {
                println!(
                    "{:<24} {:<14} {:<10} {:<6} {:<6}",
                    "Name", "Type", "Version", "API", "Tools"
                );
                println!("{}", "-".repeat(64));
                for manifest in manifests {
                    println!(
                        "{:<24} {:<14} {:<10} {:<6} {:<6}",
                        manifest.name,
                        manifest.service_type.as_str(),
                        manifest.version,
                        if manifest.has_api() { "Yes" } else { "No" },
                        manifest.declared_tools().len()
                    );
                }
            }
        }

        Commands::Routes { dir, host } => {
            let addressing = match host {
                Some(host) => Addressing::FixedHost(host),
                None => Addressing::ServiceName,
            };
            // Routing is derived from manifests only; nothing is probed.
            let prober = HealthProber::new(reqwest::Client::new(), Duration::from_secs(1));
            let registry = ServiceRegistry::new(prober, addressing);
            registry.register(discover(&dir)?);

            println!("{}", serde_json::to_string_pretty(&registry.routing_table())?);
        }
    }

    Ok(())
}
