//! safestop CLI - Main entry point.

use anyhow::Context;
use safestop::cli::{Cli, Commands, ConfigCommands};
use safestop::config::SafeStopConfig;
use safestop::connection::ConnectionFactory;
use safestop::topology::{PodLister, TopologyProber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let mut config = match &cli.config {
        Some(path) => SafeStopConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SafeStopConfig::development(),
    };
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    match cli.command {
        Commands::Members { ignore } => {
            safestop::observability::init(&config.observability)?;

            let client = kube::Client::try_default().await?;
            let lister = PodLister::new(client, &config.cluster);
            let factory = ConnectionFactory::new(config.service.clone());

            let conns = TopologyProber::new(&lister, &factory)
                .new_all_member_connections(&ignore)
                .await?;
            println!("{}", serde_json::to_string_pretty(&conns)?);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigCommands::Validate => {
                config.validate()?;
                println!("Configuration is valid");
            }
        },
    }

    Ok(())
}
