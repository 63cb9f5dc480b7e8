use clap::{Parser, Subcommand};
use keycloak_admin_integration::{
    CacheStore, ConfigurationPort, Container, EnvConfigurationAdapter, KeycloakAdminFacade,
    KeycloakServiceProvider, PublishOutcome, CONFIG_FILE_NAME,
};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "keycloak-admin", version, about = "Keycloak admin client tooling")]
struct Cli {
    /// TOML configuration file; environment variables override its values
    #[arg(long, short, env = "KEYCLOAK_ADMIN_CONFIG", default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the default configuration file
    PublishConfig {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List realm names
    Realms,
    /// Print the full server info document
    ServerInfo,
    /// Print the Keycloak server version
    Version,
    /// Print a valid admin access token
    Token,
    /// Drop both cached tokens
    ForgetTokens,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keycloak_admin_integration=info,keycloak_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = EnvConfigurationAdapter::with_file(&cli.config)?;
    debug!("Loaded configuration from {}", cli.config.display());

    let provider = KeycloakServiceProvider::from_config(&config);
    let container = Container::new();
    provider.register(&container);

    match cli.command {
        Command::PublishConfig { dir, force } => match provider.publish_config(&dir, force)? {
            PublishOutcome::Written(path) => println!("Published {}", path.display()),
            PublishOutcome::Skipped(path) => {
                println!("{} already exists, use --force to overwrite", path.display())
            }
        },
        Command::Realms => {
            let keycloak = KeycloakAdminFacade::resolve(&container)?;
            for realm in keycloak.realms().await? {
                println!("{}", realm.realm.as_deref().unwrap_or("<unnamed>"));
            }
        }
        Command::ServerInfo => {
            let keycloak = KeycloakAdminFacade::resolve(&container)?;
            let info = keycloak.server_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Version => {
            let keycloak = KeycloakAdminFacade::resolve(&container)?;
            println!("{}", keycloak.version().await?);
        }
        Command::Token => {
            let keycloak = KeycloakAdminFacade::resolve(&container)?;
            println!("{}", keycloak.access_token().await?);
        }
        Command::ForgetTokens => {
            let settings = config.admin_config();
            let cache = provider.cache();
            let mut removed = 0;
            for key in [
                &settings.access_token_cache_key,
                &settings.refresh_token_cache_key,
            ] {
                if cache.forget(key).await? {
                    removed += 1;
                }
            }
            info!("Removed {} cached token(s)", removed);
        }
    }

    Ok(())
}
