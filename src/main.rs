use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use thundermonit::config::cli::{Cli, Command};
use thundermonit::utils::{logger, validation::Validate};
use thundermonit::{build_schema, server, CatalogConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD: &str = match option_env!("THUNDERMONIT_BUILD") {
    Some(build) => build,
    None => "unknown",
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Version) = cli.command {
        println!("Build: {}\nVersion: {}", BUILD, VERSION);
        return Ok(());
    }

    let mut config = CatalogConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    logger::init_logger(&config.logging, cli.verbose);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        return Err(e).context("Invalid configuration");
    }

    let seed = config.seed_services().context("Invalid seed services")?;
    let schema = build_schema(seed).context("Couldn't build the schema")?;

    match cli.command {
        Some(Command::Schema { output }) => {
            let rendered = serde_json::to_string_pretty(&schema.to_json())?;
            std::fs::write(&output, rendered)
                .with_context(|| format!("Couldn't write the schema to {}", output.display()))?;
            tracing::info!(file = %output.display(), "Computed and built the schema");
        }
        _ => {
            let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
                .await
                .with_context(|| {
                    format!(
                        "Failed to bind TCP listener on {}:{}",
                        config.server.host, config.server.port
                    )
                })?;
            let addr = listener.local_addr()?;

            tracing::info!(version = VERSION, build = BUILD, "Starting thundermonit");
            tracing::info!("Query endpoint: http://{}{}", addr, config.server.graphql_path);

            let router = server::create_router(Arc::new(schema), &config.server.graphql_path);
            server::serve(listener, router, server::shutdown_signal())
                .await
                .context("Server terminated unexpectedly")?;

            tracing::info!("Server shutdown complete");
        }
    }

    Ok(())
}
