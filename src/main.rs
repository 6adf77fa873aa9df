use axum::http::Request;
use clap::{Parser, Subcommand};
use ens_badge::{
    activity::EtherscanClient,
    config::Settings,
    resolver::EnsClient,
    router,
    utils::{parse_address, to_lower_hex},
    AppState,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[clap(name = "ens-badge")]
#[clap(about = "Render ENS name badges for Ethereum addresses", long_about = None)]
struct Cli {
    /// Path to .env file (optional)
    #[clap(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the badge HTTP server
    Serve {
        /// Port to listen on (overrides configuration)
        #[clap(short, long)]
        port: Option<u16>,
    },

    /// Render a badge to a PNG file
    Badge {
        /// Ethereum address
        #[clap(short, long)]
        address: String,

        /// Output file
        #[clap(short, long, default_value = "badge.png")]
        output: String,
    },

    /// Print the date of an address's first transaction
    FirstTx {
        /// Ethereum address
        #[clap(short, long)]
        address: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if std::path::Path::new(&cli.dotenv).exists() {
        dotenvy::from_path(&cli.dotenv)?;
    }

    // Load configuration
    let mut settings = Settings::new().unwrap_or_else(|e| {
        eprintln!("Using default settings: {}", e);
        Settings::default()
    });

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| settings.app.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = settings.validate() {
        error!("Invalid settings: {}", e);
        return Err(anyhow::anyhow!(e));
    }

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }

            if let Err(e) = EnsClient::new(&settings.ens)?.verify_chain().await {
                warn!("ENS provider check failed: {}", e);
            }

            let state = AppState::from_settings(&settings)?;
            let app = router(state).layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                    tracing::span!(
                        Level::INFO,
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }),
            );

            let bind_addr = settings.bind_addr();
            let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
            info!(addr = %bind_addr, "starting badge server");

            axum::serve(listener, app).await?;
        }

        Commands::Badge { address, output } => {
            let address = parse_address(&address)?;
            let state = AppState::from_settings(&settings)?;

            let identity = state.resolver.resolve(address).await?;
            let png = state
                .renderer
                .render_ref(&state.loader, identity.name.as_deref(), &identity.avatar_ref)
                .await?;

            std::fs::write(&output, &png)?;
            println!(
                "Wrote {} ({} bytes) for {} [{}]",
                output,
                png.len(),
                to_lower_hex(&address),
                identity.name.as_deref().unwrap_or("no ENS name"),
            );
        }

        Commands::FirstTx { address } => {
            let address = to_lower_hex(&parse_address(&address)?);
            let client = EtherscanClient::new(&settings.etherscan)?;

            match client.get_first_activity_date(&address).await {
                Ok(activity) => println!("{}", serde_json::to_string_pretty(&activity)?),
                Err(e) => {
                    error!("Failed to fetch first transaction: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
