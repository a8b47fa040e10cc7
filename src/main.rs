use clap::Parser;

#[derive(Parser)]
#[command(name = "storefront-api")]
#[command(about = "Generic REST CRUD service over storefront entities")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides PORT env)")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up PORT, APP_ENV, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = storefront_api::config::config();
    tracing::info!("Starting storefront-api in {:?} mode", config.environment);

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", config.server.bind_address, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, storefront_api::app::app()).await?;

    Ok(())
}
