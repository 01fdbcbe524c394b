use anyhow::Result;
use axum::Router;
use clap::Parser;
use engine::RankConfig;
use server::build_app;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Directory holding recipes.csv, vectorizer.bin, matrix.bin and meta.json
    #[arg(long, default_value = "./artifacts")]
    artifacts: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Minimum similarity a recipe must exceed to be returned
    #[arg(long, default_value_t = engine::DEFAULT_SIMILARITY_THRESHOLD)]
    threshold: f32,
    /// Maximum number of recommendations per query
    #[arg(long, default_value_t = engine::DEFAULT_TOP_K)]
    top_k: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = RankConfig { threshold: args.threshold, top_k: args.top_k };
    let app: Router = build_app(&args.artifacts, config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, threshold = config.threshold, top_k = config.top_k, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
