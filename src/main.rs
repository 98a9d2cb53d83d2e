use anyhow::Context;
use clap::Parser;
use pyroingest::{DecoderConfig, GraphStackMode, ProfileDecoder};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

mod server;

const DEFAULT_MAX_BODY_BYTES: usize = 20_000_000;

#[derive(Parser, Debug)]
#[command(about = "Pyroscope compatible profile ingestion endpoint")]
struct Args {
    #[arg(long, env = "PYROINGEST_LISTEN", default_value = "[::1]:4040")]
    listen: SocketAddr,

    #[arg(long, env = "PYROINGEST_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    /// YAML file with decoder settings. The flags below override it.
    #[arg(long, env = "PYROINGEST_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "PYROINGEST_MAX_DECOMPRESSED_BYTES")]
    max_decompressed_bytes: Option<usize>,

    #[arg(long, value_enum)]
    graph_stack: Option<GraphStackMode>,

    /// Extra `key=value` label added to every record. Repeatable.
    #[arg(long = "tag", value_parser = parse_tag)]
    tags: Vec<(String, String)>,
}

fn parse_tag(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.trim().to_string())),
        _ => Err(format!("tag {:?} must look like key=value", raw)),
    }
}

fn decoder_config(args: &Args) -> anyhow::Result<DecoderConfig> {
    let mut config = match &args.config {
        Some(path) => DecoderConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => DecoderConfig::default(),
    };

    if let Some(max) = args.max_decompressed_bytes {
        config.max_decompressed_bytes = max;
    }
    if let Some(mode) = args.graph_stack {
        config.graph_stack = mode;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    colog::init();

    let args = Args::parse();
    log::info!("Starting Server");

    let config = decoder_config(&args)?;
    log::info!("Decoder config: {:?}", config);

    let service = Arc::new(server::IngestService::new(
        ProfileDecoder::new(config),
        args.tags.into_iter().collect(),
        args.max_body_bytes,
    ));

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    log::info!("Starting server at {}", listener.local_addr()?);
    axum::serve(listener, service.router()).await?;

    Ok(())
}
