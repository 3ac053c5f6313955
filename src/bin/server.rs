//! Headless maze host: serves sessions over TCP.
//!
//! Configuration comes from `MAZEWALK_*` environment variables; flags given
//! on the command line take precedence.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use mazewalk::adapter::{
    check_tcp_listen_available, run_host, Adapter, FrameFormat, Host, HostConfig, ServerConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve maze sessions over line-delimited JSON", long_about = None)]
struct Args {
    /// Listen address
    #[arg(long)]
    host: Option<String>,

    /// Listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Side of rendered frames in pixels
    #[arg(long)]
    frame_size: Option<u32>,

    /// Default image format (png or jpeg)
    #[arg(long, value_parser = parse_format)]
    format: Option<FrameFormat>,

    /// Maximum number of live sessions
    #[arg(long)]
    max_sessions: Option<usize>,

    /// JSON colour scheme file
    #[arg(long)]
    colors: Option<PathBuf>,
}

fn parse_format(s: &str) -> Result<FrameFormat, String> {
    FrameFormat::from_str(s).ok_or_else(|| format!("unknown image format {:?}", s))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut server = ServerConfig::from_env();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    let mut config = HostConfig::from_env();
    if let Some(frame_size) = args.frame_size {
        config.frame_size = frame_size;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(max_sessions) = args.max_sessions {
        config.max_sessions = max_sessions;
    }
    if args.colors.is_some() {
        config.colors = args.colors;
    }
    let config = config.clamped();

    check_tcp_listen_available(&server.host, server.port)
        .with_context(|| format!("cannot listen on {}:{}", server.host, server.port))?;

    let mut host = Host::from_config(&config)?;
    server.capabilities = host.capabilities();
    log::info!(
        "rendering {}px {} frames, up to {} sessions",
        config.frame_size,
        config.format.as_str(),
        config.max_sessions
    );

    let mut adapter = Adapter::start(server)?;
    run_host(&mut adapter, &mut host);
    Ok(())
}
