use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use flycam::logging;
use flycam::server::{StaticServer, DEFAULT_PORT};

/// Serve the web build of the demo as static files.
#[derive(Parser, Debug)]
#[command(name = "flycam-serve")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory to serve (should contain index.html and the wasm package)
    #[arg(short, long, default_value = "web")]
    root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let server = StaticServer::bind(&format!("0.0.0.0:{}", args.port), args.root).await?;
    server.run().await
}
