//! `sigil-escrow`: the semi-trusted escrow box HTTP server (§4.6, §6).

use std::net::SocketAddr;

use clap::Parser;
use tracing::info;

use sigil_escrow::{router, EscrowState};

#[derive(Parser, Debug)]
#[command(name = "sigil-escrow")]
#[command(about = "Semi-trusted escrow box for signature-exchange pairings")]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "8090")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        "sigil_escrow=debug,tower_http=debug"
    } else {
        "sigil_escrow=info"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let state = EscrowState::new();
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("escrow listening on http://{addr}");

    axum::Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
