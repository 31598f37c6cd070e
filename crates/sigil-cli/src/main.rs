//! `sigil-exchange` — the operator-facing CLI over the exchange
//! coordinator, the threshold-signing crates, and the escrow box
//! (§6 "(NEW) CLI surface").

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sigil_cli::commands::{Cli, Commands};
use sigil_cli::config::ExchangeConfig;
use sigil_escrow::{router, EscrowState};
use sigil_store::EncryptedStore;
use sigil_transport::TcpTransport;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ExchangeConfig::load(&cli.config).unwrap_or_else(|_| ExchangeConfig::default());

    match cli.command {
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }

        Commands::KeygenEcdsa { name, listen, connect } => {
            let mut transport = connect_transport(listen, connect).await?;
            tracing::info!(%name, "running CMP keygen");
            let ecdsa_config = sigil_cmp::keygen(&mut transport).await?;
            let presig = sigil_cmp::presign(&ecdsa_config, &mut transport).await?;

            let mut store = EncryptedStore::open(&config.store_path, &cli.passphrase)?;
            store.put(&format!("{name}/conf-ecdsa"), &bincode::serialize(&ecdsa_config)?)?;
            store.put(&format!("{name}/presig-ecdsa"), &bincode::serialize(&presig)?)?;

            println!("✓ ECDSA keygen complete");
            println!("  Public key: {}", hex::encode(ecdsa_config.public_key));
            println!("  Stored under: {name}/conf-ecdsa, {name}/presig-ecdsa");
        }

        Commands::KeygenFrost {
            name,
            self_id,
            peer_id,
            listen,
            connect,
        } => {
            let mut transport = connect_transport(listen, connect).await?;
            tracing::info!(%name, self_id, peer_id, "running FROST taproot keygen");
            let frost_config = sigil_frost::keygen_taproot(self_id, peer_id, &mut transport).await?;

            let mut store = EncryptedStore::open(&config.store_path, &cli.passphrase)?;
            store.put(&format!("{name}/conf-frost"), &bincode::serialize(&frost_config)?)?;

            println!("✓ FROST taproot keygen complete");
            println!("  x-only public key: {}", hex::encode(frost_config.pub_key));
            println!("  Stored under: {name}/conf-frost");
        }

        Commands::Exchange {
            token_type,
            address,
            value,
            withdrawal_digest,
            self_id,
            peer_id,
            listen,
            connect,
        } => {
            let digest_bytes = hex::decode(&withdrawal_digest).context("withdrawal digest must be hex")?;
            let digest: [u8; 32] = digest_bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("withdrawal digest must be 32 bytes"))?;

            let mut transport = connect_transport(listen, connect).await?;
            let params = sigil_coordinator::ExchangeParams {
                frost_self_id: self_id,
                frost_peer_id: peer_id,
                own_token_type: token_type.into(),
                own_id_part: config.party_id_part.clone(),
                own_address: address,
                own_value: value,
                own_withdrawal_digest: digest,
                escrow_base_url: config.escrow_base_url.clone(),
            };

            let oracle = sigil_coordinator::NullOracle;
            match sigil_coordinator::run_exchange(params, &mut transport, &oracle).await {
                Ok(outcome) => {
                    println!("✓ Exchange complete");
                    println!("  Exchange ID: {}", outcome.exchange_id);
                    println!(
                        "  Released signature: {}",
                        hex::encode(&outcome.own_released_signature)
                    );
                }
                Err(failure) => {
                    bail!("exchange failed at stage {}: {}", failure.stage, failure.source);
                }
            }
        }

        Commands::Escrow { host, port } => {
            let addr: std::net::SocketAddr = format!("{host}:{port}").parse()?;
            tracing::info!(%addr, "starting escrow box");
            let app = router(EscrowState::new());
            axum::Server::bind(&addr).serve(app.into_make_service()).await?;
        }
    }

    Ok(())
}

/// Either listen for a single inbound counterparty connection or dial
/// one out, per `--listen`/`--connect` (exactly one must be given).
async fn connect_transport(listen: Option<String>, connect: Option<String>) -> Result<TcpTransport> {
    match (listen, connect) {
        (Some(addr), None) => {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "waiting for counterparty connection");
            let (stream, peer) = listener.accept().await?;
            tracing::info!(%peer, "counterparty connected");
            Ok(TcpTransport::new(stream))
        }
        (None, Some(addr)) => {
            tracing::info!(%addr, "dialing counterparty");
            TcpTransport::connect(&addr).await.map_err(Into::into)
        }
        _ => bail!("exactly one of --listen or --connect must be given"),
    }
}
