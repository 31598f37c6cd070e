//! CLI command definitions (§6 "(NEW) CLI surface"), matching the
//! teacher's `Commands` enum / `#[command(subcommand)]` dispatch shape.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sigil-exchange")]
#[command(about = "Two-party fair-exchange core: threshold keygen, cosigning, and escrow release")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to this party's TOML config file.
    #[arg(long, global = true, default_value = "sigil-exchange.toml")]
    pub config: PathBuf,

    /// Passphrase protecting this party's encrypted store.
    #[arg(long, global = true, env = "SIGIL_STORE_PASSPHRASE")]
    pub passphrase: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the CMP 2-party ECDSA DKG and presignature precomputation
    /// with a counterparty, storing the resulting config under `name`.
    KeygenEcdsa {
        /// Local name this key configuration is stored under.
        #[arg(long)]
        name: String,

        /// `host:port` to listen on for the counterparty's connection.
        #[arg(long)]
        listen: Option<String>,

        /// `host:port` of the counterparty to connect to instead of
        /// listening.
        #[arg(long)]
        connect: Option<String>,
    },

    /// Run the FROST taproot dealerless DKG with a counterparty.
    KeygenFrost {
        #[arg(long)]
        name: String,

        /// This party's FROST identifier (1 or 2).
        #[arg(long)]
        self_id: u16,

        /// The counterparty's FROST identifier (1 or 2).
        #[arg(long)]
        peer_id: u16,

        #[arg(long)]
        listen: Option<String>,

        #[arg(long)]
        connect: Option<String>,
    },

    /// Run a full exchange against a counterparty, through keygen,
    /// funding wait, cosigning, and escrow release.
    Exchange {
        /// Which side of the exchange this party is on.
        #[arg(long, value_enum)]
        token_type: TokenTypeArg,

        /// The jointly-controlled address this party funds.
        #[arg(long)]
        address: String,

        /// Value, in the chain's smallest unit, this party deposits.
        #[arg(long)]
        value: i64,

        /// Digest (hex) of this party's own withdrawal transaction —
        /// the one spending from the address it funded, to the
        /// counterparty.
        #[arg(long)]
        withdrawal_digest: String,

        #[arg(long)]
        self_id: u16,

        #[arg(long)]
        peer_id: u16,

        #[arg(long)]
        listen: Option<String>,

        #[arg(long)]
        connect: Option<String>,
    },

    /// Run the escrow box's HTTP server.
    Escrow {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 8080)]
        port: u16,
    },

    /// Print the resolved configuration this party would run with.
    Config,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TokenTypeArg {
    Btc,
    Eth,
}

impl From<TokenTypeArg> for sigil_coordinator::TokenType {
    fn from(t: TokenTypeArg) -> Self {
        match t {
            TokenTypeArg::Btc => sigil_coordinator::TokenType::Btc,
            TokenTypeArg::Eth => sigil_coordinator::TokenType::Eth,
        }
    }
}
