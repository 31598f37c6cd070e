//! The per-party exchange state machine's stages (§4.5).
//!
//! ```text
//! INIT -> KEYGEN -> FUND_WAIT -> EXCHANGE_WISHES -> COSIGN -> ESCROW_POST -> RELEASE -> DONE
//!                                                      |
//!                                                      v
//!                                                   FAILED (any step; terminal)
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Init,
    Keygen,
    FundWait,
    ExchangeWishes,
    Cosign,
    EscrowPost,
    Release,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Init => "INIT",
            Stage::Keygen => "KEYGEN",
            Stage::FundWait => "FUND_WAIT",
            Stage::ExchangeWishes => "EXCHANGE_WISHES",
            Stage::Cosign => "COSIGN",
            Stage::EscrowPost => "ESCROW_POST",
            Stage::Release => "RELEASE",
            Stage::Done => "DONE",
        };
        f.write_str(s)
    }
}
