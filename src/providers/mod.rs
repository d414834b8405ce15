//! External data providers
//!
//! - `solana`: JSON-RPC client (supply, holders, mint account, signatures)
//! - `pumpfun`: frontend API client (metadata, bonding curve, trades)
//! - `stream`: WebSocket launch detection (logsSubscribe)
//! - `twitter`: optional mention counts for social scoring

pub mod pumpfun;
pub mod solana;
pub mod stream;
pub mod twitter;

pub use pumpfun::{CoinInfo, PumpFunClient, Trade};
pub use solana::{LargestAccount, MintAccount, SolanaClient, TokenSupply};
pub use stream::{LaunchEvent, LaunchStream, StreamEvent};
pub use twitter::TwitterClient;
