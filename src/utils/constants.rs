//! Constants Module - Single Source of Truth
//!
//! Semua konstanta dan threshold yang digunakan di seluruh aplikasi
//! didefinisikan di sini. No hardcoded values in other modules!

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "Pumpwatch";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = "Pumpwatch/0.1.0";

// ============================================
// RPC CONSTANTS
// ============================================

/// Default timeout for RPC requests (seconds)
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Default cache TTL (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Base delay for RPC retry backoff (milliseconds)
pub const RPC_BASE_RETRY_MS: u64 = 500;

/// Max RPC retries (exponential: 0.5s -> 1s -> 2s)
pub const RPC_MAX_RETRIES: u32 = 3;

/// Default Solana mainnet RPC endpoint
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Default Solana mainnet WebSocket endpoint
pub const DEFAULT_SOLANA_WS_URL: &str = "wss://api.mainnet-beta.solana.com";

/// Default pump.fun frontend API
pub const DEFAULT_PUMPFUN_API_URL: &str = "https://frontend-api.pump.fun";

// ============================================
// SOLANA PROGRAM IDS
// ============================================

/// Pump.fun bonding curve program
pub const PUMPFUN_PROGRAM: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";

/// Raydium AMM Program ID (graduated pools)
pub const RAYDIUM_AMM_PROGRAM: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";

/// SPL Token Program ID
pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Token-2022 Program ID (extensions: transfer fee, transfer hook, ...)
pub const TOKEN_2022_PROGRAM: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

/// LP incinerator - LP tokens sent here are provably burned
pub const INCINERATOR: &str = "1nc1nerator11111111111111111111111111111111";

// ============================================
// RISK THRESHOLDS (factor weights live in core::risk_score)
// ============================================

/// Default holder concentration threshold (top-5 share) that raises an alert
pub const DEFAULT_HOLDER_CONCENTRATION_THRESHOLD: f64 = 0.8;

/// Default wash trading score that raises an alert
pub const DEFAULT_WASH_TRADING_THRESHOLD: f64 = 0.8;

/// Default monitoring interval in seconds
pub const DEFAULT_RISK_UPDATE_INTERVAL_SECS: u64 = 300;

/// Default API rate limit per caller, per minute
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

// ============================================
// MINT ADDRESS VALIDATION
// ============================================

/// Validity check for a Solana mint address.
/// A 32-byte pubkey encodes to 32-44 base58 characters; length alone is
/// not enough (44 ones decode to 44 zero bytes), so the decoded byte
/// count is checked too.
pub fn is_valid_mint(address: &str) -> bool {
    if !(32..=44).contains(&address.len()) {
        return false;
    }
    matches!(bs58::decode(address).into_vec(), Ok(bytes) if bytes.len() == 32)
}

/// Convert lamports to SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_mint_addresses() {
        assert!(is_valid_mint(PUMPFUN_PROGRAM));
        assert!(is_valid_mint(TOKEN_PROGRAM));
        assert!(is_valid_mint(INCINERATOR));
        // The system program is the all-zero pubkey (32 ones in base58)
        assert!(is_valid_mint("11111111111111111111111111111111"));
    }

    #[test]
    fn test_invalid_mint_addresses() {
        assert!(!is_valid_mint("")); // empty
        assert!(!is_valid_mint("short")); // too short
        assert!(!is_valid_mint("0xdAC17F958D2ee523a2206206994597C13D831ec7")); // EVM hex, contains 0
        assert!(!is_valid_mint("O0Il!invalid?chars_aaaaaaaaaaaaaaaaaaaaa")); // forbidden charset
    }

    #[test]
    fn test_mint_decoded_length_must_be_32_bytes() {
        // Valid charset and length, but decodes to 44 zero bytes
        assert!(!is_valid_mint(&"1".repeat(44)));
        // 43 ones decode to 43 zero bytes
        assert!(!is_valid_mint(&"1".repeat(43)));
    }

    #[test]
    fn test_lamports_to_sol() {
        assert_eq!(lamports_to_sol(1_000_000_000), 1.0);
        assert_eq!(lamports_to_sol(500_000_000), 0.5);
        assert_eq!(lamports_to_sol(0), 0.0);
    }
}
