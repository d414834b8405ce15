//! pump.fun Frontend API Client
//!
//! ⚠️ IMPORTANT: pump.fun data is used for METADATA and TRADE HISTORY only!
//!
//! ✅ USED FOR:
//! - Token metadata (name, symbol, socials, creator)
//! - Bonding curve state (graduated or not, reserves)
//! - Recent trade history (wash trading + volatility analysis)
//!
//! ❌ NOT USED FOR:
//! - Mint security analysis (authorities come from on-chain getAccountInfo)
//! - Holder distribution (comes from getTokenLargestAccounts)
//!
//! API: https://frontend-api.pump.fun/coins/{mint}
//! Free; an optional API key raises rate limits.

use serde::Deserialize;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::USER_AGENT;

/// Coin metadata from /coins/{mint}
#[derive(Debug, Clone, Deserialize)]
pub struct CoinInfo {
    pub mint: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    /// Token creator wallet
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Bonding curve account address
    #[serde(default)]
    pub bonding_curve: Option<String>,
    /// true once the curve graduated to Raydium
    #[serde(default)]
    pub complete: bool,
    /// Raydium pool address after graduation
    #[serde(default)]
    pub raydium_pool: Option<String>,
    #[serde(default)]
    pub virtual_sol_reserves: u64,
    #[serde(default)]
    pub virtual_token_reserves: u64,
    #[serde(default)]
    pub total_supply: u64,
    #[serde(default)]
    pub usd_market_cap: f64,
    /// Creation timestamp (unix millis)
    #[serde(default)]
    pub created_timestamp: i64,
}

/// A single trade from /trades/all/{mint}
#[derive(Debug, Clone, Deserialize)]
pub struct Trade {
    pub signature: String,
    #[serde(default)]
    pub sol_amount: u64,
    #[serde(default)]
    pub token_amount: u64,
    pub is_buy: bool,
    /// Trader wallet
    pub user: String,
    /// Unix seconds
    pub timestamp: i64,
}

impl Trade {
    /// Execution price in SOL per token, None for zero-token fills
    pub fn price_sol(&self) -> Option<f64> {
        if self.token_amount == 0 {
            return None;
        }
        Some(self.sol_amount as f64 / self.token_amount as f64)
    }
}

/// pump.fun frontend API client
pub struct PumpFunClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PumpFunClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .gzip(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::pumpfun_error(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.get(url);
        if let Some(key) = &self.api_key {
            req = req.header("X-API-Key", key);
        }
        req
    }

    /// Fetch coin metadata. Returns None for mints pump.fun has never seen.
    pub async fn get_coin(&self, mint: &str) -> AppResult<Option<CoinInfo>> {
        let url = format!("{}/coins/{}", self.base_url, mint);

        info!("🔍 pump.fun: Fetching coin info for {}", mint);

        let response = self.get(&url).send().await?;
        let status = response.status();

        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::pumpfun_error(format!(
                "coin lookup failed: HTTP {}",
                status
            )));
        }

        let coin: CoinInfo = response
            .json()
            .await
            .map_err(|e| AppError::pumpfun_error(format!("coin response parse failed: {}", e)))?;

        Ok(Some(coin))
    }

    /// Fetch recent trades, newest first
    pub async fn get_trades(&self, mint: &str, limit: usize) -> AppResult<Vec<Trade>> {
        let url = format!(
            "{}/trades/all/{}?limit={}&offset=0",
            self.base_url, mint, limit
        );

        let response = self.get(&url).send().await?;
        let status = response.status();

        if status.as_u16() == 404 {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(AppError::pumpfun_error(format!(
                "trade history failed: HTTP {}",
                status
            )));
        }

        let trades: Vec<Trade> = response
            .json()
            .await
            .map_err(|e| AppError::pumpfun_error(format!("trade response parse failed: {}", e)))?;

        info!("📊 pump.fun: {} trades for {}", trades.len(), mint);

        Ok(trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_price() {
        let trade = Trade {
            signature: "sig".to_string(),
            sol_amount: 1_000_000_000,
            token_amount: 2_000_000,
            is_buy: true,
            user: "wallet".to_string(),
            timestamp: 0,
        };
        assert_eq!(trade.price_sol(), Some(500.0));

        let zero = Trade {
            token_amount: 0,
            ..trade
        };
        assert!(zero.price_sol().is_none());
    }

    #[test]
    fn test_coin_info_defaults() {
        let json = r#"{"mint": "So11111111111111111111111111111111111111112"}"#;
        let coin: CoinInfo = serde_json::from_str(json).expect("should parse");
        assert!(!coin.complete);
        assert!(coin.raydium_pool.is_none());
        assert_eq!(coin.usd_market_cap, 0.0);
    }
}
