//! Solana JSON-RPC provider
//!
//! Thin typed client over the standard Solana RPC methods we need:
//! - getTokenSupply       - circulating supply + decimals
//! - getTokenLargestAccounts - top 20 holders of a mint
//! - getAccountInfo       - jsonParsed mint account (authorities, extensions)
//! - getSignaturesForAddress - recent activity
//!
//! Retries transient failures (429, timeouts, connect errors) with
//! exponential backoff + jitter.

use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{RPC_BASE_RETRY_MS, RPC_MAX_RETRIES, USER_AGENT};

/// Token supply for a mint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSupply {
    pub amount: String,
    pub decimals: u8,
    pub ui_amount: Option<f64>,
}

impl TokenSupply {
    /// UI supply with decimals applied
    pub fn ui_supply(&self) -> f64 {
        self.ui_amount
            .unwrap_or_else(|| self.amount.parse::<f64>().unwrap_or(0.0) / 10f64.powi(self.decimals as i32))
    }
}

/// One entry of getTokenLargestAccounts
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargestAccount {
    /// Token account address (not the wallet)
    pub address: String,
    pub amount: String,
    pub decimals: u8,
    pub ui_amount: Option<f64>,
}

impl LargestAccount {
    pub fn ui_balance(&self) -> f64 {
        self.ui_amount
            .unwrap_or_else(|| self.amount.parse::<f64>().unwrap_or(0.0) / 10f64.powi(self.decimals as i32))
    }
}

/// Signature entry of getSignaturesForAddress
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    pub err: Option<Value>,
    pub block_time: Option<i64>,
}

/// jsonParsed mint account: authorities + token-2022 extensions
#[derive(Debug, Clone, Default)]
pub struct MintAccount {
    pub owner_program: String,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub decimals: u8,
    pub supply: String,
    /// Extension type names present on a token-2022 mint
    pub extensions: Vec<String>,
}

impl MintAccount {
    /// Parse from the `value` object of a jsonParsed getAccountInfo response
    pub fn from_account_value(value: &Value) -> Option<Self> {
        let owner_program = value.get("owner")?.as_str()?.to_string();
        let info = value
            .get("data")?
            .get("parsed")?
            .get("info")?;

        let extensions = info
            .get("extensions")
            .and_then(|e| e.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|ext| ext.get("extension").and_then(|t| t.as_str()))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            owner_program,
            mint_authority: info
                .get("mintAuthority")
                .and_then(|a| a.as_str())
                .map(String::from),
            freeze_authority: info
                .get("freezeAuthority")
                .and_then(|a| a.as_str())
                .map(String::from),
            decimals: info.get("decimals").and_then(|d| d.as_u64()).unwrap_or(0) as u8,
            supply: info
                .get("supply")
                .and_then(|s| s.as_str())
                .unwrap_or("0")
                .to_string(),
            extensions,
        })
    }
}

/// Solana RPC Client
pub struct SolanaClient {
    rpc_url: String,
    client: reqwest::Client,
}

impl SolanaClient {
    /// Create a new client against the given RPC endpoint
    pub fn new(rpc_url: impl Into<String>, timeout: std::time::Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::rpc_connection_failed(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            rpc_url: rpc_url.into(),
            client,
        })
    }

    /// Execute a JSON-RPC call with retry on transient errors
    async fn call(&self, method: &str, params: Value) -> AppResult<Value> {
        let mut attempt: u32 = 0;
        loop {
            match self.call_once(method, &params).await {
                Ok(result) => return Ok(result),
                Err(e) if e.code.is_retryable() && attempt < RPC_MAX_RETRIES => {
                    // Exponential backoff with jitter to avoid thundering herd
                    let base = RPC_BASE_RETRY_MS * 2u64.pow(attempt);
                    let jitter = rand::thread_rng().gen_range(0..base / 2 + 1);
                    let delay = std::time::Duration::from_millis(base + jitter);
                    warn!(
                        "⏳ RPC {} failed ({}), retry {}/{} in {:?}",
                        method,
                        e.code_str(),
                        attempt + 1,
                        RPC_MAX_RETRIES,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn call_once(&self, method: &str, params: &Value) -> AppResult<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self.client.post(&self.rpc_url).json(&payload).send().await?;

        if response.status().as_u16() == 429 {
            return Err(AppError::rpc_rate_limited());
        }

        let body: Value = response.json().await?;

        if let Some(error) = body.get("error") {
            return Err(AppError::rpc_error(format!("{} failed: {}", method, error)));
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| AppError::rpc_invalid_response(format!("{}: no result field", method)))
    }

    /// Get token supply for a mint
    pub async fn get_token_supply(&self, mint: &str) -> AppResult<TokenSupply> {
        let result = self.call("getTokenSupply", json!([mint])).await?;
        let value = result
            .get("value")
            .cloned()
            .ok_or_else(|| AppError::rpc_invalid_response("getTokenSupply: no value"))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Get the 20 largest token accounts of a mint
    pub async fn get_token_largest_accounts(&self, mint: &str) -> AppResult<Vec<LargestAccount>> {
        let result = self
            .call("getTokenLargestAccounts", json!([mint]))
            .await?;
        let value = result
            .get("value")
            .cloned()
            .ok_or_else(|| AppError::rpc_invalid_response("getTokenLargestAccounts: no value"))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Get jsonParsed mint account. Returns None for unknown accounts.
    pub async fn get_mint_account(&self, mint: &str) -> AppResult<Option<MintAccount>> {
        let params = json!([mint, {"encoding": "jsonParsed"}]);
        let result = self.call("getAccountInfo", params).await?;

        let value = match result.get("value") {
            Some(v) if !v.is_null() => v,
            _ => return Ok(None),
        };

        debug!("📦 Mint account fetched for {}", mint);
        Ok(MintAccount::from_account_value(value))
    }

    /// Resolve the mint created/touched by a transaction.
    /// Used to turn a launch signature from logsSubscribe into a mint address.
    pub async fn get_transaction_mint(&self, signature: &str) -> AppResult<Option<String>> {
        let params = json!([
            signature,
            {"encoding": "jsonParsed", "maxSupportedTransactionVersion": 0}
        ]);
        let result = self.call("getTransaction", params).await?;

        if result.is_null() {
            return Ok(None);
        }

        let mint = result
            .get("meta")
            .and_then(|m| m.get("postTokenBalances"))
            .and_then(|b| b.as_array())
            .and_then(|arr| arr.first())
            .and_then(|entry| entry.get("mint"))
            .and_then(|m| m.as_str())
            .map(String::from);

        Ok(mint)
    }

    /// Get recent transaction signatures for an address
    pub async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> AppResult<Vec<SignatureInfo>> {
        let params = json!([address, {"limit": limit}]);
        let result = self.call("getSignaturesForAddress", params).await?;
        Ok(serde_json::from_value(result)?)
    }
}
