//! Configuration module for Pumpwatch
//!
//! All runtime configuration comes from environment variables.
//! Secrets (API keys, bot tokens) are NEVER logged.

use std::time::Duration;
use tracing::info;

use crate::utils::constants::{
    DEFAULT_HOLDER_CONCENTRATION_THRESHOLD, DEFAULT_PUMPFUN_API_URL,
    DEFAULT_RISK_UPDATE_INTERVAL_SECS, DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_SOLANA_RPC_URL,
    DEFAULT_SOLANA_WS_URL, DEFAULT_WASH_TRADING_THRESHOLD,
};

/// Application settings, resolved once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    // Server
    pub host: String,
    pub port: u16,

    // Solana
    pub solana_rpc_url: String,
    pub solana_ws_url: String,
    pub rpc_timeout: Duration,

    // pump.fun
    pub pumpfun_api_url: String,
    pub pumpfun_api_key: Option<String>,

    // Alert channels
    pub discord_webhook_url: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    // Social
    pub twitter_api_key: Option<String>,

    // Risk analysis
    pub risk_update_interval: Duration,
    /// Top-5 holder share (0.0-1.0) that raises a holder concentration alert
    pub holder_concentration_threshold: f64,
    /// Wash trading score (0.0-1.0) that raises a wash trading alert
    pub wash_trading_threshold: f64,
    /// Auto-add tokens discovered on the launch stream to the watchlist
    pub auto_watch_new_tokens: bool,
}

impl Settings {
    /// Load settings from environment, falling back to defaults
    pub fn from_env() -> Self {
        let settings = Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 8000),

            solana_rpc_url: env_or("SOLANA_RPC_URL", DEFAULT_SOLANA_RPC_URL),
            solana_ws_url: env_or("SOLANA_WS_URL", DEFAULT_SOLANA_WS_URL),
            rpc_timeout: Duration::from_secs(env_parse(
                "SOLANA_RPC_TIMEOUT_SECS",
                DEFAULT_RPC_TIMEOUT_SECS,
            )),

            pumpfun_api_url: env_or("PUMPFUN_API_URL", DEFAULT_PUMPFUN_API_URL),
            pumpfun_api_key: secret_env("PUMPFUN_API_KEY"),

            discord_webhook_url: secret_env("DISCORD_WEBHOOK_URL"),
            telegram_bot_token: secret_env("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: std::env::var("TELEGRAM_CHAT_ID").ok().filter(|v| !v.is_empty()),

            twitter_api_key: secret_env("TWITTER_API_KEY"),

            risk_update_interval: Duration::from_secs(env_parse(
                "RISK_UPDATE_INTERVAL",
                DEFAULT_RISK_UPDATE_INTERVAL_SECS,
            )),
            holder_concentration_threshold: env_parse(
                "HOLDER_CONCENTRATION_THRESHOLD",
                DEFAULT_HOLDER_CONCENTRATION_THRESHOLD,
            ),
            wash_trading_threshold: env_parse(
                "WASH_TRADING_THRESHOLD",
                DEFAULT_WASH_TRADING_THRESHOLD,
            ),
            auto_watch_new_tokens: env_parse("AUTO_WATCH_NEW_TOKENS", false),
        };

        info!("🔧 Solana RPC: {}", settings.solana_rpc_url);
        info!("🔧 pump.fun API: {}", settings.pumpfun_api_url);
        info!(
            "🔧 Monitoring interval: {}s",
            settings.risk_update_interval.as_secs()
        );
        if settings.discord_webhook_url.is_some() {
            info!("🔑 DISCORD_WEBHOOK_URL configured (value hidden)");
        }
        if settings.telegram_bot_token.is_some() {
            info!("🔑 TELEGRAM_BOT_TOKEN configured (value hidden)");
        }
        if settings.twitter_api_key.is_some() {
            info!("🔑 TWITTER_API_KEY configured (value hidden)");
        }

        settings
    }

    /// Socket address string for the API server
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Telegram delivery needs both the bot token and a chat id
    pub fn telegram_configured(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read a secret env var. Empty and placeholder values count as unset.
fn secret_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty() && v != "YOUR_API_KEY" && v != "changeme")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_fallback() {
        // Unset variable falls back to the default
        assert_eq!(env_parse("PUMPWATCH_DOES_NOT_EXIST", 42u64), 42);
        assert!(!env_parse("PUMPWATCH_DOES_NOT_EXIST", false));
    }

    #[test]
    fn test_secret_env_filters_placeholders() {
        std::env::set_var("PUMPWATCH_TEST_SECRET", "YOUR_API_KEY");
        assert!(secret_env("PUMPWATCH_TEST_SECRET").is_none());
        std::env::set_var("PUMPWATCH_TEST_SECRET", "sk_live_123");
        assert_eq!(
            secret_env("PUMPWATCH_TEST_SECRET").as_deref(),
            Some("sk_live_123")
        );
        std::env::remove_var("PUMPWATCH_TEST_SECRET");
    }
}
