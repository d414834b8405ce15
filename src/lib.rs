//! Pumpwatch Library
//!
//! Real-time risk analysis for pump.fun token launches:
//! - Holder concentration (top-5 share, gini coefficient)
//! - Liquidity security on the bonding curve and post-graduation pools
//! - Honeypot heuristics via mint/freeze authority and token-2022 extensions
//! - Wash trading and coordinated buying detection
//! - Alerting with Discord/Telegram delivery and email subscriptions

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use core::alerts::AlertService;
pub use core::analyzer::RiskAnalyzer;
pub use core::honeypot::MintSecurityReport;
pub use core::risk_score::{RiskScore, RiskScoreBuilder};
pub use models::config::Settings;
pub use models::errors::{AppError, AppResult, ErrorCode};
pub use models::types::{
    Alert, AlertSubscription, AlertType, RiskFactor, RiskLevel, TokenAnalysis, TokenRisk,
};
pub use providers::{LaunchStream, PumpFunClient, SolanaClient, StreamEvent, TwitterClient};
pub use utils::cache::{AnalysisCache, CacheStats};
pub use utils::store::TokenStore;
pub use utils::telemetry::{TelemetryCollector, TelemetryEvent, TelemetryStats, ThreatType};
