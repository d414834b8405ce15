//! Core domain types for token risk analysis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Risk level bands for an overall 0-100 score
/// - 0-39: Low
/// - 40-59: Medium
/// - 60-79: High
/// - 80-100: Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Map an overall score (0-100) to its band
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::Critical,
            60..=79 => Self::High,
            40..=59 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown risk level: {}", other)),
        }
    }
}

/// Categories of alerts raised by the monitoring loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    HolderConcentration,
    LiquidityRemoval,
    WashTrading,
    Honeypot,
    BundlerActivity,
    PriceManipulation,
    SuspiciousActivity,
    HighRisk,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HolderConcentration => "holder_concentration",
            Self::LiquidityRemoval => "liquidity_removal",
            Self::WashTrading => "wash_trading",
            Self::Honeypot => "honeypot",
            Self::BundlerActivity => "bundler_activity",
            Self::PriceManipulation => "price_manipulation",
            Self::SuspiciousActivity => "suspicious_activity",
            Self::HighRisk => "high_risk",
        }
    }
}

/// Individual risk factor contributing to the overall score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub description: String,
    /// Factor score (0-100)
    pub score: u8,
    /// Weight in the overall score
    pub weight: f32,
    /// What we saw that justifies the score
    pub evidence: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Token holder entry (sorted by balance descending)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolderInfo {
    pub address: String,
    /// UI balance (supply decimals applied)
    pub balance: f64,
    /// Share of circulating supply (0-100)
    pub percentage: f64,
    /// Bonding curve / AMM pool accounts, not real wallets
    pub is_contract: bool,
}

/// Liquidity security snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityInfo {
    pub total_liquidity_sol: f64,
    pub locked_liquidity_sol: f64,
    /// 0-100
    pub locked_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_expiry: Option<DateTime<Utc>>,
    pub lp_token_holders: Vec<String>,
}

impl LiquidityInfo {
    /// Placeholder for tokens we could not find liquidity data for
    pub fn empty() -> Self {
        Self {
            total_liquidity_sol: 0.0,
            locked_liquidity_sol: 0.0,
            locked_percentage: 0.0,
            lock_expiry: None,
            lp_token_holders: Vec::new(),
        }
    }
}

/// Trading volume authenticity snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub total_volume_24h_sol: f64,
    pub trade_count_24h: usize,
    pub unique_traders: usize,
    /// 0.0 (organic) - 1.0 (pure wash)
    pub wash_trading_score: f64,
    /// 1.0 - wash_trading_score
    pub volume_authenticity: f64,
    /// Share of 24h volume moved by the top 5 traders (0-100)
    pub top_traders_percentage: f64,
}

/// Social credibility snapshot, derived from token metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialInfo {
    pub twitter_exists: bool,
    pub telegram_exists: bool,
    pub website_exists: bool,
    /// Recent tweet count mentioning the token (requires TWITTER_API_KEY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_mentions: Option<u64>,
}

/// Lightweight stored risk assessment (output of quick checks)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRisk {
    pub token_address: String,
    pub risk_level: RiskLevel,
    /// 0-100
    pub risk_score: u8,
    /// 0-100
    pub confidence: u8,
    pub factors: Vec<RiskFactor>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Complete token analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAnalysis {
    pub token_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_symbol: Option<String>,
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub confidence: u8,
    pub recommendation: String,

    // Detailed analysis
    pub holders: Vec<HolderInfo>,
    pub liquidity: LiquidityInfo,
    pub volume: VolumeInfo,
    pub social: SocialInfo,
    pub risk_factors: Vec<RiskFactor>,

    pub analysis_timestamp: DateTime<Utc>,
}

/// Alert raised for a monitored token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub token_address: String,
    pub alert_type: AlertType,
    pub risk_level: RiskLevel,
    pub title: String,
    pub description: String,
    /// 1 (info) - 5 (critical)
    pub severity: u8,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Alert subscription created via the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSubscription {
    pub id: Uuid,
    pub email: String,
    /// Minimum alert level the subscriber cares about
    pub risk_threshold: RiskLevel,
    /// None = all tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_addresses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_types: Option<Vec<AlertType>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl AlertSubscription {
    /// Does this subscription want the given alert?
    pub fn matches(&self, alert: &Alert) -> bool {
        if !self.is_active || alert.risk_level < self.risk_threshold {
            return false;
        }
        if let Some(ref tokens) = self.token_addresses {
            if !tokens.iter().any(|t| t == &alert.token_address) {
                return false;
            }
        }
        if let Some(ref types) = self.alert_types {
            if !types.contains(&alert.alert_type) {
                return false;
            }
        }
        true
    }
}

/// Classified trade of a token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInfo {
    pub signature: String,
    pub timestamp: DateTime<Utc>,
    /// "buy" | "sell", or "unknown" for unclassified RPC signatures
    pub kind: String,
    pub amount_sol: f64,
    pub trader: String,
    pub success: bool,
}

/// Aggregate counters for GET /api/stats
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_tokens_analyzed: usize,
    pub critical_risk_tokens: usize,
    pub high_risk_tokens: usize,
    pub medium_risk_tokens: usize,
    pub low_risk_tokens: usize,
    pub watched_tokens: usize,
    pub total_alerts: usize,
    pub unresolved_alerts: usize,
    pub active_subscriptions: usize,
    pub average_risk_score: f64,
}
