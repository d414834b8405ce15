//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::models::errors::AppError;
use crate::models::types::{
    Alert, AlertSubscription, AlertType, HolderInfo, PlatformStats, RiskLevel, TokenAnalysis,
    TransactionInfo,
};

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            code: "UNAUTHORIZED".to_string(),
            message: "Invalid API key".to_string(),
            details: None,
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: None,
        }
    }
}

// ============================================
// Token Analysis
// ============================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub token_address: String,
    /// Add the token to the monitoring watchlist after analysis
    #[serde(default)]
    pub watch: bool,
}

#[derive(Debug, Serialize)]
pub struct RiskData {
    pub token_address: String,
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub confidence: u8,
    pub factors: Vec<crate::models::types::RiskFactor>,
    pub last_updated: chrono::DateTime<chrono::Utc>,
    pub is_watched: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalysisData {
    #[serde(flatten)]
    pub analysis: TokenAnalysis,
    pub is_watched: bool,
}

#[derive(Debug, Serialize)]
pub struct HoldersData {
    pub token_address: String,
    pub holders: Vec<HolderInfo>,
    pub top5_percentage: f64,
    pub holder_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    #[serde(default = "default_tx_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_tx_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct TransactionsData {
    pub token_address: String,
    pub transactions: Vec<TransactionInfo>,
    pub count: usize,
}

// ============================================
// Alerts
// ============================================

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    /// Filter by risk level ("low" | "medium" | "high" | "critical")
    pub risk_level: Option<String>,
    #[serde(default = "default_alert_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_alert_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct AlertsData {
    pub alerts: Vec<Alert>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    /// Minimum risk level to be notified about (default: medium)
    #[serde(default = "default_threshold")]
    pub risk_threshold: RiskLevel,
    /// Restrict to specific mints (default: all tokens)
    pub token_addresses: Option<Vec<String>>,
    /// Restrict to specific alert types (default: all types)
    pub alert_types: Option<Vec<AlertType>>,
}

fn default_threshold() -> RiskLevel {
    RiskLevel::Medium
}

#[derive(Debug, Serialize)]
pub struct SubscriptionData {
    pub subscription: AlertSubscription,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionFeedData {
    pub subscription_id: uuid::Uuid,
    pub alerts: Vec<Alert>,
    pub count: usize,
}

// ============================================
// Stats / Health
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    pub platform: PlatformStats,
    pub total_analyzed: u64,
    pub total_threats: u64,
    pub honeypots_detected: u64,
    pub avg_latency_ms: f64,
    pub cache: crate::utils::cache::CacheStats,
    pub uptime_seconds: u64,
    pub api_version: String,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_request_watch_defaults_false() {
        let req: AnalyzeRequest =
            serde_json::from_str(r#"{"token_address": "abc"}"#).expect("should parse");
        assert!(!req.watch);
    }

    #[test]
    fn test_subscribe_request_defaults() {
        let req: SubscribeRequest =
            serde_json::from_str(r#"{"email": "a@b.c"}"#).expect("should parse");
        assert_eq!(req.risk_threshold, RiskLevel::Medium);
        assert!(req.token_addresses.is_none());
        assert!(req.alert_types.is_none());
    }

    #[test]
    fn test_api_response_envelope() {
        let resp = ApiResponse::success(42u32, 1.5);
        let json = serde_json::to_value(&resp).expect("should serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);
        assert!(json.get("error").is_none());

        let err = ApiResponse::error(ApiError::bad_request("nope"), 0.1);
        let json = serde_json::to_value(&err).expect("should serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}
