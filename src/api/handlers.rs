//! API Request Handlers

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use super::middleware::RATE_LIMITER;
use super::types::*;
use crate::core::alerts::AlertService;
use crate::core::analyzer::RiskAnalyzer;
use crate::models::types::RiskLevel;
use crate::utils::cache::AnalysisCache;
use crate::utils::constants::{is_valid_mint, APP_VERSION};
use crate::utils::store::TokenStore;
use crate::utils::telemetry::{TelemetryCollector, TelemetryEvent, ThreatType};

/// Shared application state
pub struct AppState {
    pub analyzer: Arc<RiskAnalyzer>,
    pub alerts: Arc<AlertService>,
    pub store: Arc<TokenStore>,
    pub cache: AnalysisCache,
    pub telemetry: Arc<TelemetryCollector>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        analyzer: Arc<RiskAnalyzer>,
        alerts: Arc<AlertService>,
        store: Arc<TokenStore>,
        cache: AnalysisCache,
        telemetry: Arc<TelemetryCollector>,
    ) -> Self {
        // Background task: cleanup expired cache entries and stale rate
        // limit windows every 60 seconds
        let cache_clone = cache.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                let removed = cache_clone.cleanup_expired();
                if removed > 0 {
                    tracing::info!("🧹 Cache cleanup: {} expired entries removed", removed);
                }
                RATE_LIMITER.evict_stale();
            }
        });

        Self {
            analyzer,
            alerts,
            store,
            cache,
            telemetry,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

type HandlerError = (StatusCode, Json<ApiResponse<()>>);

fn reject(status: StatusCode, error: ApiError, start: Instant) -> HandlerError {
    (
        status,
        Json(ApiResponse::error(
            error,
            start.elapsed().as_secs_f64() * 1000.0,
        )),
    )
}

fn reject_app_error(err: &crate::models::errors::AppError, start: Instant) -> HandlerError {
    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    reject(status, ApiError::from(err), start)
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}

// ============================================
// Token Analysis
// ============================================

pub async fn analyze_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalysisData>>, HandlerError> {
    let start = Instant::now();

    if !is_valid_mint(&req.token_address) {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            ApiError::bad_request("Invalid mint address format"),
            start,
        ));
    }

    match state.analyzer.analyze_token(&req.token_address).await {
        Ok(analysis) => {
            if req.watch && state.store.watch(&req.token_address) {
                info!("👀 Now watching {}", req.token_address);
            }

            let is_watched = state.store.is_watched(&req.token_address);
            Ok(Json(ApiResponse::success(
                AnalysisData {
                    analysis,
                    is_watched,
                },
                start.elapsed().as_secs_f64() * 1000.0,
            )))
        }
        Err(e) => {
            error!("❌ Analysis failed for {}: {}", req.token_address, e);
            state.telemetry.record_threat(TelemetryEvent::new(
                ThreatType::AnalysisFailed,
                start.elapsed().as_millis() as u64,
                0,
                format!("{}: {}", req.token_address, e.code_str()),
            ));
            Err(reject_app_error(&e, start))
        }
    }
}

pub async fn get_token_risk(
    State(state): State<Arc<AppState>>,
    Path(token_address): Path<String>,
) -> Result<Json<ApiResponse<RiskData>>, HandlerError> {
    let start = Instant::now();

    if !is_valid_mint(&token_address) {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            ApiError::bad_request("Invalid mint address format"),
            start,
        ));
    }

    let risk = state.store.get_risk(&token_address).ok_or_else(|| {
        reject(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!(
                "No risk assessment for {}. POST /api/token/analyze first.",
                token_address
            )),
            start,
        )
    })?;

    let data = RiskData {
        token_address: risk.token_address.clone(),
        risk_level: risk.risk_level,
        risk_score: risk.risk_score,
        confidence: risk.confidence,
        factors: risk.factors,
        last_updated: risk.last_updated,
        is_watched: state.store.is_watched(&token_address),
    };

    Ok(Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    )))
}

pub async fn get_token_holders(
    State(state): State<Arc<AppState>>,
    Path(token_address): Path<String>,
) -> Result<Json<ApiResponse<HoldersData>>, HandlerError> {
    let start = Instant::now();

    if !is_valid_mint(&token_address) {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            ApiError::bad_request("Invalid mint address format"),
            start,
        ));
    }

    // Stored analysis first, live RPC fetch as fallback
    let holders = match state.store.get_analysis(&token_address) {
        Some(analysis) => analysis.holders,
        None => state
            .analyzer
            .analyze_holders(&token_address, None)
            .await
            .map_err(|e| reject_app_error(&e, start))?,
    };

    let top5_percentage: f64 = holders
        .iter()
        .filter(|h| !h.is_contract)
        .take(5)
        .map(|h| h.percentage)
        .sum();

    let data = HoldersData {
        token_address,
        holder_count: holders.len(),
        top5_percentage,
        holders,
    };

    Ok(Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    )))
}

pub async fn get_token_transactions(
    State(state): State<Arc<AppState>>,
    Path(token_address): Path<String>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<ApiResponse<TransactionsData>>, HandlerError> {
    let start = Instant::now();

    if !is_valid_mint(&token_address) {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            ApiError::bad_request("Invalid mint address format"),
            start,
        ));
    }

    let limit = query.limit.clamp(1, 500);
    let transactions = state
        .analyzer
        .recent_transactions(&token_address, limit + query.offset)
        .await
        .map_err(|e| reject_app_error(&e, start))?;

    let transactions: Vec<_> = transactions
        .into_iter()
        .skip(query.offset)
        .take(limit)
        .collect();

    let data = TransactionsData {
        token_address,
        count: transactions.len(),
        transactions,
    };

    Ok(Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    )))
}

// ============================================
// Alerts
// ============================================

pub async fn get_alerts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<ApiResponse<AlertsData>>, HandlerError> {
    let start = Instant::now();

    let level_filter = match query.risk_level.as_deref() {
        Some(raw) => Some(raw.parse::<RiskLevel>().map_err(|_| {
            reject(
                StatusCode::BAD_REQUEST,
                ApiError::bad_request(format!(
                    "Unknown risk_level '{}'. Expected low|medium|high|critical",
                    raw
                )),
                start,
            )
        })?),
        None => None,
    };

    let limit = query.limit.clamp(1, 200);
    let alerts = state.alerts.list_alerts(level_filter, limit, query.offset);

    let data = AlertsData {
        count: alerts.len(),
        alerts,
    };

    Ok(Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    )))
}

pub async fn subscribe_alerts(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubscribeRequest>,
) -> Result<Json<ApiResponse<SubscriptionData>>, HandlerError> {
    let start = Instant::now();

    // Minimal sanity check, delivery bounces handle the rest
    if !req.email.contains('@') || req.email.len() < 3 {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            ApiError::bad_request("Invalid email address"),
            start,
        ));
    }

    if let Some(ref tokens) = req.token_addresses {
        if let Some(bad) = tokens.iter().find(|t| !is_valid_mint(t)) {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                ApiError::bad_request(format!("Invalid mint address in filter: {}", bad)),
                start,
            ));
        }
    }

    let subscription = state.alerts.subscribe(
        req.email,
        req.risk_threshold,
        req.token_addresses,
        req.alert_types,
    );

    info!("📬 New alert subscription {}", subscription.id);

    Ok(Json(ApiResponse::success(
        SubscriptionData { subscription },
        start.elapsed().as_secs_f64() * 1000.0,
    )))
}

/// Alerts delivered to one subscription since it was created
pub async fn get_subscription_feed(
    State(state): State<Arc<AppState>>,
    Path(subscription_id): Path<String>,
) -> Result<Json<ApiResponse<SubscriptionFeedData>>, HandlerError> {
    let start = Instant::now();

    let id: Uuid = subscription_id.parse().map_err(|_| {
        reject(
            StatusCode::BAD_REQUEST,
            ApiError::bad_request("subscription_id must be a UUID"),
            start,
        )
    })?;

    if state.alerts.get_subscription(id).is_none() {
        return Err(reject(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!("Subscription {} not found", id)),
            start,
        ));
    }

    let alerts = state.alerts.subscription_feed(id);
    let data = SubscriptionFeedData {
        subscription_id: id,
        count: alerts.len(),
        alerts,
    };

    Ok(Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    )))
}

pub async fn delete_alert(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, HandlerError> {
    let start = Instant::now();

    let id: Uuid = alert_id.parse().map_err(|_| {
        reject(
            StatusCode::BAD_REQUEST,
            ApiError::bad_request("alert_id must be a UUID"),
            start,
        )
    })?;

    if !state.alerts.delete_alert(id) {
        return Err(reject(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!("Alert {} not found", id)),
            start,
        ));
    }

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
        start.elapsed().as_secs_f64() * 1000.0,
    )))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let telemetry = state.telemetry.get_stats();
    let cache_stats = state.cache.stats();

    let mut platform = state.store.platform_stats();
    platform.total_alerts = state.alerts.alert_count();
    platform.unresolved_alerts = state.alerts.unresolved_count();
    platform.active_subscriptions = state.alerts.subscription_count();

    info!(
        "📊 Cache Stats: {} entries, {:.1}% hit rate ({} hits / {} misses)",
        cache_stats.entries, cache_stats.hit_rate, cache_stats.hits, cache_stats.misses
    );

    let data = StatsData {
        platform,
        total_analyzed: telemetry.total_analyzed,
        total_threats: telemetry.total_threats,
        honeypots_detected: telemetry.honeypots_detected,
        avg_latency_ms: telemetry.avg_latency_ms,
        cache: cache_stats,
        uptime_seconds: state.uptime_seconds(),
        api_version: APP_VERSION.to_string(),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}
