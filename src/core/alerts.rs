//! Alert Service Module
//!
//! Owns the alert log and the subscription registry, and delivers new
//! alerts to the configured channels (Discord webhook, Telegram bot).
//! Each alert is also recorded on the feed of every matching
//! subscription, which subscribers poll over the API.
//!
//! Delivery failures are logged and never propagate: a dead webhook must
//! not take down the monitoring loop.

use chrono::Utc;
use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::config::Settings;
use crate::models::types::{Alert, AlertSubscription, AlertType, RiskLevel};
use crate::utils::constants::USER_AGENT;

/// How many alerts the dispatch queue buffers before raise_alert drops
const DISPATCH_QUEUE_SIZE: usize = 256;

/// Alert log + subscriptions + delivery queue
pub struct AlertService {
    alerts: DashMap<Uuid, Alert>,
    subscriptions: DashMap<Uuid, AlertSubscription>,
    /// Per-subscription delivery feeds, oldest alert first
    feeds: DashMap<Uuid, Vec<Alert>>,
    dispatch_tx: mpsc::Sender<Alert>,
    dispatch_rx: tokio::sync::Mutex<Option<mpsc::Receiver<Alert>>>,
    settings: Arc<Settings>,
    client: reqwest::Client,
}

impl AlertService {
    pub fn new(settings: Arc<Settings>) -> Self {
        let (dispatch_tx, dispatch_rx) = mpsc::channel(DISPATCH_QUEUE_SIZE);

        Self {
            alerts: DashMap::new(),
            subscriptions: DashMap::new(),
            feeds: DashMap::new(),
            dispatch_tx,
            dispatch_rx: tokio::sync::Mutex::new(Some(dispatch_rx)),
            settings,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
        }
    }

    // ============================================
    // ALERT LOG
    // ============================================

    /// Raise an alert unless the same (token, type) is already open.
    /// Returns the alert if one was created.
    pub async fn raise_alert(
        &self,
        token_address: &str,
        alert_type: AlertType,
        risk_level: RiskLevel,
        title: String,
        description: String,
        severity: u8,
    ) -> Option<Alert> {
        // Dedupe: one open alert per (token, type)
        let already_open = self.alerts.iter().any(|entry| {
            let a = entry.value();
            !a.is_resolved && a.token_address == token_address && a.alert_type == alert_type
        });
        if already_open {
            return None;
        }

        let alert = Alert {
            id: Uuid::new_v4(),
            token_address: token_address.to_string(),
            alert_type,
            risk_level,
            title,
            description,
            severity,
            is_resolved: false,
            created_at: Utc::now(),
            resolved_at: None,
        };

        info!(
            "🚨 Alert raised: {} [{}] for {}",
            alert.title,
            alert_type.as_str(),
            token_address
        );

        self.alerts.insert(alert.id, alert.clone());

        if self.dispatch_tx.try_send(alert.clone()).is_err() {
            warn!("⚠️ Alert dispatch queue full, delivery skipped");
        }

        Some(alert)
    }

    /// List alerts, newest first, optionally filtered by risk level
    pub fn list_alerts(
        &self,
        risk_level: Option<RiskLevel>,
        limit: usize,
        offset: usize,
    ) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|a| risk_level.map(|l| a.risk_level == l).unwrap_or(true))
            .collect();

        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        alerts.into_iter().skip(offset).take(limit).collect()
    }

    /// Delete an alert by id. Returns false for unknown ids.
    pub fn delete_alert(&self, id: Uuid) -> bool {
        let removed = self.alerts.remove(&id).is_some();
        if removed {
            info!("🗑️ Alert {} deleted", id);
        }
        removed
    }

    /// Mark open alerts of a (token, type) resolved. Returns count.
    pub fn resolve_alerts(&self, token_address: &str, alert_type: AlertType) -> usize {
        let mut resolved = 0;
        for mut entry in self.alerts.iter_mut() {
            let a = entry.value_mut();
            if !a.is_resolved && a.token_address == token_address && a.alert_type == alert_type {
                a.is_resolved = true;
                a.resolved_at = Some(Utc::now());
                resolved += 1;
            }
        }
        resolved
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    pub fn unresolved_count(&self) -> usize {
        self.alerts.iter().filter(|e| !e.value().is_resolved).count()
    }

    // ============================================
    // SUBSCRIPTIONS
    // ============================================

    pub fn subscribe(
        &self,
        email: String,
        risk_threshold: RiskLevel,
        token_addresses: Option<Vec<String>>,
        alert_types: Option<Vec<AlertType>>,
    ) -> AlertSubscription {
        let subscription = AlertSubscription {
            id: Uuid::new_v4(),
            email,
            risk_threshold,
            token_addresses,
            alert_types,
            is_active: true,
            created_at: Utc::now(),
        };

        info!("✅ Subscription {} created", subscription.id);
        self.subscriptions
            .insert(subscription.id, subscription.clone());
        subscription
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|e| e.value().is_active)
            .count()
    }

    pub fn get_subscription(&self, id: Uuid) -> Option<AlertSubscription> {
        self.subscriptions.get(&id).map(|e| e.value().clone())
    }

    /// Subscriptions that want a given alert
    pub fn matching_subscriptions(&self, alert: &Alert) -> Vec<AlertSubscription> {
        self.subscriptions
            .iter()
            .filter(|e| e.value().matches(alert))
            .map(|e| e.value().clone())
            .collect()
    }

    /// Record an alert on every matching subscription's feed.
    /// Returns the number of subscriptions notified.
    fn fan_out(&self, alert: &Alert) -> usize {
        let matching = self.matching_subscriptions(alert);
        for subscription in &matching {
            self.feeds
                .entry(subscription.id)
                .or_default()
                .push(alert.clone());
        }
        matching.len()
    }

    /// Alerts delivered to one subscription, oldest first
    pub fn subscription_feed(&self, subscription_id: Uuid) -> Vec<Alert> {
        self.feeds
            .get(&subscription_id)
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }

    // ============================================
    // DELIVERY
    // ============================================

    /// Drain the dispatch queue and deliver alerts to external channels.
    /// Call once from a spawned task; subsequent calls return immediately.
    pub async fn run_processor(self: Arc<Self>) {
        let rx = self.dispatch_rx.lock().await.take();
        let Some(mut rx) = rx else {
            warn!("⚠️ Alert processor already running");
            return;
        };

        info!("📬 Alert processor started");

        while let Some(alert) = rx.recv().await {
            let notified = self.fan_out(&alert);
            info!(
                "📤 Delivering alert {} ({} subscription feed(s) updated)",
                alert.id, notified
            );

            self.deliver_discord(&alert).await;
            self.deliver_telegram(&alert).await;
        }

        info!("📪 Alert processor stopped");
    }

    async fn deliver_discord(&self, alert: &Alert) {
        let Some(webhook_url) = &self.settings.discord_webhook_url else {
            return;
        };

        let content = format!(
            "🚨 **{}**\n{}\nToken: `{}`\nSeverity: {}/5",
            alert.title, alert.description, alert.token_address, alert.severity
        );

        let result = self
            .client
            .post(webhook_url)
            .json(&json!({ "content": content }))
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => error!("❌ Discord webhook returned HTTP {}", resp.status()),
            Err(e) => error!("❌ Discord webhook delivery failed: {}", e),
        }
    }

    async fn deliver_telegram(&self, alert: &Alert) {
        if !self.settings.telegram_configured() {
            return;
        }
        let (Some(token), Some(chat_id)) = (
            &self.settings.telegram_bot_token,
            &self.settings.telegram_chat_id,
        ) else {
            return;
        };

        let url = format!("https://api.telegram.org/bot{}/sendMessage", token);
        let text = format!(
            "🚨 {}\n{}\nToken: {}\nSeverity: {}/5",
            alert.title, alert.description, alert.token_address, alert.severity
        );

        let result = self
            .client
            .post(&url)
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => error!("❌ Telegram API returned HTTP {}", resp.status()),
            Err(e) => error!("❌ Telegram delivery failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AlertService {
        // Settings without any delivery channels configured
        let settings = Arc::new(Settings {
            host: "127.0.0.1".to_string(),
            port: 8000,
            solana_rpc_url: String::new(),
            solana_ws_url: String::new(),
            rpc_timeout: std::time::Duration::from_secs(10),
            pumpfun_api_url: String::new(),
            pumpfun_api_key: None,
            discord_webhook_url: None,
            telegram_bot_token: None,
            telegram_chat_id: None,
            twitter_api_key: None,
            risk_update_interval: std::time::Duration::from_secs(300),
            holder_concentration_threshold: 0.7,
            wash_trading_threshold: 0.8,
            auto_watch_new_tokens: false,
        });
        AlertService::new(settings)
    }

    #[tokio::test]
    async fn test_raise_alert_dedupes_open_alerts() {
        let svc = service();

        let first = svc
            .raise_alert(
                "mint111",
                AlertType::HighRisk,
                RiskLevel::High,
                "t".to_string(),
                "d".to_string(),
                4,
            )
            .await;
        assert!(first.is_some());

        let duplicate = svc
            .raise_alert(
                "mint111",
                AlertType::HighRisk,
                RiskLevel::High,
                "t".to_string(),
                "d".to_string(),
                4,
            )
            .await;
        assert!(duplicate.is_none());

        // Different type is a different alert
        let other = svc
            .raise_alert(
                "mint111",
                AlertType::WashTrading,
                RiskLevel::High,
                "t".to_string(),
                "d".to_string(),
                4,
            )
            .await;
        assert!(other.is_some());
        assert_eq!(svc.alert_count(), 2);
    }

    #[tokio::test]
    async fn test_resolving_allows_new_alert() {
        let svc = service();

        svc.raise_alert(
            "mint111",
            AlertType::HighRisk,
            RiskLevel::High,
            "t".to_string(),
            "d".to_string(),
            4,
        )
        .await;

        assert_eq!(svc.resolve_alerts("mint111", AlertType::HighRisk), 1);
        assert_eq!(svc.unresolved_count(), 0);

        let again = svc
            .raise_alert(
                "mint111",
                AlertType::HighRisk,
                RiskLevel::High,
                "t".to_string(),
                "d".to_string(),
                4,
            )
            .await;
        assert!(again.is_some());
    }

    #[tokio::test]
    async fn test_list_alerts_filter_and_pagination() {
        let svc = service();

        for i in 0..5 {
            svc.raise_alert(
                &format!("mint{}", i),
                AlertType::HighRisk,
                if i % 2 == 0 {
                    RiskLevel::Critical
                } else {
                    RiskLevel::High
                },
                "t".to_string(),
                "d".to_string(),
                4,
            )
            .await;
        }

        let critical = svc.list_alerts(Some(RiskLevel::Critical), 10, 0);
        assert_eq!(critical.len(), 3);

        let page = svc.list_alerts(None, 2, 2);
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_alert() {
        let svc = service();

        let alert = svc
            .raise_alert(
                "mint111",
                AlertType::Honeypot,
                RiskLevel::Critical,
                "t".to_string(),
                "d".to_string(),
                5,
            )
            .await
            .unwrap();

        assert!(svc.delete_alert(alert.id));
        assert!(!svc.delete_alert(alert.id));
        assert!(!svc.delete_alert(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn test_matching_subscriptions() {
        let svc = service();

        svc.subscribe("a@b.c".to_string(), RiskLevel::High, None, None);
        svc.subscribe(
            "d@e.f".to_string(),
            RiskLevel::Low,
            Some(vec!["othermint".to_string()]),
            None,
        );

        let alert = svc
            .raise_alert(
                "mint111",
                AlertType::HighRisk,
                RiskLevel::Critical,
                "t".to_string(),
                "d".to_string(),
                5,
            )
            .await
            .unwrap();

        // Only the first subscription matches (second is token-filtered)
        assert_eq!(svc.matching_subscriptions(&alert).len(), 1);
        assert_eq!(svc.subscription_count(), 2);
    }

    #[tokio::test]
    async fn test_fan_out_updates_only_matching_feeds() {
        let svc = service();

        let subscribed = svc.subscribe("a@b.c".to_string(), RiskLevel::High, None, None);
        let filtered = svc.subscribe(
            "d@e.f".to_string(),
            RiskLevel::Low,
            Some(vec!["othermint".to_string()]),
            None,
        );

        let alert = svc
            .raise_alert(
                "mint111",
                AlertType::HighRisk,
                RiskLevel::Critical,
                "t".to_string(),
                "d".to_string(),
                5,
            )
            .await
            .unwrap();

        assert_eq!(svc.fan_out(&alert), 1);

        let feed = svc.subscription_feed(subscribed.id);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, alert.id);
        assert!(svc.subscription_feed(filtered.id).is_empty());
    }
}
