//! In-Memory Token Store
//!
//! Holds the latest risk assessment per token, the full analyses, and the
//! watchlist the monitoring loop walks. All maps are DashMaps so handler
//! and monitor tasks share them without explicit locking.

use dashmap::{DashMap, DashSet};
use tracing::{debug, info};

use crate::models::types::{PlatformStats, RiskLevel, TokenAnalysis, TokenRisk};

/// Shared store for risk data and the watchlist
#[derive(Default)]
pub struct TokenStore {
    risks: DashMap<String, TokenRisk>,
    analyses: DashMap<String, TokenAnalysis>,
    watchlist: DashSet<String>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ============================================
    // RISK DATA
    // ============================================

    pub fn put_risk(&self, risk: TokenRisk) {
        debug!(
            "💾 Risk stored for {} (score {})",
            risk.token_address, risk.risk_score
        );
        self.risks.insert(risk.token_address.clone(), risk);
    }

    pub fn get_risk(&self, mint: &str) -> Option<TokenRisk> {
        self.risks.get(mint).map(|e| e.value().clone())
    }

    pub fn put_analysis(&self, analysis: TokenAnalysis) {
        self.analyses
            .insert(analysis.token_address.clone(), analysis);
    }

    pub fn get_analysis(&self, mint: &str) -> Option<TokenAnalysis> {
        self.analyses.get(mint).map(|e| e.value().clone())
    }

    /// True if we have ever assessed this mint
    pub fn is_known(&self, mint: &str) -> bool {
        self.risks.contains_key(mint) || self.analyses.contains_key(mint)
    }

    // ============================================
    // WATCHLIST
    // ============================================

    /// Add a token to the monitoring watchlist. Returns false if present.
    pub fn watch(&self, mint: &str) -> bool {
        let added = self.watchlist.insert(mint.to_string());
        if added {
            info!("👀 Watching {}", mint);
        }
        added
    }

    pub fn unwatch(&self, mint: &str) -> bool {
        self.watchlist.remove(mint).is_some()
    }

    pub fn is_watched(&self, mint: &str) -> bool {
        self.watchlist.contains(mint)
    }

    pub fn watched_tokens(&self) -> Vec<String> {
        self.watchlist.iter().map(|e| e.key().clone()).collect()
    }

    // ============================================
    // STATS
    // ============================================

    /// Aggregate counters over everything we have assessed
    pub fn platform_stats(&self) -> PlatformStats {
        let mut stats = PlatformStats {
            total_tokens_analyzed: self.risks.len(),
            watched_tokens: self.watchlist.len(),
            ..Default::default()
        };

        let mut score_sum: u64 = 0;
        for entry in self.risks.iter() {
            let risk = entry.value();
            score_sum += risk.risk_score as u64;
            match risk.risk_level {
                RiskLevel::Critical => stats.critical_risk_tokens += 1,
                RiskLevel::High => stats.high_risk_tokens += 1,
                RiskLevel::Medium => stats.medium_risk_tokens += 1,
                RiskLevel::Low => stats.low_risk_tokens += 1,
            }
        }

        if stats.total_tokens_analyzed > 0 {
            stats.average_risk_score = score_sum as f64 / stats.total_tokens_analyzed as f64;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn mock_risk(mint: &str, score: u8) -> TokenRisk {
        TokenRisk {
            token_address: mint.to_string(),
            risk_level: RiskLevel::from_score(score),
            risk_score: score,
            confidence: 70,
            factors: Vec::new(),
            last_updated: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_put_get_risk() {
        let store = TokenStore::new();
        assert!(store.get_risk("mint1").is_none());
        assert!(!store.is_known("mint1"));

        store.put_risk(mock_risk("mint1", 85));

        let risk = store.get_risk("mint1").unwrap();
        assert_eq!(risk.risk_level, RiskLevel::Critical);
        assert!(store.is_known("mint1"));
    }

    #[test]
    fn test_watchlist() {
        let store = TokenStore::new();

        assert!(store.watch("mint1"));
        assert!(!store.watch("mint1")); // already watched
        assert!(store.is_watched("mint1"));
        assert_eq!(store.watched_tokens().len(), 1);

        assert!(store.unwatch("mint1"));
        assert!(!store.unwatch("mint1"));
        assert!(!store.is_watched("mint1"));
    }

    #[test]
    fn test_platform_stats() {
        let store = TokenStore::new();
        store.put_risk(mock_risk("a", 85));
        store.put_risk(mock_risk("b", 65));
        store.put_risk(mock_risk("c", 45));
        store.put_risk(mock_risk("d", 5));
        store.watch("a");

        let stats = store.platform_stats();
        assert_eq!(stats.total_tokens_analyzed, 4);
        assert_eq!(stats.critical_risk_tokens, 1);
        assert_eq!(stats.high_risk_tokens, 1);
        assert_eq!(stats.medium_risk_tokens, 1);
        assert_eq!(stats.low_risk_tokens, 1);
        assert_eq!(stats.watched_tokens, 1);
        assert_eq!(stats.average_risk_score, 50.0);
    }
}
