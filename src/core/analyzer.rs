//! Risk Analyzer Module
//!
//! Orchestrates the full analysis pipeline for a mint:
//! holders, liquidity, trade history, mint security, socials. Each
//! sub-analysis can fail independently; failures degrade to neutral
//! factors instead of sinking the whole verdict.
//!
//! Also owns the monitoring loop that re-checks watched tokens and
//! raises alerts when their risk profile changes.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::core::alerts::AlertService;
use crate::core::honeypot::MintSecurityReport;
use crate::core::risk_score::{
    gini_coefficient, RiskScoreBuilder, WEIGHT_HOLDER_CONCENTRATION, WEIGHT_LIQUIDITY_SECURITY,
    WEIGHT_MINT_SECURITY, WEIGHT_PRICE_STABILITY, WEIGHT_SOCIAL_CREDIBILITY,
    WEIGHT_TRADING_PATTERNS, WEIGHT_VOLUME_AUTHENTICITY,
};
use crate::models::config::Settings;
use crate::models::errors::AppResult;
use crate::models::types::{
    AlertType, HolderInfo, LiquidityInfo, RiskLevel, SocialInfo, TokenAnalysis, TokenRisk,
    TransactionInfo, VolumeInfo,
};
use crate::providers::pumpfun::{CoinInfo, PumpFunClient, Trade};
use crate::providers::solana::SolanaClient;
use crate::providers::twitter::TwitterClient;
use crate::utils::cache::AnalysisCache;
use crate::utils::constants::{lamports_to_sol, PUMPFUN_PROGRAM, RAYDIUM_AMM_PROGRAM};
use crate::utils::store::TokenStore;
use crate::utils::telemetry::{TelemetryCollector, TelemetryEvent, ThreatType};

/// How many trades we pull for volume / pattern analysis
const TRADE_FETCH_LIMIT: usize = 500;

/// Volume window in seconds (24h)
const VOLUME_WINDOW_SECS: i64 = 86_400;

/// Rapid trading: this many trades inside RAPID_WINDOW_SECS
const RAPID_TRADE_COUNT: usize = 5;
const RAPID_WINDOW_SECS: i64 = 10;

/// Coordinated buying: this many distinct buyers in the same second
const COORDINATED_BUYER_COUNT: usize = 3;

/// Wash trader: at least this many buys AND sells from one wallet
const WASH_TRADER_SIDE_COUNT: usize = 3;

/// Full analysis pipeline + monitoring loop
pub struct RiskAnalyzer {
    solana: Arc<SolanaClient>,
    pumpfun: Arc<PumpFunClient>,
    twitter: Option<TwitterClient>,
    store: Arc<TokenStore>,
    alerts: Arc<AlertService>,
    cache: AnalysisCache,
    telemetry: Arc<TelemetryCollector>,
    settings: Arc<Settings>,
}

impl RiskAnalyzer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        solana: Arc<SolanaClient>,
        pumpfun: Arc<PumpFunClient>,
        twitter: Option<TwitterClient>,
        store: Arc<TokenStore>,
        alerts: Arc<AlertService>,
        cache: AnalysisCache,
        telemetry: Arc<TelemetryCollector>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            solana,
            pumpfun,
            twitter,
            store,
            alerts,
            cache,
            telemetry,
            settings,
        }
    }

    // ============================================
    // FULL ANALYSIS
    // ============================================

    /// Run the full pipeline for a mint. Cached results are served until
    /// their TTL lapses.
    pub async fn analyze_token(&self, mint: &str) -> AppResult<TokenAnalysis> {
        if let Some(cached) = self.cache.get(mint) {
            return Ok(cached);
        }

        let start = Instant::now();
        info!("🔍 Analyzing token {}", mint);

        let coin = match self.pumpfun.get_coin(mint).await {
            Ok(coin) => coin,
            Err(e) => {
                warn!("⚠️ pump.fun metadata unavailable for {}: {}", mint, e);
                None
            }
        };

        let mut builder = RiskScoreBuilder::new();

        // Holder concentration
        let holders = match self.analyze_holders(mint, coin.as_ref()).await {
            Ok(holders) => {
                let top5: f64 = holders
                    .iter()
                    .filter(|h| !h.is_contract)
                    .take(5)
                    .map(|h| h.percentage)
                    .sum();
                let balances: Vec<f64> = holders.iter().map(|h| h.balance).collect();
                builder = builder.with_holder_concentration(
                    top5,
                    gini_coefficient(&balances),
                    holders.len(),
                );
                holders
            }
            Err(e) => {
                error!("❌ Holder analysis failed for {}: {}", mint, e);
                builder = builder
                    .with_degraded_factor("holder_concentration", WEIGHT_HOLDER_CONCENTRATION);
                Vec::new()
            }
        };

        // Liquidity security
        let liquidity = self.analyze_liquidity(coin.as_ref());
        builder = builder
            .with_liquidity_security(liquidity.total_liquidity_sol, liquidity.locked_percentage);

        // Volume + price + patterns all derive from trade history
        let trades = match self.pumpfun.get_trades(mint, TRADE_FETCH_LIMIT).await {
            Ok(trades) => Some(trades),
            Err(e) => {
                error!("❌ Trade history failed for {}: {}", mint, e);
                None
            }
        };

        let volume = match &trades {
            Some(trades) => {
                let volume = Self::analyze_volume(trades);
                builder = builder.with_volume_authenticity(
                    volume.wash_trading_score,
                    volume.total_volume_24h_sol,
                    volume.unique_traders,
                );
                builder = builder.with_price_stability(
                    Self::price_volatility(trades),
                    trades.len(),
                );
                builder =
                    builder.with_trading_patterns(Self::detect_suspicious_patterns(trades));
                volume
            }
            None => {
                builder = builder
                    .with_degraded_factor("volume_authenticity", WEIGHT_VOLUME_AUTHENTICITY)
                    .with_degraded_factor("price_stability", WEIGHT_PRICE_STABILITY)
                    .with_degraded_factor("trading_patterns", WEIGHT_TRADING_PATTERNS);
                VolumeInfo::default()
            }
        };

        // Mint security (authorities, token-2022 extensions)
        let security = match self.solana.get_mint_account(mint).await {
            Ok(Some(account)) => {
                let report = MintSecurityReport::evaluate(&account);
                builder = builder.with_mint_security(&report);
                report
            }
            Ok(None) => {
                warn!("⚠️ Mint account not found on-chain: {}", mint);
                builder = builder.with_degraded_factor("mint_security", WEIGHT_MINT_SECURITY);
                MintSecurityReport::unavailable()
            }
            Err(e) => {
                error!("❌ Mint account fetch failed for {}: {}", mint, e);
                builder = builder.with_degraded_factor("mint_security", WEIGHT_MINT_SECURITY);
                MintSecurityReport::unavailable()
            }
        };

        // Social credibility
        let social = self.analyze_social(coin.as_ref()).await;
        builder = builder.with_social_credibility(
            social.twitter_exists,
            social.telegram_exists,
            social.website_exists,
            social.twitter_mentions,
        );

        let score = builder.build();
        let latency_ms = start.elapsed().as_millis() as u64;

        info!(
            "📊 {} scored {} ({:?}) in {}ms",
            mint, score.total, score.level, latency_ms
        );

        let analysis = TokenAnalysis {
            token_address: mint.to_string(),
            token_name: coin.as_ref().map(|c| c.name.clone()),
            token_symbol: coin.as_ref().map(|c| c.symbol.clone()),
            risk_level: score.level,
            risk_score: score.total,
            confidence: score.confidence,
            recommendation: score.recommendation.clone(),
            holders,
            liquidity,
            volume,
            social,
            risk_factors: score.factors.clone(),
            analysis_timestamp: Utc::now(),
        };

        let risk = TokenRisk {
            token_address: mint.to_string(),
            risk_level: score.level,
            risk_score: score.total,
            confidence: score.confidence,
            factors: score.factors,
            last_updated: Utc::now(),
            created_at: Utc::now(),
        };

        self.record_telemetry(&risk, security.honeypot_suspected, latency_ms);
        self.check_for_alerts(mint, &risk, security.honeypot_suspected)
            .await;

        self.store.put_analysis(analysis.clone());
        self.store.put_risk(risk);
        self.cache.set(mint, analysis.clone());

        Ok(analysis)
    }

    // ============================================
    // SUB-ANALYSES
    // ============================================

    /// Holder distribution from the 20 largest token accounts.
    /// Bonding curve and AMM pool accounts are marked as contracts so the
    /// concentration factor only counts real wallets.
    pub async fn analyze_holders(
        &self,
        mint: &str,
        coin: Option<&CoinInfo>,
    ) -> AppResult<Vec<HolderInfo>> {
        let supply = self.solana.get_token_supply(mint).await?;
        let accounts = self.solana.get_token_largest_accounts(mint).await?;

        let total = supply.ui_supply();
        let pool_accounts = Self::known_pool_accounts(coin);

        let holders = accounts
            .into_iter()
            .map(|account| {
                let balance = account.ui_balance();
                let percentage = if total > 0.0 {
                    (balance / total) * 100.0
                } else {
                    0.0
                };
                HolderInfo {
                    is_contract: pool_accounts.contains(&account.address.as_str()),
                    address: account.address,
                    balance,
                    percentage,
                }
            })
            .collect();

        Ok(Self::rank_holders(holders))
    }

    /// Accounts that never count as wallets: the token's bonding curve,
    /// its Raydium pool (if graduated), and the program ids themselves.
    pub fn known_pool_accounts(coin: Option<&CoinInfo>) -> Vec<&str> {
        let mut accounts: Vec<&str> = coin
            .map(|c| {
                c.bonding_curve
                    .iter()
                    .chain(c.raydium_pool.iter())
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default();
        accounts.push(PUMPFUN_PROGRAM);
        accounts.push(RAYDIUM_AMM_PROGRAM);
        accounts
    }

    /// Largest balances first. RPC responses usually arrive sorted, but
    /// the top-5 slice must not depend on that.
    pub fn rank_holders(mut holders: Vec<HolderInfo>) -> Vec<HolderInfo> {
        holders.sort_by(|a, b| {
            b.balance
                .partial_cmp(&a.balance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        holders
    }

    /// Liquidity security from bonding curve state.
    ///
    /// Pre-graduation, the pool IS the bonding curve program: nobody can
    /// pull it, so it counts as 100% locked. After graduation pump.fun
    /// burns the Raydium LP, also 100% locked. Tokens pump.fun has never
    /// seen get an empty snapshot, which scores as maximum risk.
    pub fn analyze_liquidity(&self, coin: Option<&CoinInfo>) -> LiquidityInfo {
        let Some(coin) = coin else {
            return LiquidityInfo::empty();
        };

        if !coin.complete {
            let curve_sol = lamports_to_sol(coin.virtual_sol_reserves);
            return LiquidityInfo {
                total_liquidity_sol: curve_sol,
                locked_liquidity_sol: curve_sol,
                locked_percentage: if curve_sol > 0.0 { 100.0 } else { 0.0 },
                lock_expiry: None,
                lp_token_holders: coin
                    .bonding_curve
                    .iter()
                    .cloned()
                    .collect(),
            };
        }

        match &coin.raydium_pool {
            Some(pool) => {
                // LP burned at graduation
                let pool_sol = lamports_to_sol(coin.virtual_sol_reserves);
                LiquidityInfo {
                    total_liquidity_sol: pool_sol,
                    locked_liquidity_sol: pool_sol,
                    locked_percentage: if pool_sol > 0.0 { 100.0 } else { 0.0 },
                    lock_expiry: None,
                    lp_token_holders: vec![pool.clone()],
                }
            }
            None => {
                // Graduated but no pool on record: treat as unknown
                LiquidityInfo::empty()
            }
        }
    }

    /// 24h volume snapshot with a wash trading score.
    ///
    /// Wash score combines low trader diversity with wallets trading both
    /// sides, clamped to 0.0-1.0.
    pub fn analyze_volume(trades: &[Trade]) -> VolumeInfo {
        let cutoff = Utc::now().timestamp() - VOLUME_WINDOW_SECS;
        let recent: Vec<&Trade> = trades.iter().filter(|t| t.timestamp >= cutoff).collect();

        if recent.is_empty() {
            return VolumeInfo::default();
        }

        let total_volume: f64 = recent
            .iter()
            .map(|t| lamports_to_sol(t.sol_amount))
            .sum();

        let mut traders: std::collections::HashMap<&str, (usize, usize, f64)> =
            std::collections::HashMap::new();
        for trade in &recent {
            let entry = traders.entry(trade.user.as_str()).or_insert((0, 0, 0.0));
            if trade.is_buy {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
            entry.2 += lamports_to_sol(trade.sol_amount);
        }

        let unique_traders = traders.len();

        // Low diversity: many trades, few wallets
        let diversity_score = 1.0 - (unique_traders as f64 / recent.len() as f64);

        // Wallets hitting both sides of the book
        let both_sides = traders.values().filter(|(b, s, _)| *b > 0 && *s > 0).count();
        let both_sides_share = both_sides as f64 / unique_traders as f64;

        let wash_trading_score = (diversity_score * 0.6 + both_sides_share * 0.4).clamp(0.0, 1.0);

        // Top 5 traders' share of volume
        let mut volumes: Vec<f64> = traders.values().map(|(_, _, v)| *v).collect();
        volumes.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let top5_volume: f64 = volumes.iter().take(5).sum();
        let top_traders_percentage = if total_volume > 0.0 {
            (top5_volume / total_volume) * 100.0
        } else {
            0.0
        };

        VolumeInfo {
            total_volume_24h_sol: total_volume,
            trade_count_24h: recent.len(),
            unique_traders,
            wash_trading_score,
            volume_authenticity: 1.0 - wash_trading_score,
            top_traders_percentage,
        }
    }

    /// Price volatility as std dev / mean over trade prices.
    /// None when there are fewer than 2 priced trades.
    pub fn price_volatility(trades: &[Trade]) -> Option<f64> {
        let prices: Vec<f64> = trades.iter().filter_map(|t| t.price_sol()).collect();
        if prices.len() < 2 {
            return None;
        }

        let mean = prices.iter().sum::<f64>() / prices.len() as f64;
        if mean <= 0.0 {
            return Some(1.0);
        }

        let variance =
            prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / prices.len() as f64;

        Some(variance.sqrt() / mean)
    }

    /// Suspicious trading patterns in a trade window
    pub fn detect_suspicious_patterns(trades: &[Trade]) -> Vec<String> {
        let mut patterns = Vec::new();

        // Sort by timestamp ascending for window scans
        let mut sorted: Vec<&Trade> = trades.iter().collect();
        sorted.sort_by_key(|t| t.timestamp);

        // Rapid trading: RAPID_TRADE_COUNT trades inside RAPID_WINDOW_SECS
        let rapid = sorted.windows(RAPID_TRADE_COUNT).any(|window| {
            window[RAPID_TRADE_COUNT - 1].timestamp - window[0].timestamp <= RAPID_WINDOW_SECS
        });
        if rapid {
            patterns.push("Rapid trading detected".to_string());
        }

        // Coordinated buying: distinct buyers in the same second
        let mut buyers_per_second: std::collections::HashMap<i64, std::collections::HashSet<&str>> =
            std::collections::HashMap::new();
        for trade in &sorted {
            if trade.is_buy {
                buyers_per_second
                    .entry(trade.timestamp)
                    .or_default()
                    .insert(trade.user.as_str());
            }
        }
        if buyers_per_second
            .values()
            .any(|buyers| buyers.len() >= COORDINATED_BUYER_COUNT)
        {
            patterns.push("Coordinated buying detected".to_string());
        }

        // Wash trading: one wallet repeatedly on both sides
        let mut sides: std::collections::HashMap<&str, (usize, usize)> =
            std::collections::HashMap::new();
        for trade in &sorted {
            let entry = sides.entry(trade.user.as_str()).or_insert((0, 0));
            if trade.is_buy {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
        if sides
            .values()
            .any(|(b, s)| *b >= WASH_TRADER_SIDE_COUNT && *s >= WASH_TRADER_SIDE_COUNT)
        {
            patterns.push("Wash trading detected".to_string());
        }

        patterns
    }

    /// Social links from pump.fun metadata, plus optional mention counts
    async fn analyze_social(&self, coin: Option<&CoinInfo>) -> SocialInfo {
        let Some(coin) = coin else {
            return SocialInfo::default();
        };

        let twitter_exists = coin.twitter.as_deref().map(|s| !s.is_empty()).unwrap_or(false);
        let telegram_exists = coin.telegram.as_deref().map(|s| !s.is_empty()).unwrap_or(false);
        let website_exists = coin.website.as_deref().map(|s| !s.is_empty()).unwrap_or(false);

        let twitter_mentions = match (&self.twitter, twitter_exists) {
            (Some(client), true) if !coin.symbol.is_empty() => {
                client.recent_mention_count(&format!("${}", coin.symbol)).await
            }
            _ => None,
        };

        SocialInfo {
            twitter_exists,
            telegram_exists,
            website_exists,
            twitter_mentions,
        }
    }

    /// Recent trades classified for the transactions endpoint.
    ///
    /// When pump.fun trade history is down the raw RPC signature list
    /// still shows activity, just without side or amount classification.
    pub async fn recent_transactions(
        &self,
        mint: &str,
        limit: usize,
    ) -> AppResult<Vec<TransactionInfo>> {
        let trades = match self.pumpfun.get_trades(mint, limit).await {
            Ok(trades) => trades,
            Err(e) => {
                warn!(
                    "⚠️ pump.fun trade history unavailable for {} ({}), using RPC signatures",
                    mint, e
                );
                let signatures = self.solana.get_signatures_for_address(mint, limit).await?;
                return Ok(signatures
                    .into_iter()
                    .map(|s| TransactionInfo {
                        signature: s.signature,
                        timestamp: s
                            .block_time
                            .and_then(|t| chrono::DateTime::from_timestamp(t, 0))
                            .unwrap_or_else(Utc::now),
                        kind: "unknown".to_string(),
                        amount_sol: 0.0,
                        trader: String::new(),
                        success: s.err.is_none(),
                    })
                    .collect());
            }
        };

        Ok(trades
            .into_iter()
            .map(|t| TransactionInfo {
                signature: t.signature,
                timestamp: chrono::DateTime::from_timestamp(t.timestamp, 0)
                    .unwrap_or_else(Utc::now),
                kind: if t.is_buy { "buy" } else { "sell" }.to_string(),
                amount_sol: lamports_to_sol(t.sol_amount),
                trader: t.user,
                // pump.fun only reports executed fills
                success: true,
            })
            .collect())
    }

    // ============================================
    // QUICK CHECK + MONITORING
    // ============================================

    /// Lighter check used by the monitoring loop: holders + liquidity only
    pub async fn quick_risk_check(&self, mint: &str) -> AppResult<TokenRisk> {
        let coin = self.pumpfun.get_coin(mint).await.unwrap_or(None);

        let mut builder = RiskScoreBuilder::new();

        match self.analyze_holders(mint, coin.as_ref()).await {
            Ok(holders) => {
                let top5: f64 = holders
                    .iter()
                    .filter(|h| !h.is_contract)
                    .take(5)
                    .map(|h| h.percentage)
                    .sum();
                let balances: Vec<f64> = holders.iter().map(|h| h.balance).collect();
                builder = builder.with_holder_concentration(
                    top5,
                    gini_coefficient(&balances),
                    holders.len(),
                );
            }
            Err(e) => {
                debug!("Quick check holder fetch failed for {}: {}", mint, e);
                builder = builder
                    .with_degraded_factor("holder_concentration", WEIGHT_HOLDER_CONCENTRATION);
            }
        }

        let liquidity = self.analyze_liquidity(coin.as_ref());
        builder = builder
            .with_liquidity_security(liquidity.total_liquidity_sol, liquidity.locked_percentage);

        let score = builder.build();

        Ok(TokenRisk {
            token_address: mint.to_string(),
            risk_level: score.level,
            risk_score: score.total,
            // Quick checks skip most factors
            confidence: 70,
            factors: score.factors,
            last_updated: Utc::now(),
            created_at: Utc::now(),
        })
    }

    /// Monitoring loop: walk the watchlist every interval, re-check each
    /// token and raise alerts. Provider failures back off for a minute.
    pub async fn run_monitor(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.settings.risk_update_interval);
        info!(
            "🔁 Monitoring loop started (interval {}s)",
            self.settings.risk_update_interval.as_secs()
        );

        loop {
            interval.tick().await;

            let watchlist = self.store.watched_tokens();
            if watchlist.is_empty() {
                debug!("📭 Watchlist empty, nothing to monitor");
                continue;
            }

            info!("🔁 Monitoring {} watched token(s)", watchlist.len());

            let mut had_error = false;
            for mint in watchlist {
                match self.quick_risk_check(&mint).await {
                    Ok(risk) => {
                        self.check_for_alerts(&mint, &risk, false).await;
                        self.store.put_risk(risk);
                    }
                    Err(e) => {
                        error!("❌ Monitoring failed for {}: {}", mint, e);
                        had_error = true;
                    }
                }
            }

            if had_error {
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            }
        }
    }

    /// Raise alerts for a risk assessment
    pub async fn check_for_alerts(&self, mint: &str, risk: &TokenRisk, honeypot: bool) {
        if honeypot {
            self.alerts
                .raise_alert(
                    mint,
                    AlertType::Honeypot,
                    RiskLevel::Critical,
                    format!("Honeypot Suspected: {}", mint),
                    "Mint security allows holders to be blocked from selling".to_string(),
                    5,
                )
                .await;
        }

        if risk.risk_level >= RiskLevel::High {
            self.alerts
                .raise_alert(
                    mint,
                    AlertType::HighRisk,
                    risk.risk_level,
                    format!("High Risk Detected: {}", mint),
                    format!(
                        "Token {} has been flagged as {} risk (score {})",
                        mint,
                        risk.risk_level.as_str(),
                        risk.risk_score
                    ),
                    if risk.risk_level == RiskLevel::Critical {
                        5
                    } else {
                        4
                    },
                )
                .await;
        }

        let holder_alert_score =
            (self.settings.holder_concentration_threshold * 100.0).round() as u8;
        let wash_alert_score = (self.settings.wash_trading_threshold * 100.0).round() as u8;

        for factor in &risk.factors {
            let raised = match factor.name.as_str() {
                "holder_concentration" if factor.score > holder_alert_score => self
                    .alerts
                    .raise_alert(
                        mint,
                        AlertType::HolderConcentration,
                        RiskLevel::High,
                        format!("High Holder Concentration: {}", mint),
                        factor.evidence.join("; "),
                        4,
                    )
                    .await
                    .map(|_| ThreatType::HolderConcentration),
                "liquidity_security" if factor.score > 80 => self
                    .alerts
                    .raise_alert(
                        mint,
                        AlertType::LiquidityRemoval,
                        RiskLevel::High,
                        format!("Liquidity Security Risk: {}", mint),
                        factor.evidence.join("; "),
                        4,
                    )
                    .await
                    .map(|_| ThreatType::LiquidityRemoval),
                "volume_authenticity" if factor.score > wash_alert_score => self
                    .alerts
                    .raise_alert(
                        mint,
                        AlertType::WashTrading,
                        RiskLevel::High,
                        format!("Wash Trading Suspected: {}", mint),
                        factor.evidence.join("; "),
                        3,
                    )
                    .await
                    .map(|_| ThreatType::WashTrading),
                _ => None,
            };

            if let Some(threat_type) = raised {
                self.telemetry.record_threat(TelemetryEvent::new(
                    threat_type,
                    0,
                    factor.score,
                    mint.to_string(),
                ));
            }
        }
    }

    fn record_telemetry(&self, risk: &TokenRisk, honeypot: bool, latency_ms: u64) {
        if honeypot {
            self.telemetry.record_threat(TelemetryEvent::new(
                ThreatType::Honeypot,
                latency_ms,
                risk.risk_score,
                "mint security".to_string(),
            ));
        } else if risk.risk_level >= RiskLevel::High {
            self.telemetry.record_threat(TelemetryEvent::new(
                ThreatType::HighRisk,
                latency_ms,
                risk.risk_score,
                "full analysis".to_string(),
            ));
        } else {
            self.telemetry.record_analysis(latency_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::RiskFactor;

    fn trade(user: &str, is_buy: bool, timestamp: i64, sol: u64, tokens: u64) -> Trade {
        Trade {
            signature: format!("sig-{}-{}", user, timestamp),
            sol_amount: sol,
            token_amount: tokens,
            is_buy,
            user: user.to_string(),
            timestamp,
        }
    }

    #[test]
    fn test_volume_organic_trades() {
        let now = Utc::now().timestamp();
        let trades: Vec<Trade> = (0..20)
            .map(|i| {
                trade(
                    &format!("wallet{}", i),
                    i % 2 == 0,
                    now - i * 600,
                    1_000_000_000,
                    2_000_000,
                )
            })
            .collect();

        let volume = RiskAnalyzer::analyze_volume(&trades);
        assert_eq!(volume.trade_count_24h, 20);
        assert_eq!(volume.unique_traders, 20);
        assert!(volume.wash_trading_score < 0.2, "wash score {}", volume.wash_trading_score);
        assert!((volume.total_volume_24h_sol - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_volume_wash_trades() {
        let now = Utc::now().timestamp();
        // Two wallets churning both sides
        let trades: Vec<Trade> = (0..40)
            .map(|i| {
                trade(
                    if i % 2 == 0 { "washer1" } else { "washer2" },
                    i % 4 < 2,
                    now - i * 30,
                    500_000_000,
                    1_000_000,
                )
            })
            .collect();

        let volume = RiskAnalyzer::analyze_volume(&trades);
        assert_eq!(volume.unique_traders, 2);
        assert!(volume.wash_trading_score > 0.8, "wash score {}", volume.wash_trading_score);
        assert!(volume.top_traders_percentage > 99.0);
    }

    #[test]
    fn test_volume_ignores_old_trades() {
        let now = Utc::now().timestamp();
        let trades = vec![
            trade("a", true, now - 100, 1_000_000_000, 1_000_000),
            trade("b", true, now - 2 * 86_400, 1_000_000_000, 1_000_000),
        ];

        let volume = RiskAnalyzer::analyze_volume(&trades);
        assert_eq!(volume.trade_count_24h, 1);
    }

    #[test]
    fn test_price_volatility_stable() {
        let now = Utc::now().timestamp();
        let trades: Vec<Trade> = (0..10)
            .map(|i| trade("w", true, now - i, 1_000_000_000, 2_000_000))
            .collect();

        let volatility = RiskAnalyzer::price_volatility(&trades).unwrap();
        assert!(volatility < 0.01, "volatility {}", volatility);
    }

    #[test]
    fn test_price_volatility_insufficient_data() {
        let now = Utc::now().timestamp();
        assert!(RiskAnalyzer::price_volatility(&[]).is_none());
        assert!(
            RiskAnalyzer::price_volatility(&[trade("w", true, now, 1_000_000_000, 1_000_000)])
                .is_none()
        );
    }

    #[test]
    fn test_rapid_trading_pattern() {
        let now = Utc::now().timestamp();
        let trades: Vec<Trade> = (0..6)
            .map(|i| trade(&format!("w{}", i), true, now + i, 1_000_000_000, 1_000_000))
            .collect();

        let patterns = RiskAnalyzer::detect_suspicious_patterns(&trades);
        assert!(patterns.iter().any(|p| p.contains("Rapid")));
    }

    #[test]
    fn test_coordinated_buying_pattern() {
        let now = Utc::now().timestamp();
        let trades = vec![
            trade("a", true, now, 1_000_000_000, 1_000_000),
            trade("b", true, now, 1_000_000_000, 1_000_000),
            trade("c", true, now, 1_000_000_000, 1_000_000),
        ];

        let patterns = RiskAnalyzer::detect_suspicious_patterns(&trades);
        assert!(patterns.iter().any(|p| p.contains("Coordinated")));
    }

    #[test]
    fn test_wash_trading_pattern() {
        let now = Utc::now().timestamp();
        let mut trades = Vec::new();
        for i in 0..3 {
            trades.push(trade("washer", true, now + i * 100, 1_000_000_000, 1_000_000));
            trades.push(trade("washer", false, now + i * 100 + 50, 1_000_000_000, 1_000_000));
        }

        let patterns = RiskAnalyzer::detect_suspicious_patterns(&trades);
        assert!(patterns.iter().any(|p| p.contains("Wash")));
    }

    #[test]
    fn test_no_patterns_on_organic_flow() {
        let now = Utc::now().timestamp();
        let trades: Vec<Trade> = (0..10)
            .map(|i| {
                trade(
                    &format!("w{}", i),
                    i % 2 == 0,
                    now + i * 120,
                    1_000_000_000,
                    1_000_000,
                )
            })
            .collect();

        assert!(RiskAnalyzer::detect_suspicious_patterns(&trades).is_empty());
    }

    fn holder(address: &str, balance: f64) -> HolderInfo {
        HolderInfo {
            address: address.to_string(),
            balance,
            percentage: 0.0,
            is_contract: false,
        }
    }

    #[test]
    fn test_rank_holders_sorts_by_balance() {
        let ranked = RiskAnalyzer::rank_holders(vec![
            holder("mid", 50.0),
            holder("top", 900.0),
            holder("low", 1.0),
        ]);

        assert_eq!(ranked[0].address, "top");
        assert_eq!(ranked[1].address, "mid");
        assert_eq!(ranked[2].address, "low");
    }

    #[test]
    fn test_pool_accounts_include_curve_and_program_ids() {
        let coin: CoinInfo = serde_json::from_value(serde_json::json!({
            "mint": "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
            "bonding_curve": "CurveAccount111111111111111111111111111111",
        }))
        .unwrap();

        let accounts = RiskAnalyzer::known_pool_accounts(Some(&coin));
        assert!(accounts.contains(&"CurveAccount111111111111111111111111111111"));
        assert!(accounts.contains(&PUMPFUN_PROGRAM));
        assert!(accounts.contains(&RAYDIUM_AMM_PROGRAM));

        // Even without coin metadata the program ids are filtered out
        let bare = RiskAnalyzer::known_pool_accounts(None);
        assert!(bare.contains(&RAYDIUM_AMM_PROGRAM));
    }

    fn offline_analyzer() -> (Arc<RiskAnalyzer>, Arc<crate::core::alerts::AlertService>) {
        let settings = Arc::new(Settings {
            host: "127.0.0.1".to_string(),
            port: 8000,
            solana_rpc_url: "http://127.0.0.1:0".to_string(),
            solana_ws_url: String::new(),
            rpc_timeout: std::time::Duration::from_secs(1),
            pumpfun_api_url: "http://127.0.0.1:0".to_string(),
            pumpfun_api_key: None,
            discord_webhook_url: None,
            telegram_bot_token: None,
            telegram_chat_id: None,
            twitter_api_key: None,
            risk_update_interval: std::time::Duration::from_secs(300),
            holder_concentration_threshold: 0.8,
            wash_trading_threshold: 0.8,
            auto_watch_new_tokens: false,
        });

        let alerts = Arc::new(AlertService::new(settings.clone()));
        let solana = SolanaClient::new(
            settings.solana_rpc_url.clone(),
            settings.rpc_timeout,
        )
        .unwrap();
        let pumpfun = PumpFunClient::new(settings.pumpfun_api_url.clone(), None).unwrap();

        let analyzer = Arc::new(RiskAnalyzer::new(
            Arc::new(solana),
            Arc::new(pumpfun),
            None,
            Arc::new(TokenStore::new()),
            alerts.clone(),
            AnalysisCache::new(),
            Arc::new(TelemetryCollector::with_config(
                std::env::temp_dir().join("pumpwatch-analyzer-tests"),
                16,
            )),
            settings,
        ));

        (analyzer, alerts)
    }

    fn risk_with_factor(name: &str, score: u8) -> TokenRisk {
        TokenRisk {
            token_address: "mintX".to_string(),
            risk_level: RiskLevel::Low,
            risk_score: 40,
            confidence: 100,
            factors: vec![RiskFactor {
                name: name.to_string(),
                description: String::new(),
                score,
                weight: 0.25,
                evidence: vec!["evidence".to_string()],
                recommendation: None,
            }],
            last_updated: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_holder_alert_needs_score_above_eighty() {
        let (analyzer, alerts) = offline_analyzer();

        // Score exactly at the cutoff stays quiet
        analyzer
            .check_for_alerts("mintX", &risk_with_factor("holder_concentration", 80), false)
            .await;
        assert_eq!(alerts.alert_count(), 0);

        analyzer
            .check_for_alerts("mintX", &risk_with_factor("holder_concentration", 100), false)
            .await;
        assert_eq!(alerts.alert_count(), 1);
    }
}
