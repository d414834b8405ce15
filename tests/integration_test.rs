//! Integration tests for Pumpwatch

use std::sync::Arc;

use pumpwatch::core::honeypot::MintSecurityReport;
use pumpwatch::models::config::Settings;
use pumpwatch::models::types::{
    AlertType, HolderInfo, LiquidityInfo, RiskLevel, SocialInfo, TokenAnalysis, TokenRisk,
    VolumeInfo,
};
use pumpwatch::providers::MintAccount;
use pumpwatch::utils::constants::{is_valid_mint, TOKEN_2022_PROGRAM, TOKEN_PROGRAM};
use pumpwatch::utils::store::TokenStore;
use pumpwatch::{AlertService, AnalysisCache, RiskScoreBuilder};

const SAMPLE_MINT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

fn sample_analysis(mint: &str, score: u8) -> TokenAnalysis {
    TokenAnalysis {
        token_address: mint.to_string(),
        token_name: Some("Test Coin".to_string()),
        token_symbol: Some("TEST".to_string()),
        risk_level: RiskLevel::from_score(score),
        risk_score: score,
        confidence: 90,
        recommendation: "test".to_string(),
        holders: vec![HolderInfo {
            address: "wallet1".to_string(),
            balance: 1000.0,
            percentage: 10.0,
            is_contract: false,
        }],
        liquidity: LiquidityInfo::empty(),
        volume: VolumeInfo::default(),
        social: SocialInfo::default(),
        risk_factors: Vec::new(),
        analysis_timestamp: chrono::Utc::now(),
    }
}

// ============================================
// Scoring pipeline
// ============================================

#[test]
fn test_partial_factor_set_still_reaches_critical() {
    // Whale-held supply, unlocked liquidity, pure wash volume
    let score = RiskScoreBuilder::new()
        .with_holder_concentration(92.0, 0.9, 40)
        .with_liquidity_security(55.0, 5.0)
        .with_volume_authenticity(0.95, 300.0, 4)
        .build();

    assert_eq!(score.level, RiskLevel::Critical);
    assert!(score.total >= 80);
    assert!(score.recommendation.contains("💀"));
}

#[test]
fn test_strong_socials_keep_verdict_low() {
    let score = RiskScoreBuilder::new()
        .with_holder_concentration(22.0, 0.3, 800)
        .with_liquidity_security(120.0, 100.0)
        .with_volume_authenticity(0.1, 450.0, 300)
        .with_social_credibility(true, true, true, Some(250))
        .build();

    assert_eq!(score.level, RiskLevel::Low);
}

#[test]
fn test_exactly_seventy_percent_is_not_critical_band() {
    // Threshold comparisons are strictly greater: 70% sits in the 60-80 band
    let score = RiskScoreBuilder::new()
        .with_holder_concentration(70.0, 0.5, 100)
        .build();

    let factor = &score.factors[0];
    assert_eq!(factor.score, 80);
    assert!(factor.description.contains("HIGH"));
}

#[test]
fn test_freeze_authority_forces_honeypot_verdict() {
    let mint = MintAccount {
        owner_program: TOKEN_PROGRAM.to_string(),
        mint_authority: None,
        freeze_authority: Some("FrzAuth111111111111111111111111111111111111".to_string()),
        decimals: 6,
        supply: "1000000000000".to_string(),
        extensions: Vec::new(),
    };

    let report = MintSecurityReport::evaluate(&mint);
    assert!(report.honeypot_suspected);

    let score = RiskScoreBuilder::new().with_mint_security(&report).build();
    assert_eq!(score.factors[0].score, 100);
}

#[test]
fn test_transfer_hook_extension_is_blocking() {
    let mint = MintAccount {
        owner_program: TOKEN_2022_PROGRAM.to_string(),
        mint_authority: None,
        freeze_authority: None,
        decimals: 6,
        supply: "1000000000000".to_string(),
        extensions: vec!["transferHook".to_string()],
    };

    let report = MintSecurityReport::evaluate(&mint);
    assert!(report.honeypot_suspected);
    assert!(report.has_blocking_extension());
}

#[test]
fn test_transfer_fee_alone_is_flag_not_honeypot() {
    let mint = MintAccount {
        owner_program: TOKEN_2022_PROGRAM.to_string(),
        mint_authority: None,
        freeze_authority: None,
        decimals: 6,
        supply: "1000000000000".to_string(),
        extensions: vec!["transferFeeConfig".to_string()],
    };

    let report = MintSecurityReport::evaluate(&mint);
    assert!(!report.honeypot_suspected);
    assert!(!report.red_flags.is_empty());
}

#[test]
fn test_degraded_factors_lower_confidence_not_verdict() {
    let full = RiskScoreBuilder::new()
        .with_holder_concentration(30.0, 0.3, 500)
        .with_liquidity_security(80.0, 100.0)
        .build();

    let degraded = RiskScoreBuilder::new()
        .with_holder_concentration(30.0, 0.3, 500)
        .with_liquidity_security(80.0, 100.0)
        .with_degraded_factor("volume_authenticity", 0.15)
        .build();

    assert!(degraded.confidence < full.confidence);
    assert_eq!(degraded.level, full.level);
}

// ============================================
// Store + cache
// ============================================

#[test]
fn test_store_watchlist_and_platform_stats() {
    let store = TokenStore::new();

    store.put_analysis(sample_analysis(SAMPLE_MINT, 85));
    store.put_risk(TokenRisk {
        token_address: SAMPLE_MINT.to_string(),
        risk_level: RiskLevel::Critical,
        risk_score: 85,
        confidence: 90,
        factors: Vec::new(),
        last_updated: chrono::Utc::now(),
        created_at: chrono::Utc::now(),
    });

    assert!(store.watch(SAMPLE_MINT));
    assert!(!store.watch(SAMPLE_MINT), "watching twice is a no-op");
    assert!(store.is_watched(SAMPLE_MINT));

    let stats = store.platform_stats();
    assert_eq!(stats.total_tokens_analyzed, 1);
    assert_eq!(stats.critical_risk_tokens, 1);
    assert_eq!(stats.watched_tokens, 1);

    assert!(store.unwatch(SAMPLE_MINT));
    assert!(!store.is_watched(SAMPLE_MINT));
}

#[test]
fn test_cache_round_trip_preserves_mint_case() {
    let cache = AnalysisCache::new();
    cache.set(SAMPLE_MINT, sample_analysis(SAMPLE_MINT, 20));

    assert!(cache.get(SAMPLE_MINT).is_some());
    // base58 is case sensitive, a lowercased key is a different token
    assert!(cache.get(&SAMPLE_MINT.to_lowercase()).is_none());
}

// ============================================
// Alerts
// ============================================

#[tokio::test]
async fn test_alert_dedupe_and_subscription_delivery_match() {
    let alerts = AlertService::new(Arc::new(Settings::from_env()));

    let first = alerts
        .raise_alert(
            SAMPLE_MINT,
            AlertType::HighRisk,
            RiskLevel::Critical,
            "Critical risk".to_string(),
            "score 90".to_string(),
            5,
        )
        .await;
    assert!(first.is_some());

    // Same (token, type) while unresolved: suppressed
    let second = alerts
        .raise_alert(
            SAMPLE_MINT,
            AlertType::HighRisk,
            RiskLevel::Critical,
            "Critical risk".to_string(),
            "score 91".to_string(),
            5,
        )
        .await;
    assert!(second.is_none());

    let sub = alerts.subscribe(
        "trader@example.com".to_string(),
        RiskLevel::High,
        Some(vec![SAMPLE_MINT.to_string()]),
        None,
    );
    assert!(sub.is_active);

    let matching = alerts.matching_subscriptions(&first.unwrap());
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].email, "trader@example.com");

    // Resolving reopens the dedupe slot
    assert_eq!(alerts.resolve_alerts(SAMPLE_MINT, AlertType::HighRisk), 1);
    let third = alerts
        .raise_alert(
            SAMPLE_MINT,
            AlertType::HighRisk,
            RiskLevel::High,
            "High risk".to_string(),
            "score 65".to_string(),
            4,
        )
        .await;
    assert!(third.is_some());
}

// ============================================
// Address validation
// ============================================

#[test]
fn test_mint_address_validation() {
    assert!(is_valid_mint(SAMPLE_MINT));
    assert!(is_valid_mint("6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P"));

    assert!(!is_valid_mint("short"));
    assert!(!is_valid_mint("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"));
    assert!(!is_valid_mint("contains!invalid#chars00000000000000000000"));
    assert!(!is_valid_mint(""));
}
