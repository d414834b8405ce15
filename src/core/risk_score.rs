//! Risk Scoring Module
//! Provides granular 0-100 risk scores instead of binary Safe/Rug
//!
//! This allows users to make informed decisions in "gray areas"

use serde::{Deserialize, Serialize};

use crate::core::honeypot::MintSecurityReport;
use crate::models::types::{RiskFactor, RiskLevel};

// ============================================
// FACTOR WEIGHTS
// ============================================

pub const WEIGHT_HOLDER_CONCENTRATION: f32 = 0.25;
pub const WEIGHT_LIQUIDITY_SECURITY: f32 = 0.20;
pub const WEIGHT_VOLUME_AUTHENTICITY: f32 = 0.15;
pub const WEIGHT_MINT_SECURITY: f32 = 0.15;
pub const WEIGHT_SOCIAL_CREDIBILITY: f32 = 0.10;
pub const WEIGHT_PRICE_STABILITY: f32 = 0.10;
pub const WEIGHT_TRADING_PATTERNS: f32 = 0.05;

/// Aggregated risk score (0-100)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScore {
    /// Overall score (0-100), weighted average over present factors
    pub total: u8,
    pub level: RiskLevel,
    /// Confidence level (0-100) - how sure are we about this score?
    pub confidence: u8,
    /// Human-readable recommendation
    pub recommendation: String,
    /// Detailed breakdown for transparency
    pub factors: Vec<RiskFactor>,
}

impl RiskScore {
    /// Aggregate factors into an overall score.
    /// The average is normalized by the weights actually present, so a
    /// degraded analysis with missing factors still lands on 0-100.
    pub fn calculate(factors: Vec<RiskFactor>) -> Self {
        let total_weight: f32 = factors.iter().map(|f| f.weight).sum();

        let total = if total_weight > 0.0 {
            let weighted: f32 = factors
                .iter()
                .map(|f| f.score as f32 * f.weight)
                .sum::<f32>()
                / total_weight;
            (weighted.round() as u8).min(100)
        } else {
            50
        };

        let level = RiskLevel::from_score(total);
        let confidence = Self::calculate_confidence(&factors);
        let recommendation = Self::generate_recommendation(total, confidence);

        Self {
            total,
            level,
            confidence,
            recommendation,
            factors,
        }
    }

    /// Confidence based on data availability: factors backed by evidence
    /// count full, factors that degraded count half.
    fn calculate_confidence(factors: &[RiskFactor]) -> u8 {
        if factors.is_empty() {
            return 30;
        }

        let sum: f32 = factors
            .iter()
            .map(|f| if f.evidence.is_empty() { 0.5 } else { 1.0 })
            .sum();

        ((sum / factors.len() as f32) * 100.0).round() as u8
    }

    /// Generate human-readable recommendation
    fn generate_recommendation(score: u8, confidence: u8) -> String {
        let risk_level = match score {
            0..=39 => "✅ LOW RISK",
            40..=59 => "🟠 MEDIUM RISK",
            60..=79 => "🔴 HIGH RISK",
            _ => "💀 CRITICAL RISK",
        };

        let confidence_note = match confidence {
            0..=40 => "(Low confidence - limited data)",
            41..=70 => "(Medium confidence)",
            _ => "(High confidence)",
        };

        let action = match score {
            0..=39 => "Proceed with standard caution.",
            40..=59 => "Manual review recommended. Consider a small test buy.",
            60..=79 => "High probability of loss. Avoid unless you understand the risks.",
            _ => "DO NOT PROCEED. Almost certain loss of funds.",
        };

        format!("{} {} - {}", risk_level, confidence_note, action)
    }

    /// Check if this is in the "gray area" requiring user judgement
    pub fn is_gray_area(&self) -> bool {
        (30..=70).contains(&self.total) || self.confidence < 60
    }
}

/// Builder for creating risk scores from analysis results
pub struct RiskScoreBuilder {
    factors: Vec<RiskFactor>,
}

impl RiskScoreBuilder {
    pub fn new() -> Self {
        Self {
            factors: Vec::new(),
        }
    }

    /// Holder concentration: share of supply held by the top 5 wallets.
    /// Exactly 70% lands in the 60-80 band (strictly-greater comparisons).
    pub fn with_holder_concentration(
        mut self,
        top5_percentage: f64,
        gini: f64,
        holder_count: usize,
    ) -> Self {
        if holder_count == 0 {
            self.factors.push(RiskFactor {
                name: "holder_concentration".to_string(),
                description: "No holder data available".to_string(),
                score: 100,
                weight: WEIGHT_HOLDER_CONCENTRATION,
                evidence: vec!["No holder data found".to_string()],
                recommendation: None,
            });
            return self;
        }

        let (score, level) = if top5_percentage > 80.0 {
            (100, "CRITICAL")
        } else if top5_percentage > 60.0 {
            (80, "HIGH")
        } else if top5_percentage > 40.0 {
            (60, "MEDIUM")
        } else {
            (30, "LOW")
        };

        self.factors.push(RiskFactor {
            name: "holder_concentration".to_string(),
            description: format!("Token holder concentration analysis ({})", level),
            score,
            weight: WEIGHT_HOLDER_CONCENTRATION,
            evidence: vec![
                format!("Top 5 holders control {:.1}% of supply", top5_percentage),
                format!("Gini coefficient: {:.3}", gini),
                format!("Total holders: {}", holder_count),
            ],
            recommendation: Some(if score > 60 {
                "Concentrated supply - a few wallets can dump on the market".to_string()
            } else {
                "Holder distribution looks healthy".to_string()
            }),
        });

        self
    }

    /// Liquidity security: how much of the pool is locked or burned
    pub fn with_liquidity_security(
        mut self,
        total_liquidity_sol: f64,
        locked_percentage: f64,
    ) -> Self {
        if total_liquidity_sol == 0.0 {
            self.factors.push(RiskFactor {
                name: "liquidity_security".to_string(),
                description: "No liquidity data available".to_string(),
                score: 100,
                weight: WEIGHT_LIQUIDITY_SECURITY,
                evidence: vec!["No liquidity data found".to_string()],
                recommendation: None,
            });
            return self;
        }

        let (score, level) = if locked_percentage < 20.0 {
            (100, "CRITICAL")
        } else if locked_percentage < 50.0 {
            (80, "HIGH")
        } else if locked_percentage < 80.0 {
            (50, "MEDIUM")
        } else {
            (20, "LOW")
        };

        self.factors.push(RiskFactor {
            name: "liquidity_security".to_string(),
            description: format!("Liquidity security analysis ({})", level),
            score,
            weight: WEIGHT_LIQUIDITY_SECURITY,
            evidence: vec![
                format!("Total liquidity: {:.2} SOL", total_liquidity_sol),
                format!("Locked percentage: {:.1}%", locked_percentage),
            ],
            recommendation: Some(if score > 60 {
                "Unlocked liquidity can be pulled at any moment".to_string()
            } else {
                "Liquidity security looks good".to_string()
            }),
        });

        self
    }

    /// Volume authenticity from the wash trading score (0.0 organic - 1.0 wash)
    pub fn with_volume_authenticity(
        mut self,
        wash_trading_score: f64,
        volume_24h_sol: f64,
        unique_traders: usize,
    ) -> Self {
        let (score, level) = if wash_trading_score > 0.8 {
            (100, "CRITICAL")
        } else if wash_trading_score > 0.6 {
            (80, "HIGH")
        } else if wash_trading_score > 0.4 {
            (50, "MEDIUM")
        } else {
            (20, "LOW")
        };

        self.factors.push(RiskFactor {
            name: "volume_authenticity".to_string(),
            description: format!("Volume authenticity analysis ({})", level),
            score,
            weight: WEIGHT_VOLUME_AUTHENTICITY,
            evidence: vec![
                format!("24h volume: {:.2} SOL", volume_24h_sol),
                format!("Unique traders: {}", unique_traders),
                format!("Wash trading score: {:.3}", wash_trading_score),
                format!("Volume authenticity: {:.3}", 1.0 - wash_trading_score),
            ],
            recommendation: Some(if score > 60 {
                "Volume appears artificial - exercise caution".to_string()
            } else {
                "Volume appears organic".to_string()
            }),
        });

        self
    }

    /// Mint security red flags (authorities, token-2022 extensions)
    pub fn with_mint_security(mut self, report: &MintSecurityReport) -> Self {
        let flag_count = report.red_flags.len();

        let (score, level) = if report.honeypot_suspected {
            (100, "CRITICAL")
        } else if flag_count > 3 {
            (80, "HIGH")
        } else if flag_count > 1 {
            (50, "MEDIUM")
        } else {
            (20, "LOW")
        };

        let evidence = if report.red_flags.is_empty() {
            vec!["No security issues detected".to_string()]
        } else {
            report.red_flags.clone()
        };

        self.factors.push(RiskFactor {
            name: "mint_security".to_string(),
            description: format!("Mint security analysis ({})", level),
            score,
            weight: WEIGHT_MINT_SECURITY,
            evidence,
            recommendation: Some(if report.honeypot_suspected {
                "Holders can be blocked from selling - treat as honeypot".to_string()
            } else if score > 60 {
                "Address security concerns before trading".to_string()
            } else {
                "Mint security looks good".to_string()
            }),
        });

        self
    }

    /// Social credibility from metadata links and optional mention counts.
    /// Higher social presence lowers the risk contribution.
    pub fn with_social_credibility(
        mut self,
        twitter_exists: bool,
        telegram_exists: bool,
        website_exists: bool,
        twitter_mentions: Option<u64>,
    ) -> Self {
        let mut social_score: f64 = 0.0;

        match twitter_mentions {
            Some(m) if m > 100 => social_score += 0.3,
            Some(m) if m > 10 => social_score += 0.1,
            _ if twitter_exists => social_score += 0.1,
            _ => {}
        }
        if telegram_exists {
            social_score += 0.3;
        }
        if website_exists {
            social_score += 0.2;
        }

        let score = (((1.0 - social_score).max(0.0)) * 100.0).round() as u8;
        let level = if score > 80 {
            "HIGH"
        } else if score > 50 {
            "MEDIUM"
        } else {
            "LOW"
        };

        self.factors.push(RiskFactor {
            name: "social_credibility".to_string(),
            description: format!("Social credibility analysis ({})", level),
            score,
            weight: WEIGHT_SOCIAL_CREDIBILITY,
            evidence: vec![
                format!("Twitter: {}", if twitter_exists { "linked" } else { "missing" }),
                format!("Telegram: {}", if telegram_exists { "linked" } else { "missing" }),
                format!("Website: {}", if website_exists { "linked" } else { "missing" }),
                format!(
                    "Twitter mentions (24h): {}",
                    twitter_mentions
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                ),
            ],
            recommendation: Some(if score > 60 {
                "Anonymous launch with no social footprint".to_string()
            } else {
                "Social credibility looks reasonable".to_string()
            }),
        });

        self
    }

    /// Price stability from trade price volatility (std dev / mean)
    pub fn with_price_stability(mut self, volatility: Option<f64>, data_points: usize) -> Self {
        let Some(volatility) = volatility else {
            self.factors.push(RiskFactor {
                name: "price_stability".to_string(),
                description: "Insufficient price data".to_string(),
                score: 50,
                weight: WEIGHT_PRICE_STABILITY,
                evidence: Vec::new(),
                recommendation: None,
            });
            return self;
        };

        let (score, level) = if volatility > 0.5 {
            (100, "CRITICAL")
        } else if volatility > 0.3 {
            (80, "HIGH")
        } else if volatility > 0.1 {
            (50, "MEDIUM")
        } else {
            (20, "LOW")
        };

        self.factors.push(RiskFactor {
            name: "price_stability".to_string(),
            description: format!("Price stability analysis ({})", level),
            score,
            weight: WEIGHT_PRICE_STABILITY,
            evidence: vec![
                format!("Price volatility: {:.3}", volatility),
                format!("Data points: {}", data_points),
            ],
            recommendation: Some(if score > 60 {
                "High volatility - trade with caution".to_string()
            } else {
                "Price appears stable".to_string()
            }),
        });

        self
    }

    /// Trading patterns: count of detected suspicious patterns
    pub fn with_trading_patterns(mut self, suspicious_patterns: Vec<String>) -> Self {
        let count = suspicious_patterns.len();

        let (score, level) = if count > 2 {
            (100, "CRITICAL")
        } else if count > 1 {
            (80, "HIGH")
        } else if count > 0 {
            (50, "MEDIUM")
        } else {
            (20, "LOW")
        };

        let evidence = if suspicious_patterns.is_empty() {
            vec!["No suspicious patterns detected".to_string()]
        } else {
            suspicious_patterns
        };

        self.factors.push(RiskFactor {
            name: "trading_patterns".to_string(),
            description: format!("Trading patterns analysis ({})", level),
            score,
            weight: WEIGHT_TRADING_PATTERNS,
            evidence,
            recommendation: Some(if score > 60 {
                "Suspicious trading patterns detected".to_string()
            } else {
                "Trading patterns appear normal".to_string()
            }),
        });

        self
    }

    /// A factor whose data source failed. Scores neutral so one dead
    /// provider does not swing the verdict either way.
    pub fn with_degraded_factor(mut self, name: &str, weight: f32) -> Self {
        self.factors.push(RiskFactor {
            name: name.to_string(),
            description: format!("{} analysis failed", name),
            score: 50,
            weight,
            evidence: Vec::new(),
            recommendation: None,
        });
        self
    }

    /// Build final risk score
    pub fn build(self) -> RiskScore {
        RiskScore::calculate(self.factors)
    }
}

impl Default for RiskScoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Gini coefficient over holder balances (0 = equal, 1 = one whale)
pub fn gini_coefficient(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len() as f64;
    let total: f64 = sorted.iter().sum();
    if total == 0.0 {
        return 0.0;
    }

    let cumsum: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| v * (i as f64 + 1.0))
        .sum();

    (2.0 * cumsum) / (n * total) - (n + 1.0) / n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_token_scores_low() {
        let score = RiskScoreBuilder::new()
            .with_holder_concentration(25.0, 0.3, 200)
            .with_liquidity_security(150.0, 100.0)
            .with_volume_authenticity(0.1, 500.0, 120)
            .with_social_credibility(true, true, true, Some(500))
            .with_price_stability(Some(0.05), 300)
            .with_trading_patterns(Vec::new())
            .build();

        assert_eq!(score.level, RiskLevel::Low, "total was {}", score.total);
        assert!(score.recommendation.contains("LOW RISK"));
    }

    #[test]
    fn test_rug_setup_scores_critical() {
        let score = RiskScoreBuilder::new()
            .with_holder_concentration(92.0, 0.95, 8)
            .with_liquidity_security(3.0, 0.0)
            .with_volume_authenticity(0.9, 40.0, 3)
            .with_social_credibility(false, false, false, None)
            .with_price_stability(Some(0.7), 50)
            .with_trading_patterns(vec![
                "Rapid trading detected".to_string(),
                "Coordinated buying detected".to_string(),
                "Wash trading detected".to_string(),
            ])
            .build();

        assert!(score.total >= 80, "total was {}", score.total);
        assert_eq!(score.level, RiskLevel::Critical);
    }

    #[test]
    fn test_exactly_seventy_percent_is_high_band() {
        let score = RiskScoreBuilder::new()
            .with_holder_concentration(70.0, 0.5, 50)
            .build();

        // 70% is above the >60 cut but not above >80
        assert_eq!(score.factors[0].score, 80);
    }

    #[test]
    fn test_holder_band_boundaries() {
        for (pct, expected) in [(80.0, 80), (80.1, 100), (60.0, 60), (40.0, 30), (40.1, 60)] {
            let score = RiskScoreBuilder::new()
                .with_holder_concentration(pct, 0.5, 50)
                .build();
            assert_eq!(score.factors[0].score, expected, "top5 = {}", pct);
        }
    }

    #[test]
    fn test_empty_holders_scores_max() {
        let score = RiskScoreBuilder::new()
            .with_holder_concentration(0.0, 0.0, 0)
            .build();
        assert_eq!(score.factors[0].score, 100);
        assert_eq!(score.factors[0].evidence, vec!["No holder data found"]);
        // Missing data is still evidence, so confidence stays full
        assert_eq!(score.confidence, 100);
    }

    #[test]
    fn test_zero_liquidity_scores_max() {
        let score = RiskScoreBuilder::new()
            .with_liquidity_security(0.0, 0.0)
            .build();
        assert_eq!(score.factors[0].score, 100);
        assert_eq!(score.factors[0].evidence, vec!["No liquidity data found"]);
    }

    #[test]
    fn test_normalization_over_present_weights() {
        // Single factor at 80 should yield total 80, not 80 * weight
        let score = RiskScoreBuilder::new()
            .with_holder_concentration(70.0, 0.5, 50)
            .build();
        assert_eq!(score.total, 80);
    }

    #[test]
    fn test_no_factors_is_neutral_low_confidence() {
        let score = RiskScoreBuilder::new().build();
        assert_eq!(score.total, 50);
        assert_eq!(score.confidence, 30);
    }

    #[test]
    fn test_degraded_factor_lowers_confidence() {
        let full = RiskScoreBuilder::new()
            .with_holder_concentration(25.0, 0.3, 200)
            .with_liquidity_security(150.0, 100.0)
            .build();
        let degraded = RiskScoreBuilder::new()
            .with_holder_concentration(25.0, 0.3, 200)
            .with_degraded_factor("liquidity_security", WEIGHT_LIQUIDITY_SECURITY)
            .build();

        assert!(degraded.confidence < full.confidence);
    }

    #[test]
    fn test_gini_coefficient() {
        assert_eq!(gini_coefficient(&[]), 0.0);
        assert_eq!(gini_coefficient(&[100.0]), 0.0);

        // Perfect equality
        let equal = gini_coefficient(&[10.0, 10.0, 10.0, 10.0]);
        assert!(equal.abs() < 0.01, "gini was {}", equal);

        // One whale holds nearly everything
        let whale = gini_coefficient(&[1000.0, 1.0, 1.0, 1.0]);
        assert!(whale > 0.7, "gini was {}", whale);
    }

    #[test]
    fn test_gray_area_detection() {
        let score = RiskScoreBuilder::new()
            .with_holder_concentration(50.0, 0.5, 40)
            .with_liquidity_security(20.0, 60.0)
            .build();

        assert!(score.is_gray_area());
    }
}
