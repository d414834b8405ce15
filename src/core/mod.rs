//! Core analysis engine
//!
//! - `risk_score`: weighted factor scoring (0-100)
//! - `honeypot`: mint authority / extension red flags
//! - `analyzer`: full pipeline + monitoring loop
//! - `alerts`: alert log, subscriptions, delivery

pub mod alerts;
pub mod analyzer;
pub mod honeypot;
pub mod risk_score;

pub use alerts::AlertService;
pub use analyzer::RiskAnalyzer;
pub use honeypot::MintSecurityReport;
pub use risk_score::{RiskScore, RiskScoreBuilder};
