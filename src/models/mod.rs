//! Domain models, configuration and error taxonomy

pub mod config;
pub mod errors;
pub mod types;

pub use config::Settings;
pub use errors::{AppError, AppResult, ErrorCode};
pub use types::{
    Alert, AlertSubscription, AlertType, HolderInfo, LiquidityInfo, PlatformStats, RiskFactor,
    RiskLevel, SocialInfo, TokenAnalysis, TokenRisk, TransactionInfo, VolumeInfo,
};
