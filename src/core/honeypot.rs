//! Mint Security Module
//!
//! SPL tokens cannot hide a sell-blocking tax in bytecode the way EVM
//! honeypots do. What they CAN do:
//! - keep the freeze authority and freeze buyer token accounts
//! - install a token-2022 transfer hook that rejects transfers
//! - keep the mint authority and dilute holders at will
//! - charge confiscatory transfer fees (token-2022 transferFeeConfig)
//!
//! This module turns a jsonParsed mint account into an explicit list of
//! red flags plus a honeypot verdict the risk score can consume.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::providers::solana::MintAccount;
use crate::utils::constants::{TOKEN_2022_PROGRAM, TOKEN_PROGRAM};

/// Extensions that let the authority block or confiscate transfers
const HONEYPOT_EXTENSIONS: &[&str] = &["transferHook", "permanentDelegate"];

/// Security report for a mint account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintSecurityReport {
    /// Mint authority still set (supply can be inflated)
    pub mint_authority: Option<String>,
    /// Freeze authority still set (accounts can be frozen)
    pub freeze_authority: Option<String>,
    /// Token-2022 extension names present on the mint
    pub extensions: Vec<String>,
    /// Human-readable findings
    pub red_flags: Vec<String>,
    /// True when holders can be prevented from selling
    pub honeypot_suspected: bool,
    /// Mint owned by an unknown program (not spl-token / token-2022)
    pub unknown_program: bool,
}

impl MintSecurityReport {
    /// Evaluate a parsed mint account
    pub fn evaluate(mint: &MintAccount) -> Self {
        let mut red_flags = Vec::new();
        let mut honeypot_suspected = false;

        let unknown_program =
            mint.owner_program != TOKEN_PROGRAM && mint.owner_program != TOKEN_2022_PROGRAM;
        if unknown_program {
            red_flags.push(format!(
                "Mint owned by unrecognized program {}",
                mint.owner_program
            ));
            honeypot_suspected = true;
        }

        if let Some(authority) = &mint.mint_authority {
            red_flags.push(format!(
                "Mint authority retained ({}) - supply can be inflated",
                authority
            ));
        }

        if let Some(authority) = &mint.freeze_authority {
            red_flags.push(format!(
                "Freeze authority retained ({}) - holder accounts can be frozen",
                authority
            ));
            honeypot_suspected = true;
        }

        for ext in &mint.extensions {
            match ext.as_str() {
                "transferHook" => {
                    red_flags.push(
                        "Transfer hook extension - transfers can be rejected by custom program"
                            .to_string(),
                    );
                    honeypot_suspected = true;
                }
                "permanentDelegate" => {
                    red_flags.push(
                        "Permanent delegate extension - tokens can be seized from any wallet"
                            .to_string(),
                    );
                    honeypot_suspected = true;
                }
                "transferFeeConfig" => {
                    red_flags.push("Transfer fee extension - every transfer is taxed".to_string());
                }
                "defaultAccountState" => {
                    red_flags.push(
                        "Default account state extension - new accounts may start frozen"
                            .to_string(),
                    );
                    honeypot_suspected = true;
                }
                "nonTransferable" => {
                    red_flags.push("Non-transferable extension - tokens cannot move".to_string());
                    honeypot_suspected = true;
                }
                _ => {}
            }
        }

        if honeypot_suspected {
            info!(
                "⚠️ Honeypot suspected: {} red flag(s) on mint",
                red_flags.len()
            );
        }

        Self {
            mint_authority: mint.mint_authority.clone(),
            freeze_authority: mint.freeze_authority.clone(),
            extensions: mint.extensions.clone(),
            red_flags,
            honeypot_suspected,
            unknown_program,
        }
    }

    /// Report for a mint account we could not fetch
    pub fn unavailable() -> Self {
        Self {
            mint_authority: None,
            freeze_authority: None,
            extensions: Vec::new(),
            red_flags: vec!["Mint account unavailable".to_string()],
            honeypot_suspected: false,
            unknown_program: false,
        }
    }

    /// True if any extension is in the hard-block list
    pub fn has_blocking_extension(&self) -> bool {
        self.extensions
            .iter()
            .any(|e| HONEYPOT_EXTENSIONS.contains(&e.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_mint() -> MintAccount {
        MintAccount {
            owner_program: TOKEN_PROGRAM.to_string(),
            mint_authority: None,
            freeze_authority: None,
            decimals: 6,
            supply: "1000000000000000".to_string(),
            extensions: Vec::new(),
        }
    }

    #[test]
    fn test_clean_mint_has_no_flags() {
        let report = MintSecurityReport::evaluate(&clean_mint());
        assert!(report.red_flags.is_empty());
        assert!(!report.honeypot_suspected);
        assert!(!report.unknown_program);
    }

    #[test]
    fn test_freeze_authority_is_honeypot() {
        let mut mint = clean_mint();
        mint.freeze_authority = Some("Freeze111".to_string());

        let report = MintSecurityReport::evaluate(&mint);
        assert!(report.honeypot_suspected);
        assert_eq!(report.red_flags.len(), 1);
    }

    #[test]
    fn test_mint_authority_flags_without_honeypot() {
        let mut mint = clean_mint();
        mint.mint_authority = Some("Auth111".to_string());

        let report = MintSecurityReport::evaluate(&mint);
        assert!(!report.honeypot_suspected);
        assert_eq!(report.red_flags.len(), 1);
    }

    #[test]
    fn test_transfer_hook_is_honeypot() {
        let mut mint = clean_mint();
        mint.owner_program = TOKEN_2022_PROGRAM.to_string();
        mint.extensions = vec!["transferHook".to_string()];

        let report = MintSecurityReport::evaluate(&mint);
        assert!(report.honeypot_suspected);
        assert!(report.has_blocking_extension());
    }

    #[test]
    fn test_transfer_fee_flags_without_honeypot() {
        let mut mint = clean_mint();
        mint.owner_program = TOKEN_2022_PROGRAM.to_string();
        mint.extensions = vec!["transferFeeConfig".to_string()];

        let report = MintSecurityReport::evaluate(&mint);
        assert!(!report.honeypot_suspected);
        assert_eq!(report.red_flags.len(), 1);
        assert!(!report.has_blocking_extension());
    }

    #[test]
    fn test_unknown_program_is_honeypot() {
        let mut mint = clean_mint();
        mint.owner_program = "Ma1iciousProgram111".to_string();

        let report = MintSecurityReport::evaluate(&mint);
        assert!(report.honeypot_suspected);
        assert!(report.unknown_program);
    }
}
