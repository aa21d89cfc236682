//! Result verification
//!
//! Both entry points rerun the selection from public data and never return
//! an error: malformed input yields an invalid verdict with a message.

use crate::crypto::{derive_seed, TicketScorer};
use crate::draw::DrawResult;
use crate::selection::WinnerSelector;
use crate::types::{DrawConfig, LotteryError, TicketId};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub valid: bool,
    pub message: String,
}

impl Verdict {
    pub fn accepted(message: String) -> Self {
        Self { valid: true, message }
    }

    pub fn rejected(message: String) -> Self {
        warn!("Verification failed: {}", message);
        Self { valid: false, message }
    }

    /// Invalid verdict for a check that could not run
    pub fn from_error(error: &LotteryError) -> Self {
        Self::rejected(format!("✗ Verification error: {}", error))
    }
}

/// Check a claimed winner against (seed, tickets) with the default config
pub fn verify(seed_hex: &str, tickets: &[TicketId], claimed_winner: TicketId) -> Verdict {
    match WinnerSelector::new(DrawConfig::default()) {
        Ok(selector) => verify_with(&selector, seed_hex, tickets, claimed_winner),
        Err(e) => Verdict::from_error(&e),
    }
}

pub fn verify_with<S: TicketScorer>(
    selector: &WinnerSelector<S>,
    seed_hex: &str,
    tickets: &[TicketId],
    claimed_winner: TicketId,
) -> Verdict {
    match selector.select(seed_hex, tickets) {
        Ok(selection) if selection.winner == claimed_winner => {
            Verdict::accepted(format!("✓ Verified! Winner is ticket #{}", selection.winner))
        }
        Ok(selection) => Verdict::rejected(format!(
            "✗ Invalid! Expected winner: #{}, claimed: #{}",
            selection.winner, claimed_winner
        )),
        Err(e) => Verdict::from_error(&e),
    }
}

/// Recheck a whole published record: seed, score table, winner and proof
pub fn audit(result: &DrawResult) -> Verdict {
    match WinnerSelector::new(DrawConfig::default()) {
        Ok(selector) => audit_with(&selector, result),
        Err(e) => Verdict::from_error(&e),
    }
}

pub fn audit_with<S: TicketScorer>(selector: &WinnerSelector<S>, result: &DrawResult) -> Verdict {
    let seed = match derive_seed(result.block_hashes()) {
        Ok(seed) => seed,
        Err(e) => return Verdict::from_error(&e),
    };
    if seed != result.seed() {
        return Verdict::rejected(format!(
            "✗ Invalid! Block hashes give seed {}, published: {}",
            seed,
            result.seed()
        ));
    }

    let seed_hex = seed.to_hex();
    let selection = match selector.select(&seed_hex, result.tickets()) {
        Ok(selection) => selection,
        Err(e) => return Verdict::from_error(&e),
    };

    if selection.winner != result.winner() {
        return Verdict::rejected(format!(
            "✗ Invalid! Expected winner: #{}, claimed: #{}",
            selection.winner,
            result.winner()
        ));
    }

    if &selection.scores != result.all_scores() {
        let published = result.all_scores();
        let mismatch = selection
            .scores
            .iter()
            .find(|&(ticket, score)| published.get(ticket) != Some(score))
            .map(|(ticket, _)| *ticket)
            .or_else(|| {
                published
                    .keys()
                    .find(|&ticket| !selection.scores.contains_key(ticket))
                    .copied()
            })
            .map(|ticket| format!("ticket #{}", ticket))
            .unwrap_or_default();
        return Verdict::rejected(format!("✗ Invalid! Score table mismatch at {}", mismatch));
    }

    if &selection.proof != result.proof() {
        return Verdict::rejected(format!(
            "✗ Invalid! Proof mismatch: expected method {}, published {}",
            selection.proof.method(),
            result.proof().method()
        ));
    }

    Verdict::accepted(format!("✓ Verified! Winner is ticket #{}", selection.winner))
}
