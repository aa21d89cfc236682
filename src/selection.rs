//! Winner selection
//!
//! # Algorithm
//!
//! 1. Collect: duplicate ticket ids collapse to one ticket, then every
//!    distinct ticket is scored:
//!    ```text
//!    score = SHA-256(seed_hex ‖ ":" ‖ ticket)
//!    ```
//!
//! 2. Lowest score wins. A unique minimum resolves the draw as `direct`.
//!
//! 3. Tie-break: while several tickets share the minimum, each is rescored
//!    with a round-salted seed, up to `tie_breaker_rounds` rounds:
//!    ```text
//!    score = SHA-256(seed_hex ‖ ":" ‖ ticket ‖ ":tb" ‖ round ‖ ":" ‖ ticket)
//!    ```
//!    Only tickets still tied after a round go on to the next one.
//!
//! 4. Fallback: if rounds run out, the smallest ticket id among the tied set
//!    wins.
//!
//! Every step is a pure function of (seed, ticket set), so anyone can rerun
//! it. The [`Proof`] only records which step produced the winner.

use crate::crypto::{tie_break_score, Sha256Scorer, TicketScorer};
use crate::types::{DrawConfig, LotteryError, Score, TicketId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};

/// Primary score of every distinct ticket, ordered by ticket id
pub type ScoreTable = BTreeMap<TicketId, Score>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackReason {
    #[serde(rename = "min_ticket_number")]
    MinTicketId,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::MinTicketId => f.write_str("minimum ticket id"),
        }
    }
}

/// How the winner was reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Resolution {
    #[serde(rename = "direct")]
    Direct,

    #[serde(rename = "tie-breaker", rename_all = "camelCase")]
    TieBreaker {
        tie_breaker_round: u32,
        tie_breaker_score: Score,
    },

    #[serde(rename = "fallback", rename_all = "camelCase")]
    Fallback {
        tie_breaker_rounds: u32,
        fallback_reason: FallbackReason,
    },
}

impl Resolution {
    pub fn method(&self) -> &'static str {
        match self {
            Resolution::Direct => "direct",
            Resolution::TieBreaker { .. } => "tie-breaker",
            Resolution::Fallback { .. } => "fallback",
        }
    }

    pub fn is_tie_broken(&self) -> bool {
        !matches!(self, Resolution::Direct)
    }
}

/// Audit record for a selected winner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    seed: String,
    winner: TicketId,
    /// Primary (round 0) minimum score
    winner_score: Score,
    tie_breaker: bool,
    #[serde(flatten)]
    resolution: Resolution,
}

impl Proof {
    fn new(seed: &str, winner: TicketId, winner_score: Score, resolution: Resolution) -> Self {
        Self {
            seed: seed.to_string(),
            winner,
            winner_score,
            tie_breaker: resolution.is_tie_broken(),
            resolution,
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn winner(&self) -> TicketId {
        self.winner
    }

    pub fn winner_score(&self) -> Score {
        self.winner_score
    }

    pub fn tie_breaker(&self) -> bool {
        self.tie_breaker
    }

    pub fn method(&self) -> &'static str {
        self.resolution.method()
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }
}

/// Outcome of one selection pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub winner: TicketId,
    pub scores: ScoreTable,
    pub proof: Proof,
}

/// Selector state. `Direct` and `Fallback` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Direct,
    TieBreak(u32),
    Fallback,
}

/// Runs the selection cascade with a given scorer
#[derive(Debug, Clone, Default)]
pub struct WinnerSelector<S = Sha256Scorer> {
    scorer: S,
    config: DrawConfig,
}

impl WinnerSelector<Sha256Scorer> {
    pub fn new(config: DrawConfig) -> Result<Self, LotteryError> {
        Self::with_scorer(Sha256Scorer, config)
    }
}

impl<S: TicketScorer> WinnerSelector<S> {
    pub fn with_scorer(scorer: S, config: DrawConfig) -> Result<Self, LotteryError> {
        config.validate()?;
        Ok(Self { scorer, config })
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    /// Primary scores for the distinct tickets in `tickets`
    pub fn score_all(&self, seed_hex: &str, tickets: &[TicketId]) -> ScoreTable {
        let unique: BTreeSet<TicketId> = tickets.iter().copied().collect();
        unique
            .into_iter()
            .map(|ticket| (ticket, self.scorer.score(seed_hex, ticket)))
            .collect()
    }

    pub fn select(&self, seed_hex: &str, tickets: &[TicketId]) -> Result<Selection, LotteryError> {
        let scores = self.score_all(seed_hex, tickets);

        let min_score = scores
            .values()
            .min()
            .copied()
            .ok_or_else(|| LotteryError::InvalidInput("no tickets provided".into()))?;

        // Ascending ticket order, inherited from the table
        let mut tied: Vec<TicketId> = scores
            .iter()
            .filter(|(_, score)| **score == min_score)
            .map(|(ticket, _)| *ticket)
            .collect();

        let mut stage = if tied.len() == 1 {
            Stage::Direct
        } else {
            info!("Tie detected between tickets: {:?}", tied);
            Stage::TieBreak(1)
        };

        let (winner, resolution) = loop {
            match stage {
                Stage::Direct => break (tied[0], Resolution::Direct),

                Stage::TieBreak(round) if round > self.config.tie_breaker_rounds => {
                    stage = Stage::Fallback;
                }

                Stage::TieBreak(round) => {
                    info!("Tie-breaker round {}", round);
                    let round_scores: Vec<(TicketId, Score)> = tied
                        .iter()
                        .map(|&ticket| {
                            (ticket, tie_break_score(&self.scorer, seed_hex, ticket, round))
                        })
                        .collect();

                    // `tied` holds at least two tickets, so the fold sees real scores
                    let round_min = round_scores
                        .iter()
                        .map(|(_, s)| *s)
                        .fold(Score::MAX, Ord::min);
                    tied = round_scores
                        .into_iter()
                        .filter(|(_, score)| *score == round_min)
                        .map(|(ticket, _)| ticket)
                        .collect();

                    if tied.len() == 1 {
                        break (
                            tied[0],
                            Resolution::TieBreaker {
                                tie_breaker_round: round,
                                tie_breaker_score: round_min,
                            },
                        );
                    }
                    stage = Stage::TieBreak(round + 1);
                }

                Stage::Fallback => {
                    // Still ascending: each round filters without reordering
                    let winner = tied[0];
                    warn!(
                        "Tie unresolved after {} rounds, falling back to minimum ticket id {}",
                        self.config.tie_breaker_rounds, winner
                    );
                    break (
                        winner,
                        Resolution::Fallback {
                            tie_breaker_rounds: self.config.tie_breaker_rounds,
                            fallback_reason: FallbackReason::MinTicketId,
                        },
                    );
                }
            }
        };

        debug!(
            "Selected ticket {} from {} tickets ({})",
            winner,
            scores.len(),
            resolution.method()
        );

        Ok(Selection {
            winner,
            proof: Proof::new(seed_hex, winner, min_score, resolution),
            scores,
        })
    }
}

/// Select a winner with the default scorer and config
pub fn pick_winner(seed_hex: &str, tickets: &[TicketId]) -> Result<Selection, LotteryError> {
    WinnerSelector::new(DrawConfig::default())?.select(seed_hex, tickets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tickets() {
        let err = pick_winner("00", &[]).unwrap_err();
        assert!(matches!(err, LotteryError::InvalidInput(_)));
    }

    #[test]
    fn test_single_ticket_direct() {
        let selection = pick_winner("anything", &[7]).unwrap();
        assert_eq!(selection.winner, 7);
        assert_eq!(selection.proof.method(), "direct");
        assert!(!selection.proof.tie_breaker());
        assert_eq!(selection.scores.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(WinnerSelector::new(DrawConfig::with_rounds(0)).is_err());
    }

    #[test]
    fn test_proof_json_direct() {
        let selection = pick_winner("seed", &[1, 2, 3]).unwrap();
        let json = serde_json::to_value(&selection.proof).unwrap();
        assert_eq!(json["method"], "direct");
        assert_eq!(json["tieBreaker"], false);
        assert!(json["winnerScore"].is_string());
        assert!(json.get("tieBreakerRound").is_none());
    }

    #[test]
    fn test_fallback_reason_display() {
        assert_eq!(FallbackReason::MinTicketId.to_string(), "minimum ticket id");
        assert_eq!(
            serde_json::to_string(&FallbackReason::MinTicketId).unwrap(),
            "\"min_ticket_number\""
        );
    }
}
