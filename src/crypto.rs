use crate::types::{Hash, LotteryError, Score, Seed, TicketId};
use sha2::{Digest, Sha256};

pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Derive the draw seed from block hashes.
///
/// Hashes are concatenated as text, in the order given, with no separator.
/// They are never validated or normalized: the exact strings are part of the
/// public draw parameters.
pub fn derive_seed<S: AsRef<str>>(block_hashes: &[S]) -> Result<Seed, LotteryError> {
    if block_hashes.is_empty() {
        return Err(LotteryError::InvalidInput("no block hashes provided".into()));
    }

    let mut hasher = Sha256::new();
    for hash in block_hashes {
        hasher.update(hash.as_ref().as_bytes());
    }
    Ok(Seed::from_bytes(hasher.finalize().into()))
}

/// Maps (seed text, ticket) to a score.
///
/// Implementations must be pure: the same inputs always give the same score.
pub trait TicketScorer {
    fn score(&self, seed_hex: &str, ticket: TicketId) -> Score;
}

impl<S: TicketScorer + ?Sized> TicketScorer for &S {
    fn score(&self, seed_hex: &str, ticket: TicketId) -> Score {
        (**self).score(seed_hex, ticket)
    }
}

/// Production scorer: `SHA-256("{seed_hex}:{ticket}")` read as a big-endian integer
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Scorer;

impl TicketScorer for Sha256Scorer {
    fn score(&self, seed_hex: &str, ticket: TicketId) -> Score {
        score_ticket(seed_hex, ticket)
    }
}

pub fn score_ticket(seed_hex: &str, ticket: TicketId) -> Score {
    let input = format!("{}:{}", seed_hex, ticket);
    Score::from_be_bytes(sha256(input.as_bytes()))
}

/// Seed text for a tie-break round.
///
/// The ticket id appears here and again when the scorer appends it, so the
/// hashed input is `"{seed}:{ticket}:tb{round}:{ticket}"`. Published draws
/// depend on this exact layout.
pub fn tie_break_seed(seed_hex: &str, ticket: TicketId, round: u32) -> String {
    format!("{}:{}:tb{}", seed_hex, ticket, round)
}

/// Round-salted score for a ticket still tied after the primary pass
pub fn tie_break_score<S: TicketScorer + ?Sized>(
    scorer: &S,
    seed_hex: &str,
    ticket: TicketId,
    round: u32,
) -> Score {
    scorer.score(&tie_break_seed(seed_hex, ticket, round), ticket)
}
