//! Draw assembly and the hash-source boundary
//!
//! Fetching block hashes (and deciding how many confirmations make one
//! final) is the job of a [`HashSource`]. A draw only runs once the source
//! has handed over the complete sequence; a failing or short source aborts
//! the draw. There is no local fallback seed.

use crate::crypto::{derive_seed, TicketScorer};
use crate::selection::{Proof, ScoreTable, WinnerSelector};
use crate::types::{DrawConfig, LotteryError, Seed, TicketId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One externally supplied block hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashMaterial {
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
}

impl HashMaterial {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into(), height: None }
    }

    pub fn at_height(hash: impl Into<String>, height: u64) -> Self {
        Self { hash: hash.into(), height: Some(height) }
    }
}

/// Supplier of finalized block hashes
pub trait HashSource {
    /// Return exactly `count` hashes in draw order, or an error
    fn fetch(&self, count: usize) -> Result<Vec<HashMaterial>, LotteryError>;
}

/// Serves a list fixed up front
#[derive(Debug, Clone, Default)]
pub struct FixedHashSource {
    hashes: Vec<HashMaterial>,
}

impl FixedHashSource {
    pub fn new(hashes: Vec<HashMaterial>) -> Self {
        Self { hashes }
    }

    pub fn from_hashes<S: Into<String>>(hashes: impl IntoIterator<Item = S>) -> Self {
        Self::new(hashes.into_iter().map(HashMaterial::new).collect())
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl HashSource for FixedHashSource {
    fn fetch(&self, count: usize) -> Result<Vec<HashMaterial>, LotteryError> {
        if self.hashes.len() < count {
            return Err(LotteryError::IncompleteHashMaterial {
                expected: count,
                got: self.hashes.len(),
            });
        }
        Ok(self.hashes[..count].to_vec())
    }
}

/// Published output of one draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    winner: TicketId,
    seed_hex: Seed,
    block_hashes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    block_heights: Vec<u64>,
    /// Tickets as supplied, duplicates included
    tickets: Vec<TicketId>,
    all_scores: ScoreTable,
    proof: Proof,
}

impl DrawResult {
    pub fn winner(&self) -> TicketId {
        self.winner
    }

    pub fn seed(&self) -> Seed {
        self.seed_hex
    }

    pub fn seed_hex(&self) -> String {
        self.seed_hex.to_hex()
    }

    pub fn block_hashes(&self) -> &[String] {
        &self.block_hashes
    }

    pub fn block_heights(&self) -> &[u64] {
        &self.block_heights
    }

    pub fn tickets(&self) -> &[TicketId] {
        &self.tickets
    }

    pub fn all_scores(&self) -> &ScoreTable {
        &self.all_scores
    }

    pub fn proof(&self) -> &Proof {
        &self.proof
    }

    pub fn to_json(&self) -> Result<String, LotteryError> {
        serde_json::to_string(self).map_err(|e| LotteryError::Serialization(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, LotteryError> {
        serde_json::to_string_pretty(self).map_err(|e| LotteryError::Serialization(e.to_string()))
    }

    pub fn from_json(data: &str) -> Result<Self, LotteryError> {
        serde_json::from_str(data).map_err(|e| LotteryError::Serialization(e.to_string()))
    }
}

/// Run one draw over already-retrieved hash material
pub fn compute_draw<S: TicketScorer>(
    selector: &WinnerSelector<S>,
    hashes: &[HashMaterial],
    tickets: &[TicketId],
) -> Result<DrawResult, LotteryError> {
    let block_hashes: Vec<String> = hashes.iter().map(|h| h.hash.clone()).collect();
    // Heights are published only when every hash carries one
    let block_heights: Vec<u64> = hashes
        .iter()
        .map(|h| h.height)
        .collect::<Option<_>>()
        .unwrap_or_default();

    let seed = derive_seed(&block_hashes)?;
    let selection = selector.select(&seed.to_hex(), tickets)?;

    debug!(
        "Draw over {} hashes and {} tickets: seed {}, winner {}",
        block_hashes.len(),
        selection.scores.len(),
        seed,
        selection.winner
    );

    Ok(DrawResult {
        winner: selection.winner,
        seed_hex: seed,
        block_hashes,
        block_heights,
        tickets: tickets.to_vec(),
        all_scores: selection.scores,
        proof: selection.proof,
    })
}

/// Draw from bare hash strings with the default config
pub fn get_lottery_result<S: AsRef<str>>(
    block_hashes: &[S],
    tickets: &[TicketId],
) -> Result<DrawResult, LotteryError> {
    let hashes: Vec<HashMaterial> = block_hashes
        .iter()
        .map(|h| HashMaterial::new(h.as_ref()))
        .collect();
    compute_draw(&WinnerSelector::new(DrawConfig::default())?, &hashes, tickets)
}

/// Fetch `count` hashes from `source` and run the draw.
///
/// Fails closed: any source error or short sequence aborts before scoring.
pub fn conduct_draw<H: HashSource + ?Sized>(
    source: &H,
    count: usize,
    tickets: &[TicketId],
    config: DrawConfig,
) -> Result<DrawResult, LotteryError> {
    if count == 0 {
        return Err(LotteryError::InvalidInput("block count must be > 0".into()));
    }
    if tickets.is_empty() {
        return Err(LotteryError::InvalidInput("no tickets provided".into()));
    }
    let selector = WinnerSelector::new(config)?;

    let hashes = source.fetch(count)?;
    if hashes.len() != count {
        return Err(LotteryError::IncompleteHashMaterial {
            expected: count,
            got: hashes.len(),
        });
    }

    let result = compute_draw(&selector, &hashes, tickets)?;
    info!(
        "Draw complete: winner #{} ({}) seed {}",
        result.winner(),
        result.proof().method(),
        result.seed()
    );
    Ok(result)
}

/// Draw request as accepted by the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRequest {
    pub block_hashes: Vec<String>,
    #[serde(default)]
    pub block_heights: Vec<u64>,
    pub tickets: Vec<TicketId>,
}

impl DrawRequest {
    /// Pair hashes with heights; heights are dropped unless one per hash is given
    pub fn hash_material(&self) -> Vec<HashMaterial> {
        if self.block_heights.len() == self.block_hashes.len() {
            self.block_hashes
                .iter()
                .zip(&self.block_heights)
                .map(|(hash, &height)| HashMaterial::at_height(hash.clone(), height))
                .collect()
        } else {
            self.block_hashes.iter().map(|h| HashMaterial::new(h.clone())).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    impl HashSource for FailingSource {
        fn fetch(&self, _count: usize) -> Result<Vec<HashMaterial>, LotteryError> {
            Err(LotteryError::HashSource("node unreachable".into()))
        }
    }

    #[test]
    fn test_failing_source_aborts() {
        let err = conduct_draw(&FailingSource, 3, &[1, 2], DrawConfig::default()).unwrap_err();
        assert!(matches!(err, LotteryError::HashSource(_)));
    }

    #[test]
    fn test_short_source_aborts() {
        let source = FixedHashSource::from_hashes(["aa", "bb"]);
        let err = conduct_draw(&source, 3, &[1, 2], DrawConfig::default()).unwrap_err();
        assert_eq!(err, LotteryError::IncompleteHashMaterial { expected: 3, got: 2 });
    }

    #[test]
    fn test_zero_count_rejected() {
        let source = FixedHashSource::from_hashes(["aa"]);
        assert!(conduct_draw(&source, 0, &[1], DrawConfig::default()).is_err());
    }

    #[test]
    fn test_heights_only_when_complete() {
        let partial = vec![HashMaterial::at_height("aa", 10), HashMaterial::new("bb")];
        let selector = WinnerSelector::new(DrawConfig::default()).unwrap();
        let result = compute_draw(&selector, &partial, &[1]).unwrap();
        assert!(result.block_heights().is_empty());

        let full = vec![HashMaterial::at_height("aa", 10), HashMaterial::at_height("bb", 9)];
        let result = compute_draw(&selector, &full, &[1]).unwrap();
        assert_eq!(result.block_heights(), &[10, 9]);
    }

    #[test]
    fn test_request_pairs_heights() {
        let request: DrawRequest = serde_json::from_str(
            r#"{"blockHashes": ["aa", "bb"], "blockHeights": [5, 4], "tickets": [1, 1, 2]}"#,
        )
        .unwrap();
        let material = request.hash_material();
        assert_eq!(material[0], HashMaterial::at_height("aa", 5));
        assert_eq!(material[1], HashMaterial::at_height("bb", 4));
        assert_eq!(request.tickets, vec![1, 1, 2]);
    }
}
