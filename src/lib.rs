pub mod crypto;
pub mod draw;
pub mod selection;
pub mod types;
pub mod verify;

pub use crypto::{derive_seed, score_ticket, sha256, tie_break_seed, Sha256Scorer, TicketScorer};
pub use draw::{
    compute_draw, conduct_draw, get_lottery_result, DrawRequest, DrawResult, FixedHashSource,
    HashMaterial, HashSource,
};
pub use selection::{
    pick_winner, FallbackReason, Proof, Resolution, ScoreTable, Selection, WinnerSelector,
};
pub use verify::{audit, audit_with, verify, verify_with, Verdict};
pub use types::*;
