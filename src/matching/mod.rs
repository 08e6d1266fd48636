//! Smart search: pick the best live stream for a sports fixture.
//!
//! Channel names are noisy (separator rows, region prefixes, quality tags), so
//! matching is a hand-tuned score rather than a fuzzy distance. Everything
//! here is pure and safe to call from any thread.

mod banner;
mod fixture;
mod score;
mod tokenize;

pub use banner::{is_banner, is_decorative};
pub use fixture::{find_stream, Fixture};
pub use score::{
    pick_best, rank_candidates, score_channel, Candidate, MatchOutcome, MatchTarget, Ranked,
    ScoringConfig, BANNER_SCORE,
};
pub use tokenize::{is_stop_word, tokenize, STOP_WORDS};
