//! Placeholder rankings used when the live job path does not resolve in time.
//!
//! Output always has the shape a real result would have for the same request: the same
//! criterion, a bounded count, and values rendered with the criterion's format. Names come
//! from a fixed reference pool in a fixed order; only the values are random.

use rand::Rng;

use crate::core::{Criterion, RankedRecord, RankingRequest};
use crate::format::format_number;

/// Well-known assets placeholder rows are drawn from, in rank order.
pub const REFERENCE_POOL: [(&str, &str); 10] = [
    ("Bitcoin", "BTC"),
    ("Ethereum", "ETH"),
    ("Tether", "USDT"),
    ("Solana", "SOL"),
    ("Cardano", "ADA"),
    ("Chainlink", "LINK"),
    ("Polygon", "MATIC"),
    ("Avalanche", "AVAX"),
    ("Polkadot", "DOT"),
    ("Shiba Inu", "SHIB"),
];

/// Synthesizes `min(result_count, pool size)` records using the thread-local RNG.
pub fn generate(request: &RankingRequest) -> Vec<RankedRecord> {
    generate_with(request, &mut rand::rng())
}

/// Synthesizes records using the supplied random source.
///
/// Deterministic for a seeded RNG, which is what the tests rely on.
pub fn generate_with<R: Rng>(request: &RankingRequest, rng: &mut R) -> Vec<RankedRecord> {
    let criterion = request.criterion();
    let count = (request.result_count() as usize).min(REFERENCE_POOL.len());

    REFERENCE_POOL
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, (name, symbol))| RankedRecord {
            display_name: (*name).to_string(),
            symbol: (*symbol).to_string(),
            formatted_value: format_number(sample(criterion, i, rng), criterion),
            criterion: criterion.clone(),
        })
        .collect()
}

fn sample<R: Rng>(criterion: &Criterion, position: usize, rng: &mut R) -> f64 {
    if let Criterion::AltRank = criterion {
        return (position + 1) as f64;
    }
    let (lo, hi) = criterion.synthetic_range();
    lo + rng.random::<f64>() * (hi - lo)
}
