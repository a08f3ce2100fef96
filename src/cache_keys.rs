//! Centralized cache key builders
//!
//! The reconciler and the admin invalidation endpoint both derive keys from
//! here so the two never drift apart.

use crate::helpers::Direction;

pub const PRICES: &str = "prices";

const FUNDING: &str = "funding";

/// `funding_in_<id>` / `funding_out_<id>`
pub fn funding(direction: Direction, proposal_id: i64) -> String {
    format!("{}_{}_{}", FUNDING, direction, proposal_id)
}
