use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::helpers::{Direction, FundingFigures};

/// Wallet sub-account dedicated to one proposal, found by its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletAccount {
    pub index: u32,
    pub label: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transfer {
    pub txid: String,
    pub direction: Direction,
    pub amount: u64,
    pub amount_human: BigDecimal,
    pub amount_usd: Option<BigDecimal>,
    pub timestamp: i64,
    pub datetime: Option<DateTime<Utc>>,
    pub height: u64,
    pub address: String,
}

/// Filtered transfers of one proposal and their total in coin units.
#[derive(Debug, Clone)]
pub struct TransferSet {
    pub sum: BigDecimal,
    pub transfers: Vec<Transfer>,
}

impl TransferSet {
    pub fn empty() -> Self {
        Self {
            sum: BigDecimal::zero(),
            transfers: vec![],
        }
    }
}

/// Reconciled funding state of a proposal in one direction. Cached whole.
#[derive(Debug, Clone, Serialize)]
pub struct Funding {
    pub direction: Direction,
    pub sum: BigDecimal,
    pub sum_usd: Option<BigDecimal>,
    pub transfers: Vec<Transfer>,
    pub percent_funded: BigDecimal,
    pub remaining: BigDecimal,
    pub remaining_percent: BigDecimal,
    pub computed_at: DateTime<Utc>,
    /// Set when the daemon could not be reached; figures are then zero.
    pub unavailable: bool,
}

impl Funding {
    pub fn new(
        direction: Direction,
        set: TransferSet,
        sum_usd: Option<BigDecimal>,
        figures: FundingFigures,
    ) -> Self {
        Self {
            direction,
            sum: set.sum,
            sum_usd,
            transfers: set.transfers,
            percent_funded: figures.percent_funded,
            remaining: figures.remaining,
            remaining_percent: figures.remaining_percent,
            computed_at: Utc::now(),
            unavailable: false,
        }
    }

    pub fn unavailable(direction: Direction) -> Self {
        Self {
            unavailable: true,
            ..Self::new(direction, TransferSet::empty(), None, FundingFigures::zero())
        }
    }
}
