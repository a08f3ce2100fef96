use std::{fmt, str::FromStr};

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Digits kept on stored and reported percentages.
pub const PERCENT_SCALE: i64 = 4;

/// Digits kept on converted fiat amounts.
pub const FIAT_SCALE: i64 = 2;

const MAX_AMOUNT_DECIMALS: u32 = 18;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    Pool,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
            Direction::Pool => write!(f, "pool"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            "pool" => Ok(Direction::Pool),
            _ => Err(Error::InvalidOption {
                option: format!("direction '{}'", value),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationScheme {
    Account,
    Integrated,
}

impl FromStr for AllocationScheme {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "account" => Ok(AllocationScheme::Account),
            "integrated" => Ok(AllocationScheme::Integrated),
            other => Err(Error::InvalidOption {
                option: format!(
                    "allocation scheme '{}'. Valid options: account, integrated",
                    other
                ),
            }),
        }
    }
}

/// Wallet label owned by a proposal. Matched exactly, never by prefix.
pub fn account_label(proposal_id: i64) -> String {
    format!("p_{}", proposal_id)
}

/// Converts daemon minor units into coin units: `amount / 10^decimals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitScale {
    decimals: u32,
}

impl UnitScale {
    pub fn new(decimals: u32) -> Result<Self, Error> {
        if decimals > MAX_AMOUNT_DECIMALS {
            return Err(Error::ConfigurationError(format!(
                "amount decimals must be at most {}, got {}",
                MAX_AMOUNT_DECIMALS, decimals
            )));
        }

        Ok(Self { decimals })
    }

    pub fn to_human(&self, amount: u64) -> BigDecimal {
        let divisor = BigDecimal::from(10_u64.pow(self.decimals));
        BigDecimal::from(amount) / divisor
    }
}

/// Derived funding percentages for one direction of a proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct FundingFigures {
    pub percent_funded: BigDecimal,
    pub remaining: BigDecimal,
    pub remaining_percent: BigDecimal,
}

impl FundingFigures {
    pub fn zero() -> Self {
        Self {
            percent_funded: BigDecimal::zero(),
            remaining: BigDecimal::zero(),
            remaining_percent: BigDecimal::zero(),
        }
    }
}

/// `percent_funded = 100 * sum / target`, `remaining = max(sum - withdrawn, 0)`,
/// `remaining_percent = 100 * remaining / sum`. Nothing is clamped at 100.
pub fn funding_figures(
    sum: &BigDecimal,
    target: &BigDecimal,
    withdrawn: &BigDecimal,
) -> Result<FundingFigures, Error> {
    if *target <= BigDecimal::zero() {
        return Err(Error::ConfigurationError(format!(
            "funds target must be positive, got {}",
            target
        )));
    }

    if sum.is_zero() {
        return Ok(FundingFigures::zero());
    }

    let hundred = BigDecimal::from(100);
    let percent_funded = (sum * &hundred / target).round(PERCENT_SCALE);

    let mut remaining = sum - withdrawn;
    if remaining < BigDecimal::zero() {
        remaining = BigDecimal::zero();
    }

    let remaining_percent = if remaining.is_zero() {
        BigDecimal::zero()
    } else {
        (&remaining * &hundred / sum).round(PERCENT_SCALE)
    };

    Ok(FundingFigures {
        percent_funded,
        remaining,
        remaining_percent,
    })
}
