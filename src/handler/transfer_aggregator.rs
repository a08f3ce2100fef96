use bigdecimal::{BigDecimal, Zero};
use chrono::DateTime;

use crate::{
    error::RpcError,
    helpers::{Direction, UnitScale},
    model::{Transfer, TransferSet},
    provider::Daemon,
    types::{PaymentEntry, TransferEntry},
};

/// Reduces raw daemon transfers of one account into a summed set.
#[derive(Debug, Clone)]
pub struct TransferAggregator {
    daemon: Daemon,
    scale: UnitScale,
}

impl TransferAggregator {
    pub fn new(daemon: Daemon, scale: UnitScale) -> Self {
        Self { daemon, scale }
    }

    /// Transfers of one account that went through `address`, most recent
    /// first. Incoming includes unconfirmed pool entries.
    pub async fn fetch_transfers(
        &self,
        account_index: u32,
        address: &str,
        direction: Direction,
    ) -> Result<TransferSet, RpcError> {
        let entries = self
            .daemon
            .get_transfers(account_index, direction)
            .await?;

        let transfers = entries
            .into_iter()
            .filter(|entry| entry.address == address)
            .map(|entry| self.transfer(entry, direction))
            .collect();

        Ok(reduce(transfers))
    }

    /// Incoming payments tagged with `payment_id` on an integrated address.
    pub async fn fetch_payments(
        &self,
        payment_id: &str,
    ) -> Result<TransferSet, RpcError> {
        let payments = self.daemon.get_payments(payment_id).await?;

        let transfers = payments
            .into_iter()
            .filter(|payment| payment.payment_id.is_empty() || payment.payment_id == payment_id)
            .map(|payment| self.payment(payment))
            .collect();

        Ok(reduce(transfers))
    }

    fn transfer(&self, entry: TransferEntry, requested: Direction) -> Transfer {
        let direction = match entry.kind.as_str() {
            "in" => Direction::In,
            "out" | "pending" => Direction::Out,
            "pool" => Direction::Pool,
            _ => requested,
        };

        Transfer {
            amount_human: self.scale.to_human(entry.amount),
            amount_usd: None,
            datetime: DateTime::from_timestamp(entry.timestamp, 0),
            txid: entry.txid,
            direction,
            amount: entry.amount,
            timestamp: entry.timestamp,
            height: entry.height,
            address: entry.address,
        }
    }

    fn payment(&self, payment: PaymentEntry) -> Transfer {
        Transfer {
            amount_human: self.scale.to_human(payment.amount),
            amount_usd: None,
            datetime: None,
            txid: payment.tx_hash,
            direction: Direction::In,
            amount: payment.amount,
            timestamp: 0,
            height: payment.block_height,
            address: payment.address,
        }
    }
}

fn reduce(mut transfers: Vec<Transfer>) -> TransferSet {
    // unconfirmed entries carry height 0 and sort by timestamp alone
    transfers.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.height.cmp(&a.height))
    });

    let sum = transfers
        .iter()
        .fold(BigDecimal::zero(), |acc, transfer| acc + &transfer.amount_human);

    TransferSet { sum, transfers }
}
