//! Funding reconciliation
//!
//! Joins the persisted proposal, the daemon's view of its wallet account and
//! the market rates into one [`Funding`] record per direction. Records are
//! memoized for the balance TTL. Daemon failures degrade to a zero record
//! flagged `unavailable` that is never cached, so the next request retries.

use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{
    cache::TimedCache,
    cache_keys,
    dao::ProposalStore,
    error::Error,
    handler::{AddressAllocator, DonationAddress, PriceOracle, TransferAggregator},
    helpers::{funding_figures, Direction},
    model::{Funding, NewProposal, PriceQuote, Proposal, TransferSet},
};

/// Entries dropped by one cleanup pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub funding: usize,
    pub prices: usize,
    pub locks: usize,
}

#[derive(Debug)]
pub struct Reconciler {
    store: Arc<dyn ProposalStore>,
    allocator: AddressAllocator,
    aggregator: TransferAggregator,
    oracle: PriceOracle,
    cache: TimedCache<Arc<Funding>>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn ProposalStore>,
        allocator: AddressAllocator,
        aggregator: TransferAggregator,
        oracle: PriceOracle,
        balance_ttl_seconds: u64,
    ) -> Self {
        Self {
            store,
            allocator,
            aggregator,
            oracle,
            cache: TimedCache::new(balance_ttl_seconds),
        }
    }

    /// Incoming donations, including unconfirmed ones.
    pub async fn get_balance(&self, proposal_id: i64) -> Result<Arc<Funding>, Error> {
        self.funding(proposal_id, Direction::In).await
    }

    /// Outgoing payouts, including pending ones.
    pub async fn get_spends(&self, proposal_id: i64) -> Result<Arc<Funding>, Error> {
        self.funding(proposal_id, Direction::Out).await
    }

    pub async fn convert_to_usd(&self, amount: &BigDecimal) -> Option<BigDecimal> {
        self.oracle.convert_to_usd(amount).await
    }

    pub async fn get_prices(&self) -> PriceQuote {
        self.oracle.get_quote().await
    }

    pub async fn ensure_donation_address(
        &self,
        proposal_id: i64,
    ) -> Result<DonationAddress, Error> {
        self.allocator.ensure_donation_address(proposal_id).await
    }

    pub async fn create_proposal(&self, data: NewProposal) -> Result<Proposal, Error> {
        let proposal = self.store.create(data).await?;
        info!("Created proposal {}", proposal.id);
        Ok(proposal)
    }

    /// Drops both cached directions of a proposal.
    pub async fn invalidate(&self, proposal_id: i64) -> bool {
        let incoming = self
            .cache
            .invalidate(&cache_keys::funding(Direction::In, proposal_id))
            .await;
        let outgoing = self
            .cache
            .invalidate(&cache_keys::funding(Direction::Out, proposal_id))
            .await;

        incoming || outgoing
    }

    pub async fn cleanup(&self) -> CleanupReport {
        CleanupReport {
            funding: self.cache.cleanup_expired().await,
            prices: self.oracle.cleanup().await,
            locks: self.allocator.prune_locks(),
        }
    }

    async fn funding(
        &self,
        proposal_id: i64,
        direction: Direction,
    ) -> Result<Arc<Funding>, Error> {
        let proposal = self
            .store
            .get(proposal_id)
            .await?
            .ok_or(Error::ProposalNotFound(proposal_id))?;

        let key = cache_keys::funding(direction, proposal_id);

        if let Some(funding) = self.cache.get(&key).await {
            debug!("Funding cache hit {}", key);
            self.write_back(&proposal, &funding).await;
            return Ok(funding);
        }

        let funding = match self.reconcile(&proposal, direction).await {
            Ok(funding) => Arc::new(funding),
            Err(e @ (Error::Rpc(_) | Error::WalletUnavailable(_))) => {
                warn!("Reconciliation of {} degraded: {}", key, e);
                return Ok(Arc::new(Funding::unavailable(direction)));
            },
            Err(e) => return Err(e),
        };

        self.cache.set(&key, funding.clone()).await;
        self.write_back(&proposal, &funding).await;

        Ok(funding)
    }

    async fn reconcile(
        &self,
        proposal: &Proposal,
        direction: Direction,
    ) -> Result<Funding, Error> {
        let mut set = match (&proposal.payment_id, direction) {
            (Some(payment_id), Direction::In) => {
                self.aggregator.fetch_payments(payment_id).await?
            },
            // integrated addresses have no account of their own to spend from
            (Some(_), _) => TransferSet::empty(),
            (None, _) => match self.allocator.funding_account(proposal).await? {
                Some(account) => {
                    // donors pay the handed-out address, which may be a subaddress
                    let address = proposal
                        .addr_donation
                        .as_deref()
                        .unwrap_or(&account.address);
                    self.aggregator
                        .fetch_transfers(account.index, address, direction)
                        .await?
                },
                None => TransferSet::empty(),
            },
        };

        let withdrawn = match direction {
            Direction::In => proposal.funds_withdrew.clone(),
            _ => BigDecimal::zero(),
        };
        let figures = funding_figures(&set.sum, &proposal.funds_target, &withdrawn)?;

        let quote = self.oracle.get_quote().await;
        let sum_usd = quote.to_usd(&set.sum);
        for transfer in set.transfers.iter_mut() {
            transfer.amount_usd = quote.to_usd(&transfer.amount_human);
        }

        Ok(Funding::new(direction, set, sum_usd, figures))
    }

    /// Persists `percent_funded` when it differs from the stored progress.
    async fn write_back(&self, proposal: &Proposal, funding: &Funding) {
        if funding.direction != Direction::In || funding.unavailable {
            return;
        }

        if funding.percent_funded == proposal.funds_progress {
            return;
        }

        if let Err(e) = self
            .store
            .set_funds_progress(proposal.id, &funding.percent_funded)
            .await
        {
            error!(
                "Could not store funds progress of proposal {}: {}",
                proposal.id, e
            );
        }
    }
}
