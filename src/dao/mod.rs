use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::{
    error::Error,
    model::{NewProposal, Proposal},
};

mod postgre;

pub use postgre::{PoolOption, PoolType};

/// Persistence boundary of the reconciliation engine.
///
/// The engine only reads proposals, assigns a donation address once and
/// writes back the derived funding percentage.
#[async_trait]
pub trait ProposalStore: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Proposal>, Error>;

    async fn create(&self, data: NewProposal) -> Result<Proposal, Error>;

    /// Sets `addr_donation` (and `payment_id`) only while it is still null.
    /// Returns `false` when another writer got there first.
    async fn set_donation_address(
        &self,
        id: i64,
        address: &str,
        payment_id: Option<&str>,
    ) -> Result<bool, Error>;

    async fn set_funds_progress(
        &self,
        id: i64,
        progress: &BigDecimal,
    ) -> Result<(), Error>;
}

impl std::fmt::Debug for dyn ProposalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProposalStore")
    }
}
