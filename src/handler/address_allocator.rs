//! Wallet account and donation address allocation
//!
//! Every proposal owns exactly one wallet account, labeled `p_<id>`. The
//! daemon is the source of truth for which accounts exist: nothing about
//! accounts is cached locally, so a daemon that outlives this process stays
//! authoritative. Creation is serialized per proposal id because the daemon
//! has no compare-and-swap.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    dao::ProposalStore,
    error::{Error, RpcError},
    helpers::{account_label, AllocationScheme},
    keyed_lock::KeyedLock,
    model::{Proposal, WalletAccount},
    provider::Daemon,
    types::SubaddressAccount,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonationAddress {
    pub address: String,
    pub payment_id: Option<String>,
}

#[derive(Debug)]
pub struct AddressAllocator {
    daemon: Daemon,
    store: Arc<dyn ProposalStore>,
    scheme: AllocationScheme,
    locks: KeyedLock<i64>,
}

fn unavailable(error: RpcError) -> Error {
    Error::WalletUnavailable(error.to_string())
}

impl From<SubaddressAccount> for WalletAccount {
    fn from(account: SubaddressAccount) -> Self {
        WalletAccount {
            index: account.account_index,
            label: account.label,
            address: account.base_address,
        }
    }
}

impl AddressAllocator {
    pub fn new(
        daemon: Daemon,
        store: Arc<dyn ProposalStore>,
        scheme: AllocationScheme,
    ) -> Self {
        Self {
            daemon,
            store,
            scheme,
            locks: KeyedLock::new(),
        }
    }

    /// Returns the proposal's wallet account, creating it on first need.
    pub async fn ensure_account(
        &self,
        proposal_id: i64,
    ) -> Result<WalletAccount, Error> {
        let label = account_label(proposal_id);

        if let Some(account) = self.find_account(&label).await? {
            return Ok(account);
        }

        let _guard = self.locks.lock(&proposal_id).await;
        self.find_or_create_account(&label).await
    }

    /// The account whose transfers fund `proposal`. Only a proposal that
    /// already holds an account-scheme donation address gets its account
    /// recreated; every other proposal is looked up without side effects.
    pub async fn funding_account(
        &self,
        proposal: &Proposal,
    ) -> Result<Option<WalletAccount>, Error> {
        if proposal.addr_donation.is_some() && self.scheme == AllocationScheme::Account {
            return self.ensure_account(proposal.id).await.map(Some);
        }

        self.find_account(&account_label(proposal.id)).await
    }

    /// Returns the receiving address labeled for the proposal inside
    /// `account`, asking the daemon for a new one when there is none.
    pub async fn ensure_address(
        &self,
        account: &WalletAccount,
        proposal_id: i64,
    ) -> Result<String, Error> {
        let label = account_label(proposal_id);
        let book = self
            .daemon
            .get_address(account.index)
            .await
            .map_err(unavailable)?;

        if let Some(entry) = book
            .addresses
            .into_iter()
            .find(|entry| entry.label == label)
        {
            return Ok(entry.address);
        }

        let created = self
            .daemon
            .create_address(account.index, &label)
            .await
            .map_err(unavailable)?;

        info!(
            "Created address #{} in account {} for proposal {}",
            created.address_index, account.index, proposal_id
        );

        Ok(created.address)
    }

    /// Assigns the proposal's donation address once. Later calls return the
    /// persisted address without touching the daemon.
    pub async fn ensure_donation_address(
        &self,
        proposal_id: i64,
    ) -> Result<DonationAddress, Error> {
        if let Some(address) = self.persisted(proposal_id).await? {
            return Ok(address);
        }

        let _guard = self.locks.lock(&proposal_id).await;

        // a concurrent caller may have finished while we waited
        if let Some(address) = self.persisted(proposal_id).await? {
            return Ok(address);
        }

        let allocated = match self.scheme {
            AllocationScheme::Account => {
                let label = account_label(proposal_id);
                let account = self.find_or_create_account(&label).await?;
                let address = self.ensure_address(&account, proposal_id).await?;
                DonationAddress {
                    address,
                    payment_id: None,
                }
            },
            AllocationScheme::Integrated => {
                let integrated = self
                    .daemon
                    .make_integrated_address()
                    .await
                    .map_err(unavailable)?;
                DonationAddress {
                    address: integrated.integrated_address,
                    payment_id: Some(integrated.payment_id),
                }
            },
        };

        let assigned = self
            .store
            .set_donation_address(
                proposal_id,
                &allocated.address,
                allocated.payment_id.as_deref(),
            )
            .await?;

        if assigned {
            info!(
                "Assigned donation address to proposal {}",
                proposal_id
            );
            return Ok(allocated);
        }

        // another process won the conditional write; its address is canonical
        warn!(
            "Donation address of proposal {} was assigned concurrently",
            proposal_id
        );
        self.persisted(proposal_id).await?.ok_or_else(|| {
            Error::WalletUnavailable(format!(
                "donation address of proposal {} could not be stored",
                proposal_id
            ))
        })
    }

    pub fn prune_locks(&self) -> usize {
        self.locks.prune()
    }

    async fn persisted(
        &self,
        proposal_id: i64,
    ) -> Result<Option<DonationAddress>, Error> {
        let proposal = self
            .store
            .get(proposal_id)
            .await?
            .ok_or(Error::ProposalNotFound(proposal_id))?;

        if let Some(address) = proposal.addr_donation.clone() {
            return Ok(Some(DonationAddress {
                address,
                payment_id: proposal.payment_id.clone(),
            }));
        }

        if !proposal.status()?.accepts_donations() {
            return Err(Error::NotAcceptingDonations(proposal_id));
        }

        Ok(None)
    }

    async fn find_account(
        &self,
        label: &str,
    ) -> Result<Option<WalletAccount>, Error> {
        let account = self
            .daemon
            .account_by_label(label)
            .await
            .map_err(unavailable)?;

        Ok(account.map(WalletAccount::from))
    }

    /// Caller holds the proposal's lock.
    async fn find_or_create_account(
        &self,
        label: &str,
    ) -> Result<WalletAccount, Error> {
        if let Some(account) = self.find_account(label).await? {
            return Ok(account);
        }

        match self.daemon.create_account(label).await {
            Ok(created) => info!(
                "Created wallet account {} ({})",
                created.account_index, label
            ),
            // "already exists" and lost responses are settled by the re-read
            Err(error) => warn!("create_account {}: {}", label, error),
        }

        self.find_account(label).await?.ok_or_else(|| {
            Error::WalletUnavailable(format!(
                "wallet account {} not found after creation",
                label
            ))
        })
    }
}
