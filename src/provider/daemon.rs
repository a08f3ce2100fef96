use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    error::RpcError,
    helpers::Direction,
    provider::RpcTransport,
    types::{
        CreatedAccount, CreatedAddress, GetAccounts, GetAddress, GetPayments,
        GetTransfers, IntegratedAddress, PaymentEntry, SubaddressAccount,
        TransferEntry,
    },
};

/// Typed wallet daemon methods on top of a raw transport.
#[derive(Clone)]
pub struct Daemon {
    transport: Arc<dyn RpcTransport>,
}

impl Daemon {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Daemon { transport }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let value = self.transport.call(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn create_account(
        &self,
        label: &str,
    ) -> Result<CreatedAccount, RpcError> {
        self.request("create_account", json!({ "label": label }))
            .await
    }

    pub async fn get_accounts(
        &self,
    ) -> Result<Vec<SubaddressAccount>, RpcError> {
        let accounts: GetAccounts =
            self.request("get_accounts", json!({})).await?;
        Ok(accounts.subaddress_accounts)
    }

    /// Exact label match; `p_1` never matches `p_12`.
    pub async fn account_by_label(
        &self,
        label: &str,
    ) -> Result<Option<SubaddressAccount>, RpcError> {
        let accounts = self.get_accounts().await?;
        Ok(accounts
            .into_iter()
            .find(|account| account.label == label))
    }

    pub async fn get_address(
        &self,
        account_index: u32,
    ) -> Result<GetAddress, RpcError> {
        self.request("getaddress", json!({ "account_index": account_index }))
            .await
    }

    pub async fn create_address(
        &self,
        account_index: u32,
        label: &str,
    ) -> Result<CreatedAddress, RpcError> {
        self.request(
            "create_address",
            json!({ "account_index": account_index, "label": label }),
        )
        .await
    }

    /// Transfers of one account. Incoming includes the unconfirmed pool and
    /// `Out` includes pending spends; `Pool` only labels single entries and
    /// is requested as incoming.
    pub async fn get_transfers(
        &self,
        account_index: u32,
        direction: Direction,
    ) -> Result<Vec<TransferEntry>, RpcError> {
        let params = match direction {
            Direction::In | Direction::Pool => json!({
                "in": true,
                "pool": true,
                "account_index": account_index,
            }),
            Direction::Out => json!({
                "out": true,
                "pending": true,
                "account_index": account_index,
            }),
        };

        let transfers: GetTransfers =
            self.request("get_transfers", params).await?;

        let entries = match direction {
            Direction::In | Direction::Pool => {
                let mut entries = transfers.incoming;
                entries.extend(transfers.pool);
                entries
            },
            Direction::Out => {
                let mut entries = transfers.out;
                entries.extend(transfers.pending);
                entries
            },
        };

        Ok(entries)
    }

    pub async fn make_integrated_address(
        &self,
    ) -> Result<IntegratedAddress, RpcError> {
        self.request("make_integrated_address", json!({})).await
    }

    pub async fn get_payments(
        &self,
        payment_id: &str,
    ) -> Result<Vec<PaymentEntry>, RpcError> {
        let payments: GetPayments = self
            .request("get_payments", json!({ "payment_id": payment_id }))
            .await?;
        Ok(payments.payments)
    }
}

impl std::fmt::Debug for Daemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Daemon").finish()
    }
}
