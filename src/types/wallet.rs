use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GetAccounts {
    #[serde(default)]
    pub subaddress_accounts: Vec<SubaddressAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubaddressAccount {
    pub account_index: u32,
    pub base_address: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatedAccount {
    pub account_index: u32,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct GetAddress {
    pub address: String,
    #[serde(default)]
    pub addresses: Vec<SubaddressEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubaddressEntry {
    pub address: String,
    pub address_index: u32,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub used: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreatedAddress {
    pub address: String,
    pub address_index: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetTransfers {
    #[serde(default, rename = "in")]
    pub incoming: Vec<TransferEntry>,
    #[serde(default)]
    pub out: Vec<TransferEntry>,
    #[serde(default)]
    pub pool: Vec<TransferEntry>,
    #[serde(default)]
    pub pending: Vec<TransferEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferEntry {
    pub txid: String,
    pub amount: u64,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub address: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct IntegratedAddress {
    pub integrated_address: String,
    pub payment_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetPayments {
    #[serde(default)]
    pub payments: Vec<PaymentEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEntry {
    pub tx_hash: String,
    pub amount: u64,
    #[serde(default)]
    pub block_height: u64,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub address: String,
}
