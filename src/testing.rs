//! In-memory doubles for the wallet daemon, the proposal store and the
//! market feeds. Every double counts the calls it receives.

use std::{
    collections::HashMap,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{
    configuration::{AppState, Config, State},
    dao::{PoolOption, ProposalStore},
    error::{Error, RpcError},
    handler::{
        AddressAllocator, Market, PriceOracle, QuoteSource, Reconciler,
        TransferAggregator,
    },
    helpers::{AllocationScheme, UnitScale},
    model::{NewProposal, Proposal, ProposalStatus, Table},
    provider::{Daemon, DatabasePool, RpcTransport},
};

pub fn test_config() -> Config {
    Config {
        server_host: String::from("127.0.0.1"),
        port: 8080,
        allowed_origins: vec![String::from("*")],
        database_url: String::from("postgres://funding@127.0.0.1/funding"),
        database_max_connections: 1,
        wallet_rpc_url: String::from("http://127.0.0.1:34568/json_rpc"),
        wallet_rpc_username: None,
        wallet_rpc_password: None,
        timeout: 10,
        amount_decimals: 11,
        balance_cache_ttl: 300,
        price_cache_ttl: 7200,
        cache_cleanup_interval: 60,
        allocation_scheme: AllocationScheme::Account,
        coin_btc_ticker_url: String::from("http://127.0.0.1:1/ticker"),
        btc_usd_quote_url: String::from("http://127.0.0.1:1/quote"),
        user_agent: String::from("funding-test"),
        auth: String::from("secret"),
    }
}

// =============================================================================
// Wallet daemon
// =============================================================================

struct FakeAccount {
    index: u32,
    label: String,
    addresses: Vec<(String, String)>,
}

struct FakeTransfer {
    account_index: u32,
    kind: String,
    address: String,
    amount: u64,
    timestamp: i64,
    txid: String,
}

struct FakePayment {
    payment_id: String,
    amount: u64,
    block_height: u64,
    tx_hash: String,
}

#[derive(Default)]
struct Ledger {
    accounts: Vec<FakeAccount>,
    transfers: Vec<FakeTransfer>,
    payments: Vec<FakePayment>,
    integrated: u64,
}

/// A wallet daemon holding its accounts in memory.
#[derive(Default)]
pub struct FakeDaemon {
    ledger: Mutex<Ledger>,
    calls: Mutex<HashMap<String, usize>>,
    offline: AtomicBool,
    create_delay: Option<Duration>,
    create_race: bool,
}

impl FakeDaemon {
    pub fn new() -> Self {
        let daemon = Self::default();
        daemon.insert_account("Primary account", "Primary account");
        daemon
    }

    /// `create_account` sleeps before answering.
    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    /// `create_account` stores the account and then reports that it already
    /// existed, as when another process created it first.
    pub fn with_create_race(mut self) -> Self {
        self.create_race = true;
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self, method: &str) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Accounts excluding the primary one.
    pub fn account_count(&self) -> usize {
        self.ledger.lock().unwrap().accounts.len() - 1
    }

    pub fn add_account(&self, label: &str) -> (u32, String) {
        self.insert_account(label, label)
    }

    /// An account whose base address carries no label.
    pub fn add_unlabeled_account(&self) -> (u32, String) {
        self.insert_account("", "")
    }

    /// A labeled account whose base address carries no label, so the
    /// proposal's receiving address has to be created as a subaddress.
    pub fn add_account_with_unlabeled_base(&self, label: &str) -> (u32, String) {
        self.insert_account(label, "")
    }

    pub fn add_transfer(
        &self,
        account_index: u32,
        kind: &str,
        address: &str,
        amount: u64,
        timestamp: i64,
        txid: &str,
    ) {
        self.ledger.lock().unwrap().transfers.push(FakeTransfer {
            account_index,
            kind: kind.to_owned(),
            address: address.to_owned(),
            amount,
            timestamp,
            txid: txid.to_owned(),
        });
    }

    pub fn add_payment(
        &self,
        payment_id: &str,
        amount: u64,
        block_height: u64,
        tx_hash: &str,
    ) {
        self.ledger.lock().unwrap().payments.push(FakePayment {
            payment_id: payment_id.to_owned(),
            amount,
            block_height,
            tx_hash: tx_hash.to_owned(),
        });
    }

    fn insert_account(&self, label: &str, base_label: &str) -> (u32, String) {
        let mut ledger = self.ledger.lock().unwrap();
        let index = ledger.accounts.len() as u32;
        let address = format!("WW_account_{}", index);
        ledger.accounts.push(FakeAccount {
            index,
            label: label.to_owned(),
            addresses: vec![(address.clone(), base_label.to_owned())],
        });
        (index, address)
    }

    fn account_index(params: &Value) -> Result<usize, RpcError> {
        params["account_index"]
            .as_u64()
            .map(|index| index as usize)
            .ok_or_else(|| RpcError::Malformed(String::from("account_index")))
    }

    fn dispatch(&self, method: &str, params: &Value) -> Result<Value, RpcError> {
        let mut ledger = self.ledger.lock().unwrap();

        match method {
            "get_accounts" => {
                let accounts: Vec<Value> = ledger
                    .accounts
                    .iter()
                    .map(|account| {
                        json!({
                            "account_index": account.index,
                            "base_address": account.addresses[0].0,
                            "label": account.label,
                            "balance": 0,
                        })
                    })
                    .collect();
                Ok(json!({ "subaddress_accounts": accounts }))
            },
            "getaddress" => {
                let index = Self::account_index(params)?;
                let account = ledger.accounts.get(index).ok_or(RpcError::Daemon {
                    code: -13,
                    message: String::from("account index is out of bound"),
                })?;
                let addresses: Vec<Value> = account
                    .addresses
                    .iter()
                    .enumerate()
                    .map(|(i, (address, label))| {
                        json!({
                            "address": address,
                            "address_index": i,
                            "label": label,
                            "used": false,
                        })
                    })
                    .collect();
                Ok(json!({
                    "address": account.addresses[0].0,
                    "addresses": addresses,
                }))
            },
            "create_address" => {
                let index = Self::account_index(params)?;
                let label = params["label"].as_str().unwrap_or_default().to_owned();
                let account = ledger.accounts.get_mut(index).ok_or(RpcError::Daemon {
                    code: -13,
                    message: String::from("account index is out of bound"),
                })?;
                let address_index = account.addresses.len();
                let address = format!("WW_sub_{}_{}", index, address_index);
                account.addresses.push((address.clone(), label));
                Ok(json!({ "address": address, "address_index": address_index }))
            },
            "get_transfers" => {
                let index = Self::account_index(params)? as u32;
                let mut result = serde_json::Map::new();
                for kind in ["in", "out", "pool", "pending"] {
                    if params[kind].as_bool() != Some(true) {
                        continue;
                    }
                    let entries: Vec<Value> = ledger
                        .transfers
                        .iter()
                        .filter(|t| t.account_index == index && t.kind == kind)
                        .map(|t| {
                            let height: u64 = if kind == "pool" { 0 } else { 100 };
                            json!({
                                "txid": t.txid,
                                "amount": t.amount,
                                "timestamp": t.timestamp,
                                "height": height,
                                "address": t.address,
                                "type": t.kind,
                            })
                        })
                        .collect();
                    if !entries.is_empty() {
                        result.insert(kind.to_owned(), Value::Array(entries));
                    }
                }
                Ok(Value::Object(result))
            },
            "make_integrated_address" => {
                ledger.integrated += 1;
                let payment_id = format!("{:016x}", ledger.integrated);
                Ok(json!({
                    "integrated_address": format!("WW_integrated_{}", payment_id),
                    "payment_id": payment_id,
                }))
            },
            "get_payments" => {
                let payment_id = params["payment_id"].as_str().unwrap_or_default();
                let payments: Vec<Value> = ledger
                    .payments
                    .iter()
                    .filter(|p| p.payment_id == payment_id)
                    .map(|p| {
                        json!({
                            "payment_id": p.payment_id,
                            "tx_hash": p.tx_hash,
                            "amount": p.amount,
                            "block_height": p.block_height,
                            "unlock_time": 0,
                        })
                    })
                    .collect();
                Ok(json!({ "payments": payments }))
            },
            "create_account" => {
                let label = params["label"].as_str().unwrap_or_default().to_owned();
                let index = ledger.accounts.len() as u32;
                let address = format!("WW_account_{}", index);
                ledger.accounts.push(FakeAccount {
                    index,
                    label: label.clone(),
                    addresses: vec![(address.clone(), label)],
                });
                if self.create_race {
                    return Err(RpcError::Daemon {
                        code: -1,
                        message: String::from("account already exists"),
                    });
                }
                Ok(json!({ "account_index": index, "address": address }))
            },
            _ => Err(RpcError::Daemon {
                code: -32601,
                message: String::from("Method not found"),
            }),
        }
    }
}

#[async_trait]
impl RpcTransport for FakeDaemon {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(method.to_owned())
            .or_default() += 1;

        if self.offline.load(Ordering::SeqCst) {
            return Err(RpcError::Timeout);
        }

        if method == "create_account" {
            if let Some(delay) = self.create_delay {
                tokio::time::sleep(delay).await;
            }
        }

        self.dispatch(method, &params)
    }
}

// =============================================================================
// Proposal store
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    proposals: Mutex<HashMap<i64, Proposal>>,
    next_id: AtomicI64,
    progress_writes: AtomicUsize,
    address_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, target: &str, status: ProposalStatus) -> Proposal {
        let proposal = Proposal {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            headline: String::from("Proposal"),
            funds_target: BigDecimal::from_str(target).unwrap(),
            funds_progress: BigDecimal::zero(),
            funds_withdrew: BigDecimal::zero(),
            addr_donation: None,
            payment_id: None,
            status: status.into(),
            date_added: Utc::now(),
        };
        self.proposals
            .lock()
            .unwrap()
            .insert(proposal.id, proposal.clone());
        proposal
    }

    pub fn proposal(&self, id: i64) -> Proposal {
        self.proposals.lock().unwrap()[&id].clone()
    }

    pub fn assign(&self, id: i64, address: &str) {
        let mut proposals = self.proposals.lock().unwrap();
        if let Some(proposal) = proposals.get_mut(&id) {
            proposal.addr_donation = Some(address.to_owned());
        }
    }

    pub fn set_withdrew(&self, id: i64, amount: &str) {
        let mut proposals = self.proposals.lock().unwrap();
        if let Some(proposal) = proposals.get_mut(&id) {
            proposal.funds_withdrew = BigDecimal::from_str(amount).unwrap();
        }
    }

    pub fn progress_writes(&self) -> usize {
        self.progress_writes.load(Ordering::SeqCst)
    }

    pub fn address_writes(&self) -> usize {
        self.address_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProposalStore for MemoryStore {
    async fn get(&self, id: i64) -> Result<Option<Proposal>, Error> {
        Ok(self.proposals.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, data: NewProposal) -> Result<Proposal, Error> {
        data.validate()?;
        let mut proposal = self.insert("1", data.status);
        proposal.headline = data.headline;
        proposal.funds_target = data.funds_target;
        self.proposals
            .lock()
            .unwrap()
            .insert(proposal.id, proposal.clone());
        Ok(proposal)
    }

    async fn set_donation_address(
        &self,
        id: i64,
        address: &str,
        payment_id: Option<&str>,
    ) -> Result<bool, Error> {
        let mut proposals = self.proposals.lock().unwrap();
        let proposal = proposals.get_mut(&id).ok_or(Error::ProposalNotFound(id))?;

        if proposal.addr_donation.is_some() {
            return Ok(false);
        }

        proposal.addr_donation = Some(address.to_owned());
        proposal.payment_id = payment_id.map(str::to_owned);
        self.address_writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn set_funds_progress(
        &self,
        id: i64,
        progress: &BigDecimal,
    ) -> Result<(), Error> {
        let mut proposals = self.proposals.lock().unwrap();
        let proposal = proposals.get_mut(&id).ok_or(Error::ProposalNotFound(id))?;
        proposal.funds_progress = progress.clone();
        self.progress_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// Market feeds
// =============================================================================

pub struct FixedQuotes {
    coin_to_btc: Option<BigDecimal>,
    btc_to_usd: Option<BigDecimal>,
    calls: AtomicUsize,
}

impl FixedQuotes {
    pub fn new(coin_to_btc: Option<&str>, btc_to_usd: Option<&str>) -> Self {
        Self {
            coin_to_btc: coin_to_btc.map(|v| BigDecimal::from_str(v).unwrap()),
            btc_to_usd: btc_to_usd.map(|v| BigDecimal::from_str(v).unwrap()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for FixedQuotes {
    async fn quote(&self, market: Market) -> Result<BigDecimal, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let price = match market {
            Market::CoinBtc => &self.coin_to_btc,
            Market::BtcUsd => &self.btc_to_usd,
        };

        price
            .clone()
            .ok_or_else(|| Error::PriceUnavailable(format!("{} offline", market)))
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// A reconciler over fresh doubles. Rates give 10 USD per coin.
pub struct Harness {
    pub daemon: Arc<FakeDaemon>,
    pub store: Arc<MemoryStore>,
    pub quotes: Arc<FixedQuotes>,
    pub reconciler: Reconciler,
}

impl Harness {
    pub fn new(scheme: AllocationScheme) -> Self {
        let daemon = Arc::new(FakeDaemon::new());
        let store = Arc::new(MemoryStore::new());
        let quotes = Arc::new(FixedQuotes::new(Some("0.0002"), Some("50000")));
        let config = test_config();

        let rpc = Daemon::new(daemon.clone());
        let allocator = AddressAllocator::new(rpc.clone(), store.clone(), scheme);
        let aggregator = TransferAggregator::new(
            rpc,
            UnitScale::new(config.amount_decimals).unwrap(),
        );
        let oracle = PriceOracle::new(quotes.clone(), config.price_cache_ttl);
        let reconciler = Reconciler::new(
            store.clone(),
            allocator,
            aggregator,
            oracle,
            config.balance_cache_ttl,
        );

        Self {
            daemon,
            store,
            quotes,
            reconciler,
        }
    }

    /// Application state around the reconciler. The database pool never
    /// connects, so only endpoints served by the reconciler can be called.
    pub fn into_app_state(self) -> (AppState<State>, Arc<FakeDaemon>, Arc<MemoryStore>) {
        let config = test_config();
        let pool = PoolOption::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let database = DatabasePool {
            proposal: Arc::new(Table::new(pool.clone())),
            pool,
        };
        let state = State {
            config,
            database,
            reconciler: self.reconciler,
        };

        (AppState::new(state), self.daemon, self.store)
    }
}
