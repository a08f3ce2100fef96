use std::{env, fs, ops::Deref, path::Path, sync::Arc};

use crate::{
    dao::ProposalStore,
    error::Error,
    handler::{
        AddressAllocator, PriceOracle, Reconciler, TransferAggregator,
    },
    helpers::{AllocationScheme, UnitScale},
    migration,
    provider::{DatabasePool, Daemon, WalletClient, HTTP},
};

const MIN_PRICE_CACHE_TTL: u64 = 600;
const MAX_PRICE_CACHE_TTL: u64 = 7200;

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub database: DatabasePool,
    pub reconciler: Reconciler,
}

impl State {
    pub async fn new(
        config: Config,
        database: DatabasePool,
        wallet: WalletClient,
        http: HTTP,
    ) -> Result<State, Error> {
        migration::run_migrations(&database.pool).await?;

        let store: Arc<dyn ProposalStore> = database.proposal.clone();
        let reconciler =
            Self::init_reconciler(&config, store, Arc::new(wallet), Arc::new(http))?;

        Ok(Self {
            config,
            database,
            reconciler,
        })
    }

    fn init_reconciler(
        config: &Config,
        store: Arc<dyn ProposalStore>,
        wallet: Arc<WalletClient>,
        http: Arc<HTTP>,
    ) -> Result<Reconciler, Error> {
        let daemon = Daemon::new(wallet);
        let scale = UnitScale::new(config.amount_decimals)?;

        let allocator = AddressAllocator::new(
            daemon.clone(),
            store.clone(),
            config.allocation_scheme,
        );
        let aggregator = TransferAggregator::new(daemon, scale);
        let oracle = PriceOracle::new(http, config.price_cache_ttl);

        Ok(Reconciler::new(
            store,
            allocator,
            aggregator,
            oracle,
            config.balance_cache_ttl,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub database_url: String,
    pub database_max_connections: u32,
    pub wallet_rpc_url: String,
    pub wallet_rpc_username: Option<String>,
    pub wallet_rpc_password: Option<String>,
    pub timeout: u64,
    pub amount_decimals: u32,
    pub balance_cache_ttl: u64,
    pub price_cache_ttl: u64,
    pub cache_cleanup_interval: u64,
    pub allocation_scheme: AllocationScheme,
    pub coin_btc_ticker_url: String,
    pub btc_usd_quote_url: String,
    pub user_agent: String,
    pub auth: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

pub fn get_configuration() -> Result<Config, Error> {
    let server_host = env_or("SERVER_HOST", "127.0.0.1");
    let port: u16 = env_or("PORT", "8080").parse()?;
    let allowed_origins = env_or("ALLOWED_ORIGINS", "*")
        .split(',')
        .map(|item| item.trim().to_owned())
        .collect::<Vec<String>>();

    let database_url = env::var("DATABASE_URL")?;
    let database_max_connections =
        env_or("DATABASE_MAX_CONNECTIONS", "20").parse()?;

    let wallet_rpc_url = env::var("WALLET_RPC_URL")?;
    let wallet_rpc_username = env_optional("WALLET_RPC_USERNAME");
    let wallet_rpc_password = env_optional("WALLET_RPC_PASSWORD");

    let timeout = env_or("TIMEOUT", "10").parse()?;
    let amount_decimals = env_or("AMOUNT_DECIMALS", "11").parse()?;
    UnitScale::new(amount_decimals)?;

    let balance_cache_ttl = env_or("BALANCE_CACHE_TTL", "300").parse()?;
    let price_cache_ttl =
        validate_price_cache_ttl(env_or("PRICE_CACHE_TTL", "7200").parse()?)?;
    let cache_cleanup_interval =
        env_or("CACHE_CLEANUP_INTERVAL", "60").parse()?;

    let allocation_scheme = env_or("ALLOCATION_SCHEME", "account").parse()?;

    let coin_btc_ticker_url = env_or(
        "COIN_BTC_TICKER_URL",
        "https://tradeogre.com/api/v1/ticker/BTC-WOW",
    );
    let btc_usd_quote_url = env_or(
        "BTC_USD_QUOTE_URL",
        "https://api.coinmarketcap.com/v2/ticker/1/?convert=USD",
    );
    let user_agent = env_or("USER_AGENT", "funding-engine");
    let auth = env::var("AUTH")?;

    let config = Config {
        server_host,
        port,
        allowed_origins,
        database_url,
        database_max_connections,
        wallet_rpc_url,
        wallet_rpc_username,
        wallet_rpc_password,
        timeout,
        amount_decimals,
        balance_cache_ttl,
        price_cache_ttl,
        cache_cleanup_interval,
        allocation_scheme,
        coin_btc_ticker_url,
        btc_usd_quote_url,
        user_agent,
        auth,
    };

    Ok(config)
}

/// Loads `.env` next to the manifest into the environment. Variables that
/// are already set win over the file.
pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";
    let directory = env!("CARGO_MANIFEST_DIR");
    let path = Path::new(directory).join(config_file);

    if !path.exists() {
        return Ok(());
    }

    let config_string = fs::read_to_string(path)?;

    for (key, value) in parse_config_string(&config_string) {
        if env::var_os(&key).is_none() {
            env::set_var(key, value);
        }
    }

    Ok(())
}

fn parse_config_string(config: &str) -> Vec<(String, String)> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"');
            (key.trim().to_owned(), value.to_owned())
        })
        .collect()
}

fn validate_price_cache_ttl(ttl: u64) -> Result<u64, Error> {
    if !(MIN_PRICE_CACHE_TTL..=MAX_PRICE_CACHE_TTL).contains(&ttl) {
        return Err(Error::ConfigurationError(format!(
            "PRICE_CACHE_TTL must be within {}..={} seconds, got {}",
            MIN_PRICE_CACHE_TTL, MAX_PRICE_CACHE_TTL, ttl
        )));
    }

    Ok(ttl)
}
