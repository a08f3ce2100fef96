use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use tracing::warn;

use crate::{
    cache::TimedCache, cache_keys, error::Error, model::PriceQuote,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Market {
    CoinBtc,
    BtcUsd,
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Market::CoinBtc => write!(f, "coin/BTC"),
            Market::BtcUsd => write!(f, "BTC/USD"),
        }
    }
}

/// An upstream market price feed.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(&self, market: Market) -> Result<BigDecimal, Error>;
}

/// Both market rates, cached together for one TTL. Used for display only.
pub struct PriceOracle {
    source: Arc<dyn QuoteSource>,
    cache: TimedCache<PriceQuote>,
}

impl PriceOracle {
    pub fn new(source: Arc<dyn QuoteSource>, ttl_seconds: u64) -> Self {
        Self {
            source,
            cache: TimedCache::new(ttl_seconds),
        }
    }

    /// Current rate pair. A failing market leaves its field empty without
    /// affecting the other one.
    pub async fn get_quote(&self) -> PriceQuote {
        if let Some(quote) = self.cache.get(cache_keys::PRICES).await {
            return quote;
        }

        let (coin_to_btc, btc_to_usd) = tokio::join!(
            self.fetch(Market::CoinBtc),
            self.fetch(Market::BtcUsd)
        );

        let quote = PriceQuote {
            coin_to_btc,
            btc_to_usd,
            fetched_at: Utc::now(),
        };

        if !quote.is_empty() {
            self.cache.set(cache_keys::PRICES, quote.clone()).await;
        }

        quote
    }

    /// `None` whenever a rate is missing.
    pub async fn convert_to_usd(&self, amount: &BigDecimal) -> Option<BigDecimal> {
        self.get_quote().await.to_usd(amount)
    }

    pub async fn cleanup(&self) -> usize {
        self.cache.cleanup_expired().await
    }

    async fn fetch(&self, market: Market) -> Option<BigDecimal> {
        match self.source.quote(market).await {
            Ok(price) => Some(price),
            Err(error) => {
                warn!("{} quote unavailable: {}", market, error);
                None
            },
        }
    }
}

impl std::fmt::Debug for PriceOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceOracle")
            .field("cache", &self.cache)
            .finish()
    }
}
