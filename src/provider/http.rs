use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use reqwest::{header::USER_AGENT, Client};

use crate::{
    configuration::Config,
    error::{self, Error},
    handler::price_oracle::{Market, QuoteSource},
    types::{ExchangeTicker, MarketQuote},
};

/// Upstream market services, queried best-effort without authentication.
#[derive(Debug)]
pub struct HTTP {
    pub config: Config,
    pub http: Client,
}

impl HTTP {
    pub fn new(config: Config) -> Result<HTTP, Error> {
        let http = match Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                return Err(error::Error::ReqwestError(e));
            },
        };

        Ok(HTTP { config, http })
    }

    pub async fn get_coin_btc_price(&self) -> Result<BigDecimal, Error> {
        let ticker = self
            .http
            .get(&self.config.coin_btc_ticker_url)
            .header(USER_AGENT, self.config.user_agent.as_str())
            .send()
            .await?
            .error_for_status()?
            .json::<ExchangeTicker>()
            .await?;

        parse_exchange_ticker(&ticker)
    }

    pub async fn get_btc_usd_price(&self) -> Result<BigDecimal, Error> {
        let quote = self
            .http
            .get(&self.config.btc_usd_quote_url)
            .header(USER_AGENT, self.config.user_agent.as_str())
            .send()
            .await?
            .error_for_status()?
            .json::<MarketQuote>()
            .await?;

        parse_market_quote(&quote)
    }
}

#[async_trait]
impl QuoteSource for HTTP {
    async fn quote(&self, market: Market) -> Result<BigDecimal, Error> {
        match market {
            Market::CoinBtc => self.get_coin_btc_price().await,
            Market::BtcUsd => self.get_btc_usd_price().await,
        }
    }
}

fn parse_exchange_ticker(ticker: &ExchangeTicker) -> Result<BigDecimal, Error> {
    if ticker.success == Some(false) {
        return Err(Error::PriceUnavailable(String::from(
            "exchange ticker reported failure",
        )));
    }

    let high = ticker.high.as_deref().ok_or_else(|| {
        Error::PriceUnavailable(String::from("exchange ticker without price"))
    })?;

    Ok(BigDecimal::from_str(high.trim())?)
}

fn parse_market_quote(quote: &MarketQuote) -> Result<BigDecimal, Error> {
    let price = quote.usd_price().ok_or_else(|| {
        Error::PriceUnavailable(String::from("market quote without USD price"))
    })?;

    if !price.is_finite() || price <= 0.0 {
        return Err(Error::PriceUnavailable(format!(
            "market quote with invalid USD price {}",
            price
        )));
    }

    Ok(BigDecimal::from_str(&price.to_string())?)
}
