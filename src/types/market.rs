use serde::Deserialize;

/// Exchange ticker, e.g. `GET /api/v1/ticker/BTC-WOW`. Prices come as strings.
#[derive(Debug, Deserialize)]
pub struct ExchangeTicker {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub high: Option<String>,
}

/// Market data ticker, `data.quotes.USD.price`.
#[derive(Debug, Deserialize)]
pub struct MarketQuote {
    #[serde(default)]
    pub data: Option<MarketQuoteData>,
}

#[derive(Debug, Deserialize)]
pub struct MarketQuoteData {
    #[serde(default)]
    pub quotes: Option<MarketQuoteCurrencies>,
}

#[derive(Debug, Deserialize)]
pub struct MarketQuoteCurrencies {
    #[serde(rename = "USD", default)]
    pub usd: Option<MarketQuotePrice>,
}

#[derive(Debug, Deserialize)]
pub struct MarketQuotePrice {
    #[serde(default)]
    pub price: Option<f64>,
}

impl MarketQuote {
    pub fn usd_price(&self) -> Option<f64> {
        self.data
            .as_ref()
            .and_then(|data| data.quotes.as_ref())
            .and_then(|quotes| quotes.usd.as_ref())
            .and_then(|usd| usd.price)
    }
}
