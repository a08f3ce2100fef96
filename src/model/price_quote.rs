use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::helpers::FIAT_SCALE;

/// Market rates used for display conversion. A missing rate means the
/// conversion is unavailable, never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub coin_to_btc: Option<BigDecimal>,
    pub btc_to_usd: Option<BigDecimal>,
    pub fetched_at: DateTime<Utc>,
}

impl PriceQuote {
    pub fn is_empty(&self) -> bool {
        self.coin_to_btc.is_none() && self.btc_to_usd.is_none()
    }

    /// `amount * coin_to_btc * btc_to_usd`, rounded to cents.
    pub fn to_usd(&self, amount: &BigDecimal) -> Option<BigDecimal> {
        match (&self.coin_to_btc, &self.btc_to_usd) {
            (Some(coin_to_btc), Some(btc_to_usd)) => {
                Some((amount * coin_to_btc * btc_to_usd).round(FIAT_SCALE))
            },
            _ => None,
        }
    }
}
