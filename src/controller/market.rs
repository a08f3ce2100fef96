//! Market API endpoints
//!
//! Display-only conversions backed by the cached quote pair.

use std::str::FromStr;

use actix_web::{get, web, Responder};
use anyhow::Context;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    amount: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub usd: Option<BigDecimal>,
}

#[get("/convert/usd")]
pub async fn convert_usd(
    state: web::Data<AppState<State>>,
    query: web::Query<ConvertQuery>,
) -> Result<impl Responder, Error> {
    let amount = BigDecimal::from_str(query.amount.trim())
        .context(format!("invalid amount {}", &query.amount))?;

    let usd = state.reconciler.convert_to_usd(&amount).await;

    Ok(web::Json(ConvertResponse { usd }))
}

#[get("/prices")]
pub async fn prices(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let quote = state.reconciler.get_prices().await;
    Ok(web::Json(quote))
}
