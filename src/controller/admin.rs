//! Admin API endpoints
//!
//! Protected by the `auth` query value.

use actix_web::{delete, web, Responder};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub auth: Option<String>,
}

impl AuthQuery {
    /// Fails without an `auth` value; a wrong value yields `false`.
    pub fn is_authorized(&self, state: &State) -> Result<bool, Error> {
        let auth = self.auth.to_owned().context("Auth is required")?;
        Ok(auth == state.config.auth)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvalidateResponse {
    pub result: bool,
}

#[delete("/proposals/{id}/cache")]
pub async fn invalidate_cache(
    state: web::Data<AppState<State>>,
    path: web::Path<i64>,
    query: web::Query<AuthQuery>,
) -> Result<impl Responder, Error> {
    if !query.is_authorized(&state)? {
        return Ok(web::Json(InvalidateResponse { result: false }));
    };

    let proposal_id = path.into_inner();
    let result = state.reconciler.invalidate(proposal_id).await;

    info!("Funding cache of proposal {} invalidated: {}", proposal_id, result);

    Ok(web::Json(InvalidateResponse { result }))
}
