//! Proposal API endpoints
//!
//! Funding state, donation addresses and proposal creation.

use actix_web::{get, post, web, Responder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    configuration::{AppState, State},
    controller::admin::AuthQuery,
    error::Error,
    model::{NewProposal, Proposal},
};

// =============================================================================
// Funding
// =============================================================================

#[get("/proposals/{id}/balance")]
pub async fn balance(
    state: web::Data<AppState<State>>,
    path: web::Path<i64>,
) -> Result<impl Responder, Error> {
    let funding = state.reconciler.get_balance(path.into_inner()).await?;
    Ok(web::Json(funding))
}

#[get("/proposals/{id}/spends")]
pub async fn spends(
    state: web::Data<AppState<State>>,
    path: web::Path<i64>,
) -> Result<impl Responder, Error> {
    let funding = state.reconciler.get_spends(path.into_inner()).await?;
    Ok(web::Json(funding))
}

// =============================================================================
// Donation Address
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct DonationAddressResponse {
    pub address: Option<String>,
    pub payment_id: Option<String>,
    pub available: bool,
}

#[get("/proposals/{id}/donation-address")]
pub async fn donation_address(
    state: web::Data<AppState<State>>,
    path: web::Path<i64>,
) -> Result<impl Responder, Error> {
    let proposal_id = path.into_inner();

    let response = match state
        .reconciler
        .ensure_donation_address(proposal_id)
        .await
    {
        Ok(donation) => DonationAddressResponse {
            address: Some(donation.address),
            payment_id: donation.payment_id,
            available: true,
        },
        Err(Error::WalletUnavailable(e)) => {
            warn!("Donation address of proposal {} unavailable: {}", proposal_id, e);
            DonationAddressResponse {
                address: None,
                payment_id: None,
                available: false,
            }
        },
        Err(e) => return Err(e),
    };

    Ok(web::Json(response))
}

// =============================================================================
// Create
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResponse {
    pub result: bool,
    pub proposal: Option<Proposal>,
}

#[post("/proposals")]
pub async fn create(
    state: web::Data<AppState<State>>,
    query: web::Query<AuthQuery>,
    data: web::Json<NewProposal>,
) -> Result<impl Responder, Error> {
    if !query.is_authorized(&state)? {
        return Ok(web::Json(CreateResponse {
            result: false,
            proposal: None,
        }));
    };

    let proposal = state.reconciler.create_proposal(data.into_inner()).await?;

    Ok(web::Json(CreateResponse {
        result: true,
        proposal: Some(proposal),
    }))
}
