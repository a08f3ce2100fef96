use actix_web::{get, web, Responder};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse<'a> {
    pub version: Option<&'a str>,
}

#[get("/version")]
pub async fn version() -> Result<impl Responder, Error> {
    const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

    Ok(web::Json(VersionResponse { version: VERSION }))
}
