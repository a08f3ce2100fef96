use actix_web::{http::StatusCode, ResponseError};
use anyhow::Error as ANYHOW_ERROR;
use bigdecimal::ParseBigDecimalError as BIG_DECIMAL_ERROR;
use reqwest::Error as REQWEST_ERROR;
use serde_json::Error as JSON_ERROR;
use sqlx::error::Error as SQL_ERROR;
use std::{
    env::VarError, io::Error as IO_ERROR, num::ParseIntError,
    str::ParseBoolError as PARSE_BOOL_ERROR,
};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;
use url::ParseError as URL_ERROR;

/// Failure talking to the wallet daemon. Always recoverable by the caller.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("wallet rpc transport: {0}")]
    Transport(#[source] REQWEST_ERROR),

    #[error("wallet rpc timed out")]
    Timeout,

    #[error("wallet rpc returned http status {0}")]
    Status(u16),

    #[error("wallet rpc malformed response: {0}")]
    Malformed(String),

    #[error("wallet rpc error {code}: {message}")]
    Daemon { code: i64, message: String },

    #[error("wallet rpc digest auth: {0}")]
    Auth(String),
}

impl From<REQWEST_ERROR> for RpcError {
    fn from(error: REQWEST_ERROR) -> Self {
        if error.is_timeout() {
            return RpcError::Timeout;
        }
        if error.is_decode() {
            return RpcError::Malformed(error.to_string());
        }
        RpcError::Transport(error)
    }
}

impl From<JSON_ERROR> for RpcError {
    fn from(error: JSON_ERROR) -> Self {
        RpcError::Malformed(error.to_string())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    URL(#[from] URL_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[error("{0}")]
    SQL(#[from] SQL_ERROR),

    #[error("{0}")]
    VAR(#[from] VarError),

    #[error("{0}")]
    TokioJoinError(#[from] JoinError),

    #[error("{0}")]
    BigDecimalError(#[from] BIG_DECIMAL_ERROR),

    #[error("{0}")]
    JsonError(#[from] JSON_ERROR),

    #[error("{0}")]
    ParseBoolError(#[from] PARSE_BOOL_ERROR),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("{0}")]
    ReqwestError(#[from] REQWEST_ERROR),

    #[error("{0}")]
    AnyHowError(#[from] ANYHOW_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Server end with error: {0}")]
    ServerError(String),

    #[error("{0}")]
    Rpc(#[from] RpcError),

    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("Price unavailable: {0}")]
    PriceUnavailable(String),

    #[error("Proposal not found: {0}")]
    ProposalNotFound(i64),

    #[error("Proposal {0} does not accept donations")]
    NotAcceptingDonations(i64),

    #[error("Invalid option {option}")]
    InvalidOption { option: String },
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::ProposalNotFound(_) => StatusCode::NOT_FOUND,
            Error::NotAcceptingDonations(_) => StatusCode::CONFLICT,
            Error::ConfigurationError(_)
            | Error::InvalidOption { .. }
            | Error::BigDecimalError(_)
            | Error::AnyHowError(_) => StatusCode::BAD_REQUEST,
            Error::WalletUnavailable(_) | Error::Rpc(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
