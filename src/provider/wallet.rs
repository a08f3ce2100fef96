use std::time::Duration;

use async_trait::async_trait;
use digest_auth::AuthContext;
use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT, WWW_AUTHENTICATE},
    Client, Response, StatusCode, Url,
};
use serde_json::Value;
use tracing::debug;

use crate::{
    configuration::Config,
    error::{Error, RpcError},
    types::{RpcRequest, RpcResponse},
};

/// One JSON-RPC 2.0 round trip to the wallet daemon.
///
/// Implementations never retry: account and address creation are not safe
/// to repeat, so retry policy stays with the caller.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

#[derive(Debug)]
pub struct WalletClient {
    url: Url,
    credentials: Option<(String, String)>,
    user_agent: String,
    http: Client,
}

impl WalletClient {
    pub fn new(config: &Config) -> Result<WalletClient, Error> {
        let url = Url::parse(&config.wallet_rpc_url)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        let credentials = match (
            &config.wallet_rpc_username,
            &config.wallet_rpc_password,
        ) {
            (Some(username), Some(password)) => {
                Some((username.to_owned(), password.to_owned()))
            },
            _ => None,
        };

        Ok(WalletClient {
            url,
            credentials,
            user_agent: config.user_agent.to_owned(),
            http,
        })
    }

    async fn post(
        &self,
        body: &[u8],
        authorization: Option<String>,
    ) -> Result<Response, RpcError> {
        let mut request = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, self.user_agent.as_str())
            .body(body.to_vec());

        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        Ok(request.send().await?)
    }

    fn digest_authorization(
        &self,
        challenge: &Response,
        username: &str,
        password: &str,
        body: &[u8],
    ) -> Result<String, RpcError> {
        let header = challenge
            .headers()
            .get(WWW_AUTHENTICATE)
            .ok_or_else(|| RpcError::Auth(String::from("missing challenge")))?
            .to_str()
            .map_err(|e| RpcError::Auth(e.to_string()))?;

        let mut prompt = digest_auth::parse(header)
            .map_err(|e| RpcError::Auth(e.to_string()))?;
        let context =
            AuthContext::new_post(username, password, self.url.path(), Some(body));
        let answer = prompt
            .respond(&context)
            .map_err(|e| RpcError::Auth(e.to_string()))?;

        Ok(answer.to_header_string())
    }
}

#[async_trait]
impl RpcTransport for WalletClient {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let body = serde_json::to_vec(&RpcRequest::new(method, params))?;
        let mut response = self.post(&body, None).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some((username, password)) = &self.credentials {
                debug!("wallet rpc {}: answering digest challenge", method);
                let authorization =
                    self.digest_authorization(&response, username, password, &body)?;
                response = self.post(&body, Some(authorization)).await?;
            }
        }

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        parse_response(&bytes)
    }
}

pub fn parse_response(bytes: &[u8]) -> Result<Value, RpcError> {
    let response: RpcResponse = serde_json::from_slice(bytes)?;

    if let Some(error) = response.error {
        return Err(RpcError::Daemon {
            code: error.code,
            message: error.message,
        });
    }

    response
        .result
        .ok_or_else(|| RpcError::Malformed(String::from("missing result")))
}
