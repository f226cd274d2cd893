//! Read-only chain queries over the NEAR JSON-RPC `query` method.
//!
//! Uses the ethers HTTP JSON-RPC transport; NEAR speaks plain JSON-RPC 2.0 so
//! only the method name and params differ from an EVM node.

use crate::chain::ChainView;
use crate::error::{Error, Result};
use crate::utils;
use async_trait::async_trait;
use base64::Engine;
use ethers::providers::{Http, HttpClientError, JsonRpcClient};
use ethers::types::U256;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct NearRpcClient {
    transport: Http,
    token_contract: String,
    multisender_contract: String,
}

impl NearRpcClient {
    pub fn new(rpc_url: &str, token_contract: &str, multisender_contract: &str) -> anyhow::Result<Self> {
        let url = Url::parse(rpc_url)?;
        Ok(Self {
            transport: Http::new(url),
            token_contract: token_contract.to_string(),
            multisender_contract: multisender_contract.to_string(),
        })
    }

    async fn query(&self, params: Value) -> std::result::Result<Value, HttpClientError> {
        self.transport.request("query", params).await
    }

    /// Run a view function and decode its JSON return value.
    async fn view_function(&self, contract: &str, method: &str, args: Value) -> Result<Value> {
        let args_base64 = base64::engine::general_purpose::STANDARD.encode(args.to_string());
        let params = json!({
            "request_type": "call_function",
            "finality": "final",
            "account_id": contract,
            "method_name": method,
            "args_base64": args_base64,
        });

        let response = self.query(params).await.map_err(classify)?;
        if let Some(err) = response.get("error") {
            return Err(Error::Query(format!("{contract}.{method}: {err}")));
        }
        decode_call_result(&response)
            .map_err(|e| Error::Query(format!("{contract}.{method}: {e}")))
    }
}

/// Transport-level failures become [`Error::Transport`], node errors [`Error::Query`].
fn classify(err: HttpClientError) -> Error {
    match err {
        HttpClientError::ReqwestError(e) => Error::Transport(e.to_string()),
        other => Error::Query(other.to_string()),
    }
}

/// `call_function` results carry the return value as a byte array of JSON text.
fn decode_call_result(response: &Value) -> anyhow::Result<Value> {
    let bytes: Vec<u8> = response
        .get("result")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow::anyhow!("missing result bytes"))?
        .iter()
        .map(|b| {
            b.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| anyhow::anyhow!("result is not a byte array"))
        })
        .collect::<anyhow::Result<_>>()?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl ChainView for NearRpcClient {
    async fn account_exists(&self, account_id: &str) -> Result<bool> {
        let params = json!({
            "request_type": "view_account",
            "finality": "final",
            "account_id": account_id,
        });
        match self.query(params).await {
            Ok(response) => Ok(response.get("error").is_none()),
            Err(HttpClientError::ReqwestError(e)) => Err(Error::Transport(e.to_string())),
            Err(e) => {
                debug!("Account lookup for {} failed: {}", account_id, e);
                Ok(false)
            }
        }
    }

    async fn is_storage_registered(&self, account_id: &str) -> Result<bool> {
        let balance = self
            .view_function(
                &self.token_contract,
                "storage_balance_of",
                json!({ "account_id": account_id }),
            )
            .await?;
        Ok(!balance.is_null())
    }

    async fn get_deposit(&self, account_id: &str) -> Result<U256> {
        let deposit = self
            .view_function(
                &self.multisender_contract,
                "get_deposit",
                json!({ "account_id": account_id }),
            )
            .await?;
        let raw = match &deposit {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        utils::parse_base_units(&raw).map_err(|e| Error::Query(e.to_string()))
    }
}
