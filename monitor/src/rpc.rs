//! Node JSON-RPC client
//!
//! [`NodeClient`] is the capability the monitoring core polls. [`EthRpcClient`]
//! implements it over HTTP against a Parity/OpenEthereum style endpoint.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::errors::NodeError;
use crate::monitor::Block;

/// Queries the monitor needs from a node
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Chain identity reported by the node (e.g. "foundation")
    async fn chain_id(&self) -> Result<String, NodeError>;

    async fn peer_count(&self) -> Result<u64, NodeError>;

    async fn current_block_number(&self) -> Result<u64, NodeError>;

    async fn block_by_number(&self, number: u64) -> Result<Block, NodeError>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcBlock {
    number: String,
    timestamp: String,
}

pub struct EthRpcClient {
    client: Client,
    endpoint: String,
}

impl EthRpcClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, NodeError> {
        let endpoint = with_scheme(endpoint);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NodeError::Transport {
                endpoint: endpoint.clone(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, NodeError> {
        let request_body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": Uuid::new_v4().to_string()
        });

        debug!("Calling {} on {}", method, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.classify(method, e))?;

        if !response.status().is_success() {
            return Err(NodeError::Http {
                status: response.status().as_u16(),
                method: method.to_string(),
            });
        }

        let rpc_response: RpcResponse =
            response
                .json()
                .await
                .map_err(|e| NodeError::InvalidResponse {
                    method: method.to_string(),
                    reason: e.to_string(),
                })?;

        if let Some(error) = rpc_response.error {
            return Err(NodeError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = rpc_response.result.unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(|e| NodeError::InvalidResponse {
            method: method.to_string(),
            reason: e.to_string(),
        })
    }

    fn classify(&self, method: &str, err: reqwest::Error) -> NodeError {
        if err.is_timeout() {
            NodeError::Timeout {
                endpoint: self.endpoint.clone(),
                method: method.to_string(),
            }
        } else if err.is_connect() {
            NodeError::ConnectionRefused {
                endpoint: self.endpoint.clone(),
            }
        } else {
            NodeError::Transport {
                endpoint: self.endpoint.clone(),
                reason: err.to_string(),
            }
        }
    }

    async fn quantity(&self, method: &str) -> Result<u64, NodeError> {
        let raw: String = self.call(method, serde_json::json!([])).await?;
        parse_quantity(&raw).map_err(|reason| NodeError::InvalidResponse {
            method: method.to_string(),
            reason,
        })
    }
}

#[async_trait]
impl NodeClient for EthRpcClient {
    async fn chain_id(&self) -> Result<String, NodeError> {
        self.call("parity_chain", serde_json::json!([])).await
    }

    async fn peer_count(&self) -> Result<u64, NodeError> {
        self.quantity("net_peerCount").await
    }

    async fn current_block_number(&self) -> Result<u64, NodeError> {
        self.quantity("eth_blockNumber").await
    }

    async fn block_by_number(&self, number: u64) -> Result<Block, NodeError> {
        const METHOD: &str = "eth_getBlockByNumber";

        let block: Option<RpcBlock> = self
            .call(METHOD, serde_json::json!([format!("{:#x}", number), false]))
            .await?;
        let block = block.ok_or(NodeError::BlockNotFound { number })?;

        let invalid = |reason: String| NodeError::InvalidResponse {
            method: METHOD.to_string(),
            reason,
        };
        let number = parse_quantity(&block.number).map_err(invalid)?;
        let seconds = parse_quantity(&block.timestamp).map_err(invalid)?;
        let timestamp = i64::try_from(seconds)
            .ok()
            .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
            .ok_or_else(|| invalid(format!("timestamp {} out of range", seconds)))?;

        Ok(Block::new(number, timestamp))
    }
}

/// Decode a JSON-RPC hex quantity such as `"0x1b4"`
pub fn parse_quantity(raw: &str) -> Result<u64, String> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| format!("'{}' is not a hex quantity", raw))?;

    if digits.is_empty() {
        return Err(format!("'{}' has no digits", raw));
    }

    u64::from_str_radix(digits, 16).map_err(|e| format!("'{}': {}", raw, e))
}

/// Prefix `http://` when the configured address has no scheme
pub fn with_scheme(address: &str) -> String {
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}
