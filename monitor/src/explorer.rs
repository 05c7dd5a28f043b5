//! Block explorer client used as the independent view of the chain head

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ExplorerError;
use crate::monitor::Chain;
use crate::rpc::parse_quantity;

#[async_trait]
pub trait ExplorerClient: Send + Sync {
    /// Latest block number as seen by the explorer
    async fn remote_block_number(&self) -> Result<u64, ExplorerError>;
}

/// Builds the explorer client for a chain resolved at connection time
pub type ExplorerFactory =
    Box<dyn Fn(Chain) -> Result<Arc<dyn ExplorerClient>, ExplorerError> + Send + Sync>;

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    result: Value,
    message: Option<String>,
}

pub struct EtherscanClient {
    client: Client,
    url: String,
}

impl EtherscanClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ExplorerError> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExplorerError::Transport {
                url: url.clone(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, url })
    }

    pub fn for_chain(chain: Chain, timeout: Duration) -> Result<Self, ExplorerError> {
        Self::new(chain.explorer_url(), timeout)
    }

    /// Factory producing Etherscan clients for whichever chain the node reports
    pub fn factory(timeout: Duration) -> ExplorerFactory {
        Box::new(move |chain| {
            let client = EtherscanClient::for_chain(chain, timeout)?;
            Ok(Arc::new(client) as Arc<dyn ExplorerClient>)
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ExplorerClient for EtherscanClient {
    async fn remote_block_number(&self) -> Result<u64, ExplorerError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ExplorerError::Transport {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ExplorerError::Http {
                status: response.status().as_u16(),
            });
        }

        let body: EtherscanResponse =
            response
                .json()
                .await
                .map_err(|e| ExplorerError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        // Rate-limit and API errors come back as 200 with a text result
        match body.result.as_str() {
            Some(raw) => parse_quantity(raw).map_err(|reason| ExplorerError::InvalidResponse {
                reason: match body.message {
                    Some(message) => format!("{} ({})", reason, message),
                    None => reason,
                },
            }),
            None => Err(ExplorerError::InvalidResponse {
                reason: format!("unexpected result {}", body.result),
            }),
        }
    }
}
