//! Self-registration with the service registry (Consul)
//!
//! The [`RegistrationSupervisor`] runs once at startup, independent of the
//! polling loop: it retries a bounded number of times with a fixed backoff
//! and then stops, whether or not registration succeeded.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{Config, ConsulConfig};
use crate::constants::registry::REQUEST_TIMEOUT;
use crate::errors::RegistryError;
use crate::rpc::with_scheme;

/// Health check the registry runs against this monitor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthCheck {
    #[serde(rename = "HTTP")]
    pub http: String,
    pub interval: String,
    pub timeout: String,
}

/// Service definition submitted on every attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRegistration {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub port: u16,
    pub check: HealthCheck,
}

impl ServiceRegistration {
    pub fn from_config(config: &Config, consul: &ConsulConfig) -> Self {
        Self {
            id: config.node_name.clone(),
            name: consul.service_name.clone(),
            tags: consul.tags.clone(),
            port: consul.service_port,
            check: HealthCheck {
                http: config.health_check_url(),
                interval: consul.check_interval.clone(),
                timeout: consul.check_timeout.clone(),
            },
        }
    }
}

#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn register_service(&self, registration: &ServiceRegistration) -> Result<(), RegistryError>;
}

pub struct ConsulClient {
    client: Client,
    address: String,
}

impl ConsulClient {
    pub fn new(address: &str) -> Result<Self, RegistryError> {
        let address = with_scheme(address);
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RegistryError::Transport {
                address: address.clone(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, address })
    }
}

#[async_trait]
impl RegistryClient for ConsulClient {
    async fn register_service(&self, registration: &ServiceRegistration) -> Result<(), RegistryError> {
        let url = format!("{}/v1/agent/service/register", self.address);

        let response = self
            .client
            .put(&url)
            .json(registration)
            .send()
            .await
            .map_err(|e| RegistryError::Transport {
                address: self.address.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RegistryError::Rejected {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered { attempts: u32 },
    GaveUp { attempts: u32 },
}

pub struct RegistrationSupervisor {
    client: Arc<dyn RegistryClient>,
    registration: ServiceRegistration,
    max_attempts: u32,
    backoff: Duration,
}

impl RegistrationSupervisor {
    pub fn new(
        client: Arc<dyn RegistryClient>,
        registration: ServiceRegistration,
        max_attempts: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            client,
            registration,
            max_attempts,
            backoff,
        }
    }

    pub fn from_config(client: Arc<dyn RegistryClient>, config: &Config, consul: &ConsulConfig) -> Self {
        Self::new(
            client,
            ServiceRegistration::from_config(config, consul),
            consul.max_attempts,
            consul.retry_backoff(),
        )
    }

    pub fn spawn(self) -> JoinHandle<RegistrationOutcome> {
        tokio::spawn(self.run())
    }

    /// Register, sleeping `backoff` between failed attempts. Never panics or
    /// propagates; the monitor keeps running without registry visibility.
    pub async fn run(self) -> RegistrationOutcome {
        for attempt in 1..=self.max_attempts {
            match self.client.register_service(&self.registration).await {
                Ok(()) => {
                    info!(
                        "Service {} registered in consul as {}",
                        self.registration.name, self.registration.id
                    );
                    return RegistrationOutcome::Registered { attempts: attempt };
                }
                Err(e) => {
                    warn!(
                        "Failed to register in consul (attempt {}/{}): {}",
                        attempt, self.max_attempts, e
                    );
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.backoff).await;
            }
        }

        warn!(
            "Stop trying to register on consul after {} attempts",
            self.max_attempts
        );
        RegistrationOutcome::GaveUp {
            attempts: self.max_attempts,
        }
    }
}
