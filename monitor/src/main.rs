use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use node_monitor::web::{start_web_server, AppState};
use node_monitor::{
    ConfigManager, ConsulClient, EthRpcClient, EtherscanClient, HealthFlags, Monitor,
    PrometheusSink, RegistrationSupervisor,
};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("node_monitor=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting node monitor");

    // Load configuration
    let config_dir = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let config_manager = ConfigManager::new(&config_dir).await?;
    let config = config_manager.get_current_config();

    let sink = Arc::new(PrometheusSink::new(&config.metrics_namespace)?);
    let node_client = Arc::new(EthRpcClient::new(&config.endpoint, config.rpc_timeout())?);
    info!("Node RPC client targeting {}", node_client.endpoint());

    let health = HealthFlags::new();
    let cancel = CancellationToken::new();

    // Registration runs on its own; failure only costs registry visibility
    let registration = match &config.consul {
        Some(consul) => match ConsulClient::new(&consul.address) {
            Ok(client) => {
                let supervisor =
                    RegistrationSupervisor::from_config(Arc::new(client), &config, consul);
                Some(supervisor.spawn())
            }
            Err(e) => {
                error!("Consul registration disabled: {}", e);
                None
            }
        },
        None => {
            warn!("No [consul] section configured, skipping service registration");
            None
        }
    };

    let state = AppState::new(config.clone(), health.clone(), sink.clone());
    let web_server = tokio::spawn(start_web_server(state, cancel.clone()));

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received, shutting down"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
        shutdown.cancel();
    });

    let monitor = Monitor::new(
        &config,
        node_client,
        EtherscanClient::factory(config.rpc_timeout()),
        sink,
        health,
    );
    let monitor_handle = tokio::spawn(monitor.run(cancel.clone()));

    // The server only returns on shutdown or on a bind/serve failure
    let server_result = web_server.await;
    cancel.cancel();
    monitor_handle.await?;

    if let Some(handle) = registration {
        handle.abort();
    }

    server_result??;

    info!("Node monitor stopped");
    Ok(())
}
