/// Implementation of `bps serve`.
///
/// Wires the simulated sensor bank into a [`Producer`], shares the
/// resulting [`BatchStore`] with a [`Server`], and runs until Ctrl-C.
use std::sync::Arc;

use anyhow::{Context, Result};
use bps_server::{BatchStore, Producer, QueryHandler, Server, ServerConfig};

use crate::ServeArgs;
use crate::source::SimulatedSensors;

fn config(args: &ServeArgs) -> ServerConfig {
    ServerConfig {
        listen_addr: args.listen.clone(),
        codec: args.codec,
        sample_hz: args.sample_hz,
        batch_samples: args.batch_samples,
        cache_batches: args.cache_batches,
        sensor_names: args.sensors.iter().map(|s| s.trim().to_string()).collect(),
    }
}

/// Run the `bps serve` command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the listen address
/// cannot be bound, or the Ctrl-C handler cannot be installed.
pub async fn run(args: &ServeArgs) -> Result<()> {
    let config = config(args);
    config.validate().context("invalid serve options")?;

    let store = Arc::new(BatchStore::new(config.cache_batches));
    let source = SimulatedSensors::new(&config.sensor_names);
    let producer = Producer::new(source, &config, Arc::clone(&store))?;

    let handler = QueryHandler::from_config(&config, Arc::clone(&store));
    let server = Server::bind(&config.listen_addr, handler)
        .await
        .with_context(|| format!("cannot listen on {}", config.listen_addr))?;

    tracing::info!(
        addr = %server.local_addr()?,
        codec = %config.codec,
        sensors = ?config.sensor_names,
        batch_seconds = config.batch_seconds(),
        cache_batches = config.cache_batches,
        "sender ready"
    );

    let producer = tokio::spawn(producer.run());
    tokio::select! {
        () = server.serve() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("cannot install Ctrl-C handler")?;
            tracing::info!(cached = store.len(), "shutting down");
        }
    }
    producer.abort();
    Ok(())
}
