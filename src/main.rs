// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relational_transfer_gate::{
    api::router,
    config::GateConfig,
    denylist_poller::DenylistPoller,
    gate::{DenylistChecker, DenylistSource, RiskClassifier, StepUpAuthenticator, VelocityTracker},
    ledger::{EvmSubmitter, HOLESKY},
    state::AppState,
    transfer::TransferController,
};

#[tokio::main]
async fn main() {
    init_tracing();

    // Misconfiguration is fatal: the gate must not start with a missing
    // step-up credential or signing key.
    let config = GateConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        std::process::exit(1);
    });

    let http = reqwest::Client::new();
    let source = DenylistSource::new(&config.fraud_list, config.mixer_list.as_deref());

    // Initial denylist load. A fraud-list failure here is fatal: starting
    // without it would silently disable fraud protection.
    let sets = source.load(&http).await.unwrap_or_else(|e| {
        eprintln!("Failed to load denylists: {e}");
        std::process::exit(1);
    });
    info!(
        fraud_entries = sets.fraud_len(),
        mixer_entries = sets.mixer_len(),
        "Denylists loaded"
    );
    let denylist = Arc::new(DenylistChecker::new(sets));

    let velocity = VelocityTracker::open(&config.velocity_db_path(), config.cooldown)
        .unwrap_or_else(|e| {
            eprintln!("Failed to open velocity store: {e}");
            std::process::exit(1);
        });

    let submitter = EvmSubmitter::new(HOLESKY, &config.ledger_rpc_url, &config.ledger_signing_key)
        .unwrap_or_else(|e| {
            eprintln!("Failed to initialize ledger submitter: {e}");
            std::process::exit(1);
        });

    let controller = Arc::new(TransferController::new(
        Arc::clone(&denylist),
        velocity,
        RiskClassifier::new(config.large_amount_threshold_wei),
        StepUpAuthenticator::new(config.step_up_credential.clone()),
        Arc::new(submitter),
        config.submit_timeout,
    ));

    // Background denylist refresh with graceful shutdown.
    let shutdown = CancellationToken::new();
    let poller = DenylistPoller::new(
        Arc::clone(&denylist),
        source,
        http,
        config.denylist_refresh,
    );
    let poller_handle = tokio::spawn(poller.run(shutdown.clone()));

    let state = AppState::new(controller);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .unwrap_or_else(|e| {
            eprintln!("Failed to parse bind address: {e}");
            std::process::exit(1);
        });

    info!(%addr, "Transfer gate listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutdown signal received");
                shutdown.cancel();
            }
        })
        .await
        .expect("HTTP server failed");

    shutdown.cancel();
    let _ = poller_handle.await;
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
