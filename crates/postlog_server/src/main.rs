//! Postlog HTTP server
//!
//! Reads `POSTLOG_*` settings and serves the collect and clear endpoints.

use postlog_server::{router, serve, AppState, ServerConfig};
use postlog_sync_engine::{ReqwestClient, SyncEngine, TistoryGateway};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env()?;
    info!(
        target_blog = %config.target_blog_name,
        storage_post = %config.storage_post_id,
        "configuration loaded"
    );

    // The blocking HTTP client must be created and dropped outside the runtime.
    let gateway = TistoryGateway::new(
        ReqwestClient::new(REQUEST_TIMEOUT)?,
        config.credentials.clone(),
    );
    let engine = Arc::new(SyncEngine::with_clock(
        config.sync_config(),
        gateway,
        config.clock(),
    ));
    let state = AppState::new(
        Arc::clone(&engine),
        config.collect_request(),
        config.clear_request(),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config.bind_addr, router(state)))?;
    drop(runtime);
    drop(engine);

    Ok(())
}
