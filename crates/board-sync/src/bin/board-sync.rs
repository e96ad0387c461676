//! Board sync service binary.
//!
//! Standalone HTTP service applying board automation to GitHub webhooks.

use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use board_sync::{
    config::Config, server, BoardApi, GitHubProjectsClient, ProjectSchema, SyncOrchestrator,
    TypeMapping,
};

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("board_sync=info".parse()?);
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("Starting board sync service...");

    let config = Config::default();
    let target = config
        .validate()
        .map_err(|missing| anyhow!("Missing configuration: {}", missing.join(", ")))?;

    let client = GitHubProjectsClient::new(target.token, config.request_timeout)
        .context("Failed to create GitHub client")?
        .with_api_url(config.graphql_url.clone());
    let api: Arc<dyn BoardApi> = Arc::new(client);

    let schema = ProjectSchema::load(api.as_ref(), target.organization, target.board_number)
        .await
        .context("Failed to load board schema")?;
    info!(board_id = %schema.id, "Board schema ready");

    let types = TypeMapping::new();
    match &schema.organization_id {
        Some(organization_id) => match api.fetch_field_ids_by_name(organization_id).await {
            Ok(ids) => {
                let loaded = types.load_type_ids(&ids);
                info!(count = loaded, "Issue types loaded");
            }
            Err(e) => {
                // Non-fatal - service runs without type assignment
                warn!(error = %e, "Could not load organization issue types");
            }
        },
        None => warn!("Board schema has no organization id - issue types disabled"),
    }

    let orchestrator = SyncOrchestrator::new(api, Arc::new(schema), Arc::new(types));
    let state = server::AppState {
        orchestrator,
        max_body_bytes: config.max_body_bytes,
    };

    let app = server::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(port = config.port, "Board sync service listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
