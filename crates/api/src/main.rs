use std::sync::Arc;

use gatehouse_api::config::GatewayConfig;
use gatehouse_auth::{InMemoryRevocationRegistry, RevocationRegistry};
use gatehouse_infra::PostgresRevocationRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gatehouse_observability::init();

    let config = GatewayConfig::from_env()?;

    let registry: Arc<dyn RevocationRegistry> = match &config.database_url {
        Some(url) => Arc::new(PostgresRevocationRegistry::connect(url).await?),
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory revocation registry");
            Arc::new(InMemoryRevocationRegistry::new())
        }
    };

    let app = gatehouse_api::app::build_app(&config, registry);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        token_header = %config.gate.token_header,
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;
    Ok(())
}
