use docsearch::api::{create_router, queue, AppState};
use docsearch::infrastructure::{init_tracing, AppConfig, Components};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("api=debug,docsearch=debug,tower_http=debug");

    let app = AppConfig::load()?;
    let config = &app.config;

    let redis_pool = queue::create_pool(config.redis_url.as_ref())?;
    info!("Redis pool initialized");

    let components = Components::connect(
        &app,
        redis_pool.clone(),
        &[config.embedding.model.as_str(), config.llm.model.as_str()],
    )
    .await?;
    let document_service = Arc::new(components.document_service(&app));
    let rag_service = Arc::new(components.rag_service(&app));

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let state = AppState::new(
        document_service,
        rag_service,
        components.settings_store.clone(),
        components.settings.clone(),
        app,
    )
    .with_redis(redis_pool);
    let router = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
