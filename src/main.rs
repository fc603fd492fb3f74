use resume_rag::api::{create_router, AppState};
use resume_rag::application::{AnalysisService, ChatService, RagService, SessionIndex};
use resume_rag::infrastructure::{embedding, history, vector_store, AppConfig, RigGenerator};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resume_rag=debug,api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let app_config = AppConfig::from_env()?;
    let config = &app_config.config;

    let embedder = embedding::from_config(&config.embedding)?;
    info!(model = embedder.model_id(), dimension = embedder.dimension(), "Embedding ready");

    let index = vector_store::from_config(&config.vector_store, embedder.dimension())?;
    info!(backend = %config.vector_store.backend, "Vector index ready");

    let generator = Arc::new(RigGenerator::from_config(&config.llm)?);
    info!(provider = %config.llm.provider, model = generator.model(), "Generator ready");

    let (store, redis_pool) = history::from_config(&config.history)?;
    info!(backend = %config.history.backend, "History store ready");

    let session = Arc::new(
        SessionIndex::new(embedder, index, config.rag.chunker()?)
            .with_embed_timeout(Duration::from_secs(config.embedding.timeout_seconds)),
    );
    let rag = Arc::new(RagService::new(session.clone(), config.rag.top_k));
    let chat = Arc::new(ChatService::new(rag.clone(), generator.clone(), &app_config));
    let analysis = Arc::new(AnalysisService::new(session, generator, store, &app_config));

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let state = AppState::new(app_config.clone(), rag, chat, analysis).with_redis_pool(redis_pool);
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
