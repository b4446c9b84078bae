use dotenvy::dotenv;
use spot_backend::app;
use spot_backend::config::settings::AppConfig;
use spot_backend::infrastructure::db::pool::{connect_to_db, run_migrations};
use spot_backend::infrastructure::storage::ObjectStorage;
use spot_backend::infrastructure::storage::s3::StorageService;
use spot_backend::modules::spot::repository::PgKeyRepository;
use spot_backend::modules::spot::service::KeyService;
use spot_backend::state::AppState;
use spot_backend::workers::transcoder::{
    FfmpegEngine, ManifestRewriter, PgManifestStore, StagingArea, TranscodePipeline,
    TranscodeQueue,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new()?;

    let db = connect_to_db(&config.database_url).await?;
    run_migrations(&db).await?;

    let storage: Arc<dyn ObjectStorage> = Arc::new(StorageService::new(
        &config.minio_url,
        &config.minio_bucket,
        &config.minio_access_key,
        &config.minio_secret_key,
        Duration::from_secs(config.presign_expiry_secs),
    ));

    let pipeline = TranscodePipeline::new(
        StagingArea::new(config.staging_root(), storage.clone()),
        Arc::new(FfmpegEngine::new(config.ffmpeg_path.clone())),
        ManifestRewriter::new(storage),
        Arc::new(PgManifestStore::new(db.clone())),
    );
    let transcoder = TranscodeQueue::start(pipeline);
    let keys = KeyService::new(Arc::new(PgKeyRepository::new(db)));

    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = AppState::new(config, transcoder.clone(), keys);
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    transcoder.shutdown();
    info!("Server stopped");
    Ok(())
}
