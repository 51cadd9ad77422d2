use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursehub::api::router;
use coursehub::config::AppConfig;
use coursehub::repository::CourseRepository;
use coursehub::state::AppState;
use coursehub::store::GitHubContentStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "coursehub=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    info!(
        "serving courses from {}/{} under '{}'",
        config.github.owner, config.github.repo, config.courses_root
    );

    let store = Arc::new(GitHubContentStore::new(config.github.clone())?);
    let state = AppState {
        repository: CourseRepository::new(store, config.courses_root.clone()),
        revalidate: config.revalidate,
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
