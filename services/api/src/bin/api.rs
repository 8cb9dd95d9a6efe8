//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{Argon2Hasher, JsonFileCollection, JwtTokenService},
    config::Config,
    error::ApiError,
    web::{router, state::AppState},
};
use bookstore_core::{
    domain::{Book, User},
    services::{BookService, UserService},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Flat-File Collections ---
    let users_store: Arc<JsonFileCollection<User>> =
        Arc::new(JsonFileCollection::new(&config.data_dir, "users"));
    let books_store: Arc<JsonFileCollection<Book>> =
        Arc::new(JsonFileCollection::new(&config.data_dir, "books"));

    if config.backup_on_start {
        // Each snapshot is independent: one failing is logged, not fatal.
        let backup_dir = config.data_dir.join("backups");
        match users_store.snapshot(&backup_dir).await {
            Ok(dest) => info!("users collection backed up to {}", dest.display()),
            Err(e) => warn!("users collection backup failed: {e}"),
        }
        match books_store.snapshot(&backup_dir).await {
            Ok(dest) => info!("books collection backed up to {}", dest.display()),
            Err(e) => warn!("books collection backup failed: {e}"),
        }
    }

    // --- 3. Wire the Record Services and Adapters ---
    let tokens = Arc::new(JwtTokenService::new(&config.jwt_secret));
    let app_state = Arc::new(AppState {
        users: UserService::new(users_store, Arc::new(Argon2Hasher)),
        books: BookService::new(books_store),
        tokens,
        config: config.clone(),
    });

    // --- 4. Build the Web Router & Start the Server ---
    let app = router(app_state);

    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
