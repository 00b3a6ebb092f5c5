use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use pavilion_server::config::Config;
use pavilion_server::gateway::ChapaGateway;
use pavilion_server::routes::create_routes;
use pavilion_server::services::AdminGate;
use pavilion_server::state::AppState;
use pavilion_server::storage::HttpObjectStore;
use pavilion_server::store::PgStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    if config.gateway_secret_key.is_empty() {
        tracing::warn!("CHAPA_SECRET_KEY is not set; payment calls will be rejected upstream");
    }

    let gateway = ChapaGateway::new(
        config.gateway_base_url.clone(),
        config.gateway_secret_key.clone(),
        config.gateway_timeout,
    )
    .expect("Failed to build gateway client");

    let objects = HttpObjectStore::new(
        config.storage_base_url.clone(),
        config.storage_bucket.clone(),
        config.storage_api_key.clone(),
        config.gateway_timeout,
    )
    .expect("Failed to build object store client");

    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(gateway),
        Arc::new(objects),
        AdminGate::new(config.admin_email.clone()),
        config.gateway_currency.clone(),
        config.checkout_return_url.clone(),
    );

    let app: Router = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
