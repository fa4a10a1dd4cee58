use std::sync::Arc;

use cohabit_api::app::{self, ApiConfig};

#[tokio::main]
async fn main() {
    cohabit_observability::init();

    let config = ApiConfig::from_env();
    let services = Arc::new(app::build_services(&config));
    let app = app::build_app(services);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind listen address");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
