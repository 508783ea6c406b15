mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};

use crate::api::{DynAPI, API};
use crate::server::handlers::{bids, jobs};

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) {
    let api = Arc::new(api) as DynAPI;

    let app = Router::new()
        .route("/jobs", post(jobs::create))
        .route("/jobs/:id", get(jobs::find))
        .route("/jobs/:id/award", post(jobs::award))
        .route("/jobs/:id/bids", post(bids::create).get(bids::list))
        .layer(Extension(api));

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
