//! HTTP front end for the conversational agent
//!
//! One route, `/query`: `POST` submits a query, `OPTIONS` answers preflight,
//! anything else is 405.

mod dto;

pub use dto::{QueryRequest, QueryResponse};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::agent::ConversationAgent;
use crate::inference::InferenceClient;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind HTTP listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Build the `/query` router around a shared agent
pub fn router<C>(agent: Arc<ConversationAgent<C>>) -> Router
where
    C: InferenceClient + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/query", post(query_handler::<C>).options(preflight_handler))
        .layer(cors)
        .with_state(agent)
}

/// Bind `addr` and serve until `shutdown` resolves
pub async fn serve<C, S>(
    agent: Arc<ConversationAgent<C>>,
    addr: SocketAddr,
    shutdown: S,
) -> Result<(), ServerError>
where
    C: InferenceClient + 'static,
    S: Future<Output = ()> + Send + 'static,
{
    info!(%addr, "Binding HTTP server");
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "Server ready to accept connections");

    axum::serve(listener, router(agent).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}

async fn query_handler<C: InferenceClient + 'static>(
    State(agent): State<Arc<ConversationAgent<C>>>,
    body: Bytes,
) -> Response {
    let request = match QueryRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejecting /query request with malformed body: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid request body").into_response();
        }
    };

    let query = request.query_text();
    info!(query, "Received /query request");
    let outcome = agent.submit_query(query).await;
    if let Err(e) = &outcome {
        error!("Query rejected: {}", e);
    }

    Json(QueryResponse::from(outcome)).into_response()
}

async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}
