//! HTTP surface: location ingress and dispatch queries.
//!
//! Store calls are synchronous, so every handler hands its store work to the
//! blocking pool and only awaits the result.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{Level, Span, error, info};

use crate::error::{DispatchError, StoreError};
use crate::haversine::Haversine;
use crate::ingress::{LocationReport, apply_location_report};
use crate::model::{Coordinates, Driver, ShipmentContext};
use crate::selector::{Recommendation, SelectOptions, recommend};
use crate::traits::DriverStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DriverStore>,
    pub shipment: ShipmentContext,
    pub select: SelectOptions,
    pub metric: Haversine,
}

impl AppState {
    pub fn new(store: Arc<dyn DriverStore>, shipment: ShipmentContext, select: SelectOptions) -> Self {
        Self {
            store,
            shipment,
            select,
            metric: Haversine::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverRecommendation {
    pub driver: Driver,
    pub score: f64,
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            DispatchError::InvalidRequest(reason) => (StatusCode::BAD_REQUEST, reason),
            DispatchError::NotFound(reason) => (StatusCode::NOT_FOUND, reason),
            DispatchError::StoreUnavailable(err) => {
                error!(error = %err, "driver store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub fn create_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new()
        .route("/update-location", post(update_location))
        .route("/min-distance-driver", get(min_distance_driver))
        .route("/driver-coordinates", get(driver_coordinates));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::span!(
                        Level::INFO,
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_response(|response: &axum::http::Response<_>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_secs_f64() * 1000.0,
                        "response sent"
                    );
                })
                .on_failure(|failure: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                    error!(
                        %failure,
                        latency_ms = latency.as_secs_f64() * 1000.0,
                        "request failed"
                    );
                }),
        )
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "driver dispatch listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => {
            error!(error = %err, "cannot listen for Ctrl-C, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}

async fn update_location(
    State(state): State<AppState>,
    payload: Result<Json<LocationReport>, JsonRejection>,
) -> Result<Json<MessageResponse>, DispatchError> {
    let Json(report) = payload.map_err(|rejection| DispatchError::InvalidRequest(rejection.body_text()))?;

    run_blocking(move || apply_location_report(state.store.as_ref(), report)).await?;

    Ok(Json(MessageResponse {
        message: "Location updated successfully".to_string(),
    }))
}

async fn min_distance_driver(State(state): State<AppState>) -> Result<Json<DriverRecommendation>, DispatchError> {
    let recommendation = recommendation(state).await?;
    Ok(Json(DriverRecommendation {
        driver: recommendation.driver,
        score: recommendation.score,
    }))
}

async fn driver_coordinates(State(state): State<AppState>) -> Result<Json<Coordinates>, DispatchError> {
    let recommendation = recommendation(state).await?;
    recommendation
        .driver
        .location
        .map(Json)
        .ok_or_else(|| DispatchError::NotFound("No suitable drivers found".to_string()))
}

async fn recommendation(state: AppState) -> Result<Recommendation, DispatchError> {
    run_blocking(move || recommend(state.store.as_ref(), &state.shipment, &state.select, &state.metric)).await
}

async fn run_blocking<T, F>(work: F) -> Result<T, DispatchError>
where
    F: FnOnce() -> Result<T, DispatchError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| StoreError::Worker(err.to_string()))?
}
