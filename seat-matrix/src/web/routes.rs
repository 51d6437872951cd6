//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::availability::AvailabilityOrchestrator;
use crate::domain::{SeatClass, TrainModel, TravelDate};
use crate::error::CoreError;
use crate::matrix::{RouteComposer, compute_matrix};
use crate::store::MatrixId;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/matrix", post(build_matrix))
        .route("/api/matrix/:id", get(get_matrix).delete(drop_matrix))
        .route("/api/matrix/:id/routes", get(find_routes))
        .route("/api/availability", get(check_availability))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Build a seat matrix and keep it for route queries.
///
/// If the client goes away, the dropped handler cancels the batch.
async fn build_matrix(
    State(state): State<AppState>,
    Json(req): Json<MatrixRequest>,
) -> Result<Json<MatrixResponse>, AppError> {
    let model = TrainModel::parse(&req.train).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let date = parse_date(&req.date)?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let result = compute_matrix(
        state.client.as_ref(),
        &state.config,
        &model,
        &date.display(),
        &date.iso(),
        |p| debug!(train = %model, percent = p.percent(), "matrix progress"),
        &cancel,
    )
    .await?;

    let (id, result) = state.store.insert(result).await;
    Ok(Json(MatrixResponse::new(id, &result)))
}

/// Fetch a previously built matrix.
async fn get_matrix(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MatrixResponse>, AppError> {
    let id = parse_id(&id)?;
    let result = state.store.get(id).await.ok_or_else(|| expired(id))?;
    Ok(Json(MatrixResponse::new(id, &result)))
}

/// Discard a matrix, e.g. when the user refreshes.
async fn drop_matrix(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.store.remove(id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Compose routes between two stops of a built matrix.
async fn find_routes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<RoutesQuery>,
) -> Result<Json<RoutesResponse>, AppError> {
    let id = parse_id(&id)?;
    let result = state.store.get(id).await.ok_or_else(|| expired(id))?;

    let search = RouteComposer::new(state.config.service_charge).compose(
        &result.matrix,
        &q.origin,
        &q.destination,
    )?;

    Ok(Json(RoutesResponse {
        origin: q.origin,
        destination: q.destination,
        search,
    }))
}

/// Seat layouts of every train and class between two stations.
async fn check_availability(
    State(state): State<AppState>,
    Query(q): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let date = parse_date(&q.date)?;
    let seat_class = match q.class.as_deref() {
        Some(code) => SeatClass::parse(code).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?,
        None => SeatClass::SChair,
    };

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let trains = AvailabilityOrchestrator::new(state.client.as_ref(), &state.config)
        .check(&q.origin, &q.destination, date, seat_class, &cancel, |p| {
            debug!(percent = p.percent(), "availability progress")
        })
        .await?;

    Ok(Json(AvailabilityResponse {
        origin: q.origin,
        destination: q.destination,
        date: date.display(),
        trains,
    }))
}

fn parse_date(s: &str) -> Result<TravelDate, AppError> {
    TravelDate::parse(s).map_err(|e| AppError::BadRequest {
        message: format!("invalid date {s:?}: {e}"),
    })
}

fn parse_id(s: &str) -> Result<MatrixId, AppError> {
    s.parse().map_err(|_| AppError::NotFound {
        message: format!("no matrix with id {s}"),
    })
}

fn expired(id: MatrixId) -> AppError {
    AppError::NotFound {
        message: format!("matrix {id} has expired, please build it again"),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Core(CoreError),
}

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        AppError::Core(e)
    }
}

fn core_status(e: &CoreError) -> StatusCode {
    match e {
        CoreError::CredentialsMissing | CoreError::AuthTokenExpired | CoreError::DeviceKeyExpired => {
            StatusCode::UNAUTHORIZED
        }
        CoreError::NoDataFound(_) => StatusCode::NOT_FOUND,
        CoreError::ScheduleNotRunningOnDate { .. }
        | CoreError::Rejected(_)
        | CoreError::BookingRestricted(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CoreError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        CoreError::ServerUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        CoreError::NetworkFailure(_) | CoreError::UnexpectedResponse(_) => StatusCode::BAD_GATEWAY,
        CoreError::Canceled => StatusCode::REQUEST_TIMEOUT,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, auth_required) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone(), false),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message.clone(), false),
            AppError::Core(e) => (
                core_status(e),
                e.user_message().unwrap_or_else(|| e.to_string()),
                e.is_auth(),
            ),
        };

        if status.is_server_error() {
            warn!(status = status.as_u16(), %message, "request failed");
        } else {
            debug!(status = status.as_u16(), %message, "request rejected");
        }

        let body = Json(ErrorResponse {
            error: message,
            auth_required,
        });
        (status, body).into_response()
    }
}
