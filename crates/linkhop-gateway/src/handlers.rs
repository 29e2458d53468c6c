use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::model::{HealthResponse, MappingResponse, ShortenRequest, ShortenResponse};
use crate::state::AppState;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn shorten_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>)> {
    let long_url = match request {
        Ok(Json(ShortenRequest {
            long_url: Some(long_url),
        })) if !long_url.is_empty() => long_url,
        Ok(_) => return Err(AppError::LongUrlRequired),
        Err(rejection) => {
            debug!(error = %rejection, "rejecting unreadable shorten request");
            return Err(AppError::LongUrlRequired);
        }
    };

    let allocation = state.shortener.allocate(&long_url).await?;
    info!(code = %allocation.short_code, "short url created");

    Ok((StatusCode::CREATED, Json(allocation.into())))
}

pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let long_url = state.redirector.resolve(&short_code).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, long_url)]).into_response())
}

pub async fn get_url_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MappingResponse>> {
    let mapping = state.redirector.lookup(&short_code).await?;
    Ok(Json(mapping.into()))
}
