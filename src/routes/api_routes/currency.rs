use crate::models::{AppState, ConvertPayload, ExchangeRequest};
use crate::{AppError, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;

pub(super) async fn currencies(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let currencies = state.currency_service.supported_currencies().await?;
    Ok((StatusCode::OK, Json(currencies)))
}

pub(super) async fn convert(
    State(state): State<AppState>,
    payload: core::result::Result<Json<ConvertPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let request = ExchangeRequest::try_from(payload)?;
    let amount = state.currency_service.convert(&request).await?;
    Ok((StatusCode::OK, Json(amount)))
}
