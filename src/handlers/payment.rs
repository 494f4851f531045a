use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::PaymentError;
use crate::models::common::ErrorResponse;
use crate::models::payment::{CreatePaymentRequest, ListPaymentsQuery, Payment, UpdateStatusQuery};
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: PaymentError) -> ApiError {
    match &err {
        PaymentError::Storage(e) => tracing::error!("Storage failure: {}", e),
        _ => tracing::debug!("Request rejected: {}", err),
    }

    (
        err.status_code(),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn not_found(id: Uuid) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Payment {} not found", id),
        }),
    )
}

/// Handler for POST /payments
pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let payment = state.payments.create(request).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Handler for GET /payments
/// Optional `contractId` narrows the listing to one contract
pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let payments = match query.contract_id {
        Some(contract_id) => state.payments.list_by_contract(&contract_id).await,
        None => state.payments.get_all().await,
    }
    .map_err(api_error)?;

    Ok(Json(payments))
}

/// Handler for GET /payments/{id}
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>, ApiError> {
    state
        .payments
        .get_by_id(id)
        .await
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// Handler for PATCH /payments/{id}/status?status=TOKEN
pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<UpdateStatusQuery>,
) -> Result<Json<Payment>, ApiError> {
    state
        .payments
        .update_status(id, &query.status)
        .await
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// Handler for DELETE /payments/{id}
/// 204 whether or not the payment existed
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.payments.delete(id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}
