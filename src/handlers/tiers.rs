// src/handlers/tiers.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::validate_payload,
    middleware::{access::AdminOnly, auth::AuthenticatedUser, i18n::Locale},
    models::commission::{CommissionTier, CreateTierPayload},
};

// GET /api/commission-tiers
#[utoipa::path(
    get,
    path = "/api/commission-tiers",
    tag = "Commission Tiers",
    responses((status = 200, description = "Todos os tiers", body = Vec<CommissionTier>)),
    security(("api_jwt" = []))
)]
pub async fn list(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminOnly,
) -> Result<impl IntoResponse, ApiError> {
    let tiers = app_state
        .tier_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(tiers))
}

// POST /api/commission-tiers
#[utoipa::path(
    post,
    path = "/api/commission-tiers",
    tag = "Commission Tiers",
    request_body = CreateTierPayload,
    responses((status = 201, description = "Tier criado", body = CommissionTier)),
    security(("api_jwt" = []))
)]
pub async fn create(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _admin: AdminOnly,
    Json(payload): Json<CreateTierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;
    let tier = app_state
        .tier_service
        .create(&user.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(tier)))
}

// PUT /api/commission-tiers/{id}
#[utoipa::path(
    put,
    path = "/api/commission-tiers/{id}",
    tag = "Commission Tiers",
    request_body = CreateTierPayload,
    responses(
        (status = 200, description = "Tier atualizado", body = CommissionTier),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminOnly,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateTierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;
    let tier = app_state
        .tier_service
        .update(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(tier))
}

// DELETE /api/commission-tiers/{id}
#[utoipa::path(
    delete,
    path = "/api/commission-tiers/{id}",
    tag = "Commission Tiers",
    responses(
        (status = 200, description = "Tier removido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminOnly,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .tier_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(serde_json::json!({
        "message": app_state.i18n_store.text(&locale.0, "deleted")
    })))
}
