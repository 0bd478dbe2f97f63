// src/handlers/distributors.rs
//
// Gestão de distribuidores, exclusiva do admin: cria o usuário com o
// cargo custom e reprojeta as flags legadas a cada edição.

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
    models::auth::{CreateDistributorPayload, DistributorResponse, UpdateDistributorPayload},
};

// GET /api/distributors
#[utoipa::path(
    get,
    path = "/api/distributors",
    tag = "Distributors",
    responses((status = 200, description = "Distribuidores e suas permissões", body = Vec<DistributorResponse>)),
    security(("api_jwt" = []))
)]
pub async fn list(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminOnly,
) -> Result<impl IntoResponse, ApiError> {
    let distributors = app_state
        .distributor_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(distributors))
}

// GET /api/distributors/{id}
#[utoipa::path(
    get,
    path = "/api/distributors/{id}",
    tag = "Distributors",
    responses(
        (status = 200, description = "Distribuidor", body = DistributorResponse),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminOnly,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let distributor = app_state
        .distributor_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(distributor))
}

// POST /api/distributors
#[utoipa::path(
    post,
    path = "/api/distributors",
    tag = "Distributors",
    request_body = CreateDistributorPayload,
    responses(
        (status = 201, description = "Distribuidor criado com cargo custom", body = DistributorResponse),
        (status = 409, description = "Username já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _admin: AdminOnly,
    Json(payload): Json<CreateDistributorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;
    let distributor = app_state
        .distributor_service
        .create(&user.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(distributor)))
}

// PUT /api/distributors/{id}
#[utoipa::path(
    put,
    path = "/api/distributors/{id}",
    tag = "Distributors",
    request_body = UpdateDistributorPayload,
    responses(
        (status = 200, description = "Distribuidor atualizado, flags reprojetadas", body = DistributorResponse),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _admin: AdminOnly,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDistributorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;
    let distributor = app_state
        .distributor_service
        .update(&user.0, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(distributor))
}
