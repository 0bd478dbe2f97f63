// src/handlers/clients.rs

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
    middleware::{
        access::{ClientsCreate, ClientsDelete, ClientsModule, ClientsUpdate, ModuleAccess, RequirePermission},
        auth::AuthenticatedUser,
        i18n::Locale,
    },
    models::registry::{Client, ClientPayload},
};

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    responses((status = 200, description = "Clientes visíveis ao usuário", body = Vec<Client>)),
    security(("api_jwt" = []))
)]
pub async fn list(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    access: ModuleAccess<ClientsModule>,
) -> Result<impl IntoResponse, ApiError> {
    let clients = app_state
        .registry_service
        .list_clients(&user.0, &access.level)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(clients))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = ClientPayload,
    responses((status = 201, description = "Cliente criado", body = Client)),
    security(("api_jwt" = []))
)]
pub async fn create(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _perm: RequirePermission<ClientsCreate>,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;
    let client = app_state
        .registry_service
        .create_client(&user.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    request_body = ClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 404, description = "Não encontrado ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _perm: RequirePermission<ClientsUpdate>,
    access: ModuleAccess<ClientsModule>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;
    let client = app_state
        .registry_service
        .update_client(&user.0, &access.level, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(client))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    responses(
        (status = 200, description = "Cliente removido"),
        (status = 404, description = "Não encontrado ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _perm: RequirePermission<ClientsDelete>,
    access: ModuleAccess<ClientsModule>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .registry_service
        .delete_client(&user.0, &access.level, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(serde_json::json!({
        "message": app_state.i18n_store.text(&locale.0, "deleted")
    })))
}
