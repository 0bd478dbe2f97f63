// src/handlers/files.rs
//
// Só metadados de arquivo; o conteúdo do PDF vive fora deste serviço.

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
        access::{FilesCreate, FilesDelete, FilesModule, FilesUpdate, ModuleAccess, RequirePermission},
        auth::AuthenticatedUser,
        i18n::Locale,
    },
    models::registry::{FilePayload, FileRecord},
};

// GET /api/files
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "Files",
    responses((status = 200, description = "Arquivos visíveis ao usuário", body = Vec<FileRecord>)),
    security(("api_jwt" = []))
)]
pub async fn list(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    access: ModuleAccess<FilesModule>,
) -> Result<impl IntoResponse, ApiError> {
    let files = app_state
        .registry_service
        .list_files(&user.0, &access.level)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(files))
}

// POST /api/files
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "Files",
    request_body = FilePayload,
    responses((status = 201, description = "Arquivo registrado", body = FileRecord)),
    security(("api_jwt" = []))
)]
pub async fn create(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _perm: RequirePermission<FilesCreate>,
    Json(payload): Json<FilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;
    let file = app_state
        .registry_service
        .create_file(&user.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(file)))
}

// PUT /api/files/{id}
#[utoipa::path(
    put,
    path = "/api/files/{id}",
    tag = "Files",
    request_body = FilePayload,
    responses(
        (status = 200, description = "Arquivo atualizado", body = FileRecord),
        (status = 404, description = "Não encontrado ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _perm: RequirePermission<FilesUpdate>,
    access: ModuleAccess<FilesModule>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;
    let file = app_state
        .registry_service
        .update_file(&user.0, &access.level, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(file))
}

// DELETE /api/files/{id}
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "Files",
    responses(
        (status = 200, description = "Arquivo removido"),
        (status = 404, description = "Não encontrado ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _perm: RequirePermission<FilesDelete>,
    access: ModuleAccess<FilesModule>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .registry_service
        .delete_file(&user.0, &access.level, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(serde_json::json!({
        "message": app_state.i18n_store.text(&locale.0, "deleted")
    })))
}
