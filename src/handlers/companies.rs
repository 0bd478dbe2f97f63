// src/handlers/companies.rs

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
        access::{CompaniesCreate, CompaniesDelete, CompaniesModule, CompaniesUpdate, ModuleAccess, RequirePermission},
        auth::AuthenticatedUser,
        i18n::Locale,
    },
    models::registry::{Company, CompanyPayload},
};

// GET /api/companies
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    responses((status = 200, description = "Empresas visíveis ao usuário", body = Vec<Company>)),
    security(("api_jwt" = []))
)]
pub async fn list(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    access: ModuleAccess<CompaniesModule>,
) -> Result<impl IntoResponse, ApiError> {
    let companies = app_state
        .registry_service
        .list_companies(&user.0, &access.level)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(companies))
}

// POST /api/companies
#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Companies",
    request_body = CompanyPayload,
    responses((status = 201, description = "Empresa criada", body = Company)),
    security(("api_jwt" = []))
)]
pub async fn create(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _perm: RequirePermission<CompaniesCreate>,
    Json(payload): Json<CompanyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;
    let company = app_state
        .registry_service
        .create_company(&user.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(company)))
}

// PUT /api/companies/{id}
#[utoipa::path(
    put,
    path = "/api/companies/{id}",
    tag = "Companies",
    request_body = CompanyPayload,
    responses(
        (status = 200, description = "Empresa atualizada", body = Company),
        (status = 404, description = "Não encontrada ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _perm: RequirePermission<CompaniesUpdate>,
    access: ModuleAccess<CompaniesModule>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompanyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;
    let company = app_state
        .registry_service
        .update_company(&user.0, &access.level, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(company))
}

// DELETE /api/companies/{id}
#[utoipa::path(
    delete,
    path = "/api/companies/{id}",
    tag = "Companies",
    responses(
        (status = 200, description = "Empresa removida"),
        (status = 404, description = "Não encontrada ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _perm: RequirePermission<CompaniesDelete>,
    access: ModuleAccess<CompaniesModule>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .registry_service
        .delete_company(&user.0, &access.level, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(serde_json::json!({
        "message": app_state.i18n_store.text(&locale.0, "deleted")
    })))
}
