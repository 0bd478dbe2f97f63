// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        access::{InvoicesModule, ModuleAccess},
        auth::AuthenticatedUser,
        i18n::Locale,
    },
    models::dashboard::DashboardSummary,
};

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses((status = 200, description = "Totais, faturas recentes e coortes de pagamento em lote", body = DashboardSummary)),
    security(("api_jwt" = []))
)]
pub async fn summary(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    access: ModuleAccess<InvoicesModule>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .dashboard_service
        .summary(&user.0, &access.level)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(summary))
}
