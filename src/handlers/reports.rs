// src/handlers/reports.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        access::{ModuleAccess, ReportsModule},
        auth::AuthenticatedUser,
        i18n::Locale,
    },
    models::report::InvoiceReport,
};

// GET /api/reports/invoices
#[utoipa::path(
    get,
    path = "/api/reports/invoices",
    tag = "Reports",
    responses((status = 200, description = "Relatório achatado de faturas com comissões e totais", body = InvoiceReport)),
    security(("api_jwt" = []))
)]
pub async fn invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    access: ModuleAccess<ReportsModule>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .report_service
        .invoice_report(&user.0, &access.level)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(report))
}
