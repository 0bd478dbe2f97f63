// src/handlers/invoices.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::validate_payload,
    middleware::{
        access::{InvoicesCreate, InvoicesDelete, InvoicesModule, InvoicesUpdate, ModuleAccess, RequirePermission},
        auth::AuthenticatedUser,
        i18n::Locale,
    },
    models::invoice::{CreateInvoicePayload, Invoice, InvoiceView, PaymentStage, UpdateInvoicePayload},
    models::rbac::PermissionLevel,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculateCommissionPayload {
    pub client: Uuid,
    pub file: Uuid,
    pub assigned_distributor: Uuid,
    pub amount: Decimal,
}

// GET /api/invoices
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Invoices",
    responses((status = 200, description = "Faturas visíveis ao usuário", body = Vec<InvoiceView>)),
    security(("api_jwt" = []))
)]
pub async fn list(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    access: ModuleAccess<InvoicesModule>,
) -> Result<impl IntoResponse, ApiError> {
    let invoices = app_state
        .invoice_service
        .list(&user.0, &access.level)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(invoices))
}

// GET /api/invoices/{id}
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    responses(
        (status = 200, description = "Fatura", body = InvoiceView),
        (status = 404, description = "Não encontrada ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn get(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    access: ModuleAccess<InvoicesModule>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .get(&user.0, &access.level, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(invoice))
}

// POST /api/invoices
#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Invoices",
    request_body = CreateInvoicePayload,
    responses(
        (status = 201, description = "Fatura criada com snapshot de taxas", body = Invoice),
        (status = 409, description = "Código de fatura já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _perm: RequirePermission<InvoicesCreate>,
    Json(payload): Json<CreateInvoicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;
    let invoice = app_state
        .invoice_service
        .create(&user.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

// POST /api/invoices/calculate-commission
#[utoipa::path(
    post,
    path = "/api/invoices/calculate-commission",
    tag = "Invoices",
    request_body = CalculateCommissionPayload,
    responses(
        (status = 200, description = "Prévia das comissões", body = crate::models::commission::CommissionPreview),
        (status = 403, description = "Ator não pode criar faturas")
    ),
    security(("api_jwt" = []))
)]
pub async fn calculate_commission(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<InvoicesCreate>,
    Json(payload): Json<CalculateCommissionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let preview = app_state
        .invoice_service
        .preview_commission(
            payload.client,
            payload.file,
            payload.assigned_distributor,
            payload.amount,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(preview))
}

// PUT /api/invoices/{id}
#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    request_body = UpdateInvoicePayload,
    responses(
        (status = 200, description = "Fatura atualizada, snapshot recalculado", body = Invoice),
        (status = 404, description = "Não encontrada ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _perm: RequirePermission<InvoicesUpdate>,
    access: ModuleAccess<InvoicesModule>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInvoicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;
    let invoice = app_state
        .invoice_service
        .update(&user.0, &access.level, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(invoice))
}

// DELETE /api/invoices/{id}
#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    responses(
        (status = 200, description = "Fatura removida"),
        (status = 404, description = "Não encontrada ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _perm: RequirePermission<InvoicesDelete>,
    access: ModuleAccess<InvoicesModule>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .invoice_service
        .delete(&user.0, &access.level, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(json!({
        "message": app_state.i18n_store.text(&locale.0, "deleted")
    })))
}

// POST /api/invoices/{id}/payment/{stage}
#[utoipa::path(
    post,
    path = "/api/invoices/{id}/payment/{stage}",
    tag = "Payments",
    params(
        ("id" = Uuid, Path, description = "ID da fatura"),
        ("stage" = String, Path, description = "clientToDistributor | distributorToAdmin | adminToCompany")
    ),
    responses(
        (status = 200, description = "Etapa marcada como paga", body = Invoice),
        (status = 403, description = "Ator não pode marcar esta etapa"),
        (status = 409, description = "Etapa já paga ou fora de ordem")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    access: ModuleAccess<InvoicesModule>,
    Path((id, stage)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .payment_service
        .mark_stage(&user.0, &access.level, id, &stage)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // A esta altura a etapa é conhecida; o display name vem do catálogo.
    let stage_name = PaymentStage::parse(&stage)
        .map(|s| app_state.i18n_store.text(&locale.0, s.display_key()))
        .unwrap_or(stage);
    let message = app_state.i18n_store.text_with(
        &locale.0,
        "payment_marked",
        &[("stage", stage_name.as_str())],
    );
    Ok(Json(json!({ "message": message, "invoice": invoice })))
}

// DELETE /api/invoices/{id}/payment/{stage}
#[utoipa::path(
    delete,
    path = "/api/invoices/{id}/payment/{stage}",
    tag = "Payments",
    params(
        ("id" = Uuid, Path, description = "ID da fatura"),
        ("stage" = String, Path, description = "Etapa a desmarcar")
    ),
    responses(
        (status = 200, description = "Etapa desmarcada", body = Invoice),
        (status = 403, description = "Apenas o admin desmarca")
    ),
    security(("api_jwt" = []))
)]
pub async fn unmark_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path((id, stage)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .payment_service
        .unmark_stage(&user.0, id, &stage)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let stage_name = PaymentStage::parse(&stage)
        .map(|s| app_state.i18n_store.text(&locale.0, s.display_key()))
        .unwrap_or(stage);
    let message = app_state.i18n_store.text_with(
        &locale.0,
        "payment_unmarked",
        &[("stage", stage_name.as_str())],
    );
    Ok(Json(json!({ "message": message, "invoice": invoice })))
}

async fn bulk_pay(
    app_state: AppState,
    locale: Locale,
    user: AuthenticatedUser,
    level: PermissionLevel,
    stage: PaymentStage,
    scope_id: Uuid,
) -> Result<axum::Json<serde_json::Value>, ApiError> {
    let outcome = app_state
        .bulk_payment_service
        .bulk_pay(&user.0, &level, stage, scope_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let message = if outcome.updated == 0 {
        app_state.i18n_store.text(&locale.0, "nothing_to_pay")
    } else {
        let count = outcome.updated.to_string();
        let name = outcome.counterparty.unwrap_or_default();
        app_state.i18n_store.text_with(
            &locale.0,
            "bulk_paid",
            &[("count", count.as_str()), ("name", name.as_str())],
        )
    };
    Ok(Json(json!({ "message": message, "updated": outcome.updated })))
}

// POST /api/invoices/bulk-pay/client/{id}
#[utoipa::path(
    post,
    path = "/api/invoices/bulk-pay/client/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Faturas do cliente marcadas (etapa 1)"),
        (status = 403, description = "Sem acesso ao módulo de faturas")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_pay_client(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    access: ModuleAccess<InvoicesModule>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    bulk_pay(app_state, locale, user, access.level, PaymentStage::ClientToDistributor, id).await
}

// POST /api/invoices/bulk-pay/distributor/{id}
#[utoipa::path(
    post,
    path = "/api/invoices/bulk-pay/distributor/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do distribuidor")),
    responses(
        (status = 200, description = "Faturas do distribuidor marcadas (etapa 2)"),
        (status = 403, description = "Sem acesso ao módulo de faturas")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_pay_distributor(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    access: ModuleAccess<InvoicesModule>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    bulk_pay(app_state, locale, user, access.level, PaymentStage::DistributorToAdmin, id).await
}

// POST /api/invoices/bulk-pay/company/{id}
#[utoipa::path(
    post,
    path = "/api/invoices/bulk-pay/company/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Faturas da empresa marcadas (etapa 3)"),
        (status = 403, description = "Sem acesso ao módulo de faturas")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_pay_company(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    access: ModuleAccess<InvoicesModule>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    bulk_pay(app_state, locale, user, access.level, PaymentStage::AdminToCompany, id).await
}
