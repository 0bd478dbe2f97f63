// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::invoice::InvoiceView;

// Uma contraparte com faturas elegíveis para avanço de etapa em lote:
// alimenta os botões de "pagar tudo" do painel.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CohortSummary {
    pub scope_id: Uuid,
    pub name: String,
    pub unpaid_count: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkPaymentData {
    pub clients: Vec<CohortSummary>,
    pub distributors: Vec<CohortSummary>,
    pub companies: Vec<CohortSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_invoices: i64,
    pub total_clients: i64,
    pub total_companies: i64,
    pub total_files: i64,
    pub total_distributors: i64,
    pub recent_invoices: Vec<InvoiceView>,
    pub bulk_payment_data: BulkPaymentData,
}
