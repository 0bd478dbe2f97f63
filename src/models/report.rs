// src/models/report.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::invoice::OverallPaymentStatus;

// Projeção achatada de fatura + comissões resolvidas + estado de
// pagamento, consumida pelo exportador (JSON hoje; o colaborador de
// exportação decide o formato final).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceReportRow {
    pub invoice_code: String,
    pub invoice_date: NaiveDate,

    pub client_name: String,
    pub distributor_name: String,
    pub company_name: String,
    pub file_name: String,

    pub amount: Decimal,

    pub client_commission_rate: Decimal,
    pub distributor_commission_rate: Decimal,
    pub company_commission_rate: Decimal,

    pub client_commission: Decimal,
    pub distributor_commission: Decimal,
    pub company_commission: Decimal,
    pub net_profit: Decimal,

    pub overall_status: OverallPaymentStatus,

    pub client_to_distributor_paid: bool,
    pub client_to_distributor_paid_at: Option<DateTime<Utc>>,
    pub distributor_to_admin_paid: bool,
    pub distributor_to_admin_paid_at: Option<DateTime<Utc>>,
    pub admin_to_company_paid: bool,
    pub admin_to_company_paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub total_amount: Decimal,
    pub total_client_commission: Decimal,
    pub total_distributor_commission: Decimal,
    pub total_company_commission: Decimal,
    pub total_net_profit: Decimal,
    pub completed_count: i64,
    pub pending_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceReport {
    pub rows: Vec<InvoiceReportRow>,
    pub totals: ReportTotals,
}
