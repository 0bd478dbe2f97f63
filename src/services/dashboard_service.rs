// src/services/dashboard_service.rs
//
// Painel: totais, últimas faturas e as coortes de pagamento em lote.
// Distribuidor vê os próprios números e os clientes com etapa 1
// pendente; admin vê tudo mais distribuidores e empresas pendentes.

use crate::common::error::AppError;
use crate::db::{DashboardRepository, InvoiceRepository};
use crate::models::auth::User;
use crate::models::dashboard::{BulkPaymentData, DashboardSummary};
use crate::models::rbac::PermissionLevel;

const RECENT_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct DashboardService {
    dashboard_repo: DashboardRepository,
    invoice_repo: InvoiceRepository,
}

impl DashboardService {
    pub fn new(dashboard_repo: DashboardRepository, invoice_repo: InvoiceRepository) -> Self {
        Self { dashboard_repo, invoice_repo }
    }

    pub async fn summary(
        &self,
        actor: &User,
        level: &PermissionLevel,
    ) -> Result<DashboardSummary, AppError> {
        let scope = level.owner_scoped().then_some(actor.id);
        let counts = self.dashboard_repo.counts(scope).await?;

        let recent_invoices = match scope {
            Some(id) => self.invoice_repo.list_views(Some(id)).await?,
            None => self.invoice_repo.recent_views(RECENT_LIMIT).await?,
        };

        let bulk_payment_data = if actor.is_admin() {
            BulkPaymentData {
                clients: Vec::new(),
                distributors: self.dashboard_repo.distributor_cohorts().await?,
                companies: self.dashboard_repo.company_cohorts().await?,
            }
        } else {
            BulkPaymentData {
                clients: self.dashboard_repo.client_cohorts(actor.id).await?,
                distributors: Vec::new(),
                companies: Vec::new(),
            }
        };

        Ok(DashboardSummary {
            total_invoices: counts.invoices,
            total_clients: counts.clients,
            total_companies: counts.companies,
            total_files: counts.files,
            total_distributors: counts.distributors,
            recent_invoices,
            bulk_payment_data,
        })
    }
}
