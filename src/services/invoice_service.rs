// src/services/invoice_service.rs
//
// CRUD de faturas. Criação e edição tiram o snapshot das três taxas no
// mesmo instante (resolve_snapshot): ou grava tudo, ou nada.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::InvoiceRepository;
use crate::models::auth::User;
use crate::models::commission::{CommissionPreview, RateSnapshot};
use crate::models::invoice::{CreateInvoicePayload, Invoice, InvoiceView, UpdateInvoicePayload};
use crate::models::rbac::PermissionLevel;
use crate::services::commission_service::CommissionService;

#[derive(Clone)]
pub struct InvoiceService {
    invoice_repo: InvoiceRepository,
    commission: CommissionService,
}

impl InvoiceService {
    pub fn new(invoice_repo: InvoiceRepository, commission: CommissionService) -> Self {
        Self { invoice_repo, commission }
    }

    fn scope(actor: &User, level: &PermissionLevel) -> Option<Uuid> {
        level.owner_scoped().then_some(actor.id)
    }

    pub async fn list(
        &self,
        actor: &User,
        level: &PermissionLevel,
    ) -> Result<Vec<InvoiceView>, AppError> {
        self.invoice_repo.list_views(Self::scope(actor, level)).await
    }

    pub async fn get(
        &self,
        actor: &User,
        level: &PermissionLevel,
        id: Uuid,
    ) -> Result<InvoiceView, AppError> {
        self.invoice_repo
            .find_view(id, Self::scope(actor, level))
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        actor: &User,
        payload: CreateInvoicePayload,
    ) -> Result<Invoice, AppError> {
        // O arquivo precisa existir para derivar a empresa do snapshot.
        let company_id = self
            .invoice_repo
            .company_for_file(payload.file)
            .await?
            .ok_or(AppError::NotFound)?;

        let rates = self
            .commission
            .resolve_snapshot(
                payload.client,
                payload.assigned_distributor,
                Some(company_id),
                payload.amount,
            )
            .await?;

        let invoice = self
            .invoice_repo
            .insert(
                &payload.invoice_code,
                payload.client,
                payload.file,
                payload.assigned_distributor,
                payload.invoice_date,
                payload.amount,
                rates,
                actor.id,
            )
            .await?;

        tracing::info!(invoice = %invoice.invoice_code, by = %actor.username, "fatura criada");
        Ok(invoice)
    }

    pub async fn update(
        &self,
        actor: &User,
        level: &PermissionLevel,
        id: Uuid,
        payload: UpdateInvoicePayload,
    ) -> Result<Invoice, AppError> {
        let company_id = self
            .invoice_repo
            .company_for_file(payload.file)
            .await?
            .ok_or(AppError::NotFound)?;

        // Valor ou contrapartes mudaram: o snapshot é recalculado.
        let rates = self
            .commission
            .resolve_snapshot(
                payload.client,
                payload.assigned_distributor,
                Some(company_id),
                payload.amount,
            )
            .await?;

        self.invoice_repo
            .update(
                id,
                Self::scope(actor, level),
                &payload.invoice_code,
                payload.client,
                payload.file,
                payload.assigned_distributor,
                payload.invoice_date,
                payload.amount,
                rates,
                payload.status,
            )
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(
        &self,
        actor: &User,
        level: &PermissionLevel,
        id: Uuid,
    ) -> Result<(), AppError> {
        let deleted = self.invoice_repo.delete(id, Self::scope(actor, level)).await?;
        if !deleted {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    // Prévia exibida no formulário antes de salvar.
    pub async fn preview_commission(
        &self,
        client: Uuid,
        file: Uuid,
        distributor: Uuid,
        amount: Decimal,
    ) -> Result<CommissionPreview, AppError> {
        let company_id = self.invoice_repo.company_for_file(file).await?;
        let rates = self
            .commission
            .resolve_snapshot(client, distributor, company_id, amount)
            .await?;

        Ok(CommissionPreview {
            client_rate: rates.client_rate,
            distributor_rate: rates.distributor_rate,
            company_rate: rates.company_rate,
            client_commission: RateSnapshot::commission_for(rates.client_rate, amount),
            distributor_commission: RateSnapshot::commission_for(rates.distributor_rate, amount),
            company_commission: RateSnapshot::commission_for(rates.company_rate, amount),
        })
    }
}
