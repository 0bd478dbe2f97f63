// src/services/payment_service.rs
//
// A máquina de estados de pagamento por fatura: valida a transição
// (etapa conhecida, não paga, ator autorizado, ordenação), aplica a
// marcação e persiste com guarda condicional contra corrida.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::User;
use crate::models::invoice::{Invoice, PaymentStage, StageOrdering};
use crate::models::rbac::PermissionLevel;
use crate::services::ports::InvoiceStore;

#[derive(Clone)]
pub struct PaymentService {
    invoices: Arc<dyn InvoiceStore>,
    ordering: StageOrdering,
}

impl PaymentService {
    pub fn new(invoices: Arc<dyn InvoiceStore>, ordering: StageOrdering) -> Self {
        Self { invoices, ordering }
    }

    // Marca uma etapa como paga. `level` é o resumo de capacidade do
    // módulo invoices calculado para esta requisição: quando o ator só
    // enxerga as próprias faturas, a busca já vem filtrada por ele, e
    // uma fatura alheia responde como inexistente.
    pub async fn mark_stage(
        &self,
        actor: &User,
        level: &PermissionLevel,
        invoice_id: Uuid,
        stage_name: &str,
    ) -> Result<Invoice, AppError> {
        let stage = PaymentStage::parse(stage_name)
            .ok_or_else(|| AppError::InvalidStage(stage_name.to_string()))?;

        let scope = level.owner_scoped().then_some(actor.id);
        let mut invoice = self
            .invoices
            .find_scoped(invoice_id, scope)
            .await?
            .ok_or(AppError::NotFound)?;

        if !invoice.can_mark(actor.id, actor.role, stage) {
            return Err(AppError::NotAuthorized);
        }

        if invoice.payment_status.stage(stage).is_paid {
            // Idempotência é rejeitada de propósito, não aceita em silêncio.
            return Err(AppError::AlreadyPaid);
        }

        if !invoice.order_allows(actor.role, stage, self.ordering) {
            return Err(AppError::StageOrderViolation);
        }

        invoice.apply_mark(stage, actor.id, Utc::now());

        let updated = self
            .invoices
            .persist_mark(
                invoice.id,
                stage,
                invoice.payment_status.stage(stage),
                invoice.status,
            )
            .await?;
        if !updated {
            // Outra requisição marcou primeiro: a precondição vale também
            // sob corrida.
            return Err(AppError::AlreadyPaid);
        }

        tracing::info!(
            invoice = %invoice.invoice_code,
            stage = stage.as_str(),
            by = %actor.username,
            "etapa de pagamento marcada"
        );
        Ok(invoice)
    }

    // Desmarcação é exclusiva do admin, sem checagem de posse: é a
    // ferramenta de correção manual.
    pub async fn unmark_stage(
        &self,
        actor: &User,
        invoice_id: Uuid,
        stage_name: &str,
    ) -> Result<Invoice, AppError> {
        let stage = PaymentStage::parse(stage_name)
            .ok_or_else(|| AppError::InvalidStage(stage_name.to_string()))?;

        if !actor.is_admin() {
            return Err(AppError::NotAuthorized);
        }

        let mut invoice = self
            .invoices
            .find_scoped(invoice_id, None)
            .await?
            .ok_or(AppError::NotFound)?;

        invoice.apply_unmark(stage);
        self.invoices
            .persist_unmark(invoice.id, stage, invoice.status)
            .await?;

        tracing::info!(
            invoice = %invoice.invoice_code,
            stage = stage.as_str(),
            by = %actor.username,
            "etapa de pagamento desmarcada"
        );
        Ok(invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    use crate::models::auth::UserRole;
    use crate::models::invoice::{InvoiceStatus, OverallPaymentStatus};
    use crate::services::testing::{make_invoice, MemoryInvoiceStore};

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: "u".into(),
            password_hash: String::new(),
            role,
            commission_rate: Decimal::ZERO,
            permissions: Default::default(),
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn service(store: Arc<MemoryInvoiceStore>, ordering: StageOrdering) -> PaymentService {
        PaymentService::new(store, ordering)
    }

    #[tokio::test]
    async fn assigned_distributor_marks_the_first_stage() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let dist = user(UserRole::Distributor);
        let inv = make_invoice(Uuid::new_v4(), Uuid::new_v4(), dist.id);
        let inv_id = inv.id;
        store.insert(inv);

        let svc = service(store.clone(), StageOrdering::AdminOverride);
        let level = PermissionLevel {
            can_view_own: true,
            can_view_all: false,
            can_create: false,
            can_update: false,
            can_delete: false,
        };

        let updated = svc
            .mark_stage(&dist, &level, inv_id, "clientToDistributor")
            .await
            .unwrap();
        let state = updated.payment_status.client_to_distributor;
        assert!(state.is_paid);
        assert_eq!(state.marked_by, Some(dist.id));
        assert!(state.paid_at.is_some());
        assert_eq!(
            updated.overall_payment_status(),
            OverallPaymentStatus::DistributorPending
        );

        let persisted = store.get(inv_id);
        assert!(persisted.payment_status.client_to_distributor.is_paid);
    }

    #[tokio::test]
    async fn unassigned_distributor_is_denied() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let assigned = Uuid::new_v4();
        let inv = make_invoice(Uuid::new_v4(), Uuid::new_v4(), assigned);
        let inv_id = inv.id;
        store.insert(inv);

        let svc = service(store.clone(), StageOrdering::AdminOverride);
        let intruder = user(UserRole::Distributor);

        // Com visão ampla, a fatura é encontrada mas a marcação é negada.
        let err = svc
            .mark_stage(&intruder, &PermissionLevel::ALL, inv_id, "clientToDistributor")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAuthorized));

        // Com escopo próprio, a fatura alheia nem aparece.
        let scoped = PermissionLevel {
            can_view_own: true,
            can_view_all: false,
            can_create: false,
            can_update: false,
            can_delete: false,
        };
        let err = svc
            .mark_stage(&intruder, &scoped, inv_id, "clientToDistributor")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn double_mark_fails_with_already_paid_and_keeps_state() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let dist = user(UserRole::Distributor);
        let inv = make_invoice(Uuid::new_v4(), Uuid::new_v4(), dist.id);
        let inv_id = inv.id;
        store.insert(inv);

        let svc = service(store.clone(), StageOrdering::AdminOverride);
        svc.mark_stage(&dist, &PermissionLevel::ALL, inv_id, "clientToDistributor")
            .await
            .unwrap();
        let before = store.get(inv_id);

        let err = svc
            .mark_stage(&dist, &PermissionLevel::ALL, inv_id, "clientToDistributor")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyPaid));

        let after = store.get(inv_id);
        assert_eq!(
            before.payment_status.client_to_distributor.paid_at,
            after.payment_status.client_to_distributor.paid_at
        );
    }

    #[tokio::test]
    async fn unknown_stage_is_rejected() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let admin = user(UserRole::Admin);
        let svc = service(store, StageOrdering::AdminOverride);

        let err = svc
            .mark_stage(&admin, &PermissionLevel::ALL, Uuid::new_v4(), "companyToClient")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStage(_)));
    }

    #[tokio::test]
    async fn ordering_is_enforced_per_policy() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let admin = user(UserRole::Admin);
        let inv = make_invoice(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let inv_id = inv.id;
        store.insert(inv);

        // Estrito: nem o admin pula etapa.
        let strict = service(store.clone(), StageOrdering::Strict);
        let err = strict
            .mark_stage(&admin, &PermissionLevel::ALL, inv_id, "distributorToAdmin")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StageOrderViolation));

        // Com override: o admin corrige fora de ordem.
        let relaxed = service(store.clone(), StageOrdering::AdminOverride);
        relaxed
            .mark_stage(&admin, &PermissionLevel::ALL, inv_id, "distributorToAdmin")
            .await
            .unwrap();
        assert!(store.get(inv_id).payment_status.distributor_to_admin.is_paid);
    }

    #[tokio::test]
    async fn terminal_mark_completes_and_unmark_reverts() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let admin = user(UserRole::Admin);
        let inv = make_invoice(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let inv_id = inv.id;
        store.insert(inv);

        let svc = service(store.clone(), StageOrdering::AdminOverride);
        for stage in ["clientToDistributor", "distributorToAdmin", "adminToCompany"] {
            svc.mark_stage(&admin, &PermissionLevel::ALL, inv_id, stage)
                .await
                .unwrap();
        }
        assert_eq!(store.get(inv_id).status, InvoiceStatus::Completed);

        svc.unmark_stage(&admin, inv_id, "adminToCompany").await.unwrap();
        let after = store.get(inv_id);
        assert_eq!(after.status, InvoiceStatus::Pending);
        assert!(!after.payment_status.admin_to_company.is_paid);
    }

    #[tokio::test]
    async fn unmark_is_admin_only() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let dist = user(UserRole::Distributor);
        let inv = make_invoice(Uuid::new_v4(), Uuid::new_v4(), dist.id);
        let inv_id = inv.id;
        store.insert(inv);

        let svc = service(store, StageOrdering::AdminOverride);
        let err = svc
            .unmark_stage(&dist, inv_id, "clientToDistributor")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAuthorized));
    }
}
