// src/services/bulk_payment_service.rs
//
// Descobre a coorte de faturas elegíveis para avançar uma etapa,
// agrupada por contraparte, e aplica a marcação em sequência. É o
// predicado de elegibilidade daqui que codifica a ordem das etapas
// na liquidação em lote.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::{User, UserRole};
use crate::models::invoice::PaymentStage;
use crate::models::rbac::PermissionLevel;
use crate::services::ports::{CohortScope, InvoiceStore};

// Resultado do pagamento em lote: quantas faturas avançaram e o nome
// da contraparte para a mensagem de retorno. Coorte vazia não é erro.
#[derive(Debug)]
pub struct BulkPayOutcome {
    pub updated: usize,
    pub counterparty: Option<String>,
}

#[derive(Clone)]
pub struct BulkPaymentService {
    invoices: Arc<dyn InvoiceStore>,
}

impl BulkPaymentService {
    pub fn new(invoices: Arc<dyn InvoiceStore>) -> Self {
        Self { invoices }
    }

    // Quem pode invocar cada etapa em lote:
    //   clientToDistributor -> só o distribuidor, sobre as próprias faturas;
    //   distributorToAdmin / adminToCompany -> só o admin.
    fn scope_for(
        actor: &User,
        stage: PaymentStage,
        scope_id: Uuid,
    ) -> Result<CohortScope, AppError> {
        match stage {
            PaymentStage::ClientToDistributor => {
                if actor.role != UserRole::Distributor {
                    return Err(AppError::NotAuthorized);
                }
                Ok(CohortScope::Client {
                    client_id: scope_id,
                    distributor_id: actor.id,
                })
            }
            PaymentStage::DistributorToAdmin => {
                if actor.role != UserRole::Admin {
                    return Err(AppError::NotAuthorized);
                }
                Ok(CohortScope::Distributor {
                    distributor_id: scope_id,
                })
            }
            PaymentStage::AdminToCompany => {
                if actor.role != UserRole::Admin {
                    return Err(AppError::NotAuthorized);
                }
                Ok(CohortScope::Company {
                    company_id: scope_id,
                })
            }
        }
    }

    pub async fn bulk_pay(
        &self,
        actor: &User,
        level: &PermissionLevel,
        stage: PaymentStage,
        scope_id: Uuid,
    ) -> Result<BulkPayOutcome, AppError> {
        // Mesmo portão do caminho unitário: o papel grosso não basta,
        // o ator precisa de acesso ao módulo de faturas.
        if !level.has_module_access() {
            return Err(AppError::NotAuthorized);
        }

        let scope = Self::scope_for(actor, stage, scope_id)?;

        let cohort = self.invoices.find_eligible(stage, scope).await?;
        if cohort.is_empty() {
            return Ok(BulkPayOutcome {
                updated: 0,
                counterparty: None,
            });
        }

        let counterparty = self.invoices.counterparty_name(stage, scope).await?;

        // Sequencial, sem transação de coorte: uma falha no meio deixa
        // as anteriores persistidas e o operador reexecuta o lote.
        let mut updated = 0usize;
        for mut invoice in cohort {
            invoice.apply_mark(stage, actor.id, Utc::now());
            let changed = self
                .invoices
                .persist_mark(
                    invoice.id,
                    stage,
                    invoice.payment_status.stage(stage),
                    invoice.status,
                )
                .await?;
            if changed {
                updated += 1;
            }
        }

        tracing::info!(
            stage = stage.as_str(),
            scope = %scope_id,
            updated,
            "pagamento em lote aplicado"
        );

        Ok(BulkPayOutcome {
            updated,
            counterparty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::sync::Arc;

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

    #[tokio::test]
    async fn cohort_only_includes_stage_eligible_invoices() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let admin = user(UserRole::Admin);
        let distributor = Uuid::new_v4();
        store
            .names
            .lock()
            .unwrap()
            .insert(distributor, "أحمد".to_string());

        // 3 elegíveis: etapa 1 paga, etapa 2 não.
        for _ in 0..3 {
            let mut inv = make_invoice(Uuid::new_v4(), Uuid::new_v4(), distributor);
            inv.apply_mark(PaymentStage::ClientToDistributor, admin.id, Utc::now());
            store.insert(inv);
        }
        // 2 inelegíveis: cliente ainda não pagou.
        let mut ineligible = Vec::new();
        for _ in 0..2 {
            let inv = make_invoice(Uuid::new_v4(), Uuid::new_v4(), distributor);
            ineligible.push(inv.id);
            store.insert(inv);
        }

        let svc = BulkPaymentService::new(store.clone());
        let outcome = svc
            .bulk_pay(&admin, &PermissionLevel::ALL, PaymentStage::DistributorToAdmin, distributor)
            .await
            .unwrap();

        assert_eq!(outcome.updated, 3);
        assert_eq!(outcome.counterparty.as_deref(), Some("أحمد"));
        for id in ineligible {
            let inv = store.get(id);
            assert!(!inv.payment_status.distributor_to_admin.is_paid);
        }
    }

    #[tokio::test]
    async fn empty_cohort_is_a_noop_not_an_error() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let admin = user(UserRole::Admin);
        let svc = BulkPaymentService::new(store);

        let outcome = svc
            .bulk_pay(&admin, &PermissionLevel::ALL, PaymentStage::DistributorToAdmin, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(outcome.updated, 0);
        assert!(outcome.counterparty.is_none());
    }

    #[tokio::test]
    async fn distributor_stage_uses_the_acting_distributor_as_scope() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let dist = user(UserRole::Distributor);
        let client = Uuid::new_v4();
        store.names.lock().unwrap().insert(client, "Mohammed".into());

        // Duas do cliente atribuídas ao ator, uma atribuída a outro.
        for _ in 0..2 {
            store.insert(make_invoice(client, Uuid::new_v4(), dist.id));
        }
        let foreign = make_invoice(client, Uuid::new_v4(), Uuid::new_v4());
        let foreign_id = foreign.id;
        store.insert(foreign);

        let svc = BulkPaymentService::new(store.clone());
        let outcome = svc
            .bulk_pay(&dist, &PermissionLevel::ALL, PaymentStage::ClientToDistributor, client)
            .await
            .unwrap();

        assert_eq!(outcome.updated, 2);
        assert!(!store.get(foreign_id).payment_status.client_to_distributor.is_paid);
    }

    #[tokio::test]
    async fn role_gates_per_stage() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let svc = BulkPaymentService::new(store);
        let admin = user(UserRole::Admin);
        let dist = user(UserRole::Distributor);

        // Admin não usa o caminho do distribuidor, e vice-versa.
        let err = svc
            .bulk_pay(&admin, &PermissionLevel::ALL, PaymentStage::ClientToDistributor, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAuthorized));

        let err = svc
            .bulk_pay(&dist, &PermissionLevel::ALL, PaymentStage::AdminToCompany, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAuthorized));
    }

    #[tokio::test]
    async fn stripped_module_access_blocks_bulk_pay_despite_the_role() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let dist = user(UserRole::Distributor);
        let client = Uuid::new_v4();
        let inv = make_invoice(client, Uuid::new_v4(), dist.id);
        let inv_id = inv.id;
        store.insert(inv);

        // Distribuidor cujo cargo perdeu todas as permissões de faturas:
        // nem as próprias faturas podem avançar em lote.
        let svc = BulkPaymentService::new(store.clone());
        let err = svc
            .bulk_pay(&dist, &PermissionLevel::NONE, PaymentStage::ClientToDistributor, client)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAuthorized));
        assert!(!store.get(inv_id).payment_status.client_to_distributor.is_paid);
    }

    #[tokio::test]
    async fn company_scope_joins_through_the_file() {
        let store = Arc::new(MemoryInvoiceStore::new());
        let admin = user(UserRole::Admin);
        let company = Uuid::new_v4();
        let other_company = Uuid::new_v4();
        store.names.lock().unwrap().insert(company, "Al-Noor".into());

        let file_a = Uuid::new_v4();
        let file_b = Uuid::new_v4();
        {
            let mut fc = store.file_companies.lock().unwrap();
            fc.insert(file_a, company);
            fc.insert(file_b, other_company);
        }

        let mut eligible = make_invoice(Uuid::new_v4(), file_a, Uuid::new_v4());
        eligible.apply_mark(PaymentStage::ClientToDistributor, admin.id, Utc::now());
        eligible.apply_mark(PaymentStage::DistributorToAdmin, admin.id, Utc::now());
        let eligible_id = eligible.id;
        store.insert(eligible);

        let mut other = make_invoice(Uuid::new_v4(), file_b, Uuid::new_v4());
        other.apply_mark(PaymentStage::ClientToDistributor, admin.id, Utc::now());
        other.apply_mark(PaymentStage::DistributorToAdmin, admin.id, Utc::now());
        let other_id = other.id;
        store.insert(other);

        let svc = BulkPaymentService::new(store.clone());
        let outcome = svc
            .bulk_pay(&admin, &PermissionLevel::ALL, PaymentStage::AdminToCompany, company)
            .await
            .unwrap();

        assert_eq!(outcome.updated, 1);
        assert!(store.get(eligible_id).payment_status.admin_to_company.is_paid);
        assert!(!store.get(other_id).payment_status.admin_to_company.is_paid);
    }
}
