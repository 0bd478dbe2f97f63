// src/services/testing.rs
//
// Implementações em memória dos ports de armazenamento, compartilhadas
// pelos testes da máquina de pagamento, do scanner em lote e dos
// guardas de autorização.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::User;
use crate::models::invoice::{
    Invoice, InvoiceStatus, PaymentStage, PaymentStatus, StageState,
};
use crate::models::rbac::Permission;
use crate::services::ports::{CohortScope, InvoiceStore, PermissionLookup};

pub struct MemoryInvoiceStore {
    pub invoices: Mutex<HashMap<Uuid, Invoice>>,
    // file -> company, para o escopo por empresa.
    pub file_companies: Mutex<HashMap<Uuid, Uuid>>,
    pub names: Mutex<HashMap<Uuid, String>>,
}

impl MemoryInvoiceStore {
    pub fn new() -> Self {
        Self {
            invoices: Mutex::new(HashMap::new()),
            file_companies: Mutex::new(HashMap::new()),
            names: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, invoice: Invoice) {
        self.invoices.lock().unwrap().insert(invoice.id, invoice);
    }

    pub fn get(&self, id: Uuid) -> Invoice {
        self.invoices.lock().unwrap().get(&id).cloned().unwrap()
    }
}

pub struct MemoryPermissionLookup {
    pub actors: Mutex<HashMap<Uuid, User>>,
    pub permissions: Mutex<HashMap<Uuid, Vec<Permission>>>,
}

impl MemoryPermissionLookup {
    pub fn new() -> Self {
        Self {
            actors: Mutex::new(HashMap::new()),
            permissions: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert_actor(&self, user: User) {
        self.actors.lock().unwrap().insert(user.id, user);
    }

    pub fn grant(&self, actor_id: Uuid, permissions: Vec<Permission>) {
        self.permissions.lock().unwrap().insert(actor_id, permissions);
    }
}

#[async_trait]
impl PermissionLookup for MemoryPermissionLookup {
    async fn find_actor(&self, actor_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.actors.lock().unwrap().get(&actor_id).cloned())
    }

    async fn permissions_for_actor(&self, actor_id: Uuid) -> Result<Vec<Permission>, AppError> {
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .get(&actor_id)
            .cloned()
            .unwrap_or_default())
    }
}

pub fn make_invoice(client: Uuid, file: Uuid, distributor: Uuid) -> Invoice {
    Invoice {
        id: Uuid::new_v4(),
        invoice_code: format!("INV-{}", Uuid::new_v4()),
        client_id: client,
        file_id: file,
        assigned_distributor: distributor,
        invoice_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        amount: Decimal::new(1000, 0),
        client_commission_rate: Decimal::new(3, 0),
        distributor_commission_rate: Decimal::new(2, 0),
        company_commission_rate: Decimal::new(1, 0),
        payment_status: PaymentStatus::default(),
        status: InvoiceStatus::Pending,
        created_by: distributor,
        created_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn find_scoped(
        &self,
        invoice_id: Uuid,
        only_distributor: Option<Uuid>,
    ) -> Result<Option<Invoice>, AppError> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .get(&invoice_id)
            .filter(|inv| {
                only_distributor
                    .map(|d| inv.assigned_distributor == d)
                    .unwrap_or(true)
            })
            .cloned())
    }

    async fn persist_mark(
        &self,
        invoice_id: Uuid,
        stage: PaymentStage,
        state: &StageState,
        status: InvoiceStatus,
    ) -> Result<bool, AppError> {
        let mut invoices = self.invoices.lock().unwrap();
        let inv = invoices.get_mut(&invoice_id).ok_or(AppError::NotFound)?;
        // Mesma semântica do UPDATE condicional do Postgres.
        if inv.payment_status.stage(stage).is_paid {
            return Ok(false);
        }
        *inv.payment_status.stage_mut(stage) = *state;
        inv.status = status;
        Ok(true)
    }

    async fn persist_unmark(
        &self,
        invoice_id: Uuid,
        stage: PaymentStage,
        status: InvoiceStatus,
    ) -> Result<(), AppError> {
        let mut invoices = self.invoices.lock().unwrap();
        let inv = invoices.get_mut(&invoice_id).ok_or(AppError::NotFound)?;
        *inv.payment_status.stage_mut(stage) = StageState::default();
        inv.status = status;
        Ok(())
    }

    async fn find_eligible(
        &self,
        stage: PaymentStage,
        scope: CohortScope,
    ) -> Result<Vec<Invoice>, AppError> {
        let file_companies = self.file_companies.lock().unwrap();
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .values()
            .filter(|inv| {
                let p = &inv.payment_status;
                let stage_match = match stage {
                    PaymentStage::ClientToDistributor => !p.client_to_distributor.is_paid,
                    PaymentStage::DistributorToAdmin => {
                        p.client_to_distributor.is_paid && !p.distributor_to_admin.is_paid
                    }
                    PaymentStage::AdminToCompany => {
                        p.distributor_to_admin.is_paid && !p.admin_to_company.is_paid
                    }
                };
                let scope_match = match scope {
                    CohortScope::Client { client_id, distributor_id } => {
                        inv.client_id == client_id && inv.assigned_distributor == distributor_id
                    }
                    CohortScope::Distributor { distributor_id } => {
                        inv.assigned_distributor == distributor_id
                    }
                    CohortScope::Company { company_id } => {
                        file_companies.get(&inv.file_id) == Some(&company_id)
                    }
                };
                stage_match && scope_match
            })
            .cloned()
            .collect())
    }

    async fn counterparty_name(
        &self,
        _stage: PaymentStage,
        scope: CohortScope,
    ) -> Result<Option<String>, AppError> {
        let id = match scope {
            CohortScope::Client { client_id, .. } => client_id,
            CohortScope::Distributor { distributor_id } => distributor_id,
            CohortScope::Company { company_id } => company_id,
        };
        Ok(self.names.lock().unwrap().get(&id).cloned())
    }
}
