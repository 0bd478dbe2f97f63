// src/services/ports.rs
//
// Interfaces estreitas de armazenamento injetadas nos serviços do core.
// Evitam o ciclo serviço <-> camada de dados e permitem testar a lógica
// de autorização e de pagamento contra implementações em memória.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::User;
use crate::models::commission::EntityType;
use crate::models::invoice::{Invoice, InvoiceStatus, PaymentStage, StageState};
use crate::models::rbac::Permission;

// Resolução ator -> cargos -> permissões.
#[async_trait]
pub trait PermissionLookup: Send + Sync {
    async fn find_actor(&self, actor_id: Uuid) -> Result<Option<User>, AppError>;

    // União (distinta) das permissões de todos os cargos do ator.
    async fn permissions_for_actor(&self, actor_id: Uuid) -> Result<Vec<Permission>, AppError>;
}

// Fonte de taxas do resolvedor de comissão.
#[async_trait]
pub trait RateSource: Send + Sync {
    // Taxa do tier cuja faixa contém `amount`, se houver.
    async fn tier_rate(
        &self,
        entity: EntityType,
        entity_id: Uuid,
        amount: Decimal,
    ) -> Result<Option<Decimal>, AppError>;

    // Taxa padrão da própria entidade; None quando a entidade não existe.
    async fn default_rate(
        &self,
        entity: EntityType,
        entity_id: Uuid,
    ) -> Result<Option<Decimal>, AppError>;
}

// Escopo de descoberta de coorte para pagamento em lote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CohortScope {
    // Faturas de um cliente, atribuídas ao distribuidor que está agindo.
    Client { client_id: Uuid, distributor_id: Uuid },
    // Faturas de um distribuidor (etapa 1 paga, etapa 2 não).
    Distributor { distributor_id: Uuid },
    // Faturas cuja file -> company casa (etapa 2 paga, etapa 3 não).
    Company { company_id: Uuid },
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    // `only_distributor` aplica o filtro de escopo "só as minhas".
    async fn find_scoped(
        &self,
        invoice_id: Uuid,
        only_distributor: Option<Uuid>,
    ) -> Result<Option<Invoice>, AppError>;

    // Persiste a marcação com UPDATE condicional (`..._is_paid = false`).
    // Retorna false quando nenhuma linha foi afetada: outra requisição
    // marcou a etapa primeiro.
    async fn persist_mark(
        &self,
        invoice_id: Uuid,
        stage: PaymentStage,
        state: &StageState,
        status: InvoiceStatus,
    ) -> Result<bool, AppError>;

    async fn persist_unmark(
        &self,
        invoice_id: Uuid,
        stage: PaymentStage,
        status: InvoiceStatus,
    ) -> Result<(), AppError>;

    // Coorte elegível para avançar `stage`: etapa anterior paga, esta não.
    async fn find_eligible(
        &self,
        stage: PaymentStage,
        scope: CohortScope,
    ) -> Result<Vec<Invoice>, AppError>;

    // Nome de exibição da contraparte do escopo (cliente/distribuidor/empresa).
    async fn counterparty_name(
        &self,
        stage: PaymentStage,
        scope: CohortScope,
    ) -> Result<Option<String>, AppError>;
}
