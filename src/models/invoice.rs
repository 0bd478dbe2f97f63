// src/models/invoice.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::auth::UserRole;

// --- Enums ---

// Status legado, mantido em sincronia com a etapa final da cadeia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invoice_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Completed,
    Cancelled,
}

// As três etapas ordenadas da cadeia de liquidação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PaymentStage {
    ClientToDistributor,
    DistributorToAdmin,
    AdminToCompany,
}

impl PaymentStage {
    pub const ALL: [PaymentStage; 3] = [
        PaymentStage::ClientToDistributor,
        PaymentStage::DistributorToAdmin,
        PaymentStage::AdminToCompany,
    ];

    // Nome de fio da etapa, em camelCase como chega na URL.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "clientToDistributor" => Some(PaymentStage::ClientToDistributor),
            "distributorToAdmin" => Some(PaymentStage::DistributorToAdmin),
            "adminToCompany" => Some(PaymentStage::AdminToCompany),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStage::ClientToDistributor => "clientToDistributor",
            PaymentStage::DistributorToAdmin => "distributorToAdmin",
            PaymentStage::AdminToCompany => "adminToCompany",
        }
    }

    // Prefixo das colunas no Postgres.
    pub fn column_prefix(&self) -> &'static str {
        match self {
            PaymentStage::ClientToDistributor => "client_to_distributor",
            PaymentStage::DistributorToAdmin => "distributor_to_admin",
            PaymentStage::AdminToCompany => "admin_to_company",
        }
    }

    // Chave i18n do nome de exibição da etapa.
    pub fn display_key(&self) -> &'static str {
        match self {
            PaymentStage::ClientToDistributor => "stage_client_to_distributor",
            PaymentStage::DistributorToAdmin => "stage_distributor_to_admin",
            PaymentStage::AdminToCompany => "stage_admin_to_company",
        }
    }

    pub fn order(&self) -> usize {
        match self {
            PaymentStage::ClientToDistributor => 0,
            PaymentStage::DistributorToAdmin => 1,
            PaymentStage::AdminToCompany => 2,
        }
    }
}

// Projeção derivada do progresso geral da cadeia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OverallPaymentStatus {
    ClientPending,
    DistributorPending,
    AdminPending,
    FullyCompleted,
}

// Política de ordenação de etapas (veja PAYMENT_STAGE_ORDERING).
// `Strict` exige as etapas anteriores pagas para qualquer ator;
// `AdminOverride` libera o admin para correções fora de ordem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOrdering {
    Strict,
    AdminOverride,
}

impl StageOrdering {
    pub fn from_env_value(value: &str) -> Self {
        match value {
            "strict" => StageOrdering::Strict,
            _ => StageOrdering::AdminOverride,
        }
    }
}

// --- Structs ---

// Sub-registro de uma etapa: pago/quando/por quem.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageState {
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub marked_by: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub client_to_distributor: StageState,
    pub distributor_to_admin: StageState,
    pub admin_to_company: StageState,
}

impl PaymentStatus {
    pub fn stage(&self, stage: PaymentStage) -> &StageState {
        match stage {
            PaymentStage::ClientToDistributor => &self.client_to_distributor,
            PaymentStage::DistributorToAdmin => &self.distributor_to_admin,
            PaymentStage::AdminToCompany => &self.admin_to_company,
        }
    }

    pub fn stage_mut(&mut self, stage: PaymentStage) -> &mut StageState {
        match stage {
            PaymentStage::ClientToDistributor => &mut self.client_to_distributor,
            PaymentStage::DistributorToAdmin => &mut self.distributor_to_admin,
            PaymentStage::AdminToCompany => &mut self.admin_to_company,
        }
    }
}

// As nove colunas planas do Postgres viram o registro aninhado.
impl<'r> FromRow<'r, PgRow> for PaymentStatus {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        fn stage(row: &PgRow, prefix: &str) -> Result<StageState, sqlx::Error> {
            Ok(StageState {
                is_paid: row.try_get(format!("{prefix}_is_paid").as_str())?,
                paid_at: row.try_get(format!("{prefix}_paid_at").as_str())?,
                marked_by: row.try_get(format!("{prefix}_marked_by").as_str())?,
            })
        }
        Ok(PaymentStatus {
            client_to_distributor: stage(row, "client_to_distributor")?,
            distributor_to_admin: stage(row, "distributor_to_admin")?,
            admin_to_company: stage(row, "admin_to_company")?,
        })
    }
}

// A entidade central. As três taxas de comissão são um snapshot tirado
// na criação/edição: mudanças posteriores nos tiers não afetam faturas
// já salvas.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,

    #[schema(example = "INV-2024-0001")]
    pub invoice_code: String,

    pub client_id: Uuid,
    pub file_id: Uuid,
    pub assigned_distributor: Uuid,

    pub invoice_date: NaiveDate,

    #[schema(example = "1000.00")]
    pub amount: Decimal,

    #[schema(example = "3.00")]
    pub client_commission_rate: Decimal,
    #[schema(example = "2.50")]
    pub distributor_commission_rate: Decimal,
    #[schema(example = "1.00")]
    pub company_commission_rate: Decimal,

    #[sqlx(flatten)]
    pub payment_status: PaymentStatus,

    pub status: InvoiceStatus,

    pub created_by: Uuid,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Invoice {
    pub fn overall_payment_status(&self) -> OverallPaymentStatus {
        let p = &self.payment_status;
        if p.admin_to_company.is_paid {
            OverallPaymentStatus::FullyCompleted
        } else if p.distributor_to_admin.is_paid {
            OverallPaymentStatus::AdminPending
        } else if p.client_to_distributor.is_paid {
            OverallPaymentStatus::DistributorPending
        } else {
            OverallPaymentStatus::ClientPending
        }
    }

    // Percentual de progresso (0, 33, 67, 100).
    pub fn payment_progress(&self) -> u8 {
        let paid = PaymentStage::ALL
            .iter()
            .filter(|s| self.payment_status.stage(**s).is_paid)
            .count();
        ((paid as f64 / 3.0) * 100.0).round() as u8
    }

    // Quem pode marcar o quê: admin marca qualquer etapa de qualquer
    // fatura; distribuidor marca só clientToDistributor, e só nas
    // faturas atribuídas a ele.
    pub fn can_mark(&self, actor_id: Uuid, role: UserRole, stage: PaymentStage) -> bool {
        match role {
            UserRole::Admin => true,
            UserRole::Distributor => {
                stage == PaymentStage::ClientToDistributor && self.assigned_distributor == actor_id
            }
        }
    }

    // Todas as etapas anteriores a `stage` estão pagas?
    pub fn earlier_stages_paid(&self, stage: PaymentStage) -> bool {
        PaymentStage::ALL
            .iter()
            .filter(|s| s.order() < stage.order())
            .all(|s| self.payment_status.stage(*s).is_paid)
    }

    // A ordenação é aplicada pela máquina, e não só pelo scanner em
    // lote: sob AdminOverride o admin pode corrigir fora de ordem.
    pub fn order_allows(&self, role: UserRole, stage: PaymentStage, ordering: StageOrdering) -> bool {
        if self.earlier_stages_paid(stage) {
            return true;
        }
        ordering == StageOrdering::AdminOverride && role == UserRole::Admin
    }

    // Transição pura: pressupõe autorização e precondições já checadas.
    pub fn apply_mark(&mut self, stage: PaymentStage, actor_id: Uuid, at: DateTime<Utc>) {
        let state = self.payment_status.stage_mut(stage);
        state.is_paid = true;
        state.paid_at = Some(at);
        state.marked_by = Some(actor_id);

        // O status legado espelha apenas a transição terminal.
        if self.payment_status.admin_to_company.is_paid {
            self.status = InvoiceStatus::Completed;
        }
    }

    pub fn apply_unmark(&mut self, stage: PaymentStage) {
        let state = self.payment_status.stage_mut(stage);
        state.is_paid = false;
        state.paid_at = None;
        state.marked_by = None;

        self.status = InvoiceStatus::Pending;
    }
}

// Linha de listagem/exportação: fatura + nomes resolvidos por join.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub invoice: Invoice,

    pub client_name: String,
    pub file_name: String,
    pub company_name: String,
    pub distributor_name: String,
}

// --- Payloads ---

#[derive(Debug, Deserialize, validator::Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoicePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "INV-2024-0001")]
    pub invoice_code: String,

    pub client: Uuid,
    pub file: Uuid,
    pub assigned_distributor: Uuid,

    pub invoice_date: NaiveDate,

    #[schema(example = "1000.00")]
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, validator::Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoicePayload {
    #[validate(length(min = 1, message = "required"))]
    pub invoice_code: String,

    pub client: Uuid,
    pub file: Uuid,
    pub assigned_distributor: Uuid,

    pub invoice_date: NaiveDate,
    pub amount: Decimal,

    pub status: InvoiceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(distributor: Uuid) -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            invoice_code: "INV-1".into(),
            client_id: Uuid::new_v4(),
            file_id: Uuid::new_v4(),
            assigned_distributor: distributor,
            invoice_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            amount: Decimal::new(1000, 0),
            client_commission_rate: Decimal::new(3, 0),
            distributor_commission_rate: Decimal::new(2, 0),
            company_commission_rate: Decimal::new(1, 0),
            payment_status: PaymentStatus::default(),
            status: InvoiceStatus::Pending,
            created_by: Uuid::new_v4(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn overall_status_follows_the_chain() {
        let actor = Uuid::new_v4();
        let mut inv = invoice(actor);
        assert_eq!(inv.overall_payment_status(), OverallPaymentStatus::ClientPending);

        inv.apply_mark(PaymentStage::ClientToDistributor, actor, Utc::now());
        assert_eq!(inv.overall_payment_status(), OverallPaymentStatus::DistributorPending);

        inv.apply_mark(PaymentStage::DistributorToAdmin, actor, Utc::now());
        assert_eq!(inv.overall_payment_status(), OverallPaymentStatus::AdminPending);

        inv.apply_mark(PaymentStage::AdminToCompany, actor, Utc::now());
        assert_eq!(inv.overall_payment_status(), OverallPaymentStatus::FullyCompleted);
        assert_eq!(inv.payment_progress(), 100);
    }

    #[test]
    fn legacy_status_mirrors_only_the_terminal_transition() {
        let actor = Uuid::new_v4();
        let mut inv = invoice(actor);

        inv.apply_mark(PaymentStage::ClientToDistributor, actor, Utc::now());
        inv.apply_mark(PaymentStage::DistributorToAdmin, actor, Utc::now());
        assert_eq!(inv.status, InvoiceStatus::Pending);

        inv.apply_mark(PaymentStage::AdminToCompany, actor, Utc::now());
        assert_eq!(inv.status, InvoiceStatus::Completed);

        inv.apply_unmark(PaymentStage::DistributorToAdmin);
        assert_eq!(inv.status, InvoiceStatus::Pending);
    }

    #[test]
    fn distributor_marks_only_own_first_stage() {
        let dist = Uuid::new_v4();
        let other = Uuid::new_v4();
        let inv = invoice(dist);

        assert!(inv.can_mark(dist, UserRole::Distributor, PaymentStage::ClientToDistributor));
        assert!(!inv.can_mark(dist, UserRole::Distributor, PaymentStage::DistributorToAdmin));
        assert!(!inv.can_mark(other, UserRole::Distributor, PaymentStage::ClientToDistributor));
        assert!(inv.can_mark(other, UserRole::Admin, PaymentStage::AdminToCompany));
    }

    #[test]
    fn ordering_policy_gates_out_of_order_marks() {
        let actor = Uuid::new_v4();
        let inv = invoice(actor);

        // Nada pago ainda: etapa 2 está fora de ordem.
        assert!(!inv.order_allows(
            UserRole::Distributor,
            PaymentStage::DistributorToAdmin,
            StageOrdering::AdminOverride
        ));
        assert!(inv.order_allows(
            UserRole::Admin,
            PaymentStage::DistributorToAdmin,
            StageOrdering::AdminOverride
        ));
        assert!(!inv.order_allows(
            UserRole::Admin,
            PaymentStage::DistributorToAdmin,
            StageOrdering::Strict
        ));

        // A primeira etapa nunca tem anteriores.
        assert!(inv.order_allows(
            UserRole::Distributor,
            PaymentStage::ClientToDistributor,
            StageOrdering::Strict
        ));
    }

    #[test]
    fn unmark_clears_the_stage_fields() {
        let actor = Uuid::new_v4();
        let mut inv = invoice(actor);
        inv.apply_mark(PaymentStage::ClientToDistributor, actor, Utc::now());

        let state = inv.payment_status.stage(PaymentStage::ClientToDistributor);
        assert!(state.is_paid && state.paid_at.is_some() && state.marked_by == Some(actor));

        inv.apply_unmark(PaymentStage::ClientToDistributor);
        let state = inv.payment_status.stage(PaymentStage::ClientToDistributor);
        assert!(!state.is_paid && state.paid_at.is_none() && state.marked_by.is_none());
    }

    #[test]
    fn stage_names_round_trip() {
        for stage in PaymentStage::ALL {
            assert_eq!(PaymentStage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(PaymentStage::parse("companyToClient"), None);
    }
}
