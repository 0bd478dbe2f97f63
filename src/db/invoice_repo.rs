// src/db/invoice_repo.rs
//
// Tabela 'invoices' (nove colunas planas de pagamento) e a
// implementação de produção do InvoiceStore. A marcação de etapa usa
// UPDATE condicional para que "já pago" valha também sob corrida.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::user_repo::unique_to_app_error;
use crate::models::commission::RateSnapshot;
use crate::models::invoice::{
    Invoice, InvoiceStatus, InvoiceView, PaymentStage, StageState,
};
use crate::services::ports::{CohortScope, InvoiceStore};

const VIEW_SELECT: &str = r#"
    SELECT i.*,
           c.full_name AS client_name,
           f.file_name AS file_name,
           comp.name   AS company_name,
           u.username  AS distributor_name
    FROM invoices i
    JOIN clients c    ON c.id = i.client_id
    JOIN files f      ON f.id = i.file_id
    JOIN companies comp ON comp.id = f.company_id
    JOIN users u      ON u.id = i.assigned_distributor
"#;

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_views(
        &self,
        only_distributor: Option<Uuid>,
    ) -> Result<Vec<InvoiceView>, AppError> {
        let sql = format!(
            "{VIEW_SELECT} WHERE ($1::uuid IS NULL OR i.assigned_distributor = $1) \
             ORDER BY i.invoice_date DESC, i.created_at DESC"
        );
        let views = sqlx::query_as::<_, InvoiceView>(&sql)
            .bind(only_distributor)
            .fetch_all(&self.pool)
            .await?;
        Ok(views)
    }

    pub async fn find_view(
        &self,
        id: Uuid,
        only_distributor: Option<Uuid>,
    ) -> Result<Option<InvoiceView>, AppError> {
        let sql = format!(
            "{VIEW_SELECT} WHERE i.id = $1 AND ($2::uuid IS NULL OR i.assigned_distributor = $2)"
        );
        let view = sqlx::query_as::<_, InvoiceView>(&sql)
            .bind(id)
            .bind(only_distributor)
            .fetch_optional(&self.pool)
            .await?;
        Ok(view)
    }

    pub async fn recent_views(&self, limit: i64) -> Result<Vec<InvoiceView>, AppError> {
        let sql = format!("{VIEW_SELECT} ORDER BY i.created_at DESC LIMIT $1");
        let views = sqlx::query_as::<_, InvoiceView>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(views)
    }

    // A empresa é sempre derivada do arquivo, nunca informada direto.
    pub async fn company_for_file(&self, file_id: Uuid) -> Result<Option<Uuid>, AppError> {
        let company = sqlx::query_scalar::<_, Uuid>(
            "SELECT company_id FROM files WHERE id = $1",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        invoice_code: &str,
        client_id: Uuid,
        file_id: Uuid,
        assigned_distributor: Uuid,
        invoice_date: NaiveDate,
        amount: Decimal,
        rates: RateSnapshot,
        created_by: Uuid,
    ) -> Result<Invoice, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (
                invoice_code, client_id, file_id, assigned_distributor,
                invoice_date, amount,
                client_commission_rate, distributor_commission_rate, company_commission_rate,
                created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(invoice_code)
        .bind(client_id)
        .bind(file_id)
        .bind(assigned_distributor)
        .bind(invoice_date)
        .bind(amount)
        .bind(rates.client_rate)
        .bind(rates.distributor_rate)
        .bind(rates.company_rate)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_to_app_error)?;
        Ok(invoice)
    }

    // A edição regrava o snapshot de taxas junto com os campos base.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        only_distributor: Option<Uuid>,
        invoice_code: &str,
        client_id: Uuid,
        file_id: Uuid,
        assigned_distributor: Uuid,
        invoice_date: NaiveDate,
        amount: Decimal,
        rates: RateSnapshot,
        status: InvoiceStatus,
    ) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices SET
                invoice_code = $3, client_id = $4, file_id = $5,
                assigned_distributor = $6, invoice_date = $7, amount = $8,
                client_commission_rate = $9, distributor_commission_rate = $10,
                company_commission_rate = $11, status = $12, updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR assigned_distributor = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(only_distributor)
        .bind(invoice_code)
        .bind(client_id)
        .bind(file_id)
        .bind(assigned_distributor)
        .bind(invoice_date)
        .bind(amount)
        .bind(rates.client_rate)
        .bind(rates.distributor_rate)
        .bind(rates.company_rate)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_to_app_error)?;
        Ok(invoice)
    }

    pub async fn delete(&self, id: Uuid, only_distributor: Option<Uuid>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM invoices WHERE id = $1 AND ($2::uuid IS NULL OR assigned_distributor = $2)",
        )
        .bind(id)
        .bind(only_distributor)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

// Predicado de elegibilidade por etapa: a anterior paga, esta não.
fn stage_predicate(stage: PaymentStage) -> &'static str {
    match stage {
        PaymentStage::ClientToDistributor => "NOT i.client_to_distributor_is_paid",
        PaymentStage::DistributorToAdmin => {
            "i.client_to_distributor_is_paid AND NOT i.distributor_to_admin_is_paid"
        }
        PaymentStage::AdminToCompany => {
            "i.distributor_to_admin_is_paid AND NOT i.admin_to_company_is_paid"
        }
    }
}

#[async_trait]
impl InvoiceStore for InvoiceRepository {
    async fn find_scoped(
        &self,
        invoice_id: Uuid,
        only_distributor: Option<Uuid>,
    ) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            "SELECT * FROM invoices WHERE id = $1 AND ($2::uuid IS NULL OR assigned_distributor = $2)",
        )
        .bind(invoice_id)
        .bind(only_distributor)
        .fetch_optional(&self.pool)
        .await?;
        Ok(invoice)
    }

    async fn persist_mark(
        &self,
        invoice_id: Uuid,
        stage: PaymentStage,
        state: &StageState,
        status: InvoiceStatus,
    ) -> Result<bool, AppError> {
        // `column_prefix` vem de um enum fechado; o format! não recebe
        // entrada do usuário.
        let p = stage.column_prefix();
        let sql = format!(
            "UPDATE invoices SET \
                {p}_is_paid = TRUE, {p}_paid_at = $2, {p}_marked_by = $3, \
                status = $4, updated_at = NOW() \
             WHERE id = $1 AND {p}_is_paid = FALSE"
        );
        let result = sqlx::query(&sql)
            .bind(invoice_id)
            .bind(state.paid_at)
            .bind(state.marked_by)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn persist_unmark(
        &self,
        invoice_id: Uuid,
        stage: PaymentStage,
        status: InvoiceStatus,
    ) -> Result<(), AppError> {
        let p = stage.column_prefix();
        let sql = format!(
            "UPDATE invoices SET \
                {p}_is_paid = FALSE, {p}_paid_at = NULL, {p}_marked_by = NULL, \
                status = $2, updated_at = NOW() \
             WHERE id = $1"
        );
        sqlx::query(&sql)
            .bind(invoice_id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_eligible(
        &self,
        stage: PaymentStage,
        scope: CohortScope,
    ) -> Result<Vec<Invoice>, AppError> {
        let pred = stage_predicate(stage);
        let invoices = match scope {
            CohortScope::Client { client_id, distributor_id } => {
                let sql = format!(
                    "SELECT i.* FROM invoices i \
                     WHERE i.client_id = $1 AND i.assigned_distributor = $2 AND {pred}"
                );
                sqlx::query_as::<_, Invoice>(&sql)
                    .bind(client_id)
                    .bind(distributor_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            CohortScope::Distributor { distributor_id } => {
                let sql = format!(
                    "SELECT i.* FROM invoices i WHERE i.assigned_distributor = $1 AND {pred}"
                );
                sqlx::query_as::<_, Invoice>(&sql)
                    .bind(distributor_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            CohortScope::Company { company_id } => {
                let sql = format!(
                    "SELECT i.* FROM invoices i \
                     JOIN files f ON f.id = i.file_id \
                     WHERE f.company_id = $1 AND {pred}"
                );
                sqlx::query_as::<_, Invoice>(&sql)
                    .bind(company_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(invoices)
    }

    async fn counterparty_name(
        &self,
        _stage: PaymentStage,
        scope: CohortScope,
    ) -> Result<Option<String>, AppError> {
        let name = match scope {
            CohortScope::Client { client_id, .. } => {
                sqlx::query_scalar::<_, String>("SELECT full_name FROM clients WHERE id = $1")
                    .bind(client_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            CohortScope::Distributor { distributor_id } => {
                sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = $1")
                    .bind(distributor_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            CohortScope::Company { company_id } => {
                sqlx::query_scalar::<_, String>("SELECT name FROM companies WHERE id = $1")
                    .bind(company_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(name)
    }
}
