// src/db/dashboard_repo.rs
//
// Agregações do painel: totais e as coortes com saldo a avançar por
// contraparte (alimentam os botões de pagamento em lote).

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::dashboard::CohortSummary;

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

pub struct DashboardCounts {
    pub invoices: i64,
    pub clients: i64,
    pub companies: i64,
    pub files: i64,
    pub distributors: i64,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn counts(&self, only_distributor: Option<Uuid>) -> Result<DashboardCounts, AppError> {
        let invoices = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM invoices WHERE ($1::uuid IS NULL OR assigned_distributor = $1)",
        )
        .bind(only_distributor)
        .fetch_one(&self.pool)
        .await?;
        let clients = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM clients WHERE ($1::uuid IS NULL OR created_by = $1)",
        )
        .bind(only_distributor)
        .fetch_one(&self.pool)
        .await?;
        let companies = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await?;
        let files = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM files")
            .fetch_one(&self.pool)
            .await?;
        let distributors = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE role = 'distributor'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardCounts {
            invoices,
            clients,
            companies,
            files,
            distributors,
        })
    }

    // Clientes com etapa 1 pendente, do ponto de vista de um distribuidor.
    pub async fn client_cohorts(&self, distributor_id: Uuid) -> Result<Vec<CohortSummary>, AppError> {
        let cohorts = sqlx::query_as::<_, CohortSummary>(
            r#"
            SELECT c.id AS scope_id, c.full_name AS name,
                   COUNT(*) AS unpaid_count, SUM(i.amount) AS total_amount
            FROM invoices i
            JOIN clients c ON c.id = i.client_id
            WHERE i.assigned_distributor = $1
              AND NOT i.client_to_distributor_is_paid
            GROUP BY c.id, c.full_name
            ORDER BY c.full_name
            "#,
        )
        .bind(distributor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(cohorts)
    }

    // Distribuidores com etapa 2 pendente (visão do admin).
    pub async fn distributor_cohorts(&self) -> Result<Vec<CohortSummary>, AppError> {
        let cohorts = sqlx::query_as::<_, CohortSummary>(
            r#"
            SELECT u.id AS scope_id, u.username AS name,
                   COUNT(*) AS unpaid_count, SUM(i.amount) AS total_amount
            FROM invoices i
            JOIN users u ON u.id = i.assigned_distributor
            WHERE i.client_to_distributor_is_paid
              AND NOT i.distributor_to_admin_is_paid
            GROUP BY u.id, u.username
            ORDER BY u.username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(cohorts)
    }

    // Empresas com etapa 3 pendente (visão do admin; junta pelo arquivo).
    pub async fn company_cohorts(&self) -> Result<Vec<CohortSummary>, AppError> {
        let cohorts = sqlx::query_as::<_, CohortSummary>(
            r#"
            SELECT comp.id AS scope_id, comp.name AS name,
                   COUNT(*) AS unpaid_count, SUM(i.amount) AS total_amount
            FROM invoices i
            JOIN files f ON f.id = i.file_id
            JOIN companies comp ON comp.id = f.company_id
            WHERE i.distributor_to_admin_is_paid
              AND NOT i.admin_to_company_is_paid
            GROUP BY comp.id, comp.name
            ORDER BY comp.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(cohorts)
    }
}
