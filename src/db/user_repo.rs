// src/db/user_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::User;
use crate::models::rbac::LegacyPermissions;

// Repositório da tabela 'users'. Os distribuidores são usuários com
// role = 'distributor'; o admin é semeado por migração.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list_distributors(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = 'distributor' ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    // Criação dentro da transação de montagem do distribuidor (usuário +
    // cargo custom + vínculo), por isso recebe o executor.
    pub async fn create_distributor<'e, E>(
        &self,
        executor: E,
        username: &str,
        password_hash: &str,
        commission_rate: Decimal,
        legacy: &LegacyPermissions,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                username, password_hash, role, commission_rate,
                can_create_companies, can_create_invoices,
                can_manage_clients, can_view_reports
            )
            VALUES ($1, $2, 'distributor', $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(commission_rate)
        .bind(legacy.can_create_companies)
        .bind(legacy.can_create_invoices)
        .bind(legacy.can_manage_clients)
        .bind(legacy.can_view_reports)
        .fetch_one(executor)
        .await
        .map_err(unique_to_app_error)?;
        Ok(user)
    }

    pub async fn update_distributor<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        commission_rate: Decimal,
        is_active: bool,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                commission_rate = $2,
                is_active = $3,
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1 AND role = 'distributor'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(commission_rate)
        .bind(is_active)
        .bind(password_hash)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    // Reprojeta as flags legadas depois que o cargo custom mudou.
    pub async fn update_legacy_flags<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        legacy: &LegacyPermissions,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE users SET
                can_create_companies = $2,
                can_create_invoices = $3,
                can_manage_clients = $4,
                can_view_reports = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(legacy.can_create_companies)
        .bind(legacy.can_create_invoices)
        .bind(legacy.can_manage_clients)
        .bind(legacy.can_view_reports)
        .execute(executor)
        .await?;
        Ok(())
    }
}

pub(crate) fn unique_to_app_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            if let Some(constraint) = db_err.constraint() {
                return AppError::UniqueConstraintViolation(constraint.to_string());
            }
        }
    }
    e.into()
}
