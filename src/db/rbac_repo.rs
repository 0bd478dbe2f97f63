// src/db/rbac_repo.rs
//
// Tabelas roles / permissions / role_permissions / user_roles. Também é
// a implementação de PermissionLookup que o motor de autorização usa em
// produção.

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::user_repo::unique_to_app_error;
use crate::models::auth::User;
use crate::models::rbac::{Permission, Role};
use crate::services::ports::PermissionLookup;

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions ORDER BY module, action",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(permissions)
    }

    pub async fn permissions_by_names(
        &self,
        names: &[String],
    ) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE name = ANY($1)",
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await?;
        Ok(permissions)
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    pub async fn permission_names_for_role(&self, role_id: Uuid) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.name
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    // O cargo custom (não-sistema) de um distribuidor; cada um tem
    // exatamente um.
    pub async fn custom_role_for_user(&self, user_id: Uuid) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT r.*
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1 AND NOT r.is_system_role
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        name: &str,
        display_name: &str,
        description: Option<&str>,
        created_by: Uuid,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, display_name, description, is_system_role, created_by)
            VALUES ($1, $2, $3, FALSE, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(display_name)
        .bind(description)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(unique_to_app_error)?;
        Ok(role)
    }

    // Substitui o conjunto inteiro do cargo (a edição do distribuidor
    // manda sempre a lista completa).
    pub async fn replace_role_permissions(
        &self,
        conn: &mut sqlx::PgConnection,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, unnest($2::uuid[])
            "#,
        )
        .bind(role_id)
        .bind(permission_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn assign_role<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PermissionLookup for RbacRepository {
    async fn find_actor(&self, actor_id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(actor_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // União distinta das permissões de todos os cargos do ator.
    async fn permissions_for_actor(&self, actor_id: Uuid) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT DISTINCT p.*
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            JOIN user_roles ur ON ur.role_id = rp.role_id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(permissions)
    }
}
