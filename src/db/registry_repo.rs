// src/db/registry_repo.rs
//
// CRUD das entidades de referência (clientes, empresas, arquivos).
// O parâmetro `only_owner` aplica o escopo "só o que eu criei" dos
// atores com visão restrita; NULL significa visão ampla.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::user_repo::unique_to_app_error;
use crate::models::registry::{Client, Company, FileRecord};

#[derive(Clone)]
pub struct RegistryRepository {
    pool: PgPool,
}

impl RegistryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Clientes ---

    pub async fn list_clients(&self, only_owner: Option<Uuid>) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE ($1::uuid IS NULL OR created_by = $1)
            ORDER BY full_name
            "#,
        )
        .bind(only_owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    pub async fn create_client(
        &self,
        full_name: &str,
        mobile_number: Option<&str>,
        notes: Option<&str>,
        commission_rate: Decimal,
        created_by: Uuid,
    ) -> Result<Client, AppError> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (full_name, mobile_number, notes, commission_rate, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(full_name)
        .bind(mobile_number)
        .bind(notes)
        .bind(commission_rate)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(client)
    }

    pub async fn update_client(
        &self,
        id: Uuid,
        only_owner: Option<Uuid>,
        full_name: &str,
        mobile_number: Option<&str>,
        notes: Option<&str>,
        commission_rate: Decimal,
    ) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET
                full_name = $3, mobile_number = $4, notes = $5,
                commission_rate = $6, updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR created_by = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(only_owner)
        .bind(full_name)
        .bind(mobile_number)
        .bind(notes)
        .bind(commission_rate)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    pub async fn delete_client(&self, id: Uuid, only_owner: Option<Uuid>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM clients WHERE id = $1 AND ($2::uuid IS NULL OR created_by = $2)",
        )
        .bind(id)
        .bind(only_owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Empresas ---

    pub async fn list_companies(&self, only_owner: Option<Uuid>) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT * FROM companies
            WHERE ($1::uuid IS NULL OR created_by = $1)
            ORDER BY name
            "#,
        )
        .bind(only_owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    pub async fn create_company(
        &self,
        name: &str,
        notes: Option<&str>,
        commission_rate: Decimal,
        created_by: Uuid,
    ) -> Result<Company, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, notes, commission_rate, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(notes)
        .bind(commission_rate)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_to_app_error)?;
        Ok(company)
    }

    pub async fn update_company(
        &self,
        id: Uuid,
        only_owner: Option<Uuid>,
        name: &str,
        notes: Option<&str>,
        commission_rate: Decimal,
    ) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                name = $3, notes = $4, commission_rate = $5, updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR created_by = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(only_owner)
        .bind(name)
        .bind(notes)
        .bind(commission_rate)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    pub async fn delete_company(
        &self,
        id: Uuid,
        only_owner: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM companies WHERE id = $1 AND ($2::uuid IS NULL OR created_by = $2)",
        )
        .bind(id)
        .bind(only_owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Arquivos (metadados) ---

    pub async fn list_files(&self, only_owner: Option<Uuid>) -> Result<Vec<FileRecord>, AppError> {
        let files = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT * FROM files
            WHERE ($1::uuid IS NULL OR created_by = $1)
            ORDER BY file_name
            "#,
        )
        .bind(only_owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(files)
    }

    pub async fn create_file(
        &self,
        file_name: &str,
        company_id: Uuid,
        file_path: &str,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<FileRecord, AppError> {
        let file = sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO files (file_name, company_id, file_path, notes, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(file_name)
        .bind(company_id)
        .bind(file_path)
        .bind(notes)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(file)
    }

    pub async fn update_file(
        &self,
        id: Uuid,
        only_owner: Option<Uuid>,
        file_name: &str,
        company_id: Uuid,
        file_path: &str,
        notes: Option<&str>,
    ) -> Result<Option<FileRecord>, AppError> {
        let file = sqlx::query_as::<_, FileRecord>(
            r#"
            UPDATE files SET
                file_name = $3, company_id = $4, file_path = $5,
                notes = $6, updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR created_by = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(only_owner)
        .bind(file_name)
        .bind(company_id)
        .bind(file_path)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }

    pub async fn delete_file(&self, id: Uuid, only_owner: Option<Uuid>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM files WHERE id = $1 AND ($2::uuid IS NULL OR created_by = $2)",
        )
        .bind(id)
        .bind(only_owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
