// src/services/registry_service.rs
//
// CRUD das entidades de referência, com o escopo por dono aplicado a
// partir do PermissionLevel da requisição.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::RegistryRepository;
use crate::models::auth::User;
use crate::models::rbac::PermissionLevel;
use crate::models::registry::{
    Client, ClientPayload, Company, CompanyPayload, FilePayload, FileRecord,
};

fn to_decimal(value: f64) -> Result<Decimal, AppError> {
    Decimal::try_from(value).map_err(|e| anyhow::anyhow!("taxa inválida: {}", e).into())
}

#[derive(Clone)]
pub struct RegistryService {
    repo: RegistryRepository,
}

impl RegistryService {
    pub fn new(repo: RegistryRepository) -> Self {
        Self { repo }
    }

    fn scope(actor: &User, level: &PermissionLevel) -> Option<Uuid> {
        level.owner_scoped().then_some(actor.id)
    }

    // --- Clientes ---

    pub async fn list_clients(
        &self,
        actor: &User,
        level: &PermissionLevel,
    ) -> Result<Vec<Client>, AppError> {
        self.repo.list_clients(Self::scope(actor, level)).await
    }

    pub async fn create_client(
        &self,
        actor: &User,
        payload: ClientPayload,
    ) -> Result<Client, AppError> {
        self.repo
            .create_client(
                &payload.full_name,
                payload.mobile_number.as_deref(),
                payload.notes.as_deref(),
                to_decimal(payload.commission_rate)?,
                actor.id,
            )
            .await
    }

    pub async fn update_client(
        &self,
        actor: &User,
        level: &PermissionLevel,
        id: Uuid,
        payload: ClientPayload,
    ) -> Result<Client, AppError> {
        self.repo
            .update_client(
                id,
                Self::scope(actor, level),
                &payload.full_name,
                payload.mobile_number.as_deref(),
                payload.notes.as_deref(),
                to_decimal(payload.commission_rate)?,
            )
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete_client(
        &self,
        actor: &User,
        level: &PermissionLevel,
        id: Uuid,
    ) -> Result<(), AppError> {
        if !self.repo.delete_client(id, Self::scope(actor, level)).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    // --- Empresas ---

    pub async fn list_companies(
        &self,
        actor: &User,
        level: &PermissionLevel,
    ) -> Result<Vec<Company>, AppError> {
        self.repo.list_companies(Self::scope(actor, level)).await
    }

    pub async fn create_company(
        &self,
        actor: &User,
        payload: CompanyPayload,
    ) -> Result<Company, AppError> {
        self.repo
            .create_company(
                &payload.name,
                payload.notes.as_deref(),
                to_decimal(payload.commission_rate)?,
                actor.id,
            )
            .await
    }

    pub async fn update_company(
        &self,
        actor: &User,
        level: &PermissionLevel,
        id: Uuid,
        payload: CompanyPayload,
    ) -> Result<Company, AppError> {
        self.repo
            .update_company(
                id,
                Self::scope(actor, level),
                &payload.name,
                payload.notes.as_deref(),
                to_decimal(payload.commission_rate)?,
            )
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete_company(
        &self,
        actor: &User,
        level: &PermissionLevel,
        id: Uuid,
    ) -> Result<(), AppError> {
        if !self.repo.delete_company(id, Self::scope(actor, level)).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    // --- Arquivos ---

    pub async fn list_files(
        &self,
        actor: &User,
        level: &PermissionLevel,
    ) -> Result<Vec<FileRecord>, AppError> {
        self.repo.list_files(Self::scope(actor, level)).await
    }

    pub async fn create_file(
        &self,
        actor: &User,
        payload: FilePayload,
    ) -> Result<FileRecord, AppError> {
        self.repo
            .create_file(
                &payload.file_name,
                payload.company,
                &payload.file_path,
                payload.notes.as_deref(),
                actor.id,
            )
            .await
    }

    pub async fn update_file(
        &self,
        actor: &User,
        level: &PermissionLevel,
        id: Uuid,
        payload: FilePayload,
    ) -> Result<FileRecord, AppError> {
        self.repo
            .update_file(
                id,
                Self::scope(actor, level),
                &payload.file_name,
                payload.company,
                &payload.file_path,
                payload.notes.as_deref(),
            )
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete_file(
        &self,
        actor: &User,
        level: &PermissionLevel,
        id: Uuid,
    ) -> Result<(), AppError> {
        if !self.repo.delete_file(id, Self::scope(actor, level)).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
