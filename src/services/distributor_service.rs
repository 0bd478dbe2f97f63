// src/services/distributor_service.rs
//
// Montagem do distribuidor: usuário + cargo custom auto-nomeado
// (distributor_{username}_{millis}) + vínculo + flags legadas, tudo na
// mesma transação. A edição substitui o conjunto de permissões do cargo
// e reprojeta as flags.

use bcrypt::hash;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{RbacRepository, UserRepository};
use crate::models::auth::{
    CreateDistributorPayload, DistributorResponse, UpdateDistributorPayload, User,
};
use crate::models::rbac::Permission;
use crate::services::permission_service::PermissionService;
use crate::services::ports::PermissionLookup;

#[derive(Clone)]
pub struct DistributorService {
    user_repo: UserRepository,
    rbac_repo: RbacRepository,
    pool: PgPool,
}

impl DistributorService {
    pub fn new(user_repo: UserRepository, rbac_repo: RbacRepository, pool: PgPool) -> Self {
        Self { user_repo, rbac_repo, pool }
    }

    async fn hash_password(password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("falha na task de hashing: {}", e))?
            .map_err(AppError::from)
    }

    // Resolve os nomes recebidos para linhas de permissão; nomes
    // desconhecidos são ignorados em silêncio (o frontend só oferece os
    // semeados).
    async fn resolve_permissions(&self, names: &[String]) -> Result<Vec<Permission>, AppError> {
        self.rbac_repo.permissions_by_names(names).await
    }

    pub async fn list(&self) -> Result<Vec<DistributorResponse>, AppError> {
        let users = self.user_repo.list_distributors().await?;
        let mut out = Vec::with_capacity(users.len());
        for user in users {
            let permissions = self.permission_names(user.id).await?;
            out.push(DistributorResponse { user, permissions });
        }
        Ok(out)
    }

    pub async fn get(&self, id: Uuid) -> Result<DistributorResponse, AppError> {
        let user = self
            .user_repo
            .find_by_id(id)
            .await?
            .filter(|u| !u.is_admin())
            .ok_or(AppError::NotFound)?;
        let permissions = self.permission_names(id).await?;
        Ok(DistributorResponse { user, permissions })
    }

    pub async fn create(
        &self,
        actor: &User,
        payload: CreateDistributorPayload,
    ) -> Result<DistributorResponse, AppError> {
        let password_hash = Self::hash_password(&payload.password).await?;
        let permissions = self.resolve_permissions(&payload.permissions).await?;
        let legacy = PermissionService::legacy_projection(&permissions);
        let commission_rate = rust_decimal::Decimal::try_from(payload.commission_rate)
            .map_err(|e| anyhow::anyhow!("taxa inválida: {}", e))?;

        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .create_distributor(
                &mut *tx,
                &payload.username,
                &password_hash,
                commission_rate,
                &legacy,
            )
            .await?;

        // O sufixo em milissegundos evita colisão quando um username é
        // reutilizado depois de apagado.
        let role_name = format!(
            "distributor_{}_{}",
            payload.username,
            Utc::now().timestamp_millis()
        );
        let role = self
            .rbac_repo
            .create_role(
                &mut *tx,
                &role_name,
                &format!("صلاحيات الموزع {}", payload.username),
                Some("cargo custom do distribuidor"),
                actor.id,
            )
            .await?;

        let ids: Vec<Uuid> = permissions.iter().map(|p| p.id).collect();
        self.rbac_repo
            .replace_role_permissions(&mut tx, role.id, &ids)
            .await?;
        self.rbac_repo.assign_role(&mut *tx, user.id, role.id).await?;

        tx.commit().await?;

        tracing::info!(
            distributor = %user.username,
            role = %role_name,
            by = %actor.username,
            "distribuidor criado"
        );
        Ok(DistributorResponse {
            user,
            permissions: permissions.into_iter().map(|p| p.name).collect(),
        })
    }

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        payload: UpdateDistributorPayload,
    ) -> Result<DistributorResponse, AppError> {
        let password_hash = match &payload.password {
            Some(p) => Some(Self::hash_password(p).await?),
            None => None,
        };
        let permissions = self.resolve_permissions(&payload.permissions).await?;
        let legacy = PermissionService::legacy_projection(&permissions);
        let commission_rate = rust_decimal::Decimal::try_from(payload.commission_rate)
            .map_err(|e| anyhow::anyhow!("taxa inválida: {}", e))?;

        let custom_role = self.rbac_repo.custom_role_for_user(id).await?;

        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .update_distributor(
                &mut *tx,
                id,
                commission_rate,
                payload.is_active,
                password_hash.as_deref(),
            )
            .await?
            .ok_or(AppError::NotFound)?;

        let ids: Vec<Uuid> = permissions.iter().map(|p| p.id).collect();
        match custom_role {
            Some(role) => {
                self.rbac_repo
                    .replace_role_permissions(&mut tx, role.id, &ids)
                    .await?;
            }
            // Distribuidor legado sem cargo custom: cria um agora.
            None => {
                let role_name = format!(
                    "distributor_{}_{}",
                    user.username,
                    Utc::now().timestamp_millis()
                );
                let role = self
                    .rbac_repo
                    .create_role(
                        &mut *tx,
                        &role_name,
                        &format!("صلاحيات الموزع {}", user.username),
                        Some("cargo custom do distribuidor"),
                        actor.id,
                    )
                    .await?;
                self.rbac_repo
                    .replace_role_permissions(&mut tx, role.id, &ids)
                    .await?;
                self.rbac_repo.assign_role(&mut *tx, user.id, role.id).await?;
            }
        }

        // O cargo mudou: reprojeta as flags legadas no usuário.
        self.user_repo.update_legacy_flags(&mut *tx, id, &legacy).await?;

        tx.commit().await?;

        let user = self
            .user_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(DistributorResponse {
            user,
            permissions: permissions.into_iter().map(|p| p.name).collect(),
        })
    }

    async fn permission_names(&self, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let permissions = self.rbac_repo.permissions_for_actor(user_id).await?;
        let mut names: Vec<String> = permissions.into_iter().map(|p| p.name).collect();
        names.sort();
        Ok(names)
    }
}
