// src/services/rbac_service.rs

use crate::common::error::AppError;
use crate::db::RbacRepository;
use crate::models::rbac::{Permission, RoleResponse};

// Leitura do catálogo de permissões e cargos; o frontend usa o catálogo
// para montar a tela de permissões do distribuidor.
#[derive(Clone)]
pub struct RbacService {
    rbac_repo: RbacRepository,
}

impl RbacService {
    pub fn new(rbac_repo: RbacRepository) -> Self {
        Self { rbac_repo }
    }

    pub async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        self.rbac_repo.list_permissions().await
    }

    pub async fn list_roles(&self) -> Result<Vec<RoleResponse>, AppError> {
        let roles = self.rbac_repo.list_roles().await?;
        let mut out = Vec::with_capacity(roles.len());
        for role in roles {
            let permissions = self.rbac_repo.permission_names_for_role(role.id).await?;
            out.push(RoleResponse { role, permissions });
        }
        Ok(out)
    }
}
