// src/services/permission_service.rs
//
// O motor de autorização: decide se um ator pode executar uma ação de
// um módulo, calcula o resumo de capacidade por módulo e deriva as
// flags legadas a partir do conjunto fino de permissões.

use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::rbac::{LegacyPermissions, Module, PermAction, Permission, PermissionLevel};
use crate::services::ports::PermissionLookup;

#[derive(Clone)]
pub struct PermissionService {
    lookup: Arc<dyn PermissionLookup>,
}

impl PermissionService {
    pub fn new(lookup: Arc<dyn PermissionLookup>) -> Self {
        Self { lookup }
    }

    // Decisão pura de autorização. Admin é bypass incondicional: dados
    // de cargo/permissão não conseguem revogá-lo. Ator inexistente
    // (apagado depois da sessão) vira UserNotFound, não um deny mudo.
    pub async fn authorize(
        &self,
        actor_id: Uuid,
        module: Module,
        action: PermAction,
    ) -> Result<bool, AppError> {
        let actor = self
            .lookup
            .find_actor(actor_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if actor.is_admin() {
            return Ok(true);
        }

        let permissions = self.lookup.permissions_for_actor(actor_id).await?;
        Ok(permissions
            .iter()
            .any(|p| p.module == module && p.action == action))
    }

    // Resumo de capacidade do módulo, calculado uma vez por requisição.
    pub async fn module_level(
        &self,
        actor_id: Uuid,
        module: Module,
    ) -> Result<PermissionLevel, AppError> {
        let actor = self
            .lookup
            .find_actor(actor_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if actor.is_admin() {
            return Ok(PermissionLevel::ALL);
        }

        let permissions = self.lookup.permissions_for_actor(actor_id).await?;
        let has = |action: PermAction| {
            permissions
                .iter()
                .any(|p| p.module == module && p.action == action)
        };

        Ok(PermissionLevel {
            can_view_own: has(PermAction::ViewOwn),
            can_view_all: has(PermAction::ViewAll),
            can_create: has(PermAction::Create),
            can_update: has(PermAction::Update),
            can_delete: has(PermAction::Delete),
        })
    }

    // Projeção legada: função pura do conjunto fino. Uma flag liga se o
    // ator tem qualquer permissão do conjunto definido pelo módulo.
    // Recalculada (e persistida no usuário) sempre que o cargo muda.
    pub fn legacy_projection(permissions: &[Permission]) -> LegacyPermissions {
        let has = |module: Module, actions: &[PermAction]| {
            permissions
                .iter()
                .any(|p| p.module == module && actions.contains(&p.action))
        };

        LegacyPermissions {
            can_create_companies: has(Module::Companies, &[PermAction::Create, PermAction::ViewAll]),
            can_create_invoices: has(Module::Invoices, &[PermAction::Create, PermAction::ViewOwn]),
            can_manage_clients: has(
                Module::Clients,
                &[
                    PermAction::Create,
                    PermAction::Update,
                    PermAction::Delete,
                    PermAction::ViewOwn,
                ],
            ),
            can_view_reports: has(Module::Reports, &[PermAction::ViewOwn, PermAction::ViewAll]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    use crate::models::auth::{User, UserRole};

    struct InMemoryLookup {
        actors: HashMap<Uuid, User>,
        permissions: HashMap<Uuid, Vec<Permission>>,
    }

    #[async_trait]
    impl PermissionLookup for InMemoryLookup {
        async fn find_actor(&self, actor_id: Uuid) -> Result<Option<User>, AppError> {
            Ok(self.actors.get(&actor_id).cloned())
        }

        async fn permissions_for_actor(
            &self,
            actor_id: Uuid,
        ) -> Result<Vec<Permission>, AppError> {
            Ok(self.permissions.get(&actor_id).cloned().unwrap_or_default())
        }
    }

    fn user(id: Uuid, role: UserRole) -> User {
        User {
            id,
            username: "u".into(),
            password_hash: String::new(),
            role,
            commission_rate: Decimal::ZERO,
            permissions: Default::default(),
            is_active: true,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    fn perm(module: Module, action: PermAction) -> Permission {
        Permission {
            id: Uuid::new_v4(),
            name: format!("{:?}.{:?}", module, action),
            display_name: String::new(),
            module,
            action,
            description: None,
            is_system_permission: false,
        }
    }

    fn service(actors: Vec<User>, permissions: Vec<(Uuid, Vec<Permission>)>) -> PermissionService {
        PermissionService::new(Arc::new(InMemoryLookup {
            actors: actors.into_iter().map(|u| (u.id, u)).collect(),
            permissions: permissions.into_iter().collect(),
        }))
    }

    #[tokio::test]
    async fn admin_bypass_covers_every_pair() {
        let admin = Uuid::new_v4();
        let svc = service(vec![user(admin, UserRole::Admin)], vec![]);

        // Inclusive permissões que nenhum cargo concede.
        for module in [Module::System, Module::Roles, Module::CommissionTiers] {
            for action in [PermAction::Create, PermAction::Delete, PermAction::ViewAll] {
                assert!(svc.authorize(admin, module, action).await.unwrap());
            }
        }
        assert_eq!(
            svc.module_level(admin, Module::Invoices).await.unwrap().can_delete,
            true
        );
    }

    #[tokio::test]
    async fn non_admin_authorization_is_the_union_of_roles() {
        let dist = Uuid::new_v4();
        // Permissões vindas de dois cargos: a união decide.
        let svc = service(
            vec![user(dist, UserRole::Distributor)],
            vec![(
                dist,
                vec![
                    perm(Module::Invoices, PermAction::ViewOwn),
                    perm(Module::Clients, PermAction::Create),
                ],
            )],
        );

        assert!(svc.authorize(dist, Module::Invoices, PermAction::ViewOwn).await.unwrap());
        assert!(svc.authorize(dist, Module::Clients, PermAction::Create).await.unwrap());
        assert!(!svc.authorize(dist, Module::Invoices, PermAction::Delete).await.unwrap());
        assert!(!svc.authorize(dist, Module::Companies, PermAction::Create).await.unwrap());
    }

    #[tokio::test]
    async fn missing_actor_is_a_distinct_condition() {
        let svc = service(vec![], vec![]);
        let err = svc
            .authorize(Uuid::new_v4(), Module::Invoices, PermAction::ViewOwn)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }

    #[tokio::test]
    async fn module_level_reflects_each_action_independently() {
        let dist = Uuid::new_v4();
        let svc = service(
            vec![user(dist, UserRole::Distributor)],
            vec![(
                dist,
                vec![
                    perm(Module::Invoices, PermAction::ViewOwn),
                    perm(Module::Invoices, PermAction::Create),
                ],
            )],
        );

        let level = svc.module_level(dist, Module::Invoices).await.unwrap();
        assert!(level.can_view_own && level.can_create);
        assert!(!level.can_view_all && !level.can_update && !level.can_delete);
        assert!(level.has_module_access());
        assert!(level.owner_scoped());

        let none = svc.module_level(dist, Module::Companies).await.unwrap();
        assert!(!none.has_module_access());
    }

    #[test]
    fn legacy_projection_is_a_pure_function_of_the_fine_set() {
        let perms = vec![
            perm(Module::Clients, PermAction::Update),
            perm(Module::Reports, PermAction::ViewOwn),
        ];
        let legacy = PermissionService::legacy_projection(&perms);
        assert!(legacy.can_manage_clients);
        assert!(legacy.can_view_reports);
        assert!(!legacy.can_create_companies);
        assert!(!legacy.can_create_invoices);

        let empty = PermissionService::legacy_projection(&[]);
        assert!(
            !empty.can_create_companies
                && !empty.can_create_invoices
                && !empty.can_manage_clients
                && !empty.can_view_reports
        );
    }
}
