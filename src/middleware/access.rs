// src/middleware/access.rs
//
// Guardas de autorização como extratores tipados: a rota declara no
// próprio handler qual permissão fina ou qual módulo exige, e o resumo
// de capacidade chega por valor (nenhum estado mutável por requisição).

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::{locale_from_headers, Locale},
    models::auth::User,
    models::rbac::{Module, PermAction, PermissionLevel},
};

pub trait PermissionDef: Send + Sync {
    const MODULE: Module;
    const ACTION: PermAction;
}

pub trait ModuleDef: Send + Sync {
    const MODULE: Module;
}

fn current_user(parts: &Parts, state: &AppState, locale: &Locale) -> Result<User, ApiError> {
    parts
        .extensions
        .get::<User>()
        .cloned()
        .ok_or_else(|| AppError::InvalidToken.to_api_error(locale, &state.i18n_store))
}

// Exige a permissão (module, action) declarada pelo tipo.
pub struct RequirePermission<T: PermissionDef>(PhantomData<T>);

impl<T: PermissionDef> FromRequestParts<AppState> for RequirePermission<T> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let locale = Locale(locale_from_headers(&parts.headers));
        let user = current_user(parts, state, &locale)?;

        let allowed = state
            .permission_service
            .authorize(user.id, T::MODULE, T::ACTION)
            .await
            .map_err(|e| e.to_api_error(&locale, &state.i18n_store))?;
        if !allowed {
            return Err(AppError::NotAuthorized.to_api_error(&locale, &state.i18n_store));
        }
        Ok(Self(PhantomData))
    }
}

// Exige acesso ao módulo e entrega o resumo de capacidade calculado
// uma vez para a requisição.
pub struct ModuleAccess<M: ModuleDef> {
    pub level: PermissionLevel,
    _module: PhantomData<M>,
}

impl<M: ModuleDef> FromRequestParts<AppState> for ModuleAccess<M> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let locale = Locale(locale_from_headers(&parts.headers));
        let user = current_user(parts, state, &locale)?;

        let level = state
            .permission_service
            .module_level(user.id, M::MODULE)
            .await
            .map_err(|e| e.to_api_error(&locale, &state.i18n_store))?;
        if !level.has_module_access() {
            return Err(AppError::NotAuthorized.to_api_error(&locale, &state.i18n_store));
        }
        Ok(Self { level, _module: PhantomData })
    }
}

// Rotas administrativas (distribuidores, tiers, catálogo RBAC).
pub struct AdminOnly;

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let locale = Locale(locale_from_headers(&parts.headers));
        let user = current_user(parts, state, &locale)?;
        if !user.is_admin() {
            return Err(AppError::NotAuthorized.to_api_error(&locale, &state.i18n_store));
        }
        Ok(Self)
    }
}

macro_rules! permission_def {
    ($name:ident, $module:ident, $action:ident) => {
        pub struct $name;
        impl PermissionDef for $name {
            const MODULE: Module = Module::$module;
            const ACTION: PermAction = PermAction::$action;
        }
    };
}

macro_rules! module_def {
    ($name:ident, $module:ident) => {
        pub struct $name;
        impl ModuleDef for $name {
            const MODULE: Module = Module::$module;
        }
    };
}

permission_def!(ClientsCreate, Clients, Create);
permission_def!(ClientsUpdate, Clients, Update);
permission_def!(ClientsDelete, Clients, Delete);
permission_def!(CompaniesCreate, Companies, Create);
permission_def!(CompaniesUpdate, Companies, Update);
permission_def!(CompaniesDelete, Companies, Delete);
permission_def!(FilesCreate, Files, Create);
permission_def!(FilesUpdate, Files, Update);
permission_def!(FilesDelete, Files, Delete);
permission_def!(InvoicesCreate, Invoices, Create);
permission_def!(InvoicesUpdate, Invoices, Update);
permission_def!(InvoicesDelete, Invoices, Delete);

module_def!(ClientsModule, Clients);
module_def!(CompaniesModule, Companies);
module_def!(FilesModule, Files);
module_def!(InvoicesModule, Invoices);
module_def!(ReportsModule, Reports);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::{Request, StatusCode};
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    use crate::common::i18n::I18nStore;
    use crate::db::{
        DashboardRepository, InvoiceRepository, RbacRepository, RegistryRepository,
        TierRepository, UserRepository,
    };
    use crate::models::auth::UserRole;
    use crate::models::invoice::StageOrdering;
    use crate::models::rbac::Permission;
    use crate::services::testing::MemoryPermissionLookup;
    use crate::services::{
        AuthService, BulkPaymentService, CommissionService, DashboardService,
        DistributorService, InvoiceService, PaymentService, PermissionService, RbacService,
        RegistryService, ReportService, TierService,
    };

    // Estado com o serviço de permissões apoiado no lookup em memória.
    // O pool é preguiçoso: os guardas não tocam o banco.
    fn state_with(lookup: MemoryPermissionLookup) -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/nao_usado")
            .unwrap();
        let user_repo = UserRepository::new(pool.clone());
        let rbac_repo = RbacRepository::new(pool.clone());
        let invoice_repo = InvoiceRepository::new(pool.clone());
        let tier_repo = TierRepository::new(pool.clone());
        let commission_service = CommissionService::new(Arc::new(tier_repo.clone()));

        AppState {
            db_pool: pool.clone(),
            i18n_store: I18nStore::new(),
            auth_service: AuthService::new(user_repo.clone(), "segredo-de-teste".to_string()),
            permission_service: PermissionService::new(Arc::new(lookup)),
            commission_service: commission_service.clone(),
            payment_service: PaymentService::new(
                Arc::new(invoice_repo.clone()),
                StageOrdering::AdminOverride,
            ),
            bulk_payment_service: BulkPaymentService::new(Arc::new(invoice_repo.clone())),
            invoice_service: InvoiceService::new(invoice_repo.clone(), commission_service),
            registry_service: RegistryService::new(RegistryRepository::new(pool.clone())),
            distributor_service: DistributorService::new(user_repo, rbac_repo.clone(), pool.clone()),
            rbac_service: RbacService::new(rbac_repo),
            tier_service: TierService::new(tier_repo),
            dashboard_service: DashboardService::new(
                DashboardRepository::new(pool.clone()),
                invoice_repo.clone(),
            ),
            report_service: ReportService::new(invoice_repo),
        }
    }

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: "u".into(),
            password_hash: String::new(),
            role,
            commission_rate: Decimal::ZERO,
            permissions: Default::default(),
            is_active: true,
            created_at: None,
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

    // Requisição já autenticada (o guard de JWT colocou o User).
    fn parts_for(user: &User) -> Parts {
        let (mut parts, _) = Request::builder()
            .uri("/api/invoices")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(user.clone());
        parts
    }

    #[tokio::test]
    async fn permission_gate_blocks_actors_without_the_grant() {
        let dist = user(UserRole::Distributor);
        let lookup = MemoryPermissionLookup::new();
        lookup.insert_actor(dist.clone());
        let state = state_with(lookup);

        // Sem invoices.create, a prévia de comissão (e a criação) é 403.
        let mut parts = parts_for(&dist);
        let err = RequirePermission::<InvoicesCreate>::from_request_parts(&mut parts, &state)
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn permission_gate_accepts_the_granted_action() {
        let dist = user(UserRole::Distributor);
        let lookup = MemoryPermissionLookup::new();
        lookup.insert_actor(dist.clone());
        lookup.grant(dist.id, vec![perm(Module::Invoices, PermAction::Create)]);
        let state = state_with(lookup);

        let mut parts = parts_for(&dist);
        assert!(
            RequirePermission::<InvoicesCreate>::from_request_parts(&mut parts, &state)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn module_gate_requires_at_least_one_view() {
        let dist = user(UserRole::Distributor);
        let lookup = MemoryPermissionLookup::new();
        lookup.insert_actor(dist.clone());
        let state = state_with(lookup);

        // Cargo esvaziado de permissões de faturas: o papel não basta,
        // nem para as rotas de lote.
        let mut parts = parts_for(&dist);
        let err = ModuleAccess::<InvoicesModule>::from_request_parts(&mut parts, &state)
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn module_gate_passes_the_computed_level_through() {
        let dist = user(UserRole::Distributor);
        let lookup = MemoryPermissionLookup::new();
        lookup.insert_actor(dist.clone());
        lookup.grant(dist.id, vec![perm(Module::Invoices, PermAction::ViewOwn)]);
        let state = state_with(lookup);

        let mut parts = parts_for(&dist);
        let access = ModuleAccess::<InvoicesModule>::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(access.level.owner_scoped());
        assert!(!access.level.can_create);
    }
}
