// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        DashboardRepository, InvoiceRepository, RbacRepository, RegistryRepository,
        TierRepository, UserRepository,
    },
    models::invoice::StageOrdering,
    services::{
        AuthService, BulkPaymentService, CommissionService, DashboardService, DistributorService,
        InvoiceService, PaymentService, PermissionService, RbacService, RegistryService,
        ReportService, TierService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,

    pub auth_service: AuthService,
    pub permission_service: PermissionService,
    pub commission_service: CommissionService,
    pub payment_service: PaymentService,
    pub bulk_payment_service: BulkPaymentService,
    pub invoice_service: InvoiceService,
    pub registry_service: RegistryService,
    pub distributor_service: DistributorService,
    pub rbac_service: RbacService,
    pub tier_service: TierService,
    pub dashboard_service: DashboardService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let stage_ordering = StageOrdering::from_env_value(
            &env::var("PAYMENT_STAGE_ORDERING").unwrap_or_default(),
        );

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let registry_repo = RegistryRepository::new(db_pool.clone());
        let invoice_repo = InvoiceRepository::new(db_pool.clone());
        let tier_repo = TierRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret);
        let permission_service = PermissionService::new(Arc::new(rbac_repo.clone()));
        let commission_service = CommissionService::new(Arc::new(tier_repo.clone()));
        let payment_service =
            PaymentService::new(Arc::new(invoice_repo.clone()), stage_ordering);
        let bulk_payment_service = BulkPaymentService::new(Arc::new(invoice_repo.clone()));
        let invoice_service =
            InvoiceService::new(invoice_repo.clone(), commission_service.clone());
        let registry_service = RegistryService::new(registry_repo);
        let distributor_service =
            DistributorService::new(user_repo, rbac_repo.clone(), db_pool.clone());
        let rbac_service = RbacService::new(rbac_repo);
        let tier_service = TierService::new(tier_repo);
        let dashboard_service = DashboardService::new(dashboard_repo, invoice_repo.clone());
        let report_service = ReportService::new(invoice_repo);

        Ok(Self {
            db_pool,
            i18n_store: I18nStore::new(),
            auth_service,
            permission_service,
            commission_service,
            payment_service,
            bulk_payment_service,
            invoice_service,
            registry_service,
            distributor_service,
            rbac_service,
            tier_service,
            dashboard_service,
            report_service,
        })
    }
}
