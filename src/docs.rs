// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Clients ---
        handlers::clients::list,
        handlers::clients::create,
        handlers::clients::update,
        handlers::clients::delete,

        // --- Companies ---
        handlers::companies::list,
        handlers::companies::create,
        handlers::companies::update,
        handlers::companies::delete,

        // --- Files ---
        handlers::files::list,
        handlers::files::create,
        handlers::files::update,
        handlers::files::delete,

        // --- Invoices ---
        handlers::invoices::list,
        handlers::invoices::get,
        handlers::invoices::create,
        handlers::invoices::calculate_commission,
        handlers::invoices::update,
        handlers::invoices::delete,
        handlers::invoices::mark_payment,
        handlers::invoices::unmark_payment,
        handlers::invoices::bulk_pay_client,
        handlers::invoices::bulk_pay_distributor,
        handlers::invoices::bulk_pay_company,

        // --- Distributors ---
        handlers::distributors::list,
        handlers::distributors::get,
        handlers::distributors::create,
        handlers::distributors::update,

        // --- Commission tiers ---
        handlers::tiers::list,
        handlers::tiers::create,
        handlers::tiers::update,
        handlers::tiers::delete,

        // --- RBAC ---
        handlers::rbac::list_permissions,
        handlers::rbac::list_roles,

        // --- Dashboard / Reports ---
        handlers::dashboard::summary,
        handlers::reports::invoices,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::CreateDistributorPayload,
            models::auth::UpdateDistributorPayload,
            models::auth::DistributorResponse,

            // --- RBAC ---
            models::rbac::Module,
            models::rbac::PermAction,
            models::rbac::Permission,
            models::rbac::Role,
            models::rbac::RoleResponse,
            models::rbac::PermissionLevel,
            models::rbac::LegacyPermissions,

            // --- Registry ---
            models::registry::Client,
            models::registry::ClientPayload,
            models::registry::Company,
            models::registry::CompanyPayload,
            models::registry::FileRecord,
            models::registry::FilePayload,

            // --- Invoices ---
            models::invoice::InvoiceStatus,
            models::invoice::PaymentStage,
            models::invoice::OverallPaymentStatus,
            models::invoice::StageState,
            models::invoice::PaymentStatus,
            models::invoice::Invoice,
            models::invoice::InvoiceView,
            models::invoice::CreateInvoicePayload,
            models::invoice::UpdateInvoicePayload,
            handlers::invoices::CalculateCommissionPayload,

            // --- Commission ---
            models::commission::EntityType,
            models::commission::CommissionTier,
            models::commission::CreateTierPayload,
            models::commission::CommissionPreview,

            // --- Dashboard / Reports ---
            models::dashboard::CohortSummary,
            models::dashboard::BulkPaymentData,
            models::dashboard::DashboardSummary,
            models::report::InvoiceReportRow,
            models::report::ReportTotals,
            models::report::InvoiceReport,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login e sessão"),
        (name = "Clients", description = "Clientes"),
        (name = "Companies", description = "Empresas"),
        (name = "Files", description = "Metadados de arquivos"),
        (name = "Invoices", description = "Faturas e snapshot de comissões"),
        (name = "Payments", description = "Etapas de pagamento e lote"),
        (name = "Distributors", description = "Distribuidores e cargos custom"),
        (name = "Commission Tiers", description = "Faixas de comissão"),
        (name = "RBAC", description = "Permissões e cargos"),
        (name = "Dashboard", description = "Painel"),
        (name = "Reports", description = "Relatórios"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_jwt",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
