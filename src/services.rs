pub mod ports;

pub mod auth_service;
pub use auth_service::AuthService;
pub mod permission_service;
pub use permission_service::PermissionService;
pub mod commission_service;
pub use commission_service::CommissionService;
pub mod payment_service;
pub use payment_service::PaymentService;
pub mod bulk_payment_service;
pub use bulk_payment_service::BulkPaymentService;
pub mod invoice_service;
pub use invoice_service::InvoiceService;
pub mod registry_service;
pub use registry_service::RegistryService;
pub mod distributor_service;
pub use distributor_service::DistributorService;
pub mod rbac_service;
pub use rbac_service::RbacService;
pub mod tier_service;
pub use tier_service::TierService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod report_service;
pub use report_service::ReportService;

#[cfg(test)]
pub mod testing;
