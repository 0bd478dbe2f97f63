pub mod user_repo;
pub use user_repo::UserRepository;
pub mod rbac_repo;
pub use rbac_repo::RbacRepository;
pub mod registry_repo;
pub use registry_repo::RegistryRepository;
pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;
pub mod tier_repo;
pub use tier_repo::TierRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
