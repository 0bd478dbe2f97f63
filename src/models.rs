pub mod auth;
pub mod commission;
pub mod dashboard;
pub mod invoice;
pub mod rbac;
pub mod registry;
pub mod report;
