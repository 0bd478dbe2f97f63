// src/models/registry.rs
//
// Entidades de referência da cadeia: cliente, empresa e arquivo
// (o arquivo aponta para a empresa que emitiu o trabalho). O conteúdo
// do PDF em si não passa por aqui, só os metadados.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,

    #[schema(example = "Mohammed Ali")]
    pub full_name: String,

    pub mobile_number: Option<String>,
    pub notes: Option<String>,

    // Taxa padrão do cliente (fallback do resolvedor de tiers).
    #[schema(example = "3.00")]
    pub commission_rate: Decimal,

    pub created_by: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,

    #[schema(example = "Al-Noor Trading")]
    pub name: String,

    pub notes: Option<String>,

    #[schema(example = "1.50")]
    pub commission_rate: Decimal,

    pub created_by: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,

    #[schema(example = "contract-2024-06.pdf")]
    pub file_name: String,

    pub company_id: Uuid,

    // Caminho opaco no armazenamento externo.
    pub file_path: String,

    pub notes: Option<String>,

    pub created_by: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, validator::Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, message = "required"))]
    pub full_name: String,
    pub mobile_number: Option<String>,
    pub notes: Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "0..100"))]
    #[schema(value_type = f64)]
    pub commission_rate: f64,
}

#[derive(Debug, Deserialize, validator::Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub notes: Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "0..100"))]
    #[schema(value_type = f64)]
    pub commission_rate: f64,
}

#[derive(Debug, Deserialize, validator::Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload {
    #[validate(length(min = 1, message = "required"))]
    pub file_name: String,
    pub company: Uuid,
    #[validate(length(min = 1, message = "required"))]
    pub file_path: String,
    pub notes: Option<String>,
}
