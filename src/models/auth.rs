// src/models/auth.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::rbac::LegacyPermissions;

// Papel grosso do usuário. `admin` é bypass universal de autorização.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Distributor,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[schema(example = "ahmed")]
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role: UserRole,

    // Taxa de comissão padrão do distribuidor (fallback quando nenhum
    // tier casa com o valor da fatura).
    #[schema(example = "2.50")]
    pub commission_rate: Decimal,

    // Projeção legada, recalculada sempre que o cargo do usuário muda.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub permissions: LegacyPermissions,

    pub is_active: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "ahmed")]
    pub username: String,
    #[validate(length(min = 6, message = "min 6"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// --- Distribuidores ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDistributorPayload {
    #[validate(length(min = 3, message = "min 3"))]
    #[schema(example = "ahmed")]
    pub username: String,

    #[validate(length(min = 6, message = "min 6"))]
    pub password: String,

    #[validate(range(min = 0.0, max = 100.0, message = "0..100"))]
    #[schema(value_type = f64, example = 2.5)]
    pub commission_rate: f64,

    // Nomes de permissão (module.action) do cargo custom do distribuidor.
    #[schema(example = json!(["invoices.view_own", "invoices.create"]))]
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDistributorPayload {
    #[validate(range(min = 0.0, max = 100.0, message = "0..100"))]
    #[schema(value_type = f64)]
    pub commission_rate: f64,

    pub is_active: bool,

    #[validate(length(min = 6, message = "min 6"))]
    pub password: Option<String>,

    pub permissions: Vec<String>,
}

// Distribuidor + as permissões efetivas do seu cargo custom.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributorResponse {
    #[serde(flatten)]
    pub user: User,
    pub permissions: Vec<String>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
