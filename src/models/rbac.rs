// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

// O módulo é a primeira metade da chave de permissão (module, action).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "perm_module", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Companies,
    Clients,
    Files,
    Invoices,
    Distributors,
    Reports,
    #[sqlx(rename = "commission-tiers")]
    #[serde(rename = "commission-tiers")]
    CommissionTiers,
    Roles,
    Permissions,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "perm_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PermAction {
    ViewOwn,
    ViewAll,
    Create,
    Update,
    Delete,
}

// --- Structs ---

// O que sai do banco (Tabela permissions). (module, action) é único.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440001")]
    pub id: Uuid,

    #[schema(example = "invoices.create")]
    pub name: String,

    pub display_name: String,

    pub module: Module,

    pub action: PermAction,

    pub description: Option<String>,

    pub is_system_permission: bool,
}

// O que sai do banco (Tabela roles)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "distributor_ahmed_1735000000000")]
    pub name: String,

    pub display_name: String,

    pub description: Option<String>,

    // Cargos de sistema são semeados por migração e imutáveis via API.
    pub is_system_role: bool,

    pub created_by: Option<Uuid>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// Resposta completa (Cargo + Lista de Permissões)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    #[serde(flatten)]
    pub role: Role,

    #[schema(example = json!(["invoices.view_own", "invoices.create"]))]
    pub permissions: Vec<String>,
}

// Resumo de capacidade por módulo, calculado uma vez por requisição e
// passado por valor aos handlers (nada de estado mutável ambiente).
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionLevel {
    pub can_view_own: bool,
    pub can_view_all: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

impl PermissionLevel {
    pub const ALL: PermissionLevel = PermissionLevel {
        can_view_own: true,
        can_view_all: true,
        can_create: true,
        can_update: true,
        can_delete: true,
    };

    pub const NONE: PermissionLevel = PermissionLevel {
        can_view_own: false,
        can_view_all: false,
        can_create: false,
        can_update: false,
        can_delete: false,
    };

    // Acesso ao módulo exige pelo menos uma das visões.
    pub fn has_module_access(&self) -> bool {
        self.can_view_own || self.can_view_all
    }

    // Quando true, toda consulta do módulo é filtrada pelo dono/atribuído.
    pub fn owner_scoped(&self) -> bool {
        !self.can_view_all && self.can_view_own
    }
}

// Flags legadas, mantidas como projeção denormalizada no usuário.
// Nunca são escritas diretamente: sempre recalculadas a partir do
// conjunto fino de permissões (veja PermissionService::legacy_projection).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPermissions {
    pub can_create_companies: bool,
    pub can_create_invoices: bool,
    pub can_manage_clients: bool,
    pub can_view_reports: bool,
}
