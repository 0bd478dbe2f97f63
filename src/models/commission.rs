// src/models/commission.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Contraparte de uma taxa de comissão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "commission_entity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Client,
    Distributor,
    Company,
}

// Faixa de valor com taxa de comissão que sobrepõe a taxa padrão da
// entidade. `max_amount` nulo significa faixa aberta.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionTier {
    pub id: Uuid,

    pub entity_type: EntityType,
    pub entity_id: Uuid,

    #[schema(example = "0.00")]
    pub min_amount: Decimal,
    #[schema(example = "5000.00")]
    pub max_amount: Option<Decimal>,

    #[schema(example = "5.00")]
    pub commission_rate: Decimal,

    pub created_by: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

// Snapshot coerente das três taxas de uma fatura, tirado num único
// instante (sem gravação parcial: se uma resolução falha, nada é salvo).
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateSnapshot {
    pub client_rate: Decimal,
    pub distributor_rate: Decimal,
    pub company_rate: Decimal,
}

impl RateSnapshot {
    pub fn commission_for(rate: Decimal, amount: Decimal) -> Decimal {
        (amount * rate / Decimal::from(100)).round_dp(2)
    }
}

#[derive(Debug, Deserialize, validator::Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTierPayload {
    pub entity_type: EntityType,
    pub entity_id: Uuid,

    #[validate(range(min = 0.0, message = "min 0"))]
    #[schema(value_type = f64)]
    pub min_amount: f64,
    #[schema(value_type = Option<f64>)]
    pub max_amount: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "0..100"))]
    #[schema(value_type = f64)]
    pub commission_rate: f64,
}

// Resposta do cálculo de comissão exibido no formulário de fatura.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionPreview {
    pub client_rate: Decimal,
    pub distributor_rate: Decimal,
    pub company_rate: Decimal,
    pub client_commission: Decimal,
    pub distributor_commission: Decimal,
    pub company_commission: Decimal,
}
