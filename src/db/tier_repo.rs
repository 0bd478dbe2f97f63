// src/db/tier_repo.rs
//
// Tabela 'commission_tiers' e a implementação de produção do RateSource:
// faixa mais específica (maior min_amount) primeiro, taxa padrão da
// própria entidade como fallback.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::commission::{CommissionTier, EntityType};
use crate::services::ports::RateSource;

#[derive(Clone)]
pub struct TierRepository {
    pool: PgPool,
}

impl TierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<CommissionTier>, AppError> {
        let tiers = sqlx::query_as::<_, CommissionTier>(
            "SELECT * FROM commission_tiers ORDER BY entity_type, entity_id, min_amount",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tiers)
    }

    pub async fn create(
        &self,
        entity_type: EntityType,
        entity_id: Uuid,
        min_amount: Decimal,
        max_amount: Option<Decimal>,
        commission_rate: Decimal,
        created_by: Uuid,
    ) -> Result<CommissionTier, AppError> {
        let tier = sqlx::query_as::<_, CommissionTier>(
            r#"
            INSERT INTO commission_tiers
                (entity_type, entity_id, min_amount, max_amount, commission_rate, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(min_amount)
        .bind(max_amount)
        .bind(commission_rate)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(tier)
    }

    pub async fn update(
        &self,
        id: Uuid,
        min_amount: Decimal,
        max_amount: Option<Decimal>,
        commission_rate: Decimal,
    ) -> Result<Option<CommissionTier>, AppError> {
        let tier = sqlx::query_as::<_, CommissionTier>(
            r#"
            UPDATE commission_tiers SET
                min_amount = $2, max_amount = $3, commission_rate = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(min_amount)
        .bind(max_amount)
        .bind(commission_rate)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tier)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM commission_tiers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RateSource for TierRepository {
    async fn tier_rate(
        &self,
        entity: EntityType,
        entity_id: Uuid,
        amount: Decimal,
    ) -> Result<Option<Decimal>, AppError> {
        let rate = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT commission_rate FROM commission_tiers
            WHERE entity_type = $1 AND entity_id = $2
              AND min_amount <= $3
              AND (max_amount IS NULL OR max_amount >= $3)
            ORDER BY min_amount DESC
            LIMIT 1
            "#,
        )
        .bind(entity)
        .bind(entity_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rate)
    }

    async fn default_rate(
        &self,
        entity: EntityType,
        entity_id: Uuid,
    ) -> Result<Option<Decimal>, AppError> {
        let sql = match entity {
            EntityType::Client => "SELECT commission_rate FROM clients WHERE id = $1",
            EntityType::Distributor => "SELECT commission_rate FROM users WHERE id = $1",
            EntityType::Company => "SELECT commission_rate FROM companies WHERE id = $1",
        };
        let rate = sqlx::query_scalar::<_, Decimal>(sql)
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rate)
    }
}
