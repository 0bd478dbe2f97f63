// src/services/tier_service.rs
//
// Administração dos tiers de comissão. Mudar um tier não toca nas
// faturas existentes: o snapshot delas já foi tirado.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::TierRepository;
use crate::models::auth::User;
use crate::models::commission::{CommissionTier, CreateTierPayload};

fn to_decimal(value: f64) -> Result<Decimal, AppError> {
    Decimal::try_from(value).map_err(|e| anyhow::anyhow!("valor inválido: {}", e).into())
}

#[derive(Clone)]
pub struct TierService {
    tier_repo: TierRepository,
}

impl TierService {
    pub fn new(tier_repo: TierRepository) -> Self {
        Self { tier_repo }
    }

    pub async fn list(&self) -> Result<Vec<CommissionTier>, AppError> {
        self.tier_repo.list().await
    }

    pub async fn create(
        &self,
        actor: &User,
        payload: CreateTierPayload,
    ) -> Result<CommissionTier, AppError> {
        let max_amount = payload.max_amount.map(to_decimal).transpose()?;
        self.tier_repo
            .create(
                payload.entity_type,
                payload.entity_id,
                to_decimal(payload.min_amount)?,
                max_amount,
                to_decimal(payload.commission_rate)?,
                actor.id,
            )
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: CreateTierPayload,
    ) -> Result<CommissionTier, AppError> {
        let max_amount = payload.max_amount.map(to_decimal).transpose()?;
        self.tier_repo
            .update(
                id,
                to_decimal(payload.min_amount)?,
                max_amount,
                to_decimal(payload.commission_rate)?,
            )
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.tier_repo.delete(id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
