// src/services/commission_service.rs
//
// Resolvedor de taxa de comissão: tier por faixa de valor primeiro,
// taxa padrão da entidade como fallback, zero quando a entidade sumiu.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::commission::{EntityType, RateSnapshot};
use crate::services::ports::RateSource;

#[derive(Clone)]
pub struct CommissionService {
    rates: Arc<dyn RateSource>,
}

impl CommissionService {
    pub fn new(rates: Arc<dyn RateSource>) -> Self {
        Self { rates }
    }

    // Resolução tudo-ou-nada por chamada: ou a taxa do tier que casa,
    // ou a taxa padrão da entidade, ou zero (entidade inexistente).
    // Erros de armazenamento sobem: nunca gravamos taxa "meio resolvida".
    pub async fn resolve_rate(
        &self,
        entity: EntityType,
        entity_id: Uuid,
        amount: Decimal,
    ) -> Result<Decimal, AppError> {
        if let Some(rate) = self.rates.tier_rate(entity, entity_id, amount).await? {
            return Ok(rate);
        }

        Ok(self
            .rates
            .default_rate(entity, entity_id)
            .await?
            .unwrap_or(Decimal::ZERO))
    }

    // Snapshot coerente das três pernas de uma fatura. As pernas tocam
    // entidades disjuntas, então resolvem concorrentemente; qualquer
    // falha derruba a operação inteira de criação/edição.
    pub async fn resolve_snapshot(
        &self,
        client_id: Uuid,
        distributor_id: Uuid,
        company_id: Option<Uuid>,
        amount: Decimal,
    ) -> Result<RateSnapshot, AppError> {
        let (client_rate, distributor_rate, company_rate) = tokio::join!(
            self.resolve_rate(EntityType::Client, client_id, amount),
            self.resolve_rate(EntityType::Distributor, distributor_id, amount),
            async {
                match company_id {
                    Some(id) => self.resolve_rate(EntityType::Company, id, amount).await,
                    None => Ok(Decimal::ZERO),
                }
            },
        );

        Ok(RateSnapshot {
            client_rate: client_rate?,
            distributor_rate: distributor_rate?,
            company_rate: company_rate?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Fonte em memória: tiers como faixas, defaults por entidade.
    struct InMemoryRates {
        tiers: Mutex<Vec<(EntityType, Uuid, Decimal, Option<Decimal>, Decimal)>>,
        defaults: HashMap<(EntityType, Uuid), Decimal>,
    }

    #[async_trait]
    impl RateSource for InMemoryRates {
        async fn tier_rate(
            &self,
            entity: EntityType,
            entity_id: Uuid,
            amount: Decimal,
        ) -> Result<Option<Decimal>, AppError> {
            Ok(self
                .tiers
                .lock()
                .unwrap()
                .iter()
                .find(|(e, id, min, max, _)| {
                    *e == entity
                        && *id == entity_id
                        && amount >= *min
                        && max.map(|m| amount <= m).unwrap_or(true)
                })
                .map(|(_, _, _, _, rate)| *rate))
        }

        async fn default_rate(
            &self,
            entity: EntityType,
            entity_id: Uuid,
        ) -> Result<Option<Decimal>, AppError> {
            Ok(self.defaults.get(&(entity, entity_id)).copied())
        }
    }

    #[tokio::test]
    async fn tier_wins_over_the_entity_default() {
        let client = Uuid::new_v4();
        let rates = InMemoryRates {
            tiers: Mutex::new(vec![(
                EntityType::Client,
                client,
                Decimal::new(500, 0),
                Some(Decimal::new(2000, 0)),
                Decimal::new(5, 0),
            )]),
            defaults: HashMap::from([((EntityType::Client, client), Decimal::new(3, 0))]),
        };
        let svc = CommissionService::new(Arc::new(rates));

        // Dentro da faixa: taxa do tier, independente do padrão.
        let rate = svc
            .resolve_rate(EntityType::Client, client, Decimal::new(1000, 0))
            .await
            .unwrap();
        assert_eq!(rate, Decimal::new(5, 0));

        // Fora da faixa: cai no padrão da entidade.
        let rate = svc
            .resolve_rate(EntityType::Client, client, Decimal::new(100, 0))
            .await
            .unwrap();
        assert_eq!(rate, Decimal::new(3, 0));
    }

    #[tokio::test]
    async fn missing_entity_resolves_to_zero() {
        let rates = InMemoryRates {
            tiers: Mutex::new(vec![]),
            defaults: HashMap::new(),
        };
        let svc = CommissionService::new(Arc::new(rates));

        let rate = svc
            .resolve_rate(EntityType::Company, Uuid::new_v4(), Decimal::new(1000, 0))
            .await
            .unwrap();
        assert_eq!(rate, Decimal::ZERO);
    }

    #[tokio::test]
    async fn snapshot_resolves_the_three_legs_together() {
        let client = Uuid::new_v4();
        let distributor = Uuid::new_v4();
        let company = Uuid::new_v4();
        let rates = InMemoryRates {
            tiers: Mutex::new(vec![]),
            defaults: HashMap::from([
                ((EntityType::Client, client), Decimal::new(3, 0)),
                ((EntityType::Distributor, distributor), Decimal::new(25, 1)),
                ((EntityType::Company, company), Decimal::new(1, 0)),
            ]),
        };
        let svc = CommissionService::new(Arc::new(rates));

        let snap = svc
            .resolve_snapshot(client, distributor, Some(company), Decimal::new(1000, 0))
            .await
            .unwrap();
        assert_eq!(snap.client_rate, Decimal::new(3, 0));
        assert_eq!(snap.distributor_rate, Decimal::new(25, 1));
        assert_eq!(snap.company_rate, Decimal::new(1, 0));

        // Sem empresa (arquivo órfão): perna da empresa vale zero.
        let snap = svc
            .resolve_snapshot(client, distributor, None, Decimal::new(1000, 0))
            .await
            .unwrap();
        assert_eq!(snap.company_rate, Decimal::ZERO);
    }

    #[tokio::test]
    async fn saved_rates_survive_later_tier_changes_until_reresolved() {
        use crate::services::testing::{make_invoice, MemoryInvoiceStore};

        let client = Uuid::new_v4();
        let distributor = Uuid::new_v4();
        let amount = Decimal::new(1000, 0);
        let rates = Arc::new(InMemoryRates {
            tiers: Mutex::new(vec![(
                EntityType::Client,
                client,
                Decimal::ZERO,
                None,
                Decimal::new(5, 0),
            )]),
            defaults: HashMap::new(),
        });
        let svc = CommissionService::new(rates.clone());
        let store = MemoryInvoiceStore::new();

        // Gravação: a fatura carrega a taxa resolvida naquele instante.
        let snap = svc
            .resolve_snapshot(client, distributor, None, amount)
            .await
            .unwrap();
        let mut inv = make_invoice(client, Uuid::new_v4(), distributor);
        inv.client_commission_rate = snap.client_rate;
        let inv_id = inv.id;
        store.insert(inv);
        assert_eq!(store.get(inv_id).client_commission_rate, Decimal::new(5, 0));

        // O tier muda depois; a fatura gravada não é tocada.
        rates.tiers.lock().unwrap()[0].4 = Decimal::new(8, 0);
        assert_eq!(store.get(inv_id).client_commission_rate, Decimal::new(5, 0));

        // Só uma edição re-resolve e persiste a taxa nova.
        let snap = svc
            .resolve_snapshot(client, distributor, None, amount)
            .await
            .unwrap();
        assert_eq!(snap.client_rate, Decimal::new(8, 0));
        let mut edited = store.get(inv_id);
        edited.client_commission_rate = snap.client_rate;
        store.insert(edited);
        assert_eq!(store.get(inv_id).client_commission_rate, Decimal::new(8, 0));
    }

    #[test]
    fn commission_amount_is_rate_percent_of_amount() {
        let amount = RateSnapshot::commission_for(Decimal::new(5, 0), Decimal::new(1000, 0));
        assert_eq!(amount, Decimal::new(5000, 2));
    }
}
