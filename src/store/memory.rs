use dashmap::DashMap;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::delivery::Delivery;
use crate::store::{DeliveryQuery, DeliveryStore, Mutator};

/// In-memory document store. One DashMap shard lock per key gives the
/// same per-document atomicity the contract demands: `transact` holds the
/// entry lock for the whole read-validate-write, so racing claimants
/// serialize and the loser's mutator sees the winner's committed status.
#[derive(Default)]
pub struct MemoryStore {
    docs: DashMap<String, Delivery>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeliveryStore for MemoryStore {
    async fn create(&self, delivery: &Delivery) -> Result<(), AppError> {
        self.docs.insert(delivery.id.clone(), delivery.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Delivery, AppError> {
        self.docs
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("delivery {id} not found")))
    }

    async fn transact(&self, id: &str, mutate: Mutator) -> Result<Delivery, AppError> {
        let mut entry = self
            .docs
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("delivery {id} not found")))?;

        let mutated = mutate(entry.value().clone())?;
        *entry.value_mut() = mutated.clone();
        Ok(mutated)
    }

    async fn query(&self, query: &DeliveryQuery) -> Result<Vec<Delivery>, AppError> {
        // Resolve the cursor to its sort position before filtering, the way
        // a document-anchored start-after works.
        let after_key = match &query.start_after {
            Some(cursor_id) => {
                let doc = self.get(cursor_id).await?;
                Some((doc.created_at, doc.id))
            }
            None => None,
        };

        let mut matches: Vec<Delivery> = self
            .docs
            .iter()
            .filter(|entry| {
                let d = entry.value();
                query.status.is_none_or(|s| d.status == s)
                    && query
                        .business_name
                        .as_ref()
                        .is_none_or(|name| &d.business_name == name)
            })
            .map(|entry| entry.value().clone())
            .collect();

        // Newest first; id breaks createdAt ties so pages never shuffle.
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        if let Some((at, id)) = after_key {
            matches.retain(|d| (d.created_at, d.id.as_str()) < (at, id.as_str()));
        }

        if query.page_size > 0 {
            matches.truncate(query.page_size);
        }

        Ok(matches)
    }
}
