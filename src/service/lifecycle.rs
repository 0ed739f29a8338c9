use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::delivery::{Delivery, DeliveryStatus, GeoPoint};
use crate::models::user::BusinessProfile;
use crate::service::transitions::valid_transition;
use crate::store::DeliveryStore;

/// Client-supplied part of a new posting. Business name, address and
/// location come from the caller's profile instead, so a business cannot
/// post under someone else's storefront.
#[derive(Debug, Clone)]
pub struct NewDelivery {
    pub destination_address: String,
    pub destination_location: GeoPoint,
    pub item: String,
    pub payment: Option<serde_json::Value>,
}

/// Create / accept / update for one delivery aggregate. Stateless; all
/// coordination between racing callers lives in the store's per-document
/// transaction.
#[derive(Clone)]
pub struct LifecycleService {
    store: Arc<dyn DeliveryStore>,
}

impl LifecycleService {
    pub fn new(store: Arc<dyn DeliveryStore>) -> Self {
        Self { store }
    }

    /// Persists a fresh posting. Id and createdAt are server-assigned;
    /// a single create call, so no partial state is observable on failure.
    pub async fn create(
        &self,
        creator_uid: &str,
        profile: &BusinessProfile,
        req: NewDelivery,
    ) -> Result<Delivery, AppError> {
        let delivery = Delivery {
            id: Uuid::new_v4().to_string(),
            created_by: creator_uid.to_string(),
            business_id: creator_uid.to_string(),
            business_name: profile.business_name.clone(),
            business_address: profile.business_address.clone(),
            business_location: profile.location,
            destination_address: req.destination_address,
            destination_location: req.destination_location,
            item: req.item,
            status: DeliveryStatus::Posted,
            assigned_to: None,
            delivered_by: None,
            created_at: Utc::now(),
            payment: req.payment,
        };

        self.store.create(&delivery).await?;
        Ok(delivery)
    }

    /// Lets exactly one courier claim a posted delivery.
    ///
    /// The transition check runs inside the transaction against the
    /// just-read snapshot, so of N racing claimants exactly one observes
    /// `posted` and commits; the rest abort with InvalidTransition, which
    /// callers should read as "already claimed". The mutator flips only
    /// status and assignedTo on the snapshot, every other field rides
    /// along untouched.
    pub async fn accept(&self, delivery_id: &str, courier_uid: &str) -> Result<Delivery, AppError> {
        let courier = courier_uid.to_string();
        self.store
            .transact(
                delivery_id,
                Box::new(move |mut d| {
                    valid_transition(d.status, DeliveryStatus::Accepted)?;
                    d.status = DeliveryStatus::Accepted;
                    d.assigned_to = Some(courier);
                    Ok(d)
                }),
            )
            .await
    }

    /// Advances an in-flight delivery one step along the chain.
    ///
    /// Ownership is checked before the transition so a caller who is not
    /// the current assignee always gets UnauthorizedAssignment, however
    /// nonsensical their target. On `delivered` the courier is released:
    /// assignedTo clears and deliveredBy records who completed it.
    pub async fn update_status(
        &self,
        delivery_id: &str,
        target: DeliveryStatus,
        courier_uid: &str,
    ) -> Result<Delivery, AppError> {
        let courier = courier_uid.to_string();
        self.store
            .transact(
                delivery_id,
                Box::new(move |mut d| {
                    if d.assigned_to.as_deref() != Some(courier.as_str()) {
                        return Err(AppError::UnauthorizedAssignment);
                    }
                    valid_transition(d.status, target)?;

                    d.status = target;
                    if target == DeliveryStatus::Delivered {
                        d.assigned_to = None;
                        d.delivered_by = Some(courier);
                    }
                    Ok(d)
                }),
            )
            .await
    }
}
