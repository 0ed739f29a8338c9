use std::sync::Arc;

use crate::error::AppError;
use crate::geo::haversine_km;
use crate::models::delivery::{Delivery, DeliveryStatus, GeoPoint};
use crate::store::{DeliveryQuery, DeliveryStore};

/// Who is asking, with the one field each role filters on.
#[derive(Debug, Clone)]
pub enum Caller {
    /// A business only ever sees its own postings; the name is pushed
    /// down into the store query.
    Business { business_name: String },
    Courier { courier_id: String },
    Admin,
}

#[derive(Debug, Clone)]
pub struct ListParams {
    pub status: Option<DeliveryStatus>,
    pub center: Option<GeoPoint>,
    pub radius_km: Option<f64>,
    pub page_size: usize,
    /// Id of the last delivery of the previous page, sent back verbatim.
    pub page_cursor: Option<String>,
    pub caller: Caller,
}

#[derive(Debug, Clone)]
pub struct DeliveryPage {
    pub deliveries: Vec<Delivery>,
    /// Set only when the page came back full; a short page means the
    /// listing is exhausted.
    pub next_cursor: Option<String>,
}

/// Merges store-side filtering with application-side geo and visibility
/// filtering. The store answers equality filters and ordering; distance
/// and role policy are computed here because the store has neither.
#[derive(Clone)]
pub struct ListingEngine {
    store: Arc<dyn DeliveryStore>,
}

impl ListingEngine {
    pub fn new(store: Arc<dyn DeliveryStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, params: &ListParams) -> Result<DeliveryPage, AppError> {
        let query = DeliveryQuery {
            status: params.status,
            business_name: match &params.caller {
                Caller::Business { business_name } => Some(business_name.clone()),
                _ => None,
            },
            page_size: params.page_size,
            start_after: params.page_cursor.clone(),
        };

        let fetched = self.store.query(&query).await?;
        let deliveries: Vec<Delivery> = fetched
            .into_iter()
            .filter(|d| within_radius(d, params) && visible_to_caller(d, params))
            .collect();

        let next_cursor = if params.page_size > 0 && deliveries.len() == params.page_size {
            deliveries.last().map(|d| d.id.clone())
        } else {
            None
        };

        Ok(DeliveryPage {
            deliveries,
            next_cursor,
        })
    }
}

/// Geo-radius check against the pickup point. A courier keeps sight of a
/// delivery assigned to them even when it has drifted out of the search
/// radius; they may have physically traveled away from where they found it.
fn within_radius(d: &Delivery, params: &ListParams) -> bool {
    let (Some(center), Some(radius_km)) = (params.center, params.radius_km) else {
        return true;
    };

    if haversine_km(&center, &d.business_location) <= radius_km {
        return true;
    }

    match &params.caller {
        Caller::Courier { courier_id } => d.assigned_to.as_deref() == Some(courier_id),
        _ => false,
    }
}

/// Role-based visibility on top of any distance result.
///
/// Couriers without a status filter see the open board (unassigned
/// `posted`) plus everything currently assigned to them. With a filter,
/// `posted` stays unfiltered by assignment and any other status shows
/// only their own deliveries. Business callers were already narrowed to
/// their own name at query time; admins see everything.
fn visible_to_caller(d: &Delivery, params: &ListParams) -> bool {
    let Caller::Courier { courier_id } = &params.caller else {
        return true;
    };
    let mine = d.assigned_to.as_deref() == Some(courier_id);

    match params.status {
        None => match d.status {
            DeliveryStatus::Posted => d.assigned_to.is_none(),
            _ => mine,
        },
        Some(DeliveryStatus::Posted) => true,
        Some(_) => mine,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::store::memory::MemoryStore;

    fn delivery(id: &str, minutes_ago: i64, status: DeliveryStatus) -> Delivery {
        Delivery {
            id: id.to_string(),
            created_by: "biz-1".to_string(),
            business_id: "biz-1".to_string(),
            business_name: "Cafe Mitte".to_string(),
            business_address: "Alexanderplatz 1".to_string(),
            business_location: GeoPoint { lat: 52.52, lng: 13.40 },
            destination_address: "Kantstr. 12".to_string(),
            destination_location: GeoPoint { lat: 52.51, lng: 13.31 },
            item: "parcel".to_string(),
            status,
            assigned_to: None,
            delivered_by: None,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            payment: None,
        }
    }

    async fn engine_with(deliveries: Vec<Delivery>) -> ListingEngine {
        let store = Arc::new(MemoryStore::new());
        for d in &deliveries {
            store.create(d).await.unwrap();
        }
        ListingEngine::new(store)
    }

    fn courier_params(courier_id: &str) -> ListParams {
        ListParams {
            status: None,
            center: None,
            radius_km: None,
            page_size: 0,
            page_cursor: None,
            caller: Caller::Courier {
                courier_id: courier_id.to_string(),
            },
        }
    }

    fn ids(page: &DeliveryPage) -> Vec<&str> {
        page.deliveries.iter().map(|d| d.id.as_str()).collect()
    }

    #[tokio::test]
    async fn unfiltered_courier_sees_open_board_plus_own_work() {
        let mut b = delivery("b", 2, DeliveryStatus::Accepted);
        b.assigned_to = Some("courier-x".to_string());
        let mut c = delivery("c", 3, DeliveryStatus::Accepted);
        c.assigned_to = Some("courier-y".to_string());
        let engine =
            engine_with(vec![delivery("a", 1, DeliveryStatus::Posted), b, c]).await;

        let page = engine.list(&courier_params("courier-x")).await.unwrap();
        assert_eq!(ids(&page), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn status_filter_posted_is_unfiltered_by_assignment() {
        let engine = engine_with(vec![
            delivery("a", 1, DeliveryStatus::Posted),
            delivery("b", 2, DeliveryStatus::Posted),
        ])
        .await;

        let mut params = courier_params("courier-x");
        params.status = Some(DeliveryStatus::Posted);
        let page = engine.list(&params).await.unwrap();
        assert_eq!(ids(&page), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn status_filter_beyond_posted_shows_only_own() {
        let mut mine = delivery("mine", 1, DeliveryStatus::PickedUp);
        mine.assigned_to = Some("courier-x".to_string());
        let mut theirs = delivery("theirs", 2, DeliveryStatus::PickedUp);
        theirs.assigned_to = Some("courier-y".to_string());
        let engine = engine_with(vec![mine, theirs]).await;

        let mut params = courier_params("courier-x");
        params.status = Some(DeliveryStatus::PickedUp);
        let page = engine.list(&params).await.unwrap();
        assert_eq!(ids(&page), vec!["mine"]);
    }

    #[tokio::test]
    async fn radius_excludes_far_postings_but_not_own_assignments() {
        // Pickup in Berlin; searching around Hamburg with a 50 km radius.
        let far_posted = delivery("far-posted", 1, DeliveryStatus::Posted);
        let mut far_mine = delivery("far-mine", 2, DeliveryStatus::Accepted);
        far_mine.assigned_to = Some("courier-x".to_string());
        let mut near = delivery("near", 3, DeliveryStatus::Posted);
        near.business_location = GeoPoint { lat: 53.55, lng: 9.99 };
        let engine = engine_with(vec![far_posted, far_mine, near]).await;

        let mut params = courier_params("courier-x");
        params.center = Some(GeoPoint { lat: 53.5511, lng: 9.9937 });
        params.radius_km = Some(50.0);
        let page = engine.list(&params).await.unwrap();
        assert_eq!(ids(&page), vec!["far-mine", "near"]);
    }

    #[tokio::test]
    async fn radius_excludes_far_postings_for_business_callers() {
        let mut near = delivery("near", 2, DeliveryStatus::Posted);
        near.business_location = GeoPoint { lat: 53.55, lng: 9.99 };
        let engine = engine_with(vec![delivery("far", 1, DeliveryStatus::Posted), near]).await;

        let params = ListParams {
            status: None,
            center: Some(GeoPoint { lat: 53.5511, lng: 9.9937 }),
            radius_km: Some(50.0),
            page_size: 0,
            page_cursor: None,
            caller: Caller::Business {
                business_name: "Cafe Mitte".to_string(),
            },
        };
        let page = engine.list(&params).await.unwrap();
        assert_eq!(ids(&page), vec!["near"]);
    }

    #[tokio::test]
    async fn business_sees_only_its_own_postings() {
        let mut other = delivery("other", 1, DeliveryStatus::Posted);
        other.business_name = "Bakery Nord".to_string();
        let engine = engine_with(vec![other, delivery("own", 2, DeliveryStatus::Posted)]).await;

        let params = ListParams {
            status: None,
            center: None,
            radius_km: None,
            page_size: 0,
            page_cursor: None,
            caller: Caller::Business {
                business_name: "Cafe Mitte".to_string(),
            },
        };
        let page = engine.list(&params).await.unwrap();
        assert_eq!(ids(&page), vec!["own"]);
    }

    #[tokio::test]
    async fn admin_sees_everything() {
        let mut assigned = delivery("b", 2, DeliveryStatus::Accepted);
        assigned.assigned_to = Some("courier-y".to_string());
        let engine = engine_with(vec![delivery("a", 1, DeliveryStatus::Posted), assigned]).await;

        let params = ListParams {
            status: None,
            center: None,
            radius_km: None,
            page_size: 0,
            page_cursor: None,
            caller: Caller::Admin,
        };
        let page = engine.list(&params).await.unwrap();
        assert_eq!(ids(&page), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn full_pages_carry_a_cursor_and_short_pages_do_not() {
        let engine = engine_with(vec![
            delivery("a", 1, DeliveryStatus::Posted),
            delivery("b", 2, DeliveryStatus::Posted),
            delivery("c", 3, DeliveryStatus::Posted),
        ])
        .await;

        let mut params = courier_params("courier-x");
        params.page_size = 2;
        let first = engine.list(&params).await.unwrap();
        assert_eq!(ids(&first), vec!["a", "b"]);
        assert_eq!(first.next_cursor.as_deref(), Some("b"));

        params.page_cursor = first.next_cursor;
        let second = engine.list(&params).await.unwrap();
        assert_eq!(ids(&second), vec!["c"]);
        assert!(second.next_cursor.is_none(), "short page ends the listing");
    }
}
