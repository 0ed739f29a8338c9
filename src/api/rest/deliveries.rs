use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::rest::auth::Identity;
use crate::error::AppError;
use crate::models::delivery::{Delivery, DeliveryStatus, GeoPoint};
use crate::models::user::Role;
use crate::service::lifecycle::NewDelivery;
use crate::service::listing::{Caller, ListParams};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/deliveries", post(create_delivery).get(list_deliveries))
        .route("/deliveries/:id", patch(update_delivery))
        .route("/deliveries/:id/accept", post(accept_delivery))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryRequest {
    pub destination_address: String,
    pub destination_location: GeoPoint,
    pub item: String,
    pub payment: Option<serde_json::Value>,
}

async fn create_delivery(
    State(state): State<Arc<AppState>>,
    Identity(uid): Identity,
    Json(payload): Json<CreateDeliveryRequest>,
) -> Result<(StatusCode, Json<Delivery>), AppError> {
    if payload.item.trim().is_empty() {
        return Err(AppError::BadRequest("item cannot be empty".to_string()));
    }
    if payload.destination_address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "destination address cannot be empty".to_string(),
        ));
    }

    if state.directory.role(&uid).await? != Role::Business {
        return Err(AppError::Forbidden(
            "only businesses can post deliveries".to_string(),
        ));
    }

    // Business fields come from the stored profile, never from the body,
    // so a caller cannot post under someone else's storefront.
    let profile = state.directory.business_profile(&uid).await?;

    let delivery = state
        .lifecycle
        .create(
            &uid,
            &profile,
            NewDelivery {
                destination_address: payload.destination_address,
                destination_location: payload.destination_location,
                item: payload.item,
                payment: payload.payment,
            },
        )
        .await?;

    state.metrics.deliveries_created_total.inc();
    info!(delivery_id = %delivery.id, business = %delivery.business_name, "delivery posted");

    Ok((StatusCode::CREATED, Json(delivery)))
}

#[derive(Deserialize)]
pub struct ListQueryParams {
    pub status: Option<DeliveryStatus>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub r: Option<f64>,
    pub page_size: Option<usize>,
    pub page_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub deliveries: Vec<Delivery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

async fn list_deliveries(
    State(state): State<Arc<AppState>>,
    Identity(uid): Identity,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<ListResponse>, AppError> {
    let caller = match state.directory.role(&uid).await? {
        Role::Business => {
            let profile = state.directory.business_profile(&uid).await?;
            Caller::Business {
                business_name: profile.business_name,
            }
        }
        Role::Courier => Caller::Courier { courier_id: uid },
        Role::Admin => Caller::Admin,
    };

    // The radius filter only applies when the full center+radius triple
    // is present; anything partial is ignored.
    let (center, radius_km) = match (params.lat, params.lng, params.r) {
        (Some(lat), Some(lng), Some(r)) => (Some(GeoPoint { lat, lng }), Some(r)),
        _ => (None, None),
    };

    let page_size = params
        .page_size
        .unwrap_or(state.default_page_size)
        .min(state.max_page_size);

    let page = state
        .listing
        .list(&ListParams {
            status: params.status,
            center,
            radius_km,
            page_size,
            page_cursor: params.page_token.filter(|token| !token.is_empty()),
            caller,
        })
        .await
        .map_err(|err| match err {
            // A cursor that no longer resolves to a document is the
            // caller's stale bookmark, not a missing delivery.
            AppError::NotFound(_) => AppError::BadRequest("unknown page token".to_string()),
            other => other,
        })?;

    state.metrics.list_requests_total.inc();

    Ok(Json(ListResponse {
        deliveries: page.deliveries,
        next_page_token: page.next_cursor,
    }))
}

async fn accept_delivery(
    State(state): State<Arc<AppState>>,
    Identity(uid): Identity,
    Path(id): Path<String>,
) -> Result<Json<Delivery>, AppError> {
    require_courier(&state, &uid).await?;

    match state.lifecycle.accept(&id, &uid).await {
        Ok(delivery) => {
            state
                .metrics
                .delivery_accepts_total
                .with_label_values(&["won"])
                .inc();
            info!(delivery_id = %id, courier = %uid, "delivery accepted");
            Ok(Json(delivery))
        }
        Err(err @ AppError::InvalidTransition { .. }) => {
            state
                .metrics
                .delivery_accepts_total
                .with_label_values(&["lost"])
                .inc();
            Err(err)
        }
        Err(err) => {
            state
                .metrics
                .delivery_accepts_total
                .with_label_values(&["error"])
                .inc();
            Err(err)
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateDeliveryRequest {
    pub status: DeliveryStatus,
}

async fn update_delivery(
    State(state): State<Arc<AppState>>,
    Identity(uid): Identity,
    Path(id): Path<String>,
    Json(payload): Json<UpdateDeliveryRequest>,
) -> Result<Json<Delivery>, AppError> {
    require_courier(&state, &uid).await?;

    match state.lifecycle.update_status(&id, payload.status, &uid).await {
        Ok(delivery) => {
            state
                .metrics
                .status_updates_total
                .with_label_values(&["success"])
                .inc();
            info!(delivery_id = %id, status = %delivery.status, "delivery status updated");
            Ok(Json(delivery))
        }
        Err(err) => {
            state
                .metrics
                .status_updates_total
                .with_label_values(&["error"])
                .inc();
            Err(err)
        }
    }
}

async fn require_courier(state: &AppState, uid: &str) -> Result<(), AppError> {
    match state.directory.role(uid).await? {
        Role::Courier => Ok(()),
        _ => Err(AppError::Forbidden(
            "only couriers can work deliveries".to_string(),
        )),
    }
}
