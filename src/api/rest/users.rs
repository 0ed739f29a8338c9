use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;

use crate::api::rest::auth::Identity;
use crate::error::AppError;
use crate::models::user::{BusinessProfile, CourierProfile, Role};
use crate::state::AppState;

/// Caller self-lookup plus the admin console surface: enumerate the
/// registered fleet and storefronts.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(my_profile))
        .route("/couriers", get(list_couriers))
        .route("/businesses", get(list_businesses))
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business: Option<BusinessProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier: Option<CourierProfile>,
}

async fn my_profile(
    State(state): State<Arc<AppState>>,
    Identity(uid): Identity,
) -> Result<Json<ProfileResponse>, AppError> {
    let role = state.directory.role(&uid).await?;
    let response = match role {
        Role::Business => ProfileResponse {
            role,
            business: Some(state.directory.business_profile(&uid).await?),
            courier: None,
        },
        Role::Courier => ProfileResponse {
            role,
            business: None,
            courier: Some(state.directory.courier_profile(&uid).await?),
        },
        Role::Admin => ProfileResponse {
            role,
            business: None,
            courier: None,
        },
    };
    Ok(Json(response))
}

async fn list_couriers(
    State(state): State<Arc<AppState>>,
    Identity(uid): Identity,
) -> Result<Json<Vec<CourierProfile>>, AppError> {
    require_admin(&state, &uid).await?;
    Ok(Json(state.directory.couriers().await?))
}

async fn list_businesses(
    State(state): State<Arc<AppState>>,
    Identity(uid): Identity,
) -> Result<Json<Vec<BusinessProfile>>, AppError> {
    require_admin(&state, &uid).await?;
    Ok(Json(state.directory.businesses().await?))
}

async fn require_admin(state: &AppState, uid: &str) -> Result<(), AppError> {
    match state.directory.role(uid).await? {
        Role::Admin => Ok(()),
        _ => Err(AppError::Forbidden(
            "admin role required".to_string(),
        )),
    }
}
