pub mod memory;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::user::{BusinessProfile, CourierProfile, Role};

/// Identity and role lookup. The lifecycle and listing code consumes this
/// as a black box; handlers resolve the caller here before touching a
/// delivery, and swap in a double for tests.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn role(&self, uid: &str) -> Result<Role, AppError>;

    /// Profile for a business caller. Fails if the uid is unknown or does
    /// not carry the business role.
    async fn business_profile(&self, uid: &str) -> Result<BusinessProfile, AppError>;

    /// Profile for a courier caller, same role check.
    async fn courier_profile(&self, uid: &str) -> Result<CourierProfile, AppError>;

    async fn couriers(&self) -> Result<Vec<CourierProfile>, AppError>;

    async fn businesses(&self) -> Result<Vec<BusinessProfile>, AppError>;
}
