use dashmap::DashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::directory::UserDirectory;
use crate::error::AppError;
use crate::models::user::{BusinessProfile, CourierProfile, Role};

/// Startup roster for the in-memory directory, read from the JSON file
/// named by `DIRECTORY_SEED`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DirectorySeed {
    pub businesses: Vec<BusinessProfile>,
    pub couriers: Vec<CourierProfile>,
    pub admins: Vec<String>,
}

#[derive(Debug, Clone)]
enum UserRecord {
    Business(BusinessProfile),
    Courier(CourierProfile),
    Admin,
}

/// In-memory user directory, keyed by uid.
#[derive(Default)]
pub struct MemoryDirectory {
    users: DashMap<String, UserRecord>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        let directory = Self::new();
        for business in seed.businesses {
            directory.insert_business(business);
        }
        for courier in seed.couriers {
            directory.insert_courier(courier);
        }
        for admin in &seed.admins {
            directory.insert_admin(admin);
        }
        directory
    }

    pub fn from_seed_file(path: &str) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| AppError::Internal(format!("failed to read seed {path}: {err}")))?;
        let seed: DirectorySeed = serde_json::from_str(&raw)
            .map_err(|err| AppError::Internal(format!("invalid seed {path}: {err}")))?;
        Ok(Self::from_seed(seed))
    }

    pub fn insert_business(&self, profile: BusinessProfile) {
        self.users
            .insert(profile.id.clone(), UserRecord::Business(profile));
    }

    pub fn insert_courier(&self, profile: CourierProfile) {
        self.users
            .insert(profile.id.clone(), UserRecord::Courier(profile));
    }

    pub fn insert_admin(&self, uid: &str) {
        self.users.insert(uid.to_string(), UserRecord::Admin);
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn role(&self, uid: &str) -> Result<Role, AppError> {
        let record = self
            .users
            .get(uid)
            .ok_or_else(|| AppError::RoleLookupFailed(format!("unknown user {uid}")))?;
        Ok(match record.value() {
            UserRecord::Business(_) => Role::Business,
            UserRecord::Courier(_) => Role::Courier,
            UserRecord::Admin => Role::Admin,
        })
    }

    async fn business_profile(&self, uid: &str) -> Result<BusinessProfile, AppError> {
        let record = self
            .users
            .get(uid)
            .ok_or_else(|| AppError::RoleLookupFailed(format!("unknown user {uid}")))?;
        match record.value() {
            UserRecord::Business(profile) => Ok(profile.clone()),
            _ => Err(AppError::RoleLookupFailed(format!(
                "{uid} is not a business user"
            ))),
        }
    }

    async fn courier_profile(&self, uid: &str) -> Result<CourierProfile, AppError> {
        let record = self
            .users
            .get(uid)
            .ok_or_else(|| AppError::RoleLookupFailed(format!("unknown user {uid}")))?;
        match record.value() {
            UserRecord::Courier(profile) => Ok(profile.clone()),
            _ => Err(AppError::RoleLookupFailed(format!(
                "{uid} is not a courier user"
            ))),
        }
    }

    async fn couriers(&self) -> Result<Vec<CourierProfile>, AppError> {
        Ok(self
            .users
            .iter()
            .filter_map(|entry| match entry.value() {
                UserRecord::Courier(profile) => Some(profile.clone()),
                _ => None,
            })
            .collect())
    }

    async fn businesses(&self) -> Result<Vec<BusinessProfile>, AppError> {
        Ok(self
            .users
            .iter()
            .filter_map(|entry| match entry.value() {
                UserRecord::Business(profile) => Some(profile.clone()),
                _ => None,
            })
            .collect())
    }
}
