#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{
    Admin, DefinitionUpdate, LicenseFilter, LicenseKey, SignatureKind, SignatureStats,
    VirusSignature,
};
use crate::error::LicensingServiceError;

/// Repository for license keys.
pub trait LicenseRepository: Send + Sync {
    async fn find_by_key(&self, key: &str) -> Result<Option<LicenseKey>, LicensingServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LicenseKey>, LicensingServiceError>;

    /// Insert a new license. Returns `false` if another license already holds `license.key`.
    async fn insert(&self, license: &LicenseKey) -> Result<bool, LicensingServiceError>;

    /// Set `device_id` to `new` only if it currently equals `expected`.
    /// Returns `true` if the row was updated, `false` on mismatch or missing row.
    async fn update_device_id(
        &self,
        id: Uuid,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<bool, LicensingServiceError>;

    /// Delete a license. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, LicensingServiceError>;

    /// List licenses in creation order. Time-based filters compare against `now`.
    async fn list(
        &self,
        filter: Option<LicenseFilter>,
        now: DateTime<Utc>,
    ) -> Result<Vec<LicenseKey>, LicensingServiceError>;

    async fn count(
        &self,
        filter: Option<LicenseFilter>,
        now: DateTime<Utc>,
    ) -> Result<u64, LicensingServiceError>;
}

/// Repository for virus signatures.
pub trait SignatureRepository: Send + Sync {
    async fn find_by_hash(
        &self,
        hash_value: &str,
    ) -> Result<Option<VirusSignature>, LicensingServiceError>;

    /// Insert a signature. Returns `false` if its hash or signature id is already taken.
    async fn insert(&self, signature: &VirusSignature) -> Result<bool, LicensingServiceError>;

    /// All `ZARI-NNNN` ids currently held by pattern signatures.
    async fn pattern_ids(&self) -> Result<Vec<String>, LicensingServiceError>;

    /// List signatures in creation order, optionally restricted to one kind.
    async fn list(
        &self,
        kind: Option<SignatureKind>,
    ) -> Result<Vec<VirusSignature>, LicensingServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VirusSignature>, LicensingServiceError>;

    /// Delete a signature. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, LicensingServiceError>;

    async fn stats(&self) -> Result<SignatureStats, LicensingServiceError>;
}

/// Repository for administrator accounts.
pub trait AdminRepository: Send + Sync {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Admin>, LicensingServiceError>;

    async fn count(&self) -> Result<u64, LicensingServiceError>;

    /// Insert an account. Returns `false` if the username is already taken.
    async fn create(&self, admin: &Admin) -> Result<bool, LicensingServiceError>;

    /// All accounts in creation order.
    async fn list(&self) -> Result<Vec<Admin>, LicensingServiceError>;
}

/// Repository for generated definitions documents.
pub trait DefinitionRepository: Send + Sync {
    async fn insert(&self, update: &DefinitionUpdate) -> Result<(), LicensingServiceError>;

    /// Most recent generation of `kind`, or of any kind when `None`.
    async fn latest(
        &self,
        kind: Option<SignatureKind>,
    ) -> Result<Option<DefinitionUpdate>, LicensingServiceError>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of candidate license key strings (`XXXX-XXXX-XXXX-XXXX`).
/// Uniqueness is not required; callers retry on collision.
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> String;
}
