use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use uuid::Uuid;

use zari_licensing_schema::{admins, definition_updates, license_keys, virus_signatures};

use zari_licensing::domain::repository::{
    AdminRepository, Clock, DefinitionRepository, KeyGenerator, LicenseRepository,
    SignatureRepository,
};
use zari_licensing::domain::types::{
    Admin, DefinitionUpdate, LicenseFilter, LicenseKey, SignatureBody, SignatureKind,
    SignatureStats, VirusSignature,
};
use zari_licensing::error::LicensingServiceError;

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

pub fn test_license(key: &str, expires_at: DateTime<Utc>, device_id: Option<&str>) -> LicenseKey {
    LicenseKey {
        id: Uuid::now_v7(),
        key: key.to_owned(),
        created_at: expires_at - Duration::days(30),
        expires_at,
        device_id: device_id.map(str::to_owned),
    }
}

pub fn active_license(key: &str, device_id: Option<&str>) -> LicenseKey {
    test_license(key, t0() + Duration::days(30), device_id)
}

pub fn expired_license(key: &str, device_id: Option<&str>) -> LicenseKey {
    test_license(key, t0() - Duration::days(1), device_id)
}

fn broken() -> LicensingServiceError {
    LicensingServiceError::Internal(anyhow!("storage unavailable"))
}

// ── SQLite ───────────────────────────────────────────────────────────────────

/// Fresh in-memory database with every licensing table created from the entities.
/// A single pooled connection keeps all queries on the same in-memory database.
pub async fn sqlite_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(admins::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(license_keys::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(virus_signatures::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(definition_updates::Entity)))
        .await
        .unwrap();
    db
}

// ── FixedClock ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ── ScriptedKeyGenerator ─────────────────────────────────────────────────────

/// Yields the scripted keys in order, then distinct fallback keys.
pub struct ScriptedKeyGenerator {
    script: Mutex<VecDeque<String>>,
    fallback: Mutex<u32>,
    pub calls: Arc<Mutex<usize>>,
}

impl ScriptedKeyGenerator {
    pub fn new(keys: &[&str]) -> Self {
        Self {
            script: Mutex::new(keys.iter().map(|k| (*k).to_owned()).collect()),
            fallback: Mutex::new(0),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Always yields the same key.
    pub fn stuck(key: &str) -> Self {
        Self::new(&[key; 64])
    }
}

impl KeyGenerator for ScriptedKeyGenerator {
    fn generate(&self) -> String {
        *self.calls.lock().unwrap() += 1;
        if let Some(key) = self.script.lock().unwrap().pop_front() {
            return key;
        }
        let mut n = self.fallback.lock().unwrap();
        *n += 1;
        format!("ZZZZ-ZZZZ-ZZZZ-{:04}", *n)
    }
}

// ── MockLicenseRepo ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockLicenseRepo {
    pub licenses: Arc<Mutex<Vec<LicenseKey>>>,
    /// Returned by `find_by_key` instead of the stored row, to simulate a read
    /// taken just before a concurrent writer changed the binding.
    pub stale_lookup: Option<LicenseKey>,
    pub broken: bool,
    pub cas_calls: Arc<Mutex<usize>>,
}

impl MockLicenseRepo {
    pub fn new(licenses: Vec<LicenseKey>) -> Self {
        Self {
            licenses: Arc::new(Mutex::new(licenses)),
            stale_lookup: None,
            broken: false,
            cas_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn with_stale_lookup(stored: LicenseKey, stale: LicenseKey) -> Self {
        Self {
            stale_lookup: Some(stale),
            ..Self::new(vec![stored])
        }
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::empty()
        }
    }

    pub fn snapshot(&self) -> Vec<LicenseKey> {
        self.licenses.lock().unwrap().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<LicenseKey> {
        self.snapshot().into_iter().find(|l| l.id == id)
    }

    pub fn cas_calls(&self) -> usize {
        *self.cas_calls.lock().unwrap()
    }
}

impl LicenseRepository for MockLicenseRepo {
    async fn find_by_key(&self, key: &str) -> Result<Option<LicenseKey>, LicensingServiceError> {
        if self.broken {
            return Err(broken());
        }
        if let Some(stale) = self.stale_lookup.as_ref().filter(|l| l.key == key) {
            return Ok(Some(stale.clone()));
        }
        Ok(self
            .licenses
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.key == key)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LicenseKey>, LicensingServiceError> {
        if self.broken {
            return Err(broken());
        }
        Ok(self
            .licenses
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn insert(&self, license: &LicenseKey) -> Result<bool, LicensingServiceError> {
        if self.broken {
            return Err(broken());
        }
        let mut licenses = self.licenses.lock().unwrap();
        if licenses.iter().any(|l| l.key == license.key) {
            return Ok(false);
        }
        licenses.push(license.clone());
        Ok(true)
    }

    async fn update_device_id(
        &self,
        id: Uuid,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<bool, LicensingServiceError> {
        if self.broken {
            return Err(broken());
        }
        *self.cas_calls.lock().unwrap() += 1;
        let mut licenses = self.licenses.lock().unwrap();
        match licenses.iter_mut().find(|l| l.id == id) {
            Some(license) if license.device_id.as_deref() == expected => {
                license.device_id = new.map(str::to_owned);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, LicensingServiceError> {
        if self.broken {
            return Err(broken());
        }
        let mut licenses = self.licenses.lock().unwrap();
        let before = licenses.len();
        licenses.retain(|l| l.id != id);
        Ok(licenses.len() < before)
    }

    async fn list(
        &self,
        filter: Option<LicenseFilter>,
        now: DateTime<Utc>,
    ) -> Result<Vec<LicenseKey>, LicensingServiceError> {
        if self.broken {
            return Err(broken());
        }
        Ok(self
            .licenses
            .lock()
            .unwrap()
            .iter()
            .filter(|l| filter.is_none_or(|f| f.matches(l, now)))
            .cloned()
            .collect())
    }

    async fn count(
        &self,
        filter: Option<LicenseFilter>,
        now: DateTime<Utc>,
    ) -> Result<u64, LicensingServiceError> {
        Ok(self.list(filter, now).await?.len() as u64)
    }
}

// ── MockSignatureRepo ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockSignatureRepo {
    pub signatures: Arc<Mutex<Vec<VirusSignature>>>,
}

impl MockSignatureRepo {
    pub fn new(signatures: Vec<VirusSignature>) -> Self {
        Self {
            signatures: Arc::new(Mutex::new(signatures)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn snapshot(&self) -> Vec<VirusSignature> {
        self.signatures.lock().unwrap().clone()
    }
}

fn hash_of(sig: &VirusSignature) -> Option<&str> {
    match &sig.body {
        SignatureBody::Hash { hash_value } => Some(hash_value),
        SignatureBody::Pattern { .. } => None,
    }
}

fn pattern_id_of(sig: &VirusSignature) -> Option<&str> {
    match &sig.body {
        SignatureBody::Hash { .. } => None,
        SignatureBody::Pattern { signature_id, .. } => Some(signature_id),
    }
}

impl SignatureRepository for MockSignatureRepo {
    async fn find_by_hash(
        &self,
        hash_value: &str,
    ) -> Result<Option<VirusSignature>, LicensingServiceError> {
        Ok(self
            .signatures
            .lock()
            .unwrap()
            .iter()
            .find(|s| hash_of(s) == Some(hash_value))
            .cloned())
    }

    async fn insert(&self, signature: &VirusSignature) -> Result<bool, LicensingServiceError> {
        let mut signatures = self.signatures.lock().unwrap();
        let taken = signatures.iter().any(|s| {
            (hash_of(signature).is_some() && hash_of(s) == hash_of(signature))
                || (pattern_id_of(signature).is_some()
                    && pattern_id_of(s) == pattern_id_of(signature))
        });
        if taken {
            return Ok(false);
        }
        signatures.push(signature.clone());
        Ok(true)
    }

    async fn pattern_ids(&self) -> Result<Vec<String>, LicensingServiceError> {
        Ok(self
            .signatures
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| pattern_id_of(s).map(str::to_owned))
            .collect())
    }

    async fn list(
        &self,
        kind: Option<SignatureKind>,
    ) -> Result<Vec<VirusSignature>, LicensingServiceError> {
        Ok(self
            .signatures
            .lock()
            .unwrap()
            .iter()
            .filter(|s| kind.is_none_or(|k| s.body.kind() == k))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VirusSignature>, LicensingServiceError> {
        Ok(self
            .signatures
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, LicensingServiceError> {
        let mut signatures = self.signatures.lock().unwrap();
        let before = signatures.len();
        signatures.retain(|s| s.id != id);
        Ok(signatures.len() < before)
    }

    async fn stats(&self) -> Result<SignatureStats, LicensingServiceError> {
        let signatures = self.signatures.lock().unwrap();
        let hash_based = signatures
            .iter()
            .filter(|s| s.body.kind() == SignatureKind::Hash)
            .count() as u64;
        Ok(SignatureStats {
            total: signatures.len() as u64,
            hash_based,
            pattern_based: signatures.len() as u64 - hash_based,
        })
    }
}

// ── MockDefinitionRepo ───────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockDefinitionRepo {
    pub updates: Arc<Mutex<Vec<DefinitionUpdate>>>,
    pub broken: bool,
}

impl MockDefinitionRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Vec<DefinitionUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

impl DefinitionRepository for MockDefinitionRepo {
    async fn insert(&self, update: &DefinitionUpdate) -> Result<(), LicensingServiceError> {
        if self.broken {
            return Err(broken());
        }
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }

    async fn latest(
        &self,
        kind: Option<SignatureKind>,
    ) -> Result<Option<DefinitionUpdate>, LicensingServiceError> {
        if self.broken {
            return Err(broken());
        }
        Ok(self
            .updates
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|u| kind.is_none_or(|k| u.kind == k))
            .cloned())
    }
}

// ── MockAdminRepo ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockAdminRepo {
    pub admins: Arc<Mutex<Vec<Admin>>>,
}

impl MockAdminRepo {
    pub fn new(admins: Vec<Admin>) -> Self {
        Self {
            admins: Arc::new(Mutex::new(admins)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn snapshot(&self) -> Vec<Admin> {
        self.admins.lock().unwrap().clone()
    }
}

impl AdminRepository for MockAdminRepo {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Admin>, LicensingServiceError> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn count(&self) -> Result<u64, LicensingServiceError> {
        Ok(self.admins.lock().unwrap().len() as u64)
    }

    async fn create(&self, admin: &Admin) -> Result<bool, LicensingServiceError> {
        let mut admins = self.admins.lock().unwrap();
        if admins.iter().any(|a| a.username == admin.username) {
            return Ok(false);
        }
        admins.push(admin.clone());
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<Admin>, LicensingServiceError> {
        Ok(self.snapshot())
    }
}

/// Lowest bcrypt cost; keeps hashing fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_admin(username: &str, password: &str, is_admin: bool) -> Admin {
    Admin {
        id: Uuid::now_v7(),
        username: username.to_owned(),
        password_hash: bcrypt::hash(password, TEST_BCRYPT_COST).unwrap(),
        is_admin,
        created_at: t0(),
    }
}
