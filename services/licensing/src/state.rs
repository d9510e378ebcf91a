use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use zari_auth_types::identity::JwtSecret;

use crate::infra::clock::SystemClock;
use crate::infra::db::{
    DbAdminRepository, DbDefinitionRepository, DbLicenseRepository, DbSignatureRepository,
};
use crate::infra::keygen::RandomKeyGenerator;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: JwtSecret,
    pub access_token_ttl_secs: u64,
    pub max_upload_bytes: usize,
    /// bcrypt work factor for newly registered accounts.
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn license_repo(&self) -> DbLicenseRepository {
        DbLicenseRepository {
            db: self.db.clone(),
        }
    }

    pub fn signature_repo(&self) -> DbSignatureRepository {
        DbSignatureRepository {
            db: self.db.clone(),
        }
    }

    pub fn admin_repo(&self) -> DbAdminRepository {
        DbAdminRepository {
            db: self.db.clone(),
        }
    }

    pub fn definition_repo(&self) -> DbDefinitionRepository {
        DbDefinitionRepository {
            db: self.db.clone(),
        }
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock
    }

    pub fn key_generator(&self) -> RandomKeyGenerator {
        RandomKeyGenerator
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}
