use anyhow::Context as _;
use chrono::Utc;
use uuid::Uuid;

use zari_auth_types::token::issue_access_token;

use crate::domain::repository::AdminRepository;
use crate::domain::types::Admin;
use crate::error::LicensingServiceError;

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub access_token: String,
    pub expires_in: u64,
    pub username: String,
    pub is_admin: bool,
}

pub struct LoginUseCase<A: AdminRepository> {
    pub admins: A,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl<A: AdminRepository> LoginUseCase<A> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, LicensingServiceError> {
        if input.username.is_empty() || input.password.is_empty() {
            return Err(LicensingServiceError::MissingData);
        }

        let Some(admin) = self.admins.find_by_username(&input.username).await? else {
            tracing::warn!(username = %input.username, "login for unknown admin");
            return Err(LicensingServiceError::InvalidCredentials);
        };

        let hash = admin.password_hash.clone();
        let password = input.password;
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .context("join bcrypt verify")?
            .unwrap_or(false);
        if !matches {
            tracing::warn!(username = %admin.username, "login with wrong password");
            return Err(LicensingServiceError::InvalidCredentials);
        }

        let (access_token, _exp) = issue_access_token(
            &admin.username,
            admin.is_admin,
            &self.jwt_secret,
            self.token_ttl_secs,
        )
        .context("issue access token")?;

        Ok(LoginOutput {
            access_token,
            expires_in: self.token_ttl_secs,
            username: admin.username,
            is_admin: admin.is_admin,
        })
    }
}

// ── SeedInitialAdmin ─────────────────────────────────────────────────────────

pub struct SeedAdminUseCase<A: AdminRepository> {
    pub admins: A,
    /// bcrypt work factor.
    pub cost: u32,
}

impl<A: AdminRepository> SeedAdminUseCase<A> {
    /// Create the first admin account. Returns `false` if any admin already exists.
    pub async fn execute(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, LicensingServiceError> {
        if username.is_empty() || password.is_empty() {
            return Err(LicensingServiceError::MissingData);
        }
        if self.admins.count().await? > 0 {
            return Ok(false);
        }

        let admin = Admin {
            id: Uuid::now_v7(),
            username: username.to_owned(),
            password_hash: hash_password(password.to_owned(), self.cost).await?,
            is_admin: true,
            created_at: Utc::now(),
        };
        if !self.admins.create(&admin).await? {
            return Ok(false);
        }
        tracing::info!(username, "initial admin created");
        Ok(true)
    }
}

// ── RegisterAdmin ────────────────────────────────────────────────────────────

pub struct RegisterAdminInput {
    pub username: String,
    pub password: String,
    pub is_admin: bool,
}

pub struct RegisterAdminUseCase<A: AdminRepository> {
    pub admins: A,
    /// bcrypt work factor.
    pub cost: u32,
}

impl<A: AdminRepository> RegisterAdminUseCase<A> {
    pub async fn execute(&self, input: RegisterAdminInput) -> Result<Admin, LicensingServiceError> {
        if input.username.is_empty() || input.password.is_empty() {
            return Err(LicensingServiceError::MissingData);
        }
        if self.admins.find_by_username(&input.username).await?.is_some() {
            return Err(LicensingServiceError::AdminAlreadyExists);
        }

        let admin = Admin {
            id: Uuid::now_v7(),
            username: input.username,
            password_hash: hash_password(input.password, self.cost).await?,
            is_admin: input.is_admin,
            created_at: Utc::now(),
        };
        // Unique username index settles concurrent registrations.
        if !self.admins.create(&admin).await? {
            return Err(LicensingServiceError::AdminAlreadyExists);
        }
        tracing::info!(
            username = %admin.username,
            is_admin = admin.is_admin,
            "account registered"
        );
        Ok(admin)
    }
}

// ── ListAdmins ───────────────────────────────────────────────────────────────

pub struct ListAdminsUseCase<A: AdminRepository> {
    pub admins: A,
}

impl<A: AdminRepository> ListAdminsUseCase<A> {
    pub async fn execute(&self) -> Result<Vec<Admin>, LicensingServiceError> {
        self.admins.list().await
    }
}

/// Hash on the blocking pool.
async fn hash_password(password: String, cost: u32) -> Result<String, LicensingServiceError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("join bcrypt hash")?
        .context("hash password")?;
    Ok(hash)
}
