use std::fmt;

use serde::Deserialize;

use zari_core::config::Config;

/// Licensing service configuration loaded from environment variables.
#[derive(Deserialize)]
pub struct LicensingConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 3114). Env var: `LICENSING_PORT`.
    #[serde(default = "default_port")]
    pub licensing_port: u16,
    /// HMAC secret for signing admin bearer tokens.
    pub jwt_secret: String,
    /// Admin access-token lifetime in seconds (default 3600).
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,
    /// Username of the admin seeded on an empty database (default "admin").
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Password of the seeded admin. Seeding is skipped when unset.
    #[serde(default)]
    pub admin_password: Option<String>,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Request body limit for `POST /api/scan` (default 16 MiB).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Config for LicensingConfig {}

fn default_port() -> u16 {
    3114
}

fn default_access_token_ttl_secs() -> u64 {
    3600
}

fn default_admin_username() -> String {
    "admin".to_owned()
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

impl fmt::Debug for LicensingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicensingConfig")
            .field("licensing_port", &self.licensing_port)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "***"))
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish_non_exhaustive()
    }
}
